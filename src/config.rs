use std::collections::BTreeMap;
use std::env;

use crate::{
    error::{Result, SeedreamError},
    models::ModelVariant,
};

pub const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai/api/v3";
pub const DEFAULT_LENS_SIZE: f64 = 180.0;
pub const DEFAULT_ZOOM_FACTOR: f64 = 2.5;

const PROFILE_ENV_PREFIX: &str = "SEEDREAM_PROFILE_";

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
    /// No timeout unless set; a hung call keeps the client busy.
    pub timeout_secs: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl EndpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("SEEDREAM_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("SEEDREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        EndpointConfig {
            base_url,
            timeout_secs,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Fixed edit URL of `variant` below the configured base.
    pub fn url_for(&self, variant: ModelVariant) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            variant.model_path()
        )
    }
}

#[derive(Debug, Clone)]
pub struct LensConfig {
    pub diameter: f64,
    pub zoom_factor: f64,
}

impl Default for LensConfig {
    fn default() -> Self {
        LensConfig {
            diameter: DEFAULT_LENS_SIZE,
            zoom_factor: DEFAULT_ZOOM_FACTOR,
        }
    }
}

impl LensConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let diameter = env::var("SEEDREAM_LENS_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|d: &f64| *d > 0.0)
            .unwrap_or(defaults.diameter);
        let zoom_factor = env::var("SEEDREAM_ZOOM")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|z: &f64| *z > 0.0)
            .unwrap_or(defaults.zoom_factor);

        LensConfig {
            diameter,
            zoom_factor,
        }
    }

    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }

    pub fn with_zoom(mut self, zoom_factor: f64) -> Self {
        self.zoom_factor = zoom_factor;
        self
    }
}

/// Named bearer tokens the caller can switch between.
#[derive(Clone, Default)]
pub struct ApiKeyProfiles {
    profiles: BTreeMap<String, String>,
}

// Tokens stay out of debug output.
impl std::fmt::Debug for ApiKeyProfiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyProfiles")
            .field("names", &self.names())
            .finish()
    }
}

impl ApiKeyProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every `SEEDREAM_PROFILE_<NAME>=<token>` variable.
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let profiles = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(PROFILE_ENV_PREFIX)?;
                if name.is_empty() || value.trim().is_empty() {
                    return None;
                }
                Some((name.to_ascii_lowercase(), value))
            })
            .collect();
        ApiKeyProfiles { profiles }
    }

    pub fn with_profile(mut self, name: impl Into<String>, token: impl Into<String>) -> Self {
        self.profiles
            .insert(name.into().to_ascii_lowercase(), token.into());
        self
    }

    pub fn get(&self, name: &str) -> Result<&str> {
        self.profiles
            .get(&name.trim().to_ascii_lowercase())
            .map(String::as_str)
            .ok_or_else(|| SeedreamError::UnknownProfile(name.to_string()))
    }

    /// Name of the profile whose token is `token`, if any.
    pub fn active_profile(&self, token: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|(_, candidate)| candidate.as_str() == token)
            .map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct SeedreamConfig {
    pub endpoints: EndpointConfig,
    pub lens: LensConfig,
    pub profiles: ApiKeyProfiles,
    /// Token used when no profile is selected.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for SeedreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedreamConfig")
            .field("endpoints", &self.endpoints)
            .field("lens", &self.lens)
            .field("profiles", &self.profiles)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SeedreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("SEEDREAM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        SeedreamConfig {
            endpoints: EndpointConfig::from_env(),
            lens: LensConfig::from_env(),
            profiles: ApiKeyProfiles::from_env(),
            api_key,
        }
    }

    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.endpoints.base_url = base_url.into();
        self
    }

    pub fn with_lens(mut self, lens: LensConfig) -> Self {
        self.lens = lens;
        self
    }

    pub fn with_profiles(mut self, profiles: ApiKeyProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
