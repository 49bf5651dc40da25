use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeedreamError};

/// The two versioned Seedream edit endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    #[serde(rename = "v4")]
    V4,
    #[serde(rename = "v4.5")]
    V4_5,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::V4, ModelVariant::V4_5];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::V4 => "v4",
            ModelVariant::V4_5 => "v4.5",
        }
    }

    /// Key used for this variant in the aggregated raw response of a dual submit.
    pub fn raw_key(&self) -> &'static str {
        match self {
            ModelVariant::V4 => "v4",
            ModelVariant::V4_5 => "v4_5",
        }
    }

    /// Path segment of the model below the API base URL.
    pub fn model_path(&self) -> &'static str {
        match self {
            ModelVariant::V4 => "bytedance/seedream-v4/edit",
            ModelVariant::V4_5 => "bytedance/seedream-v4.5/edit",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelVariant::V4 => "Seedream v4",
            ModelVariant::V4_5 => "Seedream v4.5",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single submit dispatches: one endpoint or both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitTarget {
    Single(ModelVariant),
    Both,
}

impl SubmitTarget {
    pub fn variants(&self) -> Vec<ModelVariant> {
        match self {
            SubmitTarget::Single(variant) => vec![*variant],
            SubmitTarget::Both => ModelVariant::ALL.to_vec(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitTarget::Single(variant) => variant.as_str(),
            SubmitTarget::Both => "both",
        }
    }
}

impl Default for SubmitTarget {
    fn default() -> Self {
        SubmitTarget::Single(ModelVariant::V4)
    }
}

impl From<ModelVariant> for SubmitTarget {
    fn from(variant: ModelVariant) -> Self {
        SubmitTarget::Single(variant)
    }
}

impl FromStr for SubmitTarget {
    type Err = SeedreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v4" => Ok(SubmitTarget::Single(ModelVariant::V4)),
            "v4.5" | "v4_5" => Ok(SubmitTarget::Single(ModelVariant::V4_5)),
            "both" => Ok(SubmitTarget::Both),
            other => Err(SeedreamError::Config(format!(
                "unknown submit target '{}', expected v4, v4.5 or both",
                other
            ))),
        }
    }
}

impl fmt::Display for SubmitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn flipped(&self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

impl FromStr for Orientation {
    type Err = SeedreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(SeedreamError::Config(format!(
                "unknown orientation '{}'",
                other
            ))),
        }
    }
}
