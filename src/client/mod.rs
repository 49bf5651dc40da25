pub mod orchestrator;
pub mod transport;

use serde_json::Value;

use crate::{
    config::SeedreamConfig,
    error::Result,
    form::FormState,
    magnifier,
    models::{GalleryItem, LensGeometry, Point, Rect, SubmitReport, SubmitTarget},
};

pub use orchestrator::{build_request, BusyFlag, GenerationOrchestrator};
pub use transport::{HttpTransport, Transport};

/// Everything a front end talks to: the form, the orchestrator and the lens
/// settings.
pub struct SeedreamClient<T: Transport = HttpTransport> {
    config: SeedreamConfig,
    form: FormState,
    orchestrator: GenerationOrchestrator<T>,
}

impl SeedreamClient<HttpTransport> {
    pub fn new(config: SeedreamConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.endpoints)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> SeedreamClient<T> {
    pub fn with_transport(config: SeedreamConfig, transport: T) -> Self {
        let mut form = FormState::new();
        if let Some(api_key) = &config.api_key {
            form.set_api_key(api_key.clone());
        }
        let orchestrator = GenerationOrchestrator::new(transport, config.endpoints.clone());

        Self {
            config,
            form,
            orchestrator,
        }
    }

    pub fn config(&self) -> &SeedreamConfig {
        &self.config
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator<T> {
        &self.orchestrator
    }

    /// Selects one of the configured named API keys.
    pub fn use_profile(&mut self, name: &str) -> Result<()> {
        self.form.use_profile(name, &self.config.profiles)
    }

    /// Name of the configured profile matching the current key.
    pub fn active_profile(&self) -> Option<&str> {
        self.config.profiles.active_profile(self.form.api_key())
    }

    pub async fn submit(&mut self, target: SubmitTarget) -> SubmitReport {
        self.orchestrator.submit(target, &self.form).await
    }

    pub fn gallery(&self) -> &[GalleryItem] {
        self.orchestrator.gallery()
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.orchestrator.raw_response()
    }

    pub fn error(&self) -> Option<&str> {
        self.orchestrator.error()
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.orchestrator.busy_flag()
    }

    /// Lens geometry using the configured diameter and zoom.
    pub fn lens(
        &self,
        pointer: Point,
        container: Option<Rect>,
        image: Option<Rect>,
    ) -> Option<LensGeometry> {
        magnifier::compute_lens_with(pointer, container, image, &self.config.lens)
    }
}
