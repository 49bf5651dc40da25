use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::transport::Transport;
use crate::{
    config::EndpointConfig,
    error::{SeedreamError, ValidationError},
    extract::extract_image_urls,
    form::FormState,
    models::{
        GalleryItem, GenerationRequest, ModelVariant, RequestOutcome, SubmitReport, SubmitTarget,
    },
    planner,
};

/// Shared "request in flight" indicator. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) -> BusyGuard {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(self.0.clone())
    }
}

/// Lowers the flag when the dispatch ends, including when the submit
/// future is dropped mid-flight.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Checks the form in submit order and builds the wire body.
///
/// Order: pixel budget, API key, prompt, reference images. The first
/// failure wins.
pub fn build_request(form: &FormState) -> Result<GenerationRequest, ValidationError> {
    planner::validate_min_pixels(form.size())?;

    if form.api_key().trim().is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    if form.prompt().trim().is_empty() {
        return Err(ValidationError::MissingPrompt);
    }

    let images = form.filtered_images();
    if images.is_empty() {
        return Err(ValidationError::MissingImages);
    }

    Ok(GenerationRequest::new(form.prompt(), images, form.size()))
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    gallery: Vec<GalleryItem>,
    raw_response: Option<Value>,
    error: Option<String>,
    active_target: Option<SubmitTarget>,
}

impl SessionState {
    /// Newest batch goes first; order inside the batch is kept.
    fn prepend_batch(&mut self, variant: ModelVariant, payload: &Value) -> usize {
        let urls = extract_image_urls(Some(payload));
        if urls.is_empty() {
            log::warn!("{} answered without any image URL", variant.display_name());
            return 0;
        }

        let batch: Vec<GalleryItem> = urls
            .into_iter()
            .map(|url| GalleryItem::new(url, variant.into()))
            .collect();
        let added = batch.len();
        self.gallery.splice(0..0, batch);
        added
    }
}

/// Validates the form, fires one or both edit calls and folds the results
/// into the gallery, raw-response and error slots.
pub struct GenerationOrchestrator<T: Transport> {
    transport: T,
    endpoints: EndpointConfig,
    session: SessionState,
    busy: BusyFlag,
}

impl<T: Transport> GenerationOrchestrator<T> {
    pub fn new(transport: T, endpoints: EndpointConfig) -> Self {
        Self {
            transport,
            endpoints,
            session: SessionState::default(),
            busy: BusyFlag::default(),
        }
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Newest first.
    pub fn gallery(&self) -> &[GalleryItem] {
        &self.session.gallery
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.session.raw_response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.session.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn active_target(&self) -> Option<SubmitTarget> {
        self.session.active_target
    }

    /// Runs one submit. Failures end up in the error slot and the returned
    /// report; nothing is raised to the caller and nothing is retried.
    ///
    /// For [`SubmitTarget::Both`] the two calls run concurrently and each is
    /// handled as soon as it settles, so a failing call never hides the
    /// gallery update of its sibling.
    pub async fn submit(&mut self, target: SubmitTarget, form: &FormState) -> SubmitReport {
        self.session.error = None;
        self.session.raw_response = None;
        self.session.active_target = Some(target);

        let request = match build_request(form) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Submit ({}) rejected: {}", target, e);
                return self.reject(target, SeedreamError::from(e));
            }
        };

        let _busy = self.busy.raise();
        log::info!(
            "Dispatching {} edit request(s) for target {} at size {}",
            target.variants().len(),
            target,
            request.size
        );

        let api_key = form.api_key().trim();
        let request = &request;
        let transport = &self.transport;
        let endpoints = &self.endpoints;
        let session = &mut self.session;

        let mut pending: FuturesUnordered<_> = target
            .variants()
            .into_iter()
            .map(move |variant| {
                let url = endpoints.url_for(variant);
                async move {
                    let result = transport.post_json(&url, api_key, request).await;
                    (variant, result)
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some((variant, result)) = pending.next().await {
            match result {
                Ok(payload) => {
                    let added = session.prepend_batch(variant, &payload);
                    log::info!("{} succeeded, {} image(s) added", variant.display_name(), added);
                    outcomes.push((variant, RequestOutcome::Success(payload)));
                }
                Err(e) => {
                    log::error!("{} failed: {}", variant.display_name(), e);
                    outcomes.push((variant, RequestOutcome::Failure(e.to_string())));
                }
            }
        }
        drop(pending);

        let aggregate = match outcomes.iter().find_map(|(_, o)| o.error_message()) {
            Some(message) => {
                session.error = Some(message.to_string());
                RequestOutcome::Failure(message.to_string())
            }
            None => {
                let raw = aggregate_payload(target, &outcomes);
                session.raw_response = Some(raw.clone());
                RequestOutcome::Success(raw)
            }
        };
        session.active_target = None;

        SubmitReport {
            target,
            outcomes,
            aggregate,
        }
    }

    fn reject(&mut self, target: SubmitTarget, error: SeedreamError) -> SubmitReport {
        let message = error.to_string();
        self.session.error = Some(message.clone());
        self.session.active_target = None;
        SubmitReport {
            target,
            outcomes: Vec::new(),
            aggregate: RequestOutcome::Failure(message),
        }
    }
}

/// The payload itself for a single call; an object keyed by variant for both.
fn aggregate_payload(target: SubmitTarget, outcomes: &[(ModelVariant, RequestOutcome)]) -> Value {
    match target {
        SubmitTarget::Single(_) => outcomes
            .first()
            .and_then(|(_, outcome)| outcome.payload().cloned())
            .unwrap_or(Value::Null),
        SubmitTarget::Both => {
            let mut keyed = Map::new();
            for variant in ModelVariant::ALL {
                let payload = outcomes
                    .iter()
                    .find(|(v, _)| *v == variant)
                    .and_then(|(_, outcome)| outcome.payload().cloned())
                    .unwrap_or(Value::Null);
                keyed.insert(variant.raw_key().to_string(), payload);
            }
            Value::Object(keyed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::GalleryTag;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Answers per URL suffix and records every call.
    #[derive(Default)]
    struct FakeTransport {
        answers: HashMap<&'static str, std::result::Result<Value, (u16, &'static str)>>,
        calls: Mutex<Vec<(String, String, GenerationRequest)>>,
    }

    impl FakeTransport {
        fn answer(mut self, variant: ModelVariant, payload: Value) -> Self {
            self.answers.insert(variant.model_path(), Ok(payload));
            self
        }

        fn fail(mut self, variant: ModelVariant, status: u16, body: &'static str) -> Self {
            self.answers.insert(variant.model_path(), Err((status, body)));
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn post_json(
            &self,
            url: &str,
            api_key: &str,
            body: &GenerationRequest,
        ) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), api_key.to_string(), body.clone()));
            let answer = self
                .answers
                .iter()
                .find(|(path, _)| url.ends_with(*path))
                .map(|(_, answer)| answer.clone())
                .unwrap_or(Err((404, "not found")));
            match answer {
                Ok(payload) => Ok(payload),
                Err((status, body)) => Err(SeedreamError::Http {
                    status,
                    status_text: "Internal Server Error".to_string(),
                    body: body.to_string(),
                }),
            }
        }
    }

    fn outputs(urls: &[&str]) -> Value {
        json!({ "code": 200, "data": { "outputs": urls } })
    }

    fn valid_form() -> FormState {
        FormState::new()
            .with_prompt("make the sky purple")
            .with_image("https://example.com/ref.png")
            .with_api_key("  test-token  ")
            .with_size("2048*2048")
    }

    fn orchestrator<T: Transport>(transport: T) -> GenerationOrchestrator<T> {
        GenerationOrchestrator::new(transport, EndpointConfig::default())
    }

    #[test]
    fn test_build_request_body() {
        let request = build_request(&valid_form()).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "prompt": "make the sky purple",
                "images": ["https://example.com/ref.png"],
                "size": "2048*2048",
                "enable_sync_mode": true,
                "enable_base64_output": false
            })
        );
    }

    #[test]
    fn test_validation_order() {
        let small = FormState::new().with_size("900*1000");
        assert!(matches!(
            build_request(&small),
            Err(ValidationError::SizeTooSmall { pixels: 900_000 })
        ));

        let no_key = FormState::new().with_size("960*1000");
        assert_eq!(build_request(&no_key), Err(ValidationError::MissingApiKey));

        let no_prompt = no_key.clone().with_api_key("k").with_prompt("   ");
        assert_eq!(build_request(&no_prompt), Err(ValidationError::MissingPrompt));

        let no_images = no_prompt.clone().with_prompt("p").with_image("  ");
        assert_eq!(build_request(&no_images), Err(ValidationError::MissingImages));
    }

    #[tokio::test]
    async fn test_blank_prompt_dispatches_nothing() {
        let transport = FakeTransport::default().answer(ModelVariant::V4, outputs(&["u"]));
        let mut orch = orchestrator(transport);
        let form = valid_form().with_prompt("  ");

        let report = orch
            .submit(SubmitTarget::Single(ModelVariant::V4), &form)
            .await;

        assert!(!report.was_dispatched());
        assert_eq!(orch.transport().call_count(), 0);
        assert_eq!(orch.error(), Some("Please write a prompt."));
        assert!(orch.gallery().is_empty());
        assert!(!orch.is_busy());
        assert!(orch.active_target().is_none());
    }

    #[tokio::test]
    async fn test_single_success_fills_gallery_and_raw_slot() {
        let payload = outputs(&["https://cdn/a.png", "https://cdn/b.png"]);
        let transport = FakeTransport::default().answer(ModelVariant::V4_5, payload.clone());
        let mut orch = orchestrator(transport);

        let report = orch
            .submit(SubmitTarget::Single(ModelVariant::V4_5), &valid_form())
            .await;

        assert_eq!(report.aggregate, RequestOutcome::Success(payload.clone()));
        assert_eq!(orch.raw_response(), Some(&payload));
        assert!(orch.error().is_none());
        let urls: Vec<&str> = orch.gallery().iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn/a.png", "https://cdn/b.png"]);
        assert!(orch.gallery().iter().all(|i| i.tag == GalleryTag::V4_5));

        let calls = orch.transport().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("bytedance/seedream-v4.5/edit"));
        assert_eq!(calls[0].1, "test-token");
        assert_eq!(calls[0].2.images, vec!["https://example.com/ref.png"]);
    }

    #[tokio::test]
    async fn test_both_with_one_failure_keeps_sibling_result() {
        let transport = FakeTransport::default()
            .fail(ModelVariant::V4, 500, "upstream exploded")
            .answer(ModelVariant::V4_5, outputs(&["https://cdn/ok.png"]));
        let mut orch = orchestrator(transport);

        let report = orch.submit(SubmitTarget::Both, &valid_form()).await;

        assert_eq!(orch.transport().call_count(), 2);
        assert_eq!(orch.gallery().len(), 1);
        assert_eq!(orch.gallery()[0].url, "https://cdn/ok.png");
        assert_eq!(orch.gallery()[0].tag, GalleryTag::V4_5);

        let error = orch.error().unwrap();
        assert!(error.contains("500"));
        assert!(error.contains("Internal Server Error"));
        assert!(error.contains("upstream exploded"));
        assert!(orch.raw_response().is_none());

        assert!(!report.aggregate.is_success());
        assert!(report.outcome_for(ModelVariant::V4_5).unwrap().is_success());
        assert!(!report.outcome_for(ModelVariant::V4).unwrap().is_success());
    }

    #[tokio::test]
    async fn test_both_success_keys_raw_response_by_variant() {
        let transport = FakeTransport::default()
            .answer(ModelVariant::V4, outputs(&["https://cdn/v4.png"]))
            .answer(ModelVariant::V4_5, outputs(&["https://cdn/v45.png"]));
        let mut orch = orchestrator(transport);

        let report = orch.submit(SubmitTarget::Both, &valid_form()).await;

        assert!(report.aggregate.is_success());
        let raw = orch.raw_response().unwrap();
        assert_eq!(raw["v4"]["data"]["outputs"][0], "https://cdn/v4.png");
        assert_eq!(raw["v4_5"]["data"]["outputs"][0], "https://cdn/v45.png");
        assert_eq!(orch.gallery().len(), 2);
        assert!(orch.error().is_none());
    }

    #[tokio::test]
    async fn test_sequential_submits_are_newest_first() {
        let transport = FakeTransport::default().answer(ModelVariant::V4, outputs(&["first"]));
        let mut orch = orchestrator(transport);
        orch.submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;

        orch.transport = FakeTransport::default().answer(ModelVariant::V4, outputs(&["second"]));
        orch.submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;

        let urls: Vec<&str> = orch.gallery().iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_clear_previous_gallery() {
        let transport = FakeTransport::default().answer(ModelVariant::V4, outputs(&["kept"]));
        let mut orch = orchestrator(transport);
        orch.submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;

        orch.transport = FakeTransport::default().fail(ModelVariant::V4, 503, "busy");
        orch.submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;

        assert_eq!(orch.gallery().len(), 1);
        assert!(orch.error().unwrap().starts_with("HTTP 503"));

        // A new submit clears the error slot again.
        orch.transport = FakeTransport::default().answer(ModelVariant::V4, outputs(&[]));
        orch.submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;
        assert!(orch.error().is_none());
        assert_eq!(orch.gallery().len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_payload_is_success_without_items() {
        let payload = json!({ "status": "ok", "result": { "images": ["x"] } });
        let transport = FakeTransport::default().answer(ModelVariant::V4, payload.clone());
        let mut orch = orchestrator(transport);

        let report = orch
            .submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;

        assert_eq!(report.aggregate, RequestOutcome::Success(payload));
        assert!(orch.gallery().is_empty());
        assert!(orch.error().is_none());
    }

    #[tokio::test]
    async fn test_busy_flag_is_lowered_after_dispatch() {
        let transport = FakeTransport::default().answer(ModelVariant::V4, outputs(&["u"]));
        let mut orch = orchestrator(transport);
        let flag = orch.busy_flag();

        orch.submit(SubmitTarget::Single(ModelVariant::V4), &valid_form())
            .await;
        assert!(!flag.is_busy());
    }

    /// v4 only answers once v4.5 has been called; both record the busy flag.
    #[derive(Default)]
    struct GatedTransport {
        v4_5_started: Notify,
        busy: Mutex<Option<BusyFlag>>,
        busy_seen: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn post_json(
            &self,
            url: &str,
            _api_key: &str,
            _body: &GenerationRequest,
        ) -> Result<Value> {
            let busy = self.busy.lock().unwrap().as_ref().map_or(false, BusyFlag::is_busy);
            self.busy_seen.lock().unwrap().push(busy);

            if url.ends_with(ModelVariant::V4_5.model_path()) {
                self.v4_5_started.notify_one();
                return Ok(outputs(&["v45"]));
            }
            tokio::time::timeout(Duration::from_secs(2), self.v4_5_started.notified())
                .await
                .map_err(|_| SeedreamError::Transport("v4.5 was never called".into()))?;
            Ok(outputs(&["v4"]))
        }
    }

    #[tokio::test]
    async fn test_both_calls_are_in_flight_together() {
        let mut orch = orchestrator(GatedTransport::default());
        let flag = orch.busy_flag();
        *orch.transport().busy.lock().unwrap() = Some(flag.clone());

        let report = orch.submit(SubmitTarget::Both, &valid_form()).await;

        assert!(report.aggregate.is_success(), "{:?}", orch.error());
        let urls: Vec<&str> = orch.gallery().iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["v4", "v45"]);
        assert_eq!(*orch.transport().busy_seen.lock().unwrap(), vec![true, true]);
        assert!(!flag.is_busy());
    }
}
