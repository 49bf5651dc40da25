use rseedream::{
    EndpointConfig, FormState, GalleryTag, GenerationOrchestrator, GenerationRequest,
    HttpTransport, ModelVariant, SeedreamError, SubmitTarget, Transport,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const V4_PATH: &str = "/bytedance/seedream-v4/edit";
const V45_PATH: &str = "/bytedance/seedream-v4.5/edit";

fn endpoints(server: &MockServer) -> EndpointConfig {
    EndpointConfig::new().with_base_url(server.uri())
}

fn form() -> FormState {
    FormState::new()
        .with_prompt("replace the background with a beach")
        .with_image("https://example.com/ref.jpeg")
        .with_image("   ")
        .with_api_key("mock-token")
        .with_size("2048*2048")
}

#[tokio::test]
async fn test_post_sends_bearer_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(V4_PATH))
        .and(header("authorization", "Bearer mock-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "prompt": "p",
            "images": ["https://example.com/a.png"],
            "size": "1024*1024",
            "enable_sync_mode": true,
            "enable_base64_output": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": { "outputs": ["https://cdn.example.com/out.png"] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&endpoints(&server)).expect("client builds");
    let request = GenerationRequest::new(
        "p",
        vec!["https://example.com/a.png".to_string()],
        "1024*1024",
    );
    let url = endpoints(&server).url_for(ModelVariant::V4);

    let payload = transport
        .post_json(&url, "mock-token", &request)
        .await
        .expect("200 answer decodes");
    assert_eq!(payload["data"]["outputs"][0], "https://cdn.example.com/out.png");
}

#[tokio::test]
async fn test_non_success_status_folds_body_into_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(V4_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&endpoints(&server)).expect("client builds");
    let request = GenerationRequest::new("p", vec!["u".to_string()], "1024*1024");
    let url = endpoints(&server).url_for(ModelVariant::V4);

    let err = transport
        .post_json(&url, "bad", &request)
        .await
        .expect_err("401 must fail");
    assert_eq!(err.status(), Some(401));
    match &err {
        SeedreamError::Http {
            status_text, body, ..
        } => {
            assert_eq!(status_text, "Unauthorized");
            assert_eq!(body, "invalid token");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_string(), "HTTP 401 – Unauthorized\ninvalid token");
}

#[tokio::test]
async fn test_non_json_success_is_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(V4_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&endpoints(&server)).expect("client builds");
    let request = GenerationRequest::new("p", vec!["u".to_string()], "1024*1024");
    let url = endpoints(&server).url_for(ModelVariant::V4);

    let err = transport.post_json(&url, "t", &request).await.expect_err("not JSON");
    assert!(matches!(err, SeedreamError::Response(_)));
}

#[tokio::test]
async fn test_dual_submit_with_one_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(V4_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(V45_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "data": { "outputs": ["https://cdn.example.com/v45.png", 7] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&endpoints(&server)).expect("client builds");
    let mut orchestrator = GenerationOrchestrator::new(transport, endpoints(&server));

    let report = orchestrator.submit(SubmitTarget::Both, &form()).await;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(orchestrator.gallery().len(), 1);
    assert_eq!(orchestrator.gallery()[0].url, "https://cdn.example.com/v45.png");
    assert_eq!(orchestrator.gallery()[0].tag, GalleryTag::V4_5);

    let error = orchestrator.error().expect("failure is surfaced");
    assert!(error.contains("500"), "error: {}", error);
    assert!(error.contains("Internal Server Error"), "error: {}", error);
    assert!(error.contains("model overloaded"), "error: {}", error);
    assert!(orchestrator.raw_response().is_none());
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_validation_failure_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&endpoints(&server)).expect("client builds");
    let mut orchestrator = GenerationOrchestrator::new(transport, endpoints(&server));
    let small = form().with_size("900*1000");

    let report = orchestrator
        .submit(SubmitTarget::Single(ModelVariant::V4_5), &small)
        .await;

    assert!(!report.was_dispatched());
    assert!(orchestrator
        .error()
        .expect("sizing error")
        .contains("921600"));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let endpoints = endpoints(&server);
    drop(server);

    let transport = HttpTransport::new(&endpoints).expect("client builds");
    let request = GenerationRequest::new("p", vec!["u".to_string()], "1024*1024");
    let url = endpoints.url_for(ModelVariant::V4);

    let err = transport
        .post_json(&url, "t", &request)
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, SeedreamError::Transport(_)), "{:?}", err);
    assert!(err.to_string().contains(&url), "{}", err);
    assert_eq!(err.status(), None);
}
