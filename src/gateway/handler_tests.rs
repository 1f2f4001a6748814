//! Tests for the gateway handlers: classify verdicts, validation order,
//! store-backed flows, and the health endpoints.

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use crate::constants::OCULAR_STATUS_HEADER;
use crate::embedding::MockScorer;
use crate::gateway::handler::ClassifyResponse;
use crate::gateway::state::HandlerState;
use crate::gateway::create_router_with_state;
use crate::scoring::VerifyPolicy;
use crate::taskstore::MockTaskStore;

const BOUNDARY: &str = "ocular-test-boundary";

fn make_state(
    scorer: Arc<MockScorer>,
    store: Option<Arc<MockTaskStore>>,
) -> HandlerState<MockScorer, MockTaskStore> {
    HandlerState::new(scorer, store, VerifyPolicy::new(0.80))
}

fn router(state: HandlerState<MockScorer, MockTaskStore>) -> Router {
    create_router_with_state(state)
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([180, 40, 40]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn text_part(name: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
    .into_bytes()
}

fn file_part(name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut part = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    part.extend_from_slice(bytes);
    part.extend_from_slice(b"\r\n");
    part
}

fn multipart_body(parts: Vec<Vec<u8>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(&part);
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn classify_request(parts: Vec<Vec<u8>>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/classify")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn confident_target_distribution_verifies() {
    let scorer = Arc::new(MockScorer::returning(vec![0.92, 0.05, 0.03]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "verified"
    );
    let body: ClassifyResponse = body_json(response).await;
    assert_eq!(body, ClassifyResponse { verified: true });
}

#[tokio::test]
async fn wrong_object_distribution_rejects() {
    let scorer = Arc::new(MockScorer::returning(vec![0.10, 0.60, 0.30]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "rejected"
    );
    let body: ClassifyResponse = body_json(response).await;
    assert_eq!(body, ClassifyResponse { verified: false });
}

#[tokio::test]
async fn score_exactly_at_threshold_verifies() {
    let scorer = Arc::new(MockScorer::returning(vec![0.80, 0.15, 0.05]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    let body: ClassifyResponse = body_json(response).await;
    assert!(body.verified);
}

#[tokio::test]
async fn missing_keyword_is_rejected_before_scoring() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer.clone(), None));

    let response = app
        .oneshot(classify_request(vec![file_part("file", &png_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "invalid_request"
    );
    assert_eq!(scorer.call_count(), 0);
}

#[tokio::test]
async fn whitespace_keyword_is_rejected() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer.clone(), None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "   \t "),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(scorer.call_count(), 0);
}

#[tokio::test]
async fn configured_default_keyword_fills_missing_field() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let state = make_state(scorer, None).with_default_keyword(Some("bottle".to_string()));
    let app = router(state);

    let response = app
        .oneshot(classify_request(vec![file_part("file", &png_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ClassifyResponse = body_json(response).await;
    assert!(body.verified);
}

#[tokio::test]
async fn malformed_image_is_rejected_without_inference() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer.clone(), None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            file_part("file", b"not an image at all"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "decode_error"
    );
    assert_eq!(scorer.call_count(), 0);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![text_part("keyword", "bottle")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_user_id_is_rejected() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            text_part("user_id", "not-a-number"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scorer_failure_maps_to_server_error() {
    let scorer = Arc::new(MockScorer::failing());
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "scoring_error"
    );
}

#[tokio::test]
async fn verified_submission_with_user_id_credits_points() {
    let scorer = Arc::new(MockScorer::returning(vec![0.92, 0.05, 0.03]));
    let store = Arc::new(MockTaskStore::empty());
    let state = make_state(scorer, Some(store.clone())).with_reward_points(25);
    let app = router(state);

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            text_part("user_id", "7"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.awarded(), vec![(7, 25)]);
}

#[tokio::test]
async fn rejected_submission_credits_nothing() {
    let scorer = Arc::new(MockScorer::returning(vec![0.10, 0.60, 0.30]));
    let store = Arc::new(MockTaskStore::empty());
    let app = router(make_state(scorer, Some(store.clone())));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            text_part("user_id", "7"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.awarded().is_empty());
}

#[tokio::test]
async fn store_failure_during_credit_maps_to_bad_gateway() {
    let scorer = Arc::new(MockScorer::returning(vec![0.92, 0.05, 0.03]));
    let store = Arc::new(MockTaskStore::failing());
    let app = router(make_state(scorer, Some(store)));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            text_part("user_id", "7"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "store_error"
    );
}

#[tokio::test]
async fn credit_without_configured_store_is_unavailable() {
    let scorer = Arc::new(MockScorer::returning(vec![0.92, 0.05, 0.03]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(classify_request(vec![
            text_part("keyword", "bottle"),
            text_part("user_id", "7"),
            file_part("file", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn random_task_returns_store_task() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let store = Arc::new(MockTaskStore::with_task("bottle"));
    let app = router(make_state(scorer, Some(store)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tasks/random")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let task: crate::taskstore::RandomTask = body_json(response).await;
    assert_eq!(task.keyword, "bottle");
}

#[tokio::test]
async fn random_task_empty_store_is_not_found() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let store = Arc::new(MockTaskStore::empty());
    let app = router(make_state(scorer, Some(store)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tasks/random")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn random_task_without_store_is_unavailable() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tasks/random")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn healthz_reports_ok() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let app = router(make_state(scorer, None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(OCULAR_STATUS_HEADER).unwrap(),
        "healthy"
    );
}

#[tokio::test]
async fn ready_reports_scorer_mode_and_store() {
    let scorer = Arc::new(MockScorer::returning(vec![0.9, 0.05, 0.05]));
    let store = Arc::new(MockTaskStore::empty());
    let app = router(make_state(scorer, Some(store)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["scorer_mode"], "stub");
    assert_eq!(body["components"]["task_store"], "configured");
}

#[test]
fn classify_response_round_trips() {
    for verified in [true, false] {
        let encoded = serde_json::to_string(&ClassifyResponse { verified }).unwrap();
        let decoded: ClassifyResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ClassifyResponse { verified });
    }
}
