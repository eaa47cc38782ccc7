use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use hemavision::handlers::{self, AppState};
use hemavision::{CellType, ClassificationResult, ClassifierConfig, MockClassifier, ModelMetadata};
use serde_json::Value;
use std::time::Duration;

const BOUNDARY: &str = "hemavision-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

fn state(max_upload_bytes: usize) -> web::Data<AppState> {
    let classifier =
        MockClassifier::new(ClassifierConfig::default().with_latency(Duration::ZERO)).unwrap();
    web::Data::new(AppState {
        classifier,
        max_upload_bytes,
    })
}

fn multipart_body(filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/predict")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

#[actix_web::test]
async fn predict_returns_ranked_distribution() {
    let app = test::init_service(
        App::new()
            .app_data(state(1024))
            .configure(handlers::configure),
    )
    .await;

    let req = upload(multipart_body("cell.png", "image/png", PNG_BYTES)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    for key in [
        "predictedClass",
        "confidence",
        "allPredictions",
        "clinicalInfo",
        "normalRange",
        "modelVersion",
        "processingTime",
    ] {
        assert!(body.get(key).is_some(), "missing {key}");
    }

    let result: ClassificationResult = serde_json::from_value(body).unwrap();
    assert_eq!(result.all_predictions.len(), CellType::ALL.len());
    assert_eq!(result.all_predictions[0].cell_type, result.predicted_class);
    let sum: f64 = result.all_predictions.iter().map(|p| p.confidence).sum();
    assert!((sum - 100.0).abs() <= 0.5);
    assert_eq!(result.clinical_info, result.predicted_class.info().clinical_info);
}

#[actix_web::test]
async fn predict_uses_file_part_after_text_field() {
    let app = test::init_service(
        App::new()
            .app_data(state(1024))
            .configure(handlers::configure),
    )
    .await;

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\n");
    body.extend_from_slice(b"smear from ward 4\r\n");
    body.extend_from_slice(&multipart_body("cell.png", "image/png", PNG_BYTES));

    let resp = test::call_service(&app, upload(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let result: ClassificationResult = test::read_body_json(resp).await;
    assert_eq!(result.all_predictions.len(), CellType::ALL.len());
}

#[actix_web::test]
async fn predict_rejects_non_image_upload() {
    let app = test::init_service(
        App::new()
            .app_data(state(1024))
            .configure(handlers::configure),
    )
    .await;

    let req = upload(multipart_body("notes.txt", "text/plain", b"not an image")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Please upload an image file");
}

#[actix_web::test]
async fn predict_rejects_oversized_upload() {
    let app = test::init_service(
        App::new()
            .app_data(state(8))
            .configure(handlers::configure),
    )
    .await;

    let req = upload(multipart_body("cell.png", "image/png", PNG_BYTES)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn predict_rejects_empty_upload() {
    let app = test::init_service(
        App::new()
            .app_data(state(1024))
            .configure(handlers::configure),
    )
    .await;

    let req = upload(multipart_body("cell.png", "image/png", b"")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file selected");
}

#[actix_web::test]
async fn model_endpoint_serves_metadata() {
    let app = test::init_service(
        App::new()
            .app_data(state(1024))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/model").to_request();
    let meta: ModelMetadata = test::call_and_read_body_json(&app, req).await;
    assert_eq!(meta, ModelMetadata::default());
    assert_eq!(meta.architecture, "MobileNetV2");
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let app = test::init_service(
        App::new()
            .app_data(state(1024))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}
