use crate::classifier::MockClassifier;
use crate::error::ApiError;
use crate::models::ModelMetadata;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use image::ImageFormat;
use serde_json::json;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Shared state handed to every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    pub classifier: MockClassifier,
    pub max_upload_bytes: usize,
}

/// Register the HTTP routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/model").route(web::get().to(model_info)))
        .service(web::resource("/health").route(web::get().to(health)));
}

pub async fn predict(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    async move {
        let image = read_upload(&mut payload, state.max_upload_bytes).await?;
        check_format(&image)?;
        info!(bytes = image.len(), "image received");

        let result = state.classifier.classify(&image).await?;
        Ok(HttpResponse::Ok().json(result))
    }
    .instrument(info_span!("predict", %request_id))
    .await
}

pub async fn model_info() -> HttpResponse {
    HttpResponse::Ok().json(ModelMetadata::default())
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Collect the first non-empty file part of the upload, draining the rest.
///
/// Plain form fields are only used when no part carries a filename.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Vec<u8>, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut fallback = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::Multipart(e.to_string()))?;
        let is_file = field.content_disposition().get_filename().is_some();
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::Multipart(e.to_string()))?;
            if data.len() + chunk.len() > limit {
                warn!(limit, "upload rejected: too large");
                return Err(ApiError::PayloadTooLarge { limit });
            }
            data.extend_from_slice(&chunk);
        }
        if data.is_empty() {
            continue;
        }
        if is_file {
            if file.is_none() {
                file = Some(data);
            }
        } else if fallback.is_empty() {
            fallback = data;
        }
    }

    let image = file.unwrap_or(fallback);
    if image.is_empty() {
        return Err(ApiError::EmptyUpload);
    }
    Ok(image)
}

fn check_format(bytes: &[u8]) -> Result<(), ApiError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif) => Ok(()),
        other => {
            warn!(format = ?other.ok(), "upload rejected: not a supported image");
            Err(ApiError::UnsupportedFormat)
        }
    }
}
