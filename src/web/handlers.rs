use crate::{
    image::ImageLoader,
    models::ScanOutcome,
    notify::Delivery,
    utils::error::ServiceError,
    web::{extractors::ApiKey, state::AppState},
    Result,
};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

pub const MESSAGE_FOUND: &str = "Человек обнаружен";
pub const MESSAGE_NOT_FOUND: &str = "Человек не обнаружен";

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub filename: Option<String>,
    pub has_person: bool,
    pub message: String,
}

struct Upload {
    filename: Option<String>,
    data: Bytes,
}

/// Service identity.
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Сервис определения людей на изображениях" }))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Multipart upload: detect people, notify the chat, report the verdict.
pub async fn detect_person_handler(
    State(state): State<AppState>,
    _key: ApiKey,
    multipart: Multipart,
) -> Result<Json<DetectionResponse>> {
    let start_time = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let upload = read_upload(multipart).await?;
    tracing::info!(
        "Processing upload: request_id={}, filename={:?}, bytes={}",
        request_id,
        upload.filename,
        upload.data.len()
    );

    let detector = state.detector.clone();
    let data = upload.data;
    let outcome = tokio::task::spawn_blocking(move || -> Result<ScanOutcome> {
        let image = ImageLoader::from_bytes(&data)?;
        tracing::info!("Image decoded: {}x{}", image.width(), image.height());
        Ok(detector.detect(&image))
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("detection task failed: {}", e)))??;

    let has_person = outcome.has_person();
    if let ScanOutcome::Failed { reason, .. } = &outcome {
        tracing::warn!("request_id={} treated as negative after detection error: {}", request_id, reason);
    }

    let delivery = state
        .notifier
        .send_result(has_person, outcome.image(), upload.filename.as_deref())
        .await;
    match &delivery {
        Delivery::Sent => tracing::info!("request_id={} notification sent", request_id),
        Delivery::FellBack => tracing::warn!("request_id={} notification fell back to text", request_id),
        Delivery::Skipped => tracing::warn!("request_id={} notification skipped", request_id),
        Delivery::Failed(reason) => {
            tracing::error!("request_id={} notification failed: {}", request_id, reason)
        }
    }

    tracing::info!(
        "Upload completed: request_id={}, has_person={}, time={:.3}s",
        request_id,
        has_person,
        start_time.elapsed().as_secs_f32()
    );

    let message = if has_person { MESSAGE_FOUND } else { MESSAGE_NOT_FOUND };
    Ok(Json(DetectionResponse {
        filename: upload.filename,
        has_person,
        message: message.to_string(),
    }))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServiceError::InvalidInput(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("unknown").to_string();
        if field_name != "file" {
            tracing::debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            ServiceError::InvalidInput(format!("Failed to read file data: {}", e))
        })?;

        return Ok(Upload { filename, data });
    }

    Err(ServiceError::InvalidInput("No image file provided".to_string()))
}
