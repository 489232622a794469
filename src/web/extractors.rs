use crate::utils::error::ServiceError;
use crate::web::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

pub const API_KEY_HEADER: &str = "api-key";

/// Proof that the request carried the shared secret in `api-key`.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

#[async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let received = parts.headers.get(API_KEY_HEADER).map(|value| value.as_bytes());
        verify_api_key(state.config.api_key.as_deref(), received)?;
        Ok(ApiKey)
    }
}

/// Byte-for-byte comparison of the received header against the secret.
/// With no secret configured nothing authenticates.
pub fn verify_api_key(expected: Option<&str>, received: Option<&[u8]>) -> Result<(), ServiceError> {
    let Some(received) = received else {
        return Err(ServiceError::Unauthorized(format!(
            "API key is missing. Use the '{}' header",
            API_KEY_HEADER
        )));
    };

    match expected {
        Some(expected) if expected.as_bytes() == received => Ok(()),
        _ => {
            let received = String::from_utf8_lossy(received);
            tracing::warn!("Rejected API key: '{}'", received);
            Err(ServiceError::Unauthorized(format!("Invalid API key. Received: '{}'", received)))
        }
    }
}
