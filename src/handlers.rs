use crate::errors::AppError;
use crate::models::SyncRequest;
use crate::sales_sync::{SalesSyncService, SyncSummary};
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// The fetch, join and submit workflow.
    pub sync: SalesSyncService,
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-sales-sync",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/sales/sync
///
/// Runs one sync. The body is optional; when present it may carry
/// `fecha_desde` and/or `fecha_hasta` (`YYYY-MM-DD`), each defaulting to
/// the daily window.
///
/// # Returns
///
/// * `Result<Json<SyncSummary>, AppError>` - The run summary, or an error if
///   Reckonnt rejected the submission.
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SyncSummary>, AppError> {
    let request = parse_sync_request(&body)?;
    let window = request.into_window(chrono::Local::now().date_naive())?;

    tracing::info!("POST /api/v1/sales/sync - window {}", window);

    let summary = state.sync.run(&window).await?;
    Ok(Json(summary))
}

fn parse_sync_request(body: &[u8]) -> Result<SyncRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SyncRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid sync request: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_default_request() {
        let request = parse_sync_request(b"").unwrap();
        assert!(request.fecha_desde.is_none() && request.fecha_hasta.is_none());
        assert!(parse_sync_request(b"  \n").is_ok());
    }

    #[test]
    fn test_body_with_dates() {
        let request =
            parse_sync_request(br#"{"fecha_desde": "2024-01-01", "fecha_hasta": "2024-01-02"}"#)
                .unwrap();
        assert_eq!(request.fecha_desde.unwrap().to_string(), "2024-01-01");
        assert_eq!(request.fecha_hasta.unwrap().to_string(), "2024-01-02");
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let result = parse_sync_request(br#"{"fecha_desde": "01/01/2024"}"#);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
