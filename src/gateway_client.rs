use crate::config::{render_url, Config};
use crate::errors::AppError;
use crate::models::{ReportWindow, SalesPayload};
use reqwest;
use serde_json::Value;
use std::time::Duration;
use tracing;

/// Client for the Reckonnt sale submission API.
#[derive(Clone)]
pub struct ReckonntClient {
    client: reqwest::Client,
    url_template: String,
    token: String,
    host_header: Option<String>,
}

impl ReckonntClient {
    /// Creates a new `ReckonntClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the URL template, token, Host override and timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Reckonnt client: {}", e))
            })?;

        Ok(Self {
            client,
            url_template: config.reckonnt_sale_api_url.clone(),
            token: config.token.clone(),
            host_header: config.reckonnt_host_header.clone(),
        })
    }

    /// Submits consolidated sales (or an error report) for a window.
    ///
    /// # Arguments
    ///
    /// * `window` - Fills the date placeholders of the sale URL.
    /// * `payload` - Sent as the JSON body.
    ///
    /// # Returns
    ///
    /// * `Result<Value, AppError>` - The server's JSON answer, `null` if the body was empty.
    pub async fn submit(
        &self,
        window: &ReportWindow,
        payload: &SalesPayload,
    ) -> Result<Value, AppError> {
        let url = render_url(
            &self.url_template,
            &window.start_str(),
            &window.end_str(),
            Some(&self.token),
        )?;

        match payload {
            SalesPayload::Sales(sales) => {
                tracing::info!("Submitting {} sales to Reckonnt for {}", sales.len(), window)
            }
            SalesPayload::Error(report) => tracing::warn!(
                "Submitting error report to Reckonnt for {}: {}",
                window,
                report.message
            ),
        }

        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "/")
            .json(payload);
        if let Some(ref host) = self.host_header {
            request = request.header("Host", host);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Reckonnt request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Reckonnt returned {}: {}",
                status, error_text
            )));
        }

        let text = response.text().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read Reckonnt response: {}", e))
        })?;
        if text.trim().is_empty() {
            tracing::info!("✓ Reckonnt accepted submission (empty body)");
            return Ok(Value::Null);
        }

        let data: Value = serde_json::from_str(&text).map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Reckonnt response: {}", e))
        })?;

        tracing::info!(
            "✓ Reckonnt response: {}",
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        );
        Ok(data)
    }
}
