use crate::config::{render_url, Config};
use crate::errors::AppError;
use crate::field_filter::FlatRecord;
use crate::models::ReportWindow;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Which RunFood report to pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Payments,
    Products,
}

impl ReportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Payments => "payment",
            ReportKind::Products => "product",
        }
    }
}

/// Client for the two RunFood sales reports.
#[derive(Clone)]
pub struct RunFoodService {
    client: Client,
    payment_url_template: String,
    product_url_template: String,
}

impl RunFoodService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create RunFood client: {}", e))
            })?;

        Ok(Self {
            client,
            payment_url_template: config.runfood_payment_api_url.clone(),
            product_url_template: config.runfood_product_api_url.clone(),
        })
    }

    /// Fetch the payment-method report for a window.
    pub async fn fetch_payments(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<FlatRecord>, AppError> {
        self.fetch_report(ReportKind::Payments, window).await
    }

    /// Fetch the product-line report for a window.
    pub async fn fetch_products(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<FlatRecord>, AppError> {
        self.fetch_report(ReportKind::Products, window).await
    }

    /// Fetch one report as flat rows.
    ///
    /// An empty JSON array is a valid (empty) report. Anything other than an
    /// array of objects is an error.
    pub async fn fetch_report(
        &self,
        kind: ReportKind,
        window: &ReportWindow,
    ) -> Result<Vec<FlatRecord>, AppError> {
        let template = match kind {
            ReportKind::Payments => &self.payment_url_template,
            ReportKind::Products => &self.product_url_template,
        };
        let url = render_url(template, &window.start_str(), &window.end_str(), None)?;

        tracing::info!("Fetching RunFood {} report for {}", kind.label(), window);
        tracing::debug!("RunFood {} URL: {}", kind.label(), url);

        let response = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!(
                    "RunFood {} request failed: {}",
                    kind.label(),
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("RunFood returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "RunFood {} report returned status {}: {}",
                kind.label(),
                status,
                error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Failed to parse RunFood {} report: {}",
                kind.label(),
                e
            ))
        })?;

        let rows = rows_from_body(kind, body)?;
        tracing::info!("RunFood {} report: {} rows", kind.label(), rows.len());
        Ok(rows)
    }
}

fn rows_from_body(kind: ReportKind, body: Value) -> Result<Vec<FlatRecord>, AppError> {
    let Value::Array(items) = body else {
        return Err(AppError::ExternalApiError(format!(
            "RunFood {} report is not a JSON array",
            kind.label()
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(AppError::ExternalApiError(format!(
                "RunFood {} row {} is not an object: {}",
                kind.label(),
                idx,
                other
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_array() {
        let rows = rows_from_body(
            ReportKind::Payments,
            json!([{"numero": "1"}, {"numero": "2"}]),
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("numero"), Some(&json!("2")));
    }

    #[test]
    fn test_non_object_row_rejects_whole_report() {
        let result = rows_from_body(
            ReportKind::Payments,
            json!([{"numero": "1"}, "garbage-row", {"numero": "2"}]),
        );
        match result {
            Err(AppError::ExternalApiError(msg)) => assert!(msg.contains("row 1")),
            other => panic!("expected ExternalApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_rows_from_non_array_is_error() {
        let result = rows_from_body(ReportKind::Products, json!({"error": "boom"}));
        assert!(matches!(result, Err(AppError::ExternalApiError(_))));
    }

    #[test]
    fn test_empty_array_is_empty_report() {
        let rows = rows_from_body(ReportKind::Products, json!([])).unwrap();
        assert!(rows.is_empty());
    }
}
