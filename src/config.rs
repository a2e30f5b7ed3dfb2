use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::errors::AppError;

/// Placeholder replaced with the window start date (`YYYY-MM-DD`).
pub const START_DATE_PLACEHOLDER: &str = "__fecha_desde__";
/// Placeholder replaced with the window end date (`YYYY-MM-DD`).
pub const END_DATE_PLACEHOLDER: &str = "__fecha_hasta__";
/// Placeholder replaced with the Reckonnt token.
pub const TOKEN_PLACEHOLDER: &str = "__token__";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub token: String,
    pub runfood_product_api_url: String,
    pub runfood_payment_api_url: String,
    pub reckonnt_sale_api_url: String,
    pub reckonnt_host_header: Option<String>,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            token: std::env::var("TOKEN")
                .map_err(|_| anyhow::anyhow!("TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            runfood_product_api_url: required_url("RUNFOOD_PRODUCT_API_URL")?,
            runfood_payment_api_url: required_url("RUNFOOD_PAYMENT_API_URL")?,
            reckonnt_sale_api_url: required_url("RECKONNT_SALE_API_URL")?,
            reckonnt_host_header: std::env::var("RECKONNT_HOST_HEADER")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a whole number of seconds")
                })?,
        };

        // Log successful configuration load (without the token)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("RunFood product URL template: {}", config.runfood_product_api_url);
        tracing::debug!("RunFood payment URL template: {}", config.runfood_payment_api_url);
        tracing::debug!("Reckonnt sale URL template: [REDACTED]");
        if let Some(ref host) = config.reckonnt_host_header {
            tracing::info!("Reckonnt Host header override: {}", host);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn required_url(key: &str) -> anyhow::Result<String> {
    let url = std::env::var(key)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", key))?;
    validate_url_template(key, &url)?;
    Ok(url)
}

fn validate_url_template(key: &str, url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", key);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(())
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"__[A-Za-z_]+?__").expect("placeholder regex is valid"))
}

/// Fills the date and token placeholders of a URL template.
///
/// Any `__name__` placeholder left after substitution is reported as an
/// error, as is a result that does not parse as a URL.
pub fn render_url(
    template: &str,
    start_date: &str,
    end_date: &str,
    token: Option<&str>,
) -> Result<url::Url, AppError> {
    let mut rendered = template
        .replace(START_DATE_PLACEHOLDER, start_date)
        .replace(END_DATE_PLACEHOLDER, end_date);
    if let Some(token) = token {
        rendered = rendered.replace(TOKEN_PLACEHOLDER, token);
    }

    if let Some(leftover) = placeholder_pattern().find(&rendered) {
        return Err(AppError::InternalError(format!(
            "URL template has unresolved placeholder {}",
            leftover.as_str()
        )));
    }

    url::Url::parse(&rendered)
        .map_err(|e| AppError::InternalError(format!("Invalid URL after templating: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_url_replaces_dates() {
        let url = render_url(
            "https://runfood.local/report?desde=__fecha_desde__&hasta=__fecha_hasta__",
            "2024-03-01",
            "2024-03-02",
            None,
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://runfood.local/report?desde=2024-03-01&hasta=2024-03-02"
        );
    }

    #[test]
    fn test_render_url_replaces_token() {
        let url = render_url(
            "https://reckonnt.net/ventas/__token__?d=__fecha_desde__&h=__fecha_hasta__",
            "2024-03-01",
            "2024-03-02",
            Some("abc123"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://reckonnt.net/ventas/abc123?d=2024-03-01&h=2024-03-02"
        );
    }

    #[test]
    fn test_render_url_rejects_unresolved_token() {
        let result = render_url(
            "https://reckonnt.net/ventas/__token__",
            "2024-03-01",
            "2024-03-02",
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_render_url_without_placeholders() {
        let url = render_url("http://localhost:9000/report", "a", "b", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/report");
    }

    #[test]
    fn test_validate_url_template() {
        assert!(validate_url_template("X", "https://ok.example").is_ok());
        assert!(validate_url_template("X", "   ").is_err());
        assert!(validate_url_template("X", "ftp://nope.example").is_err());
    }
}
