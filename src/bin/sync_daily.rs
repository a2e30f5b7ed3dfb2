//! One-shot sales sync for yesterday through today, meant for a daily
//! scheduler.

use rust_sales_sync::config::Config;
use rust_sales_sync::gateway_client::ReckonntClient;
use rust_sales_sync::models::ReportWindow;
use rust_sales_sync::sales_sync::SalesSyncService;
use rust_sales_sync::services::RunFoodService;

/// Main entry point for the daily sync.
///
/// Exits with an error if configuration is incomplete or Reckonnt rejects
/// the submission. An empty RunFood day still submits an error report and
/// exits cleanly.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_sales_sync=info,sync_daily=info".into()),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("✗ Failed to load environment variables: {}", e);
        tracing::error!("Make sure a .env file defines the required variables");
        e
    })?;

    let window = ReportWindow::daily_local();
    tracing::info!(
        "Syncing sales from {} to {}",
        window.start_str(),
        window.end_str()
    );

    let service = SalesSyncService::new(
        RunFoodService::new(&config)?,
        ReckonntClient::new(&config)?,
    );

    match service.run(&window).await {
        Ok(summary) if summary.error_report => {
            tracing::warn!(
                "✗ No sales submitted for {}: {}",
                window,
                summary.message.unwrap_or_default()
            );
            Ok(())
        }
        Ok(summary) => {
            tracing::info!("✓ Submitted {} sales for {}", summary.sales, window);
            Ok(())
        }
        Err(e) => {
            tracing::error!("✗ Could not send sales to Reckonnt: {}", e);
            Err(anyhow::anyhow!(e))
        }
    }
}
