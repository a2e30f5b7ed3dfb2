/// Sales sync workflow shared by the daily binary and the HTTP trigger
///
/// One run:
/// 1. Fetch the RunFood payment and product reports for the window
/// 2. Strip denylisted columns from every row
/// 3. Decode rows and join them into consolidated sales
/// 4. Submit the sales (or an error report) to Reckonnt
use crate::consolidation::{join_with_stats, JoinStats};
use crate::errors::{AppError, ResultExt};
use crate::field_filter::{filter_records, FlatRecord};
use crate::gateway_client::ReckonntClient;
use crate::models::{
    ConsolidatedSale, RawPaymentRecord, RawProductRecord, ReportWindow, SalesPayload, Scalar,
    SyncErrorReport,
};
use crate::services::RunFoodService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Message of the error report sent when a report came back empty.
pub const NO_DATA_MESSAGE: &str = "No data received from one or both RunFood reports";

/// What `collect` produced for a window.
#[derive(Debug, Clone)]
pub struct CollectedSales {
    pub payload: SalesPayload,
    /// Present only when the join actually ran.
    pub stats: Option<JoinStats>,
}

/// Result of one full run, returned by the HTTP trigger.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub run_id: Uuid,
    pub fecha_desde: String,
    pub fecha_hasta: String,
    pub error_report: bool,
    pub message: Option<String>,
    pub sales: usize,
    pub join_stats: Option<JoinStats>,
    pub reckonnt_response: Value,
}

pub struct SalesSyncService {
    runfood: RunFoodService,
    reckonnt: ReckonntClient,
}

impl SalesSyncService {
    pub fn new(runfood: RunFoodService, reckonnt: ReckonntClient) -> Self {
        Self { runfood, reckonnt }
    }

    /// Fetches, filters and joins both reports for `window`.
    ///
    /// Never fails: a missing or empty report, or a row that cannot be
    /// joined, turns into an error report payload.
    pub async fn collect(&self, window: &ReportWindow) -> CollectedSales {
        let (payments, products) = tokio::join!(
            self.runfood.fetch_payments(window),
            self.runfood.fetch_products(window)
        );

        let (payments, products) = match (
            require_rows(payments, "payment"),
            require_rows(products, "product"),
        ) {
            (Ok(payments), Ok(products)) => (payments, products),
            (payments, products) => {
                for err in [payments.err(), products.err()].into_iter().flatten() {
                    tracing::warn!("{}", err);
                }
                tracing::warn!("Incomplete RunFood data for {}, sending error report", window);
                return CollectedSales {
                    payload: SalesPayload::Error(SyncErrorReport::new(window, NO_DATA_MESSAGE)),
                    stats: None,
                };
            }
        };

        match consolidate(&payments, &products) {
            Ok((sales, stats)) => {
                tracing::info!("Sales consolidated for {}: {} invoices", window, sales.len());
                CollectedSales {
                    payload: SalesPayload::Sales(sales),
                    stats: Some(stats),
                }
            }
            Err(e) => {
                tracing::error!("Failed to process RunFood sales for {}: {}", window, e);
                CollectedSales {
                    payload: SalesPayload::Error(SyncErrorReport::new(
                        window,
                        format!("Processing error: {}", e),
                    )),
                    stats: None,
                }
            }
        }
    }

    /// Sends a payload to Reckonnt.
    pub async fn submit(
        &self,
        window: &ReportWindow,
        payload: &SalesPayload,
    ) -> Result<Value, AppError> {
        self.reckonnt
            .submit(window, payload)
            .await
            .with_context(|| format!("submitting sales for {}", window))
    }

    /// Collects and submits one window.
    pub async fn run(&self, window: &ReportWindow) -> Result<SyncSummary, AppError> {
        let run_id = Uuid::new_v4();
        tracing::info!("=== Sales sync {} for {} ===", run_id, window);

        let collected = self.collect(window).await;
        let response = self.submit(window, &collected.payload).await?;

        let message = match &collected.payload {
            SalesPayload::Error(report) => Some(report.message.clone()),
            SalesPayload::Sales(_) => None,
        };

        tracing::info!("✓ Sales sync {} finished", run_id);
        Ok(SyncSummary {
            run_id,
            fecha_desde: window.start_str(),
            fecha_hasta: window.end_str(),
            error_report: collected.payload.is_error(),
            message,
            sales: collected.payload.sale_count(),
            join_stats: collected.stats,
            reckonnt_response: response,
        })
    }
}

/// Provider failures pass through; an empty report becomes `NoData`.
fn require_rows(
    result: Result<Vec<FlatRecord>, AppError>,
    label: &str,
) -> Result<Vec<FlatRecord>, AppError> {
    match result {
        Ok(rows) if rows.is_empty() => Err(AppError::NoData(format!(
            "RunFood {} report is empty",
            label
        ))),
        other => other,
    }
}

fn decode_rows<T: DeserializeOwned>(
    rows: Vec<FlatRecord>,
    label: &str,
) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            serde_json::from_value(Value::Object(row))
                .with_context(|| format!("decoding {} row {}", label, idx))
        })
        .collect()
}

/// Rejects rows whose serie1/serie2/numero is an object or array.
fn ensure_scalar_keys<'a>(
    keys: impl Iterator<Item = [&'a Option<Scalar>; 3]>,
    label: &str,
) -> Result<(), AppError> {
    for (idx, cells) in keys.enumerate() {
        if !cells.into_iter().flatten().all(Scalar::is_scalar) {
            return Err(AppError::ExternalApiError(format!(
                "RunFood {} row {} has a nested invoice key column",
                label, idx
            )));
        }
    }
    Ok(())
}

/// Filter, decode and join already-fetched report rows.
pub fn consolidate(
    payment_rows: &[FlatRecord],
    product_rows: &[FlatRecord],
) -> Result<(Vec<ConsolidatedSale>, JoinStats), AppError> {
    let payments: Vec<RawPaymentRecord> = decode_rows(filter_records(payment_rows), "payment")?;
    let products: Vec<RawProductRecord> = decode_rows(filter_records(product_rows), "product")?;
    ensure_scalar_keys(payments.iter().map(RawPaymentRecord::key_cells), "payment")?;
    ensure_scalar_keys(products.iter().map(RawProductRecord::key_cells), "product")?;

    let outcome = join_with_stats(&payments, &products);
    Ok((outcome.sales, outcome.stats))
}
