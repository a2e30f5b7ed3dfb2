use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AppError;

// ============ Scalar Values ============

/// A single report cell, kept exactly as RunFood rendered it.
///
/// RunFood is not consistent about quoting numbers, so every field is read
/// as whichever scalar arrived and written back unchanged. Objects and
/// arrays land in `Other` and are passed through the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl Scalar {
    /// False for objects and arrays.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Scalar::Other(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

/// Renders one invoice key component. Missing cells render as "".
fn key_component(value: &Option<Scalar>) -> String {
    value.as_ref().map(Scalar::to_string).unwrap_or_default()
}

// ============ Invoice Key ============

/// Composite natural key naming one invoice inside a report window.
///
/// Components are compared verbatim: `"1"` and `"001"` are different keys,
/// and so are the text `"1"` and the number `1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceKey {
    pub serie1: String,
    pub serie2: String,
    pub numero: String,
}

impl InvoiceKey {
    pub fn new(
        serie1: impl Into<String>,
        serie2: impl Into<String>,
        numero: impl Into<String>,
    ) -> Self {
        Self {
            serie1: serie1.into(),
            serie2: serie2.into(),
            numero: numero.into(),
        }
    }

    fn from_cells(cells: [&Option<Scalar>; 3]) -> Self {
        let [serie1, serie2, numero] = cells;
        Self::new(
            key_component(serie1),
            key_component(serie2),
            key_component(numero),
        )
    }
}

impl fmt::Display for InvoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.serie1, self.serie2, self.numero)
    }
}

// ============ RunFood Report Rows ============

/// One row of the RunFood payment-method report.
///
/// There is one row per (invoice, payment method); the invoice header is
/// repeated on every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPaymentRecord {
    pub serie1: Option<Scalar>,
    pub serie2: Option<Scalar>,
    pub numero: Option<Scalar>,

    pub cedula: Option<Scalar>,
    #[serde(rename = "razonSocial")]
    pub razon_social: Option<Scalar>,
    pub telefono: Option<Scalar>,
    pub direccion: Option<Scalar>,
    #[serde(rename = "TipoIdentificacion")]
    pub tipo_identificacion: Option<Scalar>,

    #[serde(rename = "claveAcceso")]
    pub clave_acceso: Option<Scalar>,
    pub autorizacion: Option<Scalar>,
    #[serde(rename = "fechaEmision")]
    pub fecha_emision: Option<Scalar>,
    #[serde(rename = "fechaAutorizacion")]
    pub fecha_autorizacion: Option<Scalar>,
    #[serde(rename = "idDocumento")]
    pub id_documento: Option<Scalar>,

    pub total: Option<Scalar>,
    pub propina: Option<Scalar>,
    #[serde(rename = "descuentoTotal")]
    pub descuento_total: Option<Scalar>,
    #[serde(rename = "Usuario")]
    pub usuario: Option<Scalar>,

    #[serde(rename = "FormaPago")]
    pub forma_pago: Option<Scalar>,
    #[serde(rename = "numeroCheque")]
    pub numero_cheque: Option<Scalar>,
    pub observacion: Option<Scalar>,
    #[serde(rename = "TipoTarjeta")]
    pub tipo_tarjeta: Option<Scalar>,
    pub monto: Option<Scalar>,
    #[serde(rename = "MarcaTarjeta")]
    pub marca_tarjeta: Option<Scalar>,
    #[serde(rename = "BancoTarjeta")]
    pub banco_tarjeta: Option<Scalar>,
}

impl RawPaymentRecord {
    pub fn key_cells(&self) -> [&Option<Scalar>; 3] {
        [&self.serie1, &self.serie2, &self.numero]
    }

    pub fn invoice_key(&self) -> InvoiceKey {
        InvoiceKey::from_cells(self.key_cells())
    }
}

/// One row of the RunFood product-line report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProductRecord {
    pub serie1: Option<Scalar>,
    pub serie2: Option<Scalar>,
    pub numero: Option<Scalar>,

    pub codigo: Option<Scalar>,
    pub descripcion: Option<Scalar>,
    pub cantidad: Option<Scalar>,
    /// Unit price.
    pub pvp: Option<Scalar>,
    #[serde(rename = "ivaPorcentaje")]
    pub iva_porcentaje: Option<Scalar>,
    pub descuento: Option<Scalar>,
}

impl RawProductRecord {
    pub fn key_cells(&self) -> [&Option<Scalar>; 3] {
        [&self.serie1, &self.serie2, &self.numero]
    }

    pub fn invoice_key(&self) -> InvoiceKey {
        InvoiceKey::from_cells(self.key_cells())
    }
}

// ============ Reckonnt Sale Shape ============

/// One payment-method line of a consolidated sale (`detalleFp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetail {
    #[serde(rename = "tipoFormaPago")]
    pub tipo_forma_pago: Option<Scalar>,
    #[serde(rename = "numCheque")]
    pub num_cheque: Option<Scalar>,
    pub observacion: Option<Scalar>,
    #[serde(rename = "tipoTarjeta")]
    pub tipo_tarjeta: Option<Scalar>,
    pub monto: Option<Scalar>,
    #[serde(rename = "marcaTarjeta")]
    pub marca_tarjeta: Option<Scalar>,
    #[serde(rename = "bancoTarjeta")]
    pub banco_tarjeta: Option<Scalar>,
}

impl From<&RawPaymentRecord> for PaymentDetail {
    fn from(record: &RawPaymentRecord) -> Self {
        Self {
            tipo_forma_pago: record.forma_pago.clone(),
            num_cheque: record.numero_cheque.clone(),
            observacion: record.observacion.clone(),
            tipo_tarjeta: record.tipo_tarjeta.clone(),
            monto: record.monto.clone(),
            marca_tarjeta: record.marca_tarjeta.clone(),
            banco_tarjeta: record.banco_tarjeta.clone(),
        }
    }
}

/// One product line of a consolidated sale (`detalleVenta`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(rename = "codProducto")]
    pub cod_producto: Option<Scalar>,
    pub descripcion: Option<Scalar>,
    pub cantidad: Option<Scalar>,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: Option<Scalar>,
    #[serde(rename = "porcentajeIva")]
    pub porcentaje_iva: Option<Scalar>,
    pub descuento: Option<Scalar>,
}

impl From<&RawProductRecord> for ProductDetail {
    fn from(record: &RawProductRecord) -> Self {
        Self {
            cod_producto: record.codigo.clone(),
            descripcion: record.descripcion.clone(),
            cantidad: record.cantidad.clone(),
            precio_unitario: record.pvp.clone(),
            porcentaje_iva: record.iva_porcentaje.clone(),
            descuento: record.descuento.clone(),
        }
    }
}

/// The merged representation of one invoice, as Reckonnt expects it.
///
/// Field order matches the Reckonnt payload; missing values are sent as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedSale {
    pub cedula: Option<Scalar>,
    #[serde(rename = "razonSocial")]
    pub razon_social: Option<Scalar>,
    pub telefono: Option<Scalar>,
    pub direccion: Option<Scalar>,
    #[serde(rename = "claveAcceso")]
    pub clave_acceso: Option<Scalar>,
    pub autorizacion: Option<Scalar>,
    #[serde(rename = "fechaEmision")]
    pub fecha_emision: Option<Scalar>,
    #[serde(rename = "fechaAutorizacion")]
    pub fecha_autorizacion: Option<Scalar>,
    #[serde(rename = "numFactura")]
    pub num_factura: Option<Scalar>,
    #[serde(rename = "tipoComprobante")]
    pub tipo_comprobante: Option<Scalar>,
    pub total: Option<Scalar>,
    pub propina: Option<Scalar>,
    #[serde(rename = "descuentoTotal")]
    pub descuento_total: Option<Scalar>,
    pub usuario: Option<Scalar>,
    #[serde(rename = "tipoIdentificacion")]
    pub tipo_identificacion: Option<Scalar>,
    #[serde(rename = "numEstablecimiento")]
    pub num_establecimiento: Option<Scalar>,
    #[serde(rename = "numSerie")]
    pub num_serie: Option<Scalar>,
    #[serde(rename = "numCorrelativo")]
    pub num_correlativo: Option<Scalar>,
    #[serde(rename = "detalleFp")]
    pub detalle_fp: Vec<PaymentDetail>,
    #[serde(rename = "detalleVenta")]
    pub detalle_venta: Vec<ProductDetail>,
}

impl ConsolidatedSale {
    /// Builds the header from the first payment row seen for an invoice.
    /// Detail lists start empty.
    pub fn from_header(record: &RawPaymentRecord) -> Self {
        Self {
            cedula: record.cedula.clone(),
            razon_social: record.razon_social.clone(),
            telefono: record.telefono.clone(),
            direccion: record.direccion.clone(),
            clave_acceso: record.clave_acceso.clone(),
            autorizacion: record.autorizacion.clone(),
            fecha_emision: record.fecha_emision.clone(),
            fecha_autorizacion: record.fecha_autorizacion.clone(),
            num_factura: record.numero.clone(),
            tipo_comprobante: record.id_documento.clone(),
            total: record.total.clone(),
            propina: record.propina.clone(),
            descuento_total: record.descuento_total.clone(),
            usuario: record.usuario.clone(),
            tipo_identificacion: record.tipo_identificacion.clone(),
            num_establecimiento: record.serie1.clone(),
            num_serie: record.serie2.clone(),
            num_correlativo: record.numero.clone(),
            detalle_fp: Vec::new(),
            detalle_venta: Vec::new(),
        }
    }

    /// The invoice key rebuilt from the stored establishment/series/correlative.
    pub fn invoice_key(&self) -> InvoiceKey {
        InvoiceKey::from_cells([
            &self.num_establecimiento,
            &self.num_serie,
            &self.num_correlativo,
        ])
    }
}

// ============ Submission Payload ============

/// Error document submitted to Reckonnt instead of sales when a run could
/// not produce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncErrorReport {
    pub status: String,
    pub message: String,
    pub fecha_desde: String,
    pub fecha_hasta: String,
}

impl SyncErrorReport {
    pub fn new(window: &ReportWindow, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            fecha_desde: window.start_str(),
            fecha_hasta: window.end_str(),
        }
    }
}

/// Body of the Reckonnt submission: a JSON array of sales, or an error
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SalesPayload {
    Sales(Vec<ConsolidatedSale>),
    Error(SyncErrorReport),
}

impl SalesPayload {
    pub fn is_error(&self) -> bool {
        matches!(self, SalesPayload::Error(_))
    }

    pub fn sale_count(&self) -> usize {
        match self {
            SalesPayload::Sales(sales) => sales.len(),
            SalesPayload::Error(_) => 0,
        }
    }
}

// ============ Report Window ============

/// Inclusive date range both RunFood reports are requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::BadRequest(format!(
                "fecha_desde {} is after fecha_hasta {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The daily run window: yesterday through `today`.
    pub fn daily(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(1),
            end: today,
        }
    }

    /// The daily run window relative to the local clock.
    pub fn daily_local() -> Self {
        Self::daily(Local::now().date_naive())
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_str(), self.end_str())
    }
}

// ============ API Request/Response Models ============

/// Request payload for triggering a sync over HTTP.
///
/// Both dates are optional; an empty body means the daily window.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
}

impl SyncRequest {
    pub fn into_window(self, today: NaiveDate) -> Result<ReportWindow, AppError> {
        let daily = ReportWindow::daily(today);
        ReportWindow::new(
            self.fecha_desde.unwrap_or(daily.start),
            self.fecha_hasta.unwrap_or(daily.end),
        )
    }
}
