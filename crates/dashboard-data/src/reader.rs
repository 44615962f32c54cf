//! CSV loading for the order dataset.
//!
//! Reads one delimited file with a header row and maps every data row onto an
//! [`OrderLine`]. Columns other than the seven listed in [`columns::REQUIRED`]
//! are ignored. Any malformed row aborts the load.

use std::io::Read;
use std::path::Path;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::OrderLine;
use dashboard_core::timestamps::TimestampParser;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::dataset::OrderDataset;

/// Header names the loader relies on.
pub mod columns {
    pub const ORDER_ID: &str = "order_id";
    pub const ORDER_ITEM_ID: &str = "order_item_id";
    pub const PRODUCT_CATEGORY_NAME: &str = "product_category_name";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const CUSTOMER_CITY: &str = "customer_city";
    pub const PRICE: &str = "price";
    pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";

    pub const REQUIRED: [&str; 7] = [
        ORDER_ID,
        ORDER_ITEM_ID,
        PRODUCT_CATEGORY_NAME,
        CUSTOMER_ID,
        CUSTOMER_CITY,
        PRICE,
        ORDER_PURCHASE_TIMESTAMP,
    ];
}

/// One CSV row before validation. Every cell is kept as text so that a bad
/// value can be reported with its line number.
#[derive(Debug, Deserialize)]
struct RawOrderLine {
    order_id: String,
    order_item_id: Option<String>,
    product_category_name: Option<String>,
    customer_id: String,
    customer_city: Option<String>,
    price: Option<String>,
    order_purchase_timestamp: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the dataset at `path`.
///
/// Fails when the file cannot be opened, a required column is missing, or
/// any row is malformed.
pub fn load_orders(path: &Path) -> Result<OrderDataset> {
    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_orders_from_reader(file)?;
    debug!("Loaded {} order lines from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Load the dataset from any byte source containing CSV text.
pub fn load_orders_from_reader<R: Read>(reader: R) -> Result<OrderDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_headers(&headers)?;

    let mut records = Vec::new();
    let mut missing_keys = 0usize;

    for result in csv_reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawOrderLine =
            row.deserialize(Some(&headers))
                .map_err(|e| DashboardError::InvalidRow {
                    line,
                    message: e.to_string(),
                })?;
        let record = map_to_order_line(raw, line)?;
        if record.product_category_name.is_none() || record.customer_city.is_none() {
            missing_keys += 1;
        }
        records.push(record);
    }

    if missing_keys > 0 {
        warn!(
            "{} order lines have no category or city and will be left out of those groupings",
            missing_keys
        );
    }

    Ok(OrderDataset::new(records))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Reject a header row that lacks any required column.
fn check_headers(headers: &csv::StringRecord) -> Result<()> {
    for required in columns::REQUIRED {
        if !headers.iter().any(|h| h == required) {
            return Err(DashboardError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

/// Validate a raw row and convert it into an [`OrderLine`].
///
/// Empty `order_item_id` / `price` cells count as zero, so the line still
/// contributes its order and customer to distinct counts but nothing to sums.
fn map_to_order_line(raw: RawOrderLine, line: u64) -> Result<OrderLine> {
    if raw.order_id.is_empty() {
        return Err(invalid(line, "empty order_id"));
    }
    if raw.customer_id.is_empty() {
        return Err(invalid(line, "empty customer_id"));
    }

    let order_item_id = match non_empty(raw.order_item_id) {
        Some(s) => parse_count(&s).ok_or_else(|| {
            invalid(line, &format!("order_item_id is not a whole number: {}", s))
        })?,
        None => 0,
    };

    let price = match non_empty(raw.price) {
        Some(s) => {
            let value: f64 = s
                .parse()
                .map_err(|_| invalid(line, &format!("price is not a number: {}", s)))?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(line, &format!("price must be non-negative: {}", s)));
            }
            value
        }
        None => 0.0,
    };

    let order_purchase_timestamp = TimestampParser::parse(&raw.order_purchase_timestamp)
        .ok_or_else(|| DashboardError::TimestampParse {
            line,
            value: raw.order_purchase_timestamp.clone(),
        })?;

    Ok(OrderLine {
        order_id: raw.order_id,
        order_item_id,
        product_category_name: non_empty(raw.product_category_name),
        customer_id: raw.customer_id,
        customer_city: non_empty(raw.customer_city),
        price,
        order_purchase_timestamp,
    })
}

/// Parse a non-negative whole number, accepting float spellings like `"2.0"`
/// that spreadsheet exports produce for integer columns with gaps.
///
/// Float spellings at or above 2^64 are rejected rather than clamped.
fn parse_count(s: &str) -> Option<u64> {
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let f: f64 = s.parse().ok()?;
    // `u64::MAX as f64` rounds up to 2^64, which itself does not fit.
    if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.is_empty())
}

fn invalid(line: u64, message: &str) -> DashboardError {
    DashboardError::InvalidRow {
        line,
        message: message.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
