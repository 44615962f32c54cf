use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashboardError, Result};

/// One line item of one order, as read from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Order identifier; shared by every line item of the same order.
    pub order_id: String,
    /// Item count recorded for this line.
    pub order_item_id: u64,
    /// Product category label, `None` when the cell was empty.
    #[serde(default)]
    pub product_category_name: Option<String>,
    /// Customer identifier.
    pub customer_id: String,
    /// Customer city label, `None` when the cell was empty.
    #[serde(default)]
    pub customer_city: Option<String>,
    /// Line price.
    pub price: f64,
    /// Local wall-clock time of purchase.
    pub order_purchase_timestamp: NaiveDateTime,
}

impl OrderLine {
    /// Calendar date of the purchase (time of day dropped).
    pub fn purchase_date(&self) -> NaiveDate {
        self.order_purchase_timestamp.date()
    }

    /// Calendar year of the purchase.
    pub fn year(&self) -> i32 {
        self.order_purchase_timestamp.year()
    }

    /// Calendar month of the purchase, 1-12.
    pub fn month(&self) -> u32 {
        self.order_purchase_timestamp.month()
    }

    /// `(year, month)` bucket the purchase falls in.
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year(),
            month: self.month(),
        }
    }
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive range of calendar dates used to select records.
///
/// A record belongs to the range when the date portion of its purchase
/// timestamp lies within `[start, end]`, so every order placed on `end`
/// is included regardless of time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `ts` falls on a day before `start`.
    pub fn is_before(&self, ts: &NaiveDateTime) -> bool {
        ts.date() < self.start
    }

    /// Whether `ts` falls on a day after `end`.
    pub fn is_after(&self, ts: &NaiveDateTime) -> bool {
        ts.date() > self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
