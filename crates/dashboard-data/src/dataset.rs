//! The in-memory order dataset and date-range filtering.

use chrono::{NaiveDate, NaiveDateTime};
use dashboard_core::models::{DateRange, OrderLine};

/// All order lines loaded from one file, ordered by purchase time.
///
/// The dataset is owned by the caller and never mutated after construction;
/// [`OrderDataset::filter`] hands out borrowed sub-slices.
#[derive(Debug, Clone, Default)]
pub struct OrderDataset {
    records: Vec<OrderLine>,
}

impl OrderDataset {
    /// Take ownership of `records`, sorting them by purchase timestamp.
    ///
    /// The sort is stable, so lines with equal timestamps keep file order.
    pub fn new(mut records: Vec<OrderLine>) -> Self {
        records.sort_by_key(|r| r.order_purchase_timestamp);
        Self { records }
    }

    pub fn records(&self) -> &[OrderLine] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest purchase timestamp.
    pub fn min_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.first().map(|r| r.order_purchase_timestamp)
    }

    /// Latest purchase timestamp.
    pub fn max_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.order_purchase_timestamp)
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.min_timestamp().map(|ts| ts.date())
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.max_timestamp().map(|ts| ts.date())
    }

    /// Range spanning every record, `None` for an empty dataset.
    pub fn full_range(&self) -> Option<DateRange> {
        let start = self.min_date()?;
        let end = self.max_date()?;
        DateRange::new(start, end).ok()
    }

    /// Records purchased on a day inside `range`.
    ///
    /// Because records are sorted by timestamp the matching lines form one
    /// contiguous run, located by binary search. Ranges lying outside the
    /// dataset yield an empty slice.
    pub fn filter(&self, range: &DateRange) -> &[OrderLine] {
        let lo = self
            .records
            .partition_point(|r| range.is_before(&r.order_purchase_timestamp));
        let hi = self
            .records
            .partition_point(|r| !range.is_after(&r.order_purchase_timestamp));
        if lo >= hi {
            return &[];
        }
        &self.records[lo..hi]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
