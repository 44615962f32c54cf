//! Grouped order summaries: per category/city, per city, per category and
//! per calendar month.
//!
//! Every function takes the already-filtered record slice and returns a new
//! owned table. Groups are first collected in key order, then a stable sort
//! applies the documented ordering, so ties always come out in key order.

use std::collections::{BTreeMap, HashSet};

use dashboard_core::models::{OrderLine, YearMonth};
use serde::{Deserialize, Serialize};

// ── Accumulate ────────────────────────────────────────────────────────────────

/// In-place addition used by every grouping. Item counts saturate at
/// `u64::MAX` instead of overflowing.
pub(crate) trait Accumulate {
    fn accumulate(&mut self, value: Self);
}

impl Accumulate for u64 {
    fn accumulate(&mut self, value: u64) {
        *self = self.saturating_add(value);
    }
}

impl Accumulate for f64 {
    fn accumulate(&mut self, value: f64) {
        *self += value;
    }
}

/// Saturating sum of item counts.
pub(crate) fn saturating_total(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

// ── OrderStats ────────────────────────────────────────────────────────────────

/// The three measures shown for every category/city group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    /// Distinct orders in the group.
    #[serde(rename = "Order Count")]
    pub order_count: usize,
    /// Sum of `order_item_id`.
    #[serde(rename = "Item")]
    pub items: u64,
    /// Sum of `price`.
    #[serde(rename = "Total Price")]
    pub total_price: f64,
}

/// Running totals for one group while scanning records.
#[derive(Default)]
struct StatsAccumulator<'a> {
    order_ids: HashSet<&'a str>,
    items: u64,
    total_price: f64,
}

impl<'a> StatsAccumulator<'a> {
    fn add(&mut self, record: &'a OrderLine) {
        self.order_ids.insert(record.order_id.as_str());
        self.items.accumulate(record.order_item_id);
        self.total_price += record.price;
    }

    fn finish(self) -> OrderStats {
        OrderStats {
            order_count: self.order_ids.len(),
            items: self.items,
            total_price: self.total_price,
        }
    }
}

// ── Result rows ───────────────────────────────────────────────────────────────

/// One `(category, city)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCitySummary {
    pub product_category_name: String,
    pub customer_city: String,
    #[serde(flatten)]
    pub stats: OrderStats,
}

/// One city group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub customer_city: String,
    #[serde(flatten)]
    pub stats: OrderStats,
}

/// Items sold in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub product_category_name: String,
    pub order_item_id: u64,
}

/// Items sold in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyItems {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    pub order_item_id: u64,
}

/// Revenue taken in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    pub price: f64,
}

impl MonthlyItems {
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

impl MonthlyRevenue {
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

// ── CategoryTotals ────────────────────────────────────────────────────────────

/// Per-category item totals, ordered by items descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    rows: Vec<CategoryTotal>,
}

impl CategoryTotals {
    pub fn rows(&self) -> &[CategoryTotal] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CategoryTotal> {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Best-selling category: the first row.
    pub fn best(&self) -> Option<&CategoryTotal> {
        self.rows.first()
    }

    /// Worst-selling category: the last row.
    pub fn worst(&self) -> Option<&CategoryTotal> {
        self.rows.last()
    }

    /// The `n` best-selling categories, best first.
    pub fn top(&self, n: usize) -> &[CategoryTotal] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// The `n` worst-selling categories, worst first.
    pub fn bottom(&self, n: usize) -> Vec<CategoryTotal> {
        let mut ascending = self.rows.clone();
        ascending.sort_by_key(|r| r.order_item_id);
        ascending.truncate(n);
        ascending
    }

    /// Sum of items over all categories, saturating at `u64::MAX`.
    pub fn total_items(&self) -> u64 {
        saturating_total(self.rows.iter().map(|r| r.order_item_id))
    }
}

// ── OrderAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that builds the summary tables.
pub struct OrderAggregator;

impl OrderAggregator {
    /// Group by `(category, city)`; ordered by items descending.
    ///
    /// Lines without a category or a city are not part of any group.
    pub fn category_summary(records: &[OrderLine]) -> Vec<CategoryCitySummary> {
        let groups = Self::group_stats(records, |r| {
            Some((
                r.product_category_name.as_deref()?,
                r.customer_city.as_deref()?,
            ))
        });

        let mut rows: Vec<CategoryCitySummary> = groups
            .into_iter()
            .map(|((category, city), stats)| CategoryCitySummary {
                product_category_name: category.to_string(),
                customer_city: city.to_string(),
                stats,
            })
            .collect();
        rows.sort_by(|a, b| b.stats.items.cmp(&a.stats.items));
        rows
    }

    /// Group by city; ordered by items descending.
    pub fn city_summary(records: &[OrderLine]) -> Vec<CitySummary> {
        let groups = Self::group_stats(records, |r| r.customer_city.as_deref());

        let mut rows: Vec<CitySummary> = groups
            .into_iter()
            .map(|(city, stats)| CitySummary {
                customer_city: city.to_string(),
                stats,
            })
            .collect();
        rows.sort_by(|a, b| b.stats.items.cmp(&a.stats.items));
        rows
    }

    /// Items per category; ordered by items descending.
    pub fn category_totals(records: &[OrderLine]) -> CategoryTotals {
        let mut map: BTreeMap<&str, u64> = BTreeMap::new();
        for record in records {
            if let Some(category) = record.product_category_name.as_deref() {
                map.entry(category)
                    .or_default()
                    .accumulate(record.order_item_id);
            }
        }

        let mut rows: Vec<CategoryTotal> = map
            .into_iter()
            .map(|(category, items)| CategoryTotal {
                product_category_name: category.to_string(),
                order_item_id: items,
            })
            .collect();
        rows.sort_by(|a, b| b.order_item_id.cmp(&a.order_item_id));
        CategoryTotals { rows }
    }

    /// Items per `(Year, Month)`, chronological. Months without orders are
    /// absent rather than zero.
    pub fn monthly_order_volume(records: &[OrderLine]) -> Vec<MonthlyItems> {
        Self::bucket_by_month(records, |r| r.order_item_id)
            .into_iter()
            .map(|(ym, items)| MonthlyItems {
                year: ym.year,
                month: ym.month,
                order_item_id: items,
            })
            .collect()
    }

    /// Revenue per `(Year, Month)`, chronological.
    pub fn monthly_revenue(records: &[OrderLine]) -> Vec<MonthlyRevenue> {
        Self::bucket_by_month(records, |r| r.price)
            .into_iter()
            .map(|(ym, price)| MonthlyRevenue {
                year: ym.year,
                month: ym.month,
                price,
            })
            .collect()
    }

    /// Number of distinct orders in `records`.
    pub fn distinct_orders(records: &[OrderLine]) -> usize {
        records
            .iter()
            .map(|r| r.order_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic grouping driver; `key_fn` returning `None` drops the record.
    fn group_stats<'a, K: Ord>(
        records: &'a [OrderLine],
        key_fn: impl Fn(&'a OrderLine) -> Option<K>,
    ) -> BTreeMap<K, OrderStats> {
        let mut map: BTreeMap<K, StatsAccumulator<'a>> = BTreeMap::new();
        for record in records {
            if let Some(key) = key_fn(record) {
                map.entry(key).or_default().add(record);
            }
        }
        map.into_iter().map(|(k, acc)| (k, acc.finish())).collect()
    }

    fn bucket_by_month<T>(
        records: &[OrderLine],
        value_fn: impl Fn(&OrderLine) -> T,
    ) -> BTreeMap<YearMonth, T>
    where
        T: Default + Accumulate,
    {
        let mut map: BTreeMap<YearMonth, T> = BTreeMap::new();
        for record in records {
            map.entry(record.year_month())
                .or_default()
                .accumulate(value_fn(record));
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(
        order_id: &str,
        items: u64,
        category: Option<&str>,
        city: Option<&str>,
        price: f64,
        ts: &str,
    ) -> OrderLine {
        OrderLine {
            order_id: order_id.to_string(),
            order_item_id: items,
            product_category_name: category.map(str::to_string),
            customer_id: format!("cust-{order_id}"),
            customer_city: city.map(str::to_string),
            price,
            order_purchase_timestamp: chrono::NaiveDateTime::parse_from_str(
                ts,
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
        }
    }

    fn sample() -> Vec<OrderLine> {
        vec![
            make_line("o1", 1, Some("toys"), Some("rio"), 10.0, "2017-01-05 10:00:00"),
            make_line("o1", 2, Some("toys"), Some("rio"), 15.0, "2017-01-05 10:00:00"),
            make_line("o2", 1, Some("toys"), Some("sao paulo"), 20.0, "2017-01-20 08:00:00"),
            make_line("o3", 4, Some("garden"), Some("sao paulo"), 40.0, "2017-02-02 12:00:00"),
            make_line("o4", 1, Some("books"), Some("rio"), 5.0, "2017-04-11 16:00:00"),
        ]
    }

    // ── category_summary ──────────────────────────────────────────────────────

    #[test]
    fn test_category_summary_groups_and_sorts() {
        let rows = OrderAggregator::category_summary(&sample());

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].product_category_name, "garden");
        assert_eq!(rows[0].customer_city, "sao paulo");
        assert_eq!(rows[0].stats.items, 4);

        let toys_rio = &rows[1];
        assert_eq!(toys_rio.product_category_name, "toys");
        assert_eq!(toys_rio.customer_city, "rio");
        assert_eq!(toys_rio.stats.order_count, 1);
        assert_eq!(toys_rio.stats.items, 3);
        assert!((toys_rio.stats.total_price - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_summary_ties_in_key_order() {
        let rows = OrderAggregator::category_summary(&sample());
        // books/rio and toys/sao paulo both have 1 item.
        assert_eq!(rows[2].product_category_name, "books");
        assert_eq!(rows[3].product_category_name, "toys");
    }

    #[test]
    fn test_category_summary_items_match_input() {
        let records = sample();
        let rows = OrderAggregator::category_summary(&records);
        let summed: u64 = rows.iter().map(|r| r.stats.items).sum();
        let expected: u64 = records.iter().map(|r| r.order_item_id).sum();
        assert_eq!(summed, expected);
    }

    #[test]
    fn test_category_summary_skips_missing_keys() {
        let records = vec![
            make_line("o1", 1, None, Some("rio"), 10.0, "2017-01-05 10:00:00"),
            make_line("o2", 1, Some("toys"), None, 10.0, "2017-01-05 10:00:00"),
        ];
        assert!(OrderAggregator::category_summary(&records).is_empty());
    }

    #[test]
    fn test_category_summary_empty() {
        assert!(OrderAggregator::category_summary(&[]).is_empty());
    }

    // ── city_summary ──────────────────────────────────────────────────────────

    #[test]
    fn test_city_summary() {
        let rows = OrderAggregator::city_summary(&sample());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_city, "sao paulo");
        assert_eq!(rows[0].stats.items, 5);
        assert_eq!(rows[0].stats.order_count, 2);
        assert!((rows[0].stats.total_price - 60.0).abs() < 1e-9);

        assert_eq!(rows[1].customer_city, "rio");
        assert_eq!(rows[1].stats.items, 4);
        assert_eq!(rows[1].stats.order_count, 2);
    }

    #[test]
    fn test_city_summary_serialises_display_names() {
        let rows = OrderAggregator::city_summary(&sample());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["customer_city"], "sao paulo");
        assert_eq!(json["Order Count"], 2);
        assert_eq!(json["Item"], 5);
        assert_eq!(json["Total Price"], 60.0);
    }

    // ── category_totals ───────────────────────────────────────────────────────

    #[test]
    fn test_category_totals_best_and_worst() {
        let records = vec![
            make_line("o1", 50, Some("A"), Some("x"), 1.0, "2017-01-05 10:00:00"),
            make_line("o2", 5, Some("B"), Some("x"), 1.0, "2017-01-05 10:00:00"),
        ];
        let totals = OrderAggregator::category_totals(&records);

        assert_eq!(totals.best().unwrap().product_category_name, "A");
        assert_eq!(totals.best().unwrap().order_item_id, 50);
        assert_eq!(totals.worst().unwrap().product_category_name, "B");
    }

    #[test]
    fn test_category_totals_sorted_descending() {
        let totals = OrderAggregator::category_totals(&sample());
        let names: Vec<&str> = totals
            .rows()
            .iter()
            .map(|r| r.product_category_name.as_str())
            .collect();
        assert_eq!(names, vec!["garden", "toys", "books"]);
        assert_eq!(totals.total_items(), 9);
    }

    #[test]
    fn test_category_totals_top_and_bottom() {
        let totals = OrderAggregator::category_totals(&sample());

        let top = totals.top(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_category_name, "garden");

        let bottom = totals.bottom(2);
        assert_eq!(bottom[0].product_category_name, "books");
        // garden and toys tie on 4 items; the tie keeps descending-table order.
        assert_eq!(bottom[1].product_category_name, "garden");

        assert_eq!(totals.top(10).len(), 3);
        assert_eq!(totals.bottom(10).len(), 3);
    }

    #[test]
    fn test_category_totals_empty() {
        let totals = OrderAggregator::category_totals(&[]);
        assert!(totals.is_empty());
        assert!(totals.best().is_none());
        assert!(totals.worst().is_none());
        assert!(totals.top(5).is_empty());
    }

    // ── monthly buckets ───────────────────────────────────────────────────────

    #[test]
    fn test_monthly_order_volume() {
        let months = OrderAggregator::monthly_order_volume(&sample());

        assert_eq!(months.len(), 3);
        assert_eq!((months[0].year, months[0].month), (2017, 1));
        assert_eq!(months[0].order_item_id, 4);
        assert_eq!((months[1].year, months[1].month), (2017, 2));
        assert_eq!(months[1].order_item_id, 4);
        // March has no orders and no row.
        assert_eq!((months[2].year, months[2].month), (2017, 4));
        assert_eq!(months[2].order_item_id, 1);
    }

    #[test]
    fn test_monthly_revenue() {
        let months = OrderAggregator::monthly_revenue(&sample());
        assert_eq!(months.len(), 3);
        assert!((months[0].price - 45.0).abs() < 1e-9);
        assert!((months[1].price - 40.0).abs() < 1e-9);
        assert!((months[2].price - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_tables_share_keys() {
        let records = sample();
        let volume: Vec<YearMonth> = OrderAggregator::monthly_order_volume(&records)
            .iter()
            .map(MonthlyItems::year_month)
            .collect();
        let revenue: Vec<YearMonth> = OrderAggregator::monthly_revenue(&records)
            .iter()
            .map(MonthlyRevenue::year_month)
            .collect();
        assert_eq!(volume, revenue);
    }

    #[test]
    fn test_monthly_counts_lines_without_category() {
        let records = vec![make_line(
            "o1",
            2,
            None,
            None,
            7.0,
            "2018-12-31 23:59:59",
        )];
        let months = OrderAggregator::monthly_order_volume(&records);
        assert_eq!(months.len(), 1);
        assert_eq!((months[0].year, months[0].month), (2018, 12));
        assert_eq!(months[0].order_item_id, 2);
    }

    #[test]
    fn test_monthly_spans_year_boundary_in_order() {
        let records = vec![
            make_line("o2", 1, Some("a"), Some("x"), 1.0, "2017-01-02 00:00:00"),
            make_line("o1", 1, Some("a"), Some("x"), 1.0, "2016-12-30 00:00:00"),
        ];
        let months = OrderAggregator::monthly_revenue(&records);
        assert_eq!((months[0].year, months[0].month), (2016, 12));
        assert_eq!((months[1].year, months[1].month), (2017, 1));
    }

    #[test]
    fn test_monthly_empty() {
        assert!(OrderAggregator::monthly_order_volume(&[]).is_empty());
        assert!(OrderAggregator::monthly_revenue(&[]).is_empty());
    }

    // ── distinct_orders ───────────────────────────────────────────────────────

    #[test]
    fn test_item_sums_saturate_instead_of_overflowing() {
        let records = vec![
            make_line("o1", u64::MAX, Some("toys"), Some("rio"), 1.0, "2017-01-05 10:00:00"),
            make_line("o2", 1, Some("toys"), Some("rio"), 1.0, "2017-01-06 10:00:00"),
        ];

        let totals = OrderAggregator::category_totals(&records);
        assert_eq!(totals.best().unwrap().order_item_id, u64::MAX);
        assert_eq!(totals.total_items(), u64::MAX);

        let summary = OrderAggregator::category_summary(&records);
        assert_eq!(summary[0].stats.items, u64::MAX);
        assert_eq!(OrderAggregator::city_summary(&records)[0].stats.items, u64::MAX);

        let monthly = OrderAggregator::monthly_order_volume(&records);
        assert_eq!(monthly[0].order_item_id, u64::MAX);
    }

    #[test]
    fn test_distinct_orders() {
        assert_eq!(OrderAggregator::distinct_orders(&sample()), 4);
        assert_eq!(OrderAggregator::distinct_orders(&[]), 0);
    }
}
