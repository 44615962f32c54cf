//! Plain-text rendering of a [`DashboardSummary`].
//!
//! One section per dashboard panel: headline metrics, monthly trends,
//! best/worst categories, category-by-city, cities, and RFM.

use dashboard_core::formatting::{format_number, format_optional, percentage};
use dashboard_data::analysis::DashboardSummary;
use dashboard_data::rfm::{RfmCalculator, RfmRow};

const RULE_WIDTH: usize = 64;

/// Render the full report; `top` bounds every ranked listing.
pub fn render_text(summary: &DashboardSummary, top: usize) -> String {
    let mut out: Vec<String> = Vec::new();

    heading(&mut out, "E-Commerce Orders");
    out.push(format!(
        "Range: {} .. {}  ({} of {} order lines, {} orders)",
        summary.metadata.start_date,
        summary.metadata.end_date,
        format_number(summary.metadata.records_in_range as f64, 0),
        format_number(summary.metadata.records_total as f64, 0),
        format_number(summary.metadata.orders_in_range as f64, 0),
    ));

    // ── Monthly ───────────────────────────────────────────────────────────────
    heading(&mut out, "Monthly Orders");
    out.push(format!(
        "Total orders:  {}",
        format_number(summary.total_items as f64, 0)
    ));
    out.push(format!(
        "Total revenue: {}",
        format_number(summary.total_revenue, 2)
    ));
    out.push(String::new());
    out.push(format!("{:<10}{:>14}{:>18}", "Month", "Items", "Revenue"));
    for (items, revenue) in summary
        .monthly_order_volume
        .iter()
        .zip(summary.monthly_revenue.iter())
    {
        out.push(format!(
            "{:<10}{:>14}{:>18}",
            items.year_month().to_string(),
            format_number(items.order_item_id as f64, 0),
            format_number(revenue.price, 2),
        ));
    }

    // ── Categories ────────────────────────────────────────────────────────────
    heading(&mut out, "Best & Worst Performing Product");
    let name_of = |c: &Option<dashboard_data::aggregator::CategoryTotal>| {
        c.as_ref()
            .map(|c| c.product_category_name.clone())
            .unwrap_or_else(|| "n/a".to_string())
    };
    out.push(format!("Best product:  {}", name_of(&summary.best_category)));
    out.push(format!("Worst product: {}", name_of(&summary.worst_category)));

    let all_items = summary.category_totals.total_items() as f64;
    out.push(String::new());
    out.push("Best performing:".to_string());
    for row in summary.category_totals.top(top) {
        out.push(category_line(
            &row.product_category_name,
            row.order_item_id,
            all_items,
        ));
    }
    out.push("Worst performing:".to_string());
    for row in summary.category_totals.bottom(top) {
        out.push(category_line(
            &row.product_category_name,
            row.order_item_id,
            all_items,
        ));
    }

    heading(&mut out, "Most Product Sold in A City");
    out.push(format!(
        "{:<34}{:<22}{:>8}",
        "Category", "City", "Items"
    ));
    for row in summary.category_summary.iter().take(top) {
        out.push(format!(
            "{:<34}{:<22}{:>8}",
            row.product_category_name,
            row.customer_city,
            format_number(row.stats.items as f64, 0),
        ));
    }

    heading(&mut out, "Most Order Item By City");
    out.push(format!(
        "{:<26}{:>8}{:>10}{:>18}",
        "City", "Orders", "Items", "Total Price"
    ));
    for row in summary.city_summary.iter().take(top) {
        out.push(format!(
            "{:<26}{:>8}{:>10}{:>18}",
            row.customer_city,
            format_number(row.stats.order_count as f64, 0),
            format_number(row.stats.items as f64, 0),
            format_number(row.stats.total_price, 2),
        ));
    }

    // ── RFM ───────────────────────────────────────────────────────────────────
    heading(&mut out, "Best Customer Based on RFM Parameters");
    let rfm = &summary.rfm_summary;
    out.push(format!(
        "Average recency (days): {}",
        format_optional(rfm.avg_recency, 1)
    ));
    out.push(format!(
        "Average frequency:      {}",
        format_optional(rfm.avg_frequency, 2)
    ));
    out.push(format!(
        "Average monetary:       {}",
        format_optional(rfm.avg_monetary, 2)
    ));

    rfm_listing(
        &mut out,
        "By recency (days)",
        &RfmCalculator::top_by_recency(&summary.rfm, top),
        |r| format_number(r.recency as f64, 0),
    );
    rfm_listing(
        &mut out,
        "By frequency",
        &RfmCalculator::top_by_frequency(&summary.rfm, top),
        |r| format_number(r.frequency as f64, 0),
    );
    rfm_listing(
        &mut out,
        "By monetary",
        &RfmCalculator::top_by_monetary(&summary.rfm, top),
        |r| format_number(r.monetary, 2),
    );

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn heading(out: &mut Vec<String>, title: &str) {
    if !out.is_empty() {
        out.push(String::new());
    }
    out.push(title.to_string());
    out.push("─".repeat(RULE_WIDTH));
}

fn category_line(name: &str, items: u64, all_items: f64) -> String {
    format!(
        "  {:<34}{:>10}{:>8}%",
        name,
        format_number(items as f64, 0),
        format_number(percentage(items as f64, all_items, 1), 1),
    )
}

fn rfm_listing(
    out: &mut Vec<String>,
    title: &str,
    rows: &[RfmRow],
    value: impl Fn(&RfmRow) -> String,
) {
    out.push(String::new());
    out.push(format!("{}:", title));
    for row in rows {
        out.push(format!("  {:<36}{:>14}", row.customer_id, value(row)));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::DateRange;
    use dashboard_data::analysis::build_dashboard;
    use dashboard_data::reader::load_orders_from_reader;

    const SAMPLE_CSV: &str = "\
order_id,order_item_id,product_category_name,customer_id,customer_city,price,order_purchase_timestamp
O1,1,toys,C1,rio,10.0,2017-01-05 09:00:00
O2,1,toys,C1,rio,20.0,2017-02-10 18:45:00
O3,2,garden,C2,sao paulo,1035.5,2017-02-01 11:00:00
O4,3,books,C3,curitiba,9.0,2017-03-20 07:15:00
";

    fn summary() -> DashboardSummary {
        let dataset = load_orders_from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        build_dashboard(&dataset, dataset.full_range().unwrap())
    }

    #[test]
    fn test_render_text_contains_sections() {
        let text = render_text(&summary(), 5);
        for section in [
            "Monthly Orders",
            "Best & Worst Performing Product",
            "Most Product Sold in A City",
            "Most Order Item By City",
            "Best Customer Based on RFM Parameters",
        ] {
            assert!(text.contains(section), "missing section {section}");
        }
    }

    #[test]
    fn test_render_text_headline_figures() {
        let text = render_text(&summary(), 5);
        assert!(text.contains("Total orders:  7"));
        assert!(text.contains("Total revenue: 1,074.50"));
        assert!(text.contains("Best product:  books"));
        assert!(text.contains("Worst product: toys"));
        assert!(text.contains("2017-02"));
    }

    #[test]
    fn test_render_text_respects_top() {
        // curitiba leads both city listings; sao paulo only ranks second.
        let text = render_text(&summary(), 1);
        assert!(text.contains("curitiba"));
        assert!(!text.contains("sao paulo"));
    }

    #[test]
    fn test_render_text_empty_range() {
        let dataset = load_orders_from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let range = DateRange::single_day(chrono::NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        let text = render_text(&build_dashboard(&dataset, range), 5);
        assert!(text.contains("Best product:  n/a"));
        assert!(text.contains("Average recency (days): n/a"));
    }
}
