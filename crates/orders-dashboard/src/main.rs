mod bootstrap;
mod report;

use anyhow::{Context, Result};
use dashboard_core::error::DashboardError;
use dashboard_core::models::DateRange;
use dashboard_core::settings::Settings;
use dashboard_data::analysis::build_dashboard;
use dashboard_data::reader::load_orders;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Orders dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let data_path = match settings.data_file.clone() {
        Some(path) => path,
        None => bootstrap::discover_data_path().ok_or_else(|| {
            DashboardError::DataPathNotFound(bootstrap::DEFAULT_DATA_FILE.into())
        })?,
    };
    tracing::info!("Loading {}", data_path.display());

    let dataset = load_orders(&data_path)
        .with_context(|| format!("loading dataset {}", data_path.display()))?;

    let range = match dataset.full_range() {
        Some(full) => settings.resolve_range(full.start(), full.end())?,
        None => {
            tracing::warn!("Dataset {} has no order lines", data_path.display());
            let today = chrono::Local::now().date_naive();
            match (settings.start_date, settings.end_date) {
                (Some(start), Some(end)) => DateRange::new(start, end)?,
                _ => DateRange::single_day(today),
            }
        }
    };
    tracing::info!("Reporting range: {}", range);

    let summary = build_dashboard(&dataset, range);

    if settings.wants_json() {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render_text(&summary, settings.top as usize));
    }

    Ok(())
}
