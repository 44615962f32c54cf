use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::DateRange;
use crate::timestamps::TimestampParser;

/// Name of the per-user state directory under the home directory.
pub const STATE_DIR_NAME: &str = ".orders-dashboard";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Order, revenue and customer-segment summaries for an e-commerce dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "orders-dashboard",
    about = "Order, revenue and customer-segment summaries for an e-commerce dataset",
    version
)]
pub struct Settings {
    /// CSV file with one row per order line (auto-discovered if not specified)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// First day of the reporting window, inclusive (defaults to the earliest purchase)
    #[arg(long, value_parser = parse_date_arg)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the reporting window, inclusive (defaults to the latest purchase)
    #[arg(long, value_parser = parse_date_arg)]
    pub end_date: Option<NaiveDate>,

    /// Rows shown in each top/bottom listing (1-50)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub top: u32,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    TimestampParser::parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got \"{}\"", s))
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.orders-dashboard/last_used.json`.
///
/// Date bounds are never persisted: they only make sense for the dataset they
/// were picked against.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(STATE_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Could not clear {}: {}", config_path.display(), e);
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins; clap stores arg ids under the field name.
        // A remembered dataset that has since been moved is forgotten so
        // that discovery can take over.
        if settings.data_file.is_none() {
            settings.data_file = last.data_file.filter(|p| p.is_file());
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top.filter(|v| (1..=50).contains(v)) {
                settings.top = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format.filter(|v| v == "text" || v == "json") {
                settings.format = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!("Could not persist settings to {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Resolve the reporting window, falling back to the dataset bounds for
    /// whichever side was not given on the command line.
    pub fn resolve_range(&self, dataset_min: NaiveDate, dataset_max: NaiveDate) -> Result<DateRange> {
        let start = self.start_date.unwrap_or(dataset_min);
        let end = self.end_date.unwrap_or(dataset_max);
        DateRange::new(start, end)
    }

    /// `true` when the JSON report was requested.
    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data_file: s.data_file.clone(),
            top: Some(s.top),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
