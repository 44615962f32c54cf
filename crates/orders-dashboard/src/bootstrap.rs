use dashboard_core::settings::STATE_DIR_NAME;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name the dataset is published under.
pub const DEFAULT_DATA_FILE: &str = "all_data.csv";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.orders-dashboard/` exists (including any missing parents).
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(home.join(STATE_DIR_NAME))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a Python-style level name onto a `tracing` level directive.
///
/// Unrecognised names map to `info`.
pub fn level_directive(log_level: &str) -> &'static str {
    match log_level.to_uppercase().as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "WARNING" => "warn",
        "ERROR" => "error",
        _ => "info",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired; all output goes to stderr so that the report on
/// stdout stays clean.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::new(level_directive(log_level));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the dataset when `--data-file` was not given.
///
/// Checks, relative to `cwd` and `home`, and returns the first that exists:
/// 1. `./all_data.csv`
/// 2. `./dashboard/all_data.csv`
/// 3. `~/.orders-dashboard/all_data.csv`
pub fn discover_data_path_in(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = vec![
        cwd.join(DEFAULT_DATA_FILE),
        cwd.join("dashboard").join(DEFAULT_DATA_FILE),
    ];
    if let Some(home) = home {
        candidates.push(home.join(STATE_DIR_NAME).join(DEFAULT_DATA_FILE));
    }
    candidates.into_iter().find(|p| p.is_file())
}

/// [`discover_data_path_in`] for the current directory and home directory.
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_data_path_in(&cwd, dirs::home_dir().as_deref())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "order_id\n").unwrap();
    }

    // ── level_directive ───────────────────────────────────────────────────────

    #[test]
    fn test_level_directive_maps_python_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("CRITICAL"), "debug");
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
    }

    #[test]
    fn test_level_directive_unknown_is_info() {
        assert_eq!(level_directive("verbose"), "info");
    }

    // ── discover_data_path_in ─────────────────────────────────────────────────

    #[test]
    fn test_discover_returns_none_when_absent() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        assert!(discover_data_path_in(cwd.path(), Some(home.path())).is_none());
    }

    #[test]
    fn test_discover_prefers_working_directory() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        let local = cwd.path().join(DEFAULT_DATA_FILE);
        touch(&local);
        touch(&home.path().join(STATE_DIR_NAME).join(DEFAULT_DATA_FILE));

        assert_eq!(
            discover_data_path_in(cwd.path(), Some(home.path())),
            Some(local)
        );
    }

    #[test]
    fn test_discover_finds_dashboard_subdirectory() {
        let cwd = TempDir::new().expect("tempdir");
        let nested = cwd.path().join("dashboard").join(DEFAULT_DATA_FILE);
        touch(&nested);

        assert_eq!(discover_data_path_in(cwd.path(), None), Some(nested));
    }

    #[test]
    fn test_discover_falls_back_to_home() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        let in_home = home.path().join(STATE_DIR_NAME).join(DEFAULT_DATA_FILE);
        touch(&in_home);

        assert_eq!(
            discover_data_path_in(cwd.path(), Some(home.path())),
            Some(in_home)
        );
    }

    #[test]
    fn test_discover_ignores_directories_with_matching_name() {
        let cwd = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(cwd.path().join(DEFAULT_DATA_FILE)).unwrap();
        assert!(discover_data_path_in(cwd.path(), None).is_none());
    }
}
