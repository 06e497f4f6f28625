use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Sheet the consumption report is published on.
pub const DEFAULT_SHEET_NAME: &str = "فرم ارائه گزارش برق کنسانتره";

/// Directory (under the home dir) holding persisted CLI state.
const STATE_DIR: &str = ".meter-dashboard";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Equipment electricity consumption dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meter-dashboard",
    about = "Summarise per-equipment electricity consumption from a spreadsheet report",
    version
)]
pub struct Settings {
    /// Spreadsheet to read (.xlsx, .xlsm, .xls, .ods or .csv)
    pub file: PathBuf,

    /// Sheet holding the readings (ignored for CSV files)
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet: String,

    /// First day of the date range (defaults to the earliest reading)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the date range (defaults to the latest reading)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Equipment columns to compare (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Equipment column to show a trend for (defaults to the first column)
    #[arg(long)]
    pub trend: Option<String>,

    /// Print the filtered table
    #[arg(long)]
    pub table: bool,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Name given to the first (timestamp) column
    #[arg(long, default_value = "date")]
    pub date_column: String,

    /// Label used for columns whose header cell is blank
    #[arg(long, default_value = "Untitled")]
    pub placeholder: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.meter-dashboard/last_used.json`.
///
/// Column selections belong to a single report and are never persisted.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(STATE_DIR).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
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

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                warn!("Failed to clear {}: {}", config_path.display(), e);
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "sheet") {
            if let Some(v) = last.sheet {
                settings.sheet = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            warn!("Failed to save {}: {}", config_path.display(), e);
        }

        settings.apply_debug()
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            sheet: Some(s.sheet.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
