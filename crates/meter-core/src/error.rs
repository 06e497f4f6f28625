use std::path::PathBuf;
use thiserror::Error;

/// Reasons a raw grid cannot be turned into a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The grid needs a metadata row, a label row and at least one data row.
    #[error("Grid has {found} rows; at least 3 are required (metadata, labels, data)")]
    TooFewRows { found: usize },

    /// Every column was empty once formatting noise was removed.
    #[error("Grid has no usable columns after dropping empty columns")]
    NoColumns,
}

/// All errors produced by the dashboard crates.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The sheet could not be shaped into a table.
    #[error("Cannot build a table from this file: {0}")]
    Schema(#[from] SchemaError),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook does not contain the requested sheet.
    #[error("Sheet \"{sheet}\" not found in {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    /// The spreadsheet container itself could not be decoded.
    #[error("Failed to decode workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// A CSV record could not be decoded.
    #[error("Failed to decode CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// The file extension is not one of the supported spreadsheet formats.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(PathBuf),

    /// A selected column does not exist in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
