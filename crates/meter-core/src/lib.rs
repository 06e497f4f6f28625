//! Shared types for the equipment consumption dashboard.
//!
//! Holds the cell / grid / table model, error types, cell coercion rules,
//! date parsing, display formatting and command-line settings used by the
//! data and binary crates.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result, SchemaError};
