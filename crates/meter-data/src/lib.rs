//! Data layer for the consumption dashboard.
//!
//! Decodes spreadsheet reports, recovers a typed table from their loosely
//! structured layout, and computes the date-filtered statistics the
//! dashboard displays.

pub mod aggregator;
pub mod analysis;
pub mod normalizer;
pub mod reader;

pub use meter_core as core;
