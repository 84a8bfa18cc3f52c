//! fati-import library interface
//!
//! Loads the FATI territorial database from spreadsheet-derived JSON
//! exports and administrative boundary CSVs, then tops it up with
//! generated data. Exposed as a library for integration testing.

pub mod classify;
pub mod codes;
pub mod config;
pub mod db;
pub mod error;
pub mod geo_lookup;
pub mod parsing;
pub mod services;
pub mod workflow;

pub use crate::error::{ImportError, ImportResult};
