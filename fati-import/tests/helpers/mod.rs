//! Test helper utilities
//!
//! Shared fixtures and database helpers for the fati-import suites

#![allow(dead_code)]

pub mod db_utils;
pub mod fixtures;

pub use db_utils::{create_test_db, stored_values, StoredValue};
pub use fixtures::{write_education_json, write_geography, write_health_json, write_text};
