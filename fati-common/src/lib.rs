//! # FATI Common Library
//!
//! Shared code for the FATI territorial monitoring tools including:
//! - Database schema creation and migrations
//! - Domain enums (sectors, categories, roles, ...) and pure domain rules
//! - Bootstrap configuration loading
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
