//! End-to-end workflows driven by the CLI

pub mod populate;

pub use populate::run_populate;
