//! Database schema, migrations and settings

pub mod init;
pub mod migrations;
pub mod settings;

pub use init::*;
pub use migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};
pub use settings::*;
