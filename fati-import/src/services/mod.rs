//! Import, generation and seeding services
//!
//! Each service owns a clone of the database pool. Services that draw random
//! values take the run's RNG so a whole populate run replays from one seed.

pub mod alert_seeder;
pub mod education_import;
pub mod facility_seeder;
pub mod geography_sync;
pub mod health_import;
pub mod json_document;
pub mod region_seeder;
pub mod statistics;
pub mod synthetic;
pub mod user_seeder;

pub use alert_seeder::AlertSeeder;
pub use education_import::EducationImporter;
pub use facility_seeder::FacilitySeeder;
pub use geography_sync::GeographySync;
pub use health_import::HealthImporter;
pub use region_seeder::RegionSeeder;
pub use statistics::{
    FacilitySeedStats, GeographySyncStats, JsonImportStats, PopulateStatistics, RegionSeedStats, SyntheticStats,
    UserSeedStats,
};
pub use synthetic::SyntheticGenerator;
pub use user_seeder::UserSeeder;
