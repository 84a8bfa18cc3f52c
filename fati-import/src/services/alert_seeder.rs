//! Top-up of demo alerts

use super::facility_seeder::missing_count;
use super::synthetic::round2;
use crate::db::alerts::{count_alerts, save_alert, Alert};
use crate::db::geography::list_regions;
use crate::db::indicators::list_indicators;
use crate::db::users::active_user_ids;
use fati_common::models::{AlertSeverity, AlertType};
use fati_common::{uuid_utils, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::{Pool, Sqlite};

pub struct AlertSeeder {
    db: Pool<Sqlite>,
}

impl AlertSeeder {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Create alerts until `min_alerts` exist; returns how many were added
    ///
    /// Every new alert goes to all active users.
    pub async fn ensure(&self, min_alerts: u32, rng: &mut StdRng) -> Result<usize> {
        let missing = missing_count(min_alerts, count_alerts(&self.db).await?);
        if missing == 0 {
            return Ok(0);
        }

        let recipients = active_user_ids(&self.db).await?;
        let indicators = list_indicators(&self.db).await?;
        let regions = list_regions(&self.db).await?;

        for idx in 0..missing {
            let indicator = indicators.choose(rng);
            let region = regions.choose(rng);
            let value = round2(rng.gen_range(20.0..=95.0));
            let threshold = round2(value + rng.gen_range(-15.0..=15.0));

            let alert = Alert {
                guid: uuid_utils::generate(),
                alert_type: AlertType::ALL.choose(rng).copied().unwrap_or(AlertType::Threshold),
                severity: AlertSeverity::ALL.choose(rng).copied().unwrap_or(AlertSeverity::Info),
                title: format!("Alerte automatique {}", idx + 1),
                message: match indicator {
                    Some(i) => format!("Verification sur indicateur {}", i.name),
                    None => "Verification sur donnees territoriales".to_string(),
                },
                sector: indicator.map(|i| i.sector.as_str().to_string()).unwrap_or_default(),
                indicator_id: indicator.map(|i| i.guid),
                region_id: region.map(|r| r.guid),
                value: Some(value),
                threshold: Some(threshold),
            };
            save_alert(&self.db, &alert, &recipients).await?;
        }

        tracing::info!(created = missing, recipients = recipients.len(), "Alerts generated");
        Ok(missing)
    }
}
