//! Alerts and their recipients

use fati_common::models::{AlertSeverity, AlertType};
use fati_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Alert {
    pub guid: Uuid,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    /// Sector label of the linked indicator, empty without one
    pub sector: String,
    pub indicator_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
}

/// Insert an alert and link it to `recipients` in one transaction
pub async fn save_alert(pool: &SqlitePool, alert: &Alert, recipients: &[Uuid]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO alerts (
            guid, alert_type, severity, title, message, sector,
            indicator_id, region_id, value, threshold, is_read
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(alert.guid.to_string())
    .bind(alert.alert_type.as_str())
    .bind(alert.severity.as_str())
    .bind(&alert.title)
    .bind(&alert.message)
    .bind(&alert.sector)
    .bind(alert.indicator_id.map(|id| id.to_string()))
    .bind(alert.region_id.map(|id| id.to_string()))
    .bind(alert.value)
    .bind(alert.threshold)
    .execute(&mut *tx)
    .await?;

    for user_id in recipients {
        sqlx::query("INSERT OR IGNORE INTO alert_recipients (alert_id, user_id) VALUES (?, ?)")
            .bind(alert.guid.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn count_alerts(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts").fetch_one(pool).await?;
    Ok(count)
}

pub async fn count_recipients(pool: &SqlitePool, alert_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alert_recipients WHERE alert_id = ?")
        .bind(alert_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
