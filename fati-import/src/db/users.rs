//! User accounts

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use fati_common::models::{UserRole, UserStatus};
use fati_common::{uuid_utils, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub guid: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub region_id: Option<Uuid>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Argon2id PHC string of `password` under a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// False for a wrong password or a malformed stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(hash) => Argon2::default().verify_password(password.as_bytes(), &hash).is_ok(),
        Err(_) => false,
    }
}

/// Insert a user with a freshly hashed password
pub async fn save_user(pool: &SqlitePool, user: &User, password: &str) -> Result<()> {
    let password_hash = hash_password(password)?;
    sqlx::query(
        r#"
        INSERT INTO users (
            guid, email, first_name, last_name, role, status, password_hash,
            region_id, is_active, is_staff, is_superuser
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.guid.to_string())
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.role.as_str())
    .bind(user.status.as_str())
    .bind(&password_hash)
    .bind(user.region_id.map(|id| id.to_string()))
    .bind(user.is_active)
    .bind(user.is_staff)
    .bind(user.is_superuser)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, email, first_name, last_name, role, status, region_id,
               is_active, is_staff, is_superuser
        FROM users WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let guid: String = row.get("guid");
    let role: String = row.get("role");
    let status: String = row.get("status");
    Ok(Some(User {
        guid: uuid_utils::parse(&guid)?,
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role: role.parse()?,
        status: status.parse()?,
        region_id: uuid_utils::parse_opt(row.get("region_id"))?,
        is_active: row.get("is_active"),
        is_staff: row.get("is_staff"),
        is_superuser: row.get("is_superuser"),
    }))
}

/// Mark an account active again
pub async fn reactivate_user(pool: &SqlitePool, guid: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE users SET is_active = 1, status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(UserStatus::Active.as_str())
    .bind(guid.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Guids of every active account, in email order
pub async fn active_user_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    let guids: Vec<String> = sqlx::query_scalar("SELECT guid FROM users WHERE is_active = 1 ORDER BY email")
        .fetch_all(pool)
        .await?;

    guids.iter().map(|g| uuid_utils::parse(g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fati_common::db::init_memory_database;

    #[test]
    fn test_password_hash_is_salted() {
        let a = hash_password("test123").unwrap();
        let b = hash_password("test123").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify_password("test123", &a));
        assert!(!verify_password("wrong", &a));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("test123", "not-a-phc-string"));
        assert!(!verify_password("test123", ""));
    }

    #[tokio::test]
    async fn test_save_find_reactivate() {
        let pool = init_memory_database().await.unwrap();
        let user = User {
            guid: uuid_utils::generate(),
            email: "viewer@fati.local".to_string(),
            first_name: "Lecteur".to_string(),
            last_name: "FATI".to_string(),
            role: UserRole::Viewer,
            status: UserStatus::Inactive,
            region_id: None,
            is_active: false,
            is_staff: false,
            is_superuser: false,
        };
        save_user(&pool, &user, "test123").await.unwrap();
        let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE email = ?")
            .bind("viewer@fati.local")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(verify_password("test123", &stored));
        assert!(active_user_ids(&pool).await.unwrap().is_empty());

        reactivate_user(&pool, user.guid).await.unwrap();
        let found = find_user_by_email(&pool, "viewer@fati.local").await.unwrap().unwrap();
        assert!(found.is_active);
        assert_eq!(found.status, UserStatus::Active);
        assert_eq!(found.role, UserRole::Viewer);
        assert_eq!(active_user_ids(&pool).await.unwrap(), vec![user.guid]);
    }
}
