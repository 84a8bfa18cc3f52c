//! Demo accounts, one per main role

use super::statistics::UserSeedStats;
use crate::db::geography::list_regions;
use crate::db::users::{find_user_by_email, reactivate_user, save_user, User};
use fati_common::models::{UserRole, UserStatus};
use fati_common::{uuid_utils, Result};
use sqlx::{Pool, Sqlite};

/// Password given to every account created here
pub const DEFAULT_PASSWORD: &str = "test123";

struct AccountSeed {
    email: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: UserRole,
    superuser: bool,
}

const ACCOUNTS: &[AccountSeed] = &[
    AccountSeed {
        email: "admin@fati.local",
        first_name: "Admin",
        last_name: "FATI",
        role: UserRole::Admin,
        superuser: true,
    },
    AccountSeed {
        email: "institution@fati.local",
        first_name: "Decideur",
        last_name: "Institution",
        role: UserRole::Institution,
        superuser: false,
    },
    AccountSeed {
        email: "local@fati.local",
        first_name: "Agent",
        last_name: "Local",
        role: UserRole::LocalManager,
        superuser: false,
    },
    AccountSeed {
        email: "public@fati.local",
        first_name: "Profil",
        last_name: "Public",
        role: UserRole::Contributor,
        superuser: false,
    },
    AccountSeed {
        email: "viewer@fati.local",
        first_name: "Lecteur",
        last_name: "FATI",
        role: UserRole::Viewer,
        superuser: false,
    },
];

pub struct UserSeeder {
    db: Pool<Sqlite>,
}

impl UserSeeder {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Get-or-create each account by email
    ///
    /// New accounts are assigned to the first region in name order. Existing
    /// accounts keep their fields, except inactive ones are reactivated.
    pub async fn ensure(&self) -> Result<UserSeedStats> {
        let default_region = list_regions(&self.db).await?.into_iter().next().map(|r| r.guid);
        let mut stats = UserSeedStats::default();

        for account in ACCOUNTS {
            match find_user_by_email(&self.db, account.email).await? {
                Some(existing) if !existing.is_active => {
                    reactivate_user(&self.db, existing.guid).await?;
                    tracing::debug!(email = account.email, "Account reactivated");
                    stats.reactivated += 1;
                }
                Some(_) => {}
                None => {
                    let user = User {
                        guid: uuid_utils::generate(),
                        email: account.email.to_string(),
                        first_name: account.first_name.to_string(),
                        last_name: account.last_name.to_string(),
                        role: account.role,
                        status: UserStatus::Active,
                        region_id: default_region,
                        is_active: true,
                        is_staff: account.superuser,
                        is_superuser: account.superuser,
                    };
                    save_user(&self.db, &user, DEFAULT_PASSWORD).await?;
                    stats.created += 1;
                }
            }
        }

        if stats.created > 0 {
            tracing::info!(created = stats.created, "Users created (password: {})", DEFAULT_PASSWORD);
        }
        Ok(stats)
    }
}
