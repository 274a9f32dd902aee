//! First-start admin provisioning

use anyhow::{Context, Result};
use petboard_auth::PasswordHasher;
use petboard_db::{Database, NewUser, UserRole};
use tracing::{debug, info};

use crate::config::BootstrapAdmin;

/// Create the configured admin unless an admin already exists
///
/// Returns whether a user was created.
pub async fn ensure_admin(
    db: &Database,
    hasher: &PasswordHasher,
    admin: Option<&BootstrapAdmin>,
) -> Result<bool> {
    let Some(admin) = admin else {
        debug!("No bootstrap admin configured");
        return Ok(false);
    };

    if db.has_admin().await? {
        debug!("Admin already present, skipping bootstrap");
        return Ok(false);
    }

    info!("Creating bootstrap admin user");
    let password_hash = hasher
        .hash(&admin.password)
        .await
        .context("Failed to hash bootstrap admin password")?;

    let user = db
        .insert_user(NewUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            role: UserRole::Admin,
        })
        .await
        .with_context(|| format!("Failed to create bootstrap admin {}", admin.email))?;

    info!("Bootstrap admin created (id: {}, email: {})", user.id, user.email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petboard_auth::HashingConfig;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: "changeme".to_string(),
        }
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let db = Database::in_memory().await.unwrap();
        let hasher = cheap_hasher();

        assert!(ensure_admin(&db, &hasher, Some(&admin())).await.unwrap());
        assert!(!ensure_admin(&db, &hasher, Some(&admin())).await.unwrap());

        let user = db.get_user_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(hasher.verify("changeme", &user.password_hash).await);
    }

    #[tokio::test]
    async fn test_nothing_configured() {
        let db = Database::in_memory().await.unwrap();

        assert!(!ensure_admin(&db, &cheap_hasher(), None).await.unwrap());
        assert!(!db.has_admin().await.unwrap());
    }
}
