use crate::shared::config::AuthConfig;
use crate::shared::error::PortalResult;
use crate::system::users::UserDirectory;

/// Ensure an administrator exists (create one from config if not)
pub async fn ensure_admin_user_exists(users: &UserDirectory, auth: &AuthConfig) -> PortalResult<()> {
    if users.admin_exists().await? {
        return Ok(());
    }

    tracing::info!("No administrator found. Creating default admin user...");

    let admin = users
        .create_admin(&auth.admin_username, &auth.admin_password, "Administrator")
        .await?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default admin user created!");
    tracing::warn!("  Username: {}", admin.username);
    tracing::warn!("  User ID: {}", admin.id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_admin_created_once() {
        let users = UserDirectory::new(test_connection().await);
        let auth = AuthConfig::default();

        ensure_admin_user_exists(&users, &auth).await.unwrap();
        ensure_admin_user_exists(&users, &auth).await.unwrap();

        let all = users.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].username, "admin");
        assert!(all[0].is_admin);
        assert!(users.verify_credentials("admin", "admin").await.unwrap().is_some());
    }
}
