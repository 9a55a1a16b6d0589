use async_trait::async_trait;
use contracts::system::users::{CreateUserDto, User};
use sea_orm::DatabaseConnection;

use super::bulk_import::UserCreator;
use super::repository;
use crate::shared::error::{PortalError, PortalResult};
use crate::system::auth::password;

/// Portal accounts stored in `sys_users`
#[derive(Clone)]
pub struct UserDirectory {
    db: DatabaseConnection,
}

impl UserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a regular (non-admin) account
    pub async fn create(&self, dto: CreateUserDto) -> PortalResult<User> {
        dto.validate().map_err(PortalError::Validation)?;
        self.insert(dto.username.trim(), &dto.password, dto.full_name.trim(), false)
            .await
    }

    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> PortalResult<User> {
        self.insert(username, password, full_name, true).await
    }

    async fn insert(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        is_admin: bool,
    ) -> PortalResult<User> {
        if repository::get_by_username(&self.db, username).await?.is_some() {
            return Err(PortalError::DuplicateIdentifier(username.to_string()));
        }

        let password_hash = password::hash_password(password)?;

        let user = repository::insert(&self.db, username, &password_hash, full_name, is_admin)
            .await
            .map_err(|e| PortalError::from_insert(e, username))?;

        tracing::info!("Created user '{}' (id {})", user.username, user.id);
        Ok(user)
    }

    pub async fn get(&self, id: i32) -> PortalResult<Option<User>> {
        Ok(repository::get_by_id(&self.db, id).await?)
    }

    pub async fn list(&self) -> PortalResult<Vec<User>> {
        Ok(repository::list_all(&self.db).await?)
    }

    /// Delete a parent account; administrators cannot be removed here
    pub async fn delete(&self, id: i32) -> PortalResult<()> {
        let user = repository::get_by_id(&self.db, id)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("user {}", id)))?;

        if user.is_admin {
            return Err(PortalError::Validation(
                "administrator accounts cannot be deleted".into(),
            ));
        }

        repository::delete(&self.db, id).await?;
        tracing::info!("Deleted user '{}' (id {})", user.username, id);
        Ok(())
    }

    /// Remove every non-admin account (school-year rollover)
    pub async fn reset(&self) -> PortalResult<u64> {
        let deleted = repository::delete_non_admins(&self.db).await?;
        tracing::warn!("User reset removed {} accounts", deleted);
        Ok(deleted)
    }

    pub async fn admin_exists(&self) -> PortalResult<bool> {
        Ok(repository::count_admins(&self.db).await? > 0)
    }

    /// Verify user credentials (for login)
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> PortalResult<Option<User>> {
        let user = match repository::get_by_username(&self.db, username).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        let password_hash = repository::get_password_hash(&self.db, user.id)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("password of user {}", user.id)))?;

        if !password::verify_password(password, &password_hash)? {
            return Ok(None);
        }

        Ok(Some(user))
    }
}

#[async_trait]
impl UserCreator for UserDirectory {
    async fn create_user(
        &self,
        identifier: &str,
        secret: &str,
        full_name: &str,
    ) -> PortalResult<()> {
        self.insert(identifier, secret, full_name, false).await?;
        Ok(())
    }
}
