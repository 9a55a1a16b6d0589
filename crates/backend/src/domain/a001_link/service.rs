use std::sync::Arc;

use contracts::domain::a001_link::{
    group_links, CategoryGroup, CategoryRoots, CreateLinkDto, Link, UpdateLinkDto,
};
use contracts::system::auth::TokenClaims;
use contracts::system::users::BulkImportResult;

use super::repository::LinkStore;
use crate::shared::error::{PortalError, PortalResult};
use crate::system::auth::authorize_admin;
use crate::system::users::{import_users, UserCreator};

/// Link administration plus the bulk user import of the admin screen.
///
/// Reads are open to any session; every mutation requires `is_admin`.
pub struct LinkAdminService<S, U> {
    links: S,
    users: U,
    categories: Arc<CategoryRoots>,
}

impl<S, U> LinkAdminService<S, U>
where
    S: LinkStore,
    U: UserCreator,
{
    pub fn new(links: S, users: U, categories: Arc<CategoryRoots>) -> Self {
        Self {
            links,
            users,
            categories,
        }
    }

    pub async fn list(&self) -> PortalResult<Vec<Link>> {
        self.links.list().await
    }

    /// Links arranged in the two-level category hierarchy
    pub async fn grouped(&self) -> PortalResult<Vec<CategoryGroup>> {
        let links = self.links.list().await?;
        Ok(group_links(&links, &self.categories))
    }

    pub async fn create_link(&self, caller: &TokenClaims, dto: CreateLinkDto) -> PortalResult<Link> {
        authorize_admin(caller)?;
        let link = self.links.create(dto).await.map_err(log_rejected)?;
        tracing::info!(
            "Link {} '{}' created by {} at position {}",
            link.id,
            link.title,
            caller.username,
            link.order
        );
        Ok(link)
    }

    pub async fn update_link(&self, caller: &TokenClaims, dto: UpdateLinkDto) -> PortalResult<Link> {
        authorize_admin(caller)?;
        let link = self.links.update(dto).await.map_err(log_rejected)?;
        tracing::info!("Link {} updated by {}", link.id, caller.username);
        Ok(link)
    }

    pub async fn delete_link(&self, caller: &TokenClaims, id: i32) -> PortalResult<()> {
        authorize_admin(caller)?;
        self.links.delete(id).await.map_err(log_rejected)?;
        tracing::info!("Link {} deleted by {}", id, caller.username);
        Ok(())
    }

    pub async fn reorder_links(&self, caller: &TokenClaims, ids: &[i32]) -> PortalResult<()> {
        authorize_admin(caller)?;
        self.links.reorder(ids).await.map_err(log_rejected)?;
        tracing::info!("{} links reordered by {}", ids.len(), caller.username);
        Ok(())
    }

    /// Create accounts from an uploaded CSV; row failures end up in the ledger
    pub async fn bulk_import_users(
        &self,
        caller: &TokenClaims,
        csv_text: &str,
    ) -> PortalResult<BulkImportResult> {
        authorize_admin(caller)?;
        let ledger = import_users(&self.users, csv_text).await;
        tracing::info!(
            "Bulk import by {}: {}",
            caller.username,
            ledger.summary()
        );
        Ok(ledger)
    }
}

fn log_rejected(err: PortalError) -> PortalError {
    if !err.status().is_server_error() {
        tracing::warn!("Link operation rejected: {}", err);
    }
    err
}
