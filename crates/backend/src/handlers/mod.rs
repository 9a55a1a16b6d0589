pub mod a001_link;
pub mod a002_article;
pub mod a003_subscriber;
pub mod a004_notification;

use serde::Deserialize;

use crate::shared::error::{PortalError, PortalResult};

/// `?id=` of the admin DELETE endpoints
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

impl IdQuery {
    pub fn require(&self) -> PortalResult<i32> {
        self.id
            .ok_or_else(|| PortalError::Validation("id is required".into()))
    }
}

/// `?limit=` of the list endpoints
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}
