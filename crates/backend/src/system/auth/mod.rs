pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

use contracts::system::auth::TokenClaims;

use crate::shared::error::{PortalError, PortalResult};

/// Admin-only operations check the explicit claim, never the username
pub fn authorize_admin(claims: &TokenClaims) -> PortalResult<()> {
    if claims.is_admin {
        Ok(())
    } else {
        tracing::warn!("User '{}' attempted an admin operation", claims.username);
        Err(PortalError::Forbidden)
    }
}
