use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::shared::error::PortalError;
use crate::shared::state::AppState;

/// Cookie carrying the session token for browser clients
pub const AUTH_COOKIE: &str = "auth-token";

/// Middleware that requires a valid session token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, PortalError> {
    let token = extract_token(req.headers()).ok_or(PortalError::Unauthenticated)?;

    let claims = state
        .jwt
        .validate(&token)
        .map_err(|_| PortalError::Unauthenticated)?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires administrator privileges
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, PortalError> {
    let token = extract_token(req.headers()).ok_or(PortalError::Unauthenticated)?;

    let claims = state
        .jwt
        .validate(&token)
        .map_err(|_| PortalError::Unauthenticated)?;

    super::authorize_admin(&claims)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Bearer header first, then the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}
