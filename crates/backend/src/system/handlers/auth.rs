use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    Json,
};
use contracts::system::auth::{
    AuthCheckResponse, LoginHistoryResponse, LoginRequest, LoginResponse, UserInfo,
};
use contracts::system::users::User;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::shared::error::{PortalError, PortalResult};
use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;
use crate::system::auth::middleware::AUTH_COOKIE;
use crate::system::login_history::repository::{self as login_history, LoginContext};

const OWN_HISTORY_LIMIT: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

fn user_info(user: User) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        is_admin: user.is_admin,
    }
}

/// Client address as reported by the reverse proxy
fn client_context(headers: &HeaderMap) -> LoginContext {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| header_str("x-real-ip").map(String::from));

    LoginContext {
        ip_address,
        user_agent: header_str(header::USER_AGENT.as_str()).map(String::from),
    }
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        AUTH_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> PortalResult<([(header::HeaderName, String); 1], Json<LoginResponse>)> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(PortalError::Validation(
            "username and password are required".into(),
        ));
    }

    let user = state
        .users()
        .verify_credentials(request.username.trim(), &request.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Failed login attempt for '{}'", request.username.trim());
            PortalError::Unauthenticated
        })?;

    let context = client_context(&headers);
    if let Err(e) = login_history::record(&state.db, user.id, &user.username, &context).await {
        tracing::error!("Failed to record login of '{}': {}", user.username, e);
    }

    let token = state.jwt.issue(user.id, &user.username, user.is_admin)?;
    let cookie = session_cookie(
        &token,
        state.jwt.lifetime_seconds(),
        state.config.auth.secure_cookie,
    );

    tracing::info!("User '{}' logged in from {:?}", user.username, context.ip_address);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            token,
            user: user_info(user),
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> ([(header::HeaderName, String); 1], Json<Value>) {
    let cookie = session_cookie("", 0, state.config.auth.secure_cookie);
    ([(header::SET_COOKIE, cookie)], Json(json!({ "success": true })))
}

/// GET /api/auth/check
pub async fn check(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> PortalResult<Json<AuthCheckResponse>> {
    let id = claims.user_id().ok_or(PortalError::Unauthenticated)?;
    let user = state
        .users()
        .get(id)
        .await?
        .ok_or(PortalError::Unauthenticated)?;

    Ok(Json(AuthCheckResponse {
        authenticated: true,
        user: Some(user_info(user)),
    }))
}

/// GET /api/login-history?limit=
pub async fn own_login_history(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> PortalResult<Json<LoginHistoryResponse>> {
    let id = claims.user_id().ok_or(PortalError::Unauthenticated)?;
    let history = login_history::list_for_user(
        &state.db,
        id,
        query.limit.unwrap_or(OWN_HISTORY_LIMIT),
    )
    .await?;
    Ok(Json(LoginHistoryResponse { history }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_context_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let context = client_context(&headers);
        assert_eq!(context.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(context.user_agent.as_deref(), Some("curl/8.0"));

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(
            client_context(&headers).ip_address.as_deref(),
            Some("198.51.100.2")
        );
        assert_eq!(client_context(&HeaderMap::new()).ip_address, None);
    }

    #[test]
    fn test_session_cookie() {
        assert_eq!(
            session_cookie("tok", 86400, false),
            "auth-token=tok; HttpOnly; SameSite=Strict; Path=/; Max-Age=86400"
        );
        assert!(session_cookie("", 0, true).ends_with("Max-Age=0; Secure"));
    }
}
