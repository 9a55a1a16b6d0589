use axum::extract::{Query, State};
use axum::Json;
use contracts::system::auth::LoginHistoryResponse;
use contracts::system::users::{CreateUserDto, ResetUsersResponse, UserListResponse};
use serde_json::{json, Value};

use super::auth::HistoryQuery;
use crate::handlers::IdQuery;
use crate::shared::error::PortalResult;
use crate::shared::state::AppState;
use crate::system::login_history::repository as login_history;

const ALL_HISTORY_LIMIT: u64 = 100;

/// GET /api/admin/users
pub async fn list(State(state): State<AppState>) -> PortalResult<Json<UserListResponse>> {
    let users = state.users().list().await?;
    Ok(Json(UserListResponse { users }))
}

/// POST /api/admin/users
pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserDto>,
) -> PortalResult<Json<Value>> {
    let user = state.users().create(dto).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// DELETE /api/admin/users?id=
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> PortalResult<Json<Value>> {
    state.users().delete(query.require()?).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/admin/users/reset
pub async fn reset(State(state): State<AppState>) -> PortalResult<Json<ResetUsersResponse>> {
    let deleted = state.users().reset().await?;
    Ok(Json(ResetUsersResponse {
        success: true,
        deleted,
        message: format!("{} accounts removed", deleted),
    }))
}

/// GET /api/admin/login-history?limit=
pub async fn login_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> PortalResult<Json<LoginHistoryResponse>> {
    let history =
        login_history::list_all(&state.db, query.limit.unwrap_or(ALL_HISTORY_LIMIT)).await?;
    Ok(Json(LoginHistoryResponse { history }))
}
