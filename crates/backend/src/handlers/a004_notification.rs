use axum::extract::State;
use axum::Json;
use contracts::domain::a004_notification::{
    EmailHistoryEntry, SendNotificationDto, SendNotificationResponse,
};

use crate::shared::error::PortalResult;
use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;

/// POST /api/admin/email/send
pub async fn send(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<SendNotificationDto>,
) -> PortalResult<Json<SendNotificationResponse>> {
    Ok(Json(state.notifications().send(&claims.username, dto).await?))
}

/// GET /api/admin/email/history
pub async fn history(State(state): State<AppState>) -> PortalResult<Json<Vec<EmailHistoryEntry>>> {
    Ok(Json(state.notifications().history().await?))
}
