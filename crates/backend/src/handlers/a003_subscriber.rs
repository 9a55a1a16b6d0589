use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_subscriber::{SubscribeDto, Subscriber, UpdateSubscriberDto};
use serde_json::{json, Value};

use super::IdQuery;
use crate::shared::error::PortalResult;
use crate::shared::state::AppState;

/// POST /api/subscribers (public)
pub async fn subscribe(
    State(state): State<AppState>,
    Json(dto): Json<SubscribeDto>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    let subscriber = state.subscribers().subscribe(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": subscriber })),
    ))
}

/// GET /api/admin/subscribers
pub async fn list(State(state): State<AppState>) -> PortalResult<Json<Vec<Subscriber>>> {
    Ok(Json(state.subscribers().list().await?))
}

/// PUT /api/admin/subscribers
pub async fn update(
    State(state): State<AppState>,
    Json(dto): Json<UpdateSubscriberDto>,
) -> PortalResult<Json<Subscriber>> {
    Ok(Json(state.subscribers().update(dto).await?))
}

/// DELETE /api/admin/subscribers?id=
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> PortalResult<Json<Value>> {
    state.subscribers().delete(query.require()?).await?;
    Ok(Json(json!({ "success": true })))
}
