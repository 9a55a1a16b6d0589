use axum::extract::{Multipart, Query, State};
use axum::Json;
use contracts::domain::a001_link::{
    CreateLinkDto, LinkGroupsResponse, LinkListResponse, ReorderLinksDto, UpdateLinkDto,
};
use contracts::system::users::BulkImportResponse;
use serde_json::{json, Value};

use super::IdQuery;
use crate::shared::error::{PortalError, PortalResult};
use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;

/// Multipart field carrying the import file
const CSV_FIELD: &str = "csv";

/// GET /api/links, GET /api/admin/links
pub async fn list(State(state): State<AppState>) -> PortalResult<Json<LinkListResponse>> {
    let links = state.links().list().await?;
    Ok(Json(LinkListResponse { links }))
}

/// GET /api/links/grouped
pub async fn grouped(State(state): State<AppState>) -> PortalResult<Json<LinkGroupsResponse>> {
    let groups = state.links().grouped().await?;
    Ok(Json(LinkGroupsResponse { groups }))
}

/// POST /api/admin/links
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateLinkDto>,
) -> PortalResult<Json<Value>> {
    let link = state.links().create_link(&claims, dto).await?;
    Ok(Json(json!({ "success": true, "link": link })))
}

/// PUT /api/admin/links
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<UpdateLinkDto>,
) -> PortalResult<Json<Value>> {
    let link = state.links().update_link(&claims, dto).await?;
    Ok(Json(json!({ "success": true, "link": link })))
}

/// DELETE /api/admin/links?id=
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Query(query): Query<IdQuery>,
) -> PortalResult<Json<Value>> {
    state.links().delete_link(&claims, query.require()?).await?;
    Ok(Json(json!({ "success": true })))
}

/// PUT /api/admin/links/reorder
pub async fn reorder(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<ReorderLinksDto>,
) -> PortalResult<Json<Value>> {
    state.links().reorder_links(&claims, &dto.link_ids).await?;
    Ok(Json(json!({ "message": "order updated" })))
}

/// POST /api/admin/users/bulk-import (multipart, field `csv`)
pub async fn bulk_import_users(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    mut multipart: Multipart,
) -> PortalResult<Json<BulkImportResponse>> {
    let mut csv_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PortalError::Validation(format!("malformed upload: {}", e)))?
    {
        if field.name() == Some(CSV_FIELD) {
            let text = field
                .text()
                .await
                .map_err(|e| PortalError::Validation(format!("unreadable CSV file: {}", e)))?;
            csv_text = Some(text);
        }
    }

    let csv_text = csv_text.ok_or_else(|| PortalError::Validation("CSV file is required".into()))?;

    let results = state.links().bulk_import_users(&claims, &csv_text).await?;
    let message = results.summary();
    Ok(Json(BulkImportResponse { results, message }))
}
