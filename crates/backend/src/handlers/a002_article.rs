use axum::extract::{Query, State};
use axum::Json;
use contracts::domain::a002_article::{ArticleListResponse, CreateArticleDto, UpdateArticleDto};
use serde_json::{json, Value};

use super::{IdQuery, LimitQuery};
use crate::shared::error::PortalResult;
use crate::shared::state::AppState;

/// GET /api/articles?limit=, GET /api/admin/articles
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> PortalResult<Json<ArticleListResponse>> {
    let articles = state.articles().list(query.limit).await?;
    Ok(Json(ArticleListResponse { articles }))
}

/// POST /api/admin/articles
pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateArticleDto>,
) -> PortalResult<Json<Value>> {
    let article = state.articles().create(dto).await?;
    Ok(Json(json!({ "success": true, "article": article })))
}

/// PUT /api/admin/articles
pub async fn update(
    State(state): State<AppState>,
    Json(dto): Json<UpdateArticleDto>,
) -> PortalResult<Json<Value>> {
    let article = state.articles().update(dto).await?;
    Ok(Json(json!({ "success": true, "article": article })))
}

/// DELETE /api/admin/articles?id=
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> PortalResult<Json<Value>> {
    state.articles().delete(query.require()?).await?;
    Ok(Json(json!({ "success": true })))
}
