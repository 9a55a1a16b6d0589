use chrono::Utc;
use contracts::domain::a002_article::{Article, CreateArticleDto, UpdateArticleDto};
use sea_orm::{DatabaseConnection, Set};

use super::repository::{self, encode_documents};
use crate::shared::error::{PortalError, PortalResult};
use crate::shared::html::sanitize_html;

/// Announcements shown on the parent dashboard
#[derive(Clone)]
pub struct ArticleService {
    db: DatabaseConnection,
}

impl ArticleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, limit: Option<u64>) -> PortalResult<Vec<Article>> {
        Ok(repository::list(&self.db, limit).await?)
    }

    pub async fn create(&self, dto: CreateArticleDto) -> PortalResult<Article> {
        dto.validate().map_err(PortalError::Validation)?;

        let article = repository::insert(
            &self.db,
            dto.title.trim().to_string(),
            sanitize_html(&dto.content),
            dto.author.trim().to_string(),
            encode_documents(&dto.documents.unwrap_or_default()),
        )
        .await?;

        tracing::info!("Article {} '{}' published", article.id, article.title);
        Ok(article)
    }

    /// Merge the provided fields; omitted ones stay unchanged
    pub async fn update(&self, dto: UpdateArticleDto) -> PortalResult<Article> {
        dto.validate().map_err(PortalError::Validation)?;

        let model = repository::get_by_id(&self.db, dto.id)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("article {}", dto.id)))?;

        let mut active: repository::ActiveModel = model.into();
        if let Some(title) = dto.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(content) = dto.content {
            active.content = Set(sanitize_html(&content));
        }
        if let Some(author) = dto.author {
            active.author = Set(author.trim().to_string());
        }
        if let Some(documents) = dto.documents {
            active.documents = Set(encode_documents(&documents));
        }
        active.updated_at = Set(Utc::now());

        Ok(repository::update(&self.db, active).await?)
    }

    pub async fn delete(&self, id: i32) -> PortalResult<()> {
        if !repository::delete(&self.db, id).await? {
            return Err(PortalError::NotFound(format!("article {}", id)));
        }
        tracing::info!("Article {} deleted", id);
        Ok(())
    }
}
