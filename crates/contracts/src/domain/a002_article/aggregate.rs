use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::document::validate_documents;
use crate::domain::common::Document;

/// Announcement shown on the parent dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub documents: Vec<Document>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    pub documents: Option<Vec<Document>>,
}

impl CreateArticleDto {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".into());
        }
        if self.content.trim().is_empty() {
            return Err("content cannot be empty".into());
        }
        if self.author.trim().is_empty() {
            return Err("author cannot be empty".into());
        }
        if let Some(ref docs) = self.documents {
            validate_documents(docs)?;
        }
        Ok(())
    }
}

/// Partial update of an article; omitted fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleDto {
    pub id: i32,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub documents: Option<Vec<Document>>,
}

impl UpdateArticleDto {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("author", &self.author),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(format!("{} cannot be empty", field));
            }
        }
        if let Some(ref docs) = self.documents {
            validate_documents(docs)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
}
