use chrono::Utc;
use contracts::domain::a002_article::Article;
use contracts::domain::common::Document;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a002_articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub documents: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Article {
    fn from(m: Model) -> Self {
        Article {
            id: m.id,
            title: m.title,
            content: m.content,
            author: m.author,
            documents: serde_json::from_str(&m.documents).unwrap_or_default(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Newest first
pub async fn list(db: &DatabaseConnection, limit: Option<u64>) -> Result<Vec<Article>, DbErr> {
    let mut query = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    let items = query
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(db).await
}

pub async fn insert(
    db: &DatabaseConnection,
    title: String,
    content: String,
    author: String,
    documents: String,
) -> Result<Article, DbErr> {
    let now = Utc::now();
    let active = ActiveModel {
        id: NotSet,
        title: Set(title),
        content: Set(content),
        author: Set(author),
        documents: Set(documents),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(active.insert(db).await?.into())
}

pub async fn update(db: &DatabaseConnection, active: ActiveModel) -> Result<Article, DbErr> {
    Ok(active.update(db).await?.into())
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

pub fn encode_documents(documents: &[Document]) -> String {
    serde_json::to_string(documents).unwrap_or_else(|_| "[]".to_string())
}
