use chrono::Utc;
use contracts::domain::a004_notification::EmailHistoryEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a004_email_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// JSON array of grade labels
    pub target_grades: String,
    pub recipient_count: i32,
    pub sent_by: String,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmailHistoryEntry {
    fn from(m: Model) -> Self {
        EmailHistoryEntry {
            id: m.id,
            target_grades: serde_json::from_str(&m.target_grades).unwrap_or_default(),
            recipient_count: m.recipient_count,
            sent_by: m.sent_by,
            sent_at: m.sent_at,
        }
    }
}

pub async fn insert(
    db: &DatabaseConnection,
    target_grades: &[String],
    recipient_count: usize,
    sent_by: &str,
) -> Result<EmailHistoryEntry, DbErr> {
    let active = ActiveModel {
        id: NotSet,
        target_grades: Set(serde_json::to_string(target_grades).unwrap_or_else(|_| "[]".into())),
        recipient_count: Set(recipient_count as i32),
        sent_by: Set(sent_by.to_string()),
        sent_at: Set(Utc::now()),
    };
    Ok(active.insert(db).await?.into())
}

/// Most recent sends first
pub async fn list_recent(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<EmailHistoryEntry>, DbErr> {
    let items = Entity::find()
        .order_by_desc(Column::SentAt)
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
