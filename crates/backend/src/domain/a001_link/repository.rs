use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_link::{
    CategoryPath, CategoryRoots, CreateLinkDto, DisplayType, Link, UpdateLinkDto,
};
use contracts::domain::common::Document;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::NotSet, DatabaseBackend, QueryOrder, Set, Statement, TransactionTrait,
};

use crate::shared::error::{PortalError, PortalResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub url: String,
    pub sort_order: i32,
    pub display_type: String,
    pub icon_url: Option<String>,
    pub category: String,
    pub category_root: String,
    pub category_sub: Option<String>,
    /// JSON array of `{name, url}`
    pub documents: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Link {
    fn from(m: Model) -> Self {
        let documents: Vec<Document> = serde_json::from_str(&m.documents).unwrap_or_else(|e| {
            tracing::warn!("Link {} has unreadable documents: {}", m.id, e);
            Vec::new()
        });

        Link {
            id: m.id,
            title: m.title,
            description: m.description,
            url: m.url,
            order: m.sort_order,
            display_type: DisplayType::from_code(&m.display_type).unwrap_or_default(),
            icon_url: m.icon_url,
            category: m.category,
            category_path: CategoryPath {
                root: m.category_root,
                sub: m.category_sub,
            },
            documents,
            created_at: m.created_at,
        }
    }
}

fn encode_documents(documents: &[Document]) -> PortalResult<String> {
    serde_json::to_string(documents)
        .map_err(|e| PortalError::Internal(anyhow::anyhow!("Failed to encode documents: {}", e)))
}

/// Persisted total order of portal links.
///
/// Order values always form `0..n-1`; every mutation that touches order
/// runs in a single transaction.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Validate and append at the end of the order
    async fn create(&self, dto: CreateLinkDto) -> PortalResult<Link>;

    /// All links ascending by order
    async fn list(&self) -> PortalResult<Vec<Link>>;

    async fn get(&self, id: i32) -> PortalResult<Link>;

    /// Merge the provided fields into an existing link
    async fn update(&self, dto: UpdateLinkDto) -> PortalResult<Link>;

    /// Remove a link and close the gap it leaves in the order
    async fn delete(&self, id: i32) -> PortalResult<()>;

    /// Assign `order = index` from a full permutation of the existing ids
    async fn reorder(&self, ids: &[i32]) -> PortalResult<()>;
}

/// `a001_links` table
#[derive(Clone)]
pub struct SqlLinkStore {
    db: DatabaseConnection,
    categories: Arc<CategoryRoots>,
}

impl SqlLinkStore {
    pub fn new(db: DatabaseConnection, categories: Arc<CategoryRoots>) -> Self {
        Self { db, categories }
    }

    fn not_found(id: i32) -> PortalError {
        PortalError::NotFound(format!("link {}", id))
    }
}

#[async_trait]
impl LinkStore for SqlLinkStore {
    async fn create(&self, dto: CreateLinkDto) -> PortalResult<Link> {
        dto.validate().map_err(PortalError::Validation)?;

        let category = self.categories.normalize_label(dto.category.as_deref());
        let path = self.categories.classify(&category);
        let documents = encode_documents(&dto.documents.unwrap_or_default())?;

        let txn = self.db.begin().await?;

        let next_order = match txn
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT MAX(sort_order) AS max_order FROM a001_links".to_string(),
            ))
            .await?
        {
            Some(row) => row
                .try_get::<Option<i32>>("", "max_order")?
                .map_or(0, |max| max + 1),
            None => 0,
        };

        let active = ActiveModel {
            id: NotSet,
            title: Set(dto.title.trim().to_string()),
            description: Set(dto.description.trim().to_string()),
            url: Set(dto.url.trim().to_string()),
            sort_order: Set(next_order),
            display_type: Set(dto.display_type.unwrap_or_default().code().to_string()),
            icon_url: Set(dto.icon_url.filter(|u| !u.trim().is_empty())),
            category: Set(category),
            category_root: Set(path.root),
            category_sub: Set(path.sub),
            documents: Set(documents),
            created_at: Set(Utc::now()),
        };
        let model = active.insert(&txn).await?;

        txn.commit().await?;

        Ok(model.into())
    }

    async fn list(&self) -> PortalResult<Vec<Link>> {
        let items = Entity::find()
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(items)
    }

    async fn get(&self, id: i32) -> PortalResult<Link> {
        Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, dto: UpdateLinkDto) -> PortalResult<Link> {
        dto.validate().map_err(PortalError::Validation)?;

        let txn = self.db.begin().await?;

        let model = Entity::find_by_id(dto.id)
            .one(&txn)
            .await?
            .ok_or_else(|| Self::not_found(dto.id))?;

        if dto.is_empty() {
            return Ok(model.into());
        }

        let mut active: ActiveModel = model.into();

        if let Some(title) = dto.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = dto.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(url) = dto.url {
            active.url = Set(url.trim().to_string());
        }
        if let Some(display_type) = dto.display_type {
            active.display_type = Set(display_type.code().to_string());
        }
        if let Some(icon_url) = dto.icon_url {
            active.icon_url = Set(icon_url.filter(|u| !u.trim().is_empty()));
        }
        if let Some(category) = dto.category {
            let category = self.categories.normalize_label(Some(&category));
            let path = self.categories.classify(&category);
            active.category = Set(category);
            active.category_root = Set(path.root);
            active.category_sub = Set(path.sub);
        }
        if let Some(documents) = dto.documents {
            active.documents = Set(encode_documents(&documents)?);
        }

        let id = dto.id;
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| updated_row_error(e, id))?;

        txn.commit().await?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> PortalResult<()> {
        let txn = self.db.begin().await?;

        let model = Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        Entity::delete_by_id(id).exec(&txn).await?;

        // Close the gap: every link after the removed one moves up by one
        Entity::update_many()
            .col_expr(Column::SortOrder, Expr::col(Column::SortOrder).sub(1))
            .filter(Column::SortOrder.gt(model.sort_order))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn reorder(&self, ids: &[i32]) -> PortalResult<()> {
        let txn = self.db.begin().await?;

        let existing: Vec<i32> = Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        // Dropping the transaction on error rolls it back
        validate_permutation(&existing, ids)?;

        for (index, id) in ids.iter().enumerate() {
            Entity::update_many()
                .col_expr(Column::SortOrder, Expr::value(index as i32))
                .filter(Column::Id.eq(*id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

/// A row that vanished between read and write is reported as missing
fn updated_row_error(err: DbErr, id: i32) -> PortalError {
    match err {
        DbErr::RecordNotUpdated => SqlLinkStore::not_found(id),
        other => PortalError::Backend(other),
    }
}

/// `ids` must list every existing id exactly once.
pub fn validate_permutation(existing: &[i32], ids: &[i32]) -> PortalResult<()> {
    if ids.len() != existing.len() {
        return Err(PortalError::InvalidArgument(format!(
            "expected {} link ids, got {}",
            existing.len(),
            ids.len()
        )));
    }

    let known: HashSet<i32> = existing.iter().copied().collect();
    let mut seen: HashSet<i32> = HashSet::with_capacity(ids.len());
    for id in ids {
        if !known.contains(id) {
            return Err(PortalError::InvalidArgument(format!("unknown link id {}", id)));
        }
        if !seen.insert(*id) {
            return Err(PortalError::InvalidArgument(format!("duplicate link id {}", id)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    async fn store() -> SqlLinkStore {
        SqlLinkStore::new(test_connection().await, Arc::new(CategoryRoots::default()))
    }

    fn dto(title: &str, category: Option<&str>) -> CreateLinkDto {
        CreateLinkDto {
            title: title.into(),
            description: format!("{} description", title),
            url: format!("https://portal.example/{}", title),
            category: category.map(String::from),
            ..Default::default()
        }
    }

    async fn seed(store: &SqlLinkStore, n: usize) -> Vec<i32> {
        let mut ids = Vec::new();
        for i in 0..n {
            ids.push(store.create(dto(&format!("l{}", i), None)).await.unwrap().id);
        }
        ids
    }

    async fn order_of(store: &SqlLinkStore) -> Vec<(i32, i32)> {
        store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| (l.id, l.order))
            .collect()
    }

    fn assert_dense(links: &[(i32, i32)]) {
        let orders: Vec<i32> = links.iter().map(|(_, o)| *o).collect();
        assert_eq!(orders, (0..links.len() as i32).collect::<Vec<_>>());
    }

    #[test]
    fn test_validate_permutation() {
        let existing = [1, 2, 3];
        assert!(validate_permutation(&existing, &[3, 1, 2]).is_ok());
        assert!(validate_permutation(&[], &[]).is_ok());

        for bad in [&[1, 2][..], &[1, 2, 3, 4], &[1, 1, 2], &[1, 2, 9]] {
            assert!(
                matches!(
                    validate_permutation(&existing, bad),
                    Err(PortalError::InvalidArgument(_))
                ),
                "{:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_creates_are_appended_in_order() {
        let store = store().await;
        let ids = seed(&store, 4).await;

        let listed = order_of(&store).await;
        assert_dense(&listed);
        assert_eq!(listed.iter().map(|(id, _)| *id).collect::<Vec<_>>(), ids);
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let store = store().await;
        let link = store.create(dto("menu", None)).await.unwrap();

        assert_eq!(link.order, 0);
        assert_eq!(link.display_type, DisplayType::Card);
        assert_eq!(link.category, "common");
        assert_eq!(link.category_path, CategoryPath::root("common"));
        assert!(link.documents.is_empty());
        assert!(link.icon_url.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let store = store().await;
        let mut bad = dto("x", None);
        bad.url = "   ".into();
        assert!(matches!(
            store.create(bad).await,
            Err(PortalError::Validation(ref m)) if m == "url cannot be empty"
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_stores_category_path_and_documents() {
        let store = store().await;
        let mut input = dto("trip", Some("grade-2-B"));
        input.display_type = Some(DisplayType::Icon);
        input.icon_url = Some("https://files/icon.png".into());
        input.documents = Some(vec![Document::new("Plan", "https://files/plan.pdf")]);

        let created = store.create(input).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.category_path.root, "grade-2");
        assert_eq!(fetched.category_path.sub.as_deref(), Some("grade-2-B"));
        assert_eq!(fetched.documents[0].name, "Plan");
        assert_eq!(fetched.display_type, DisplayType::Icon);
    }

    #[tokio::test]
    async fn test_reorder_then_list() {
        let store = store().await;
        let ids = seed(&store, 4).await;
        let permutation = vec![ids[2], ids[0], ids[3], ids[1]];

        store.reorder(&permutation).await.unwrap();

        let listed = order_of(&store).await;
        assert_dense(&listed);
        assert_eq!(
            listed.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            permutation
        );
    }

    #[tokio::test]
    async fn test_bad_permutation_leaves_order_untouched() {
        let store = store().await;
        let ids = seed(&store, 3).await;
        let before = order_of(&store).await;

        for bad in [
            vec![ids[0], ids[1]],
            vec![ids[0], ids[0], ids[1]],
            vec![ids[2], ids[1], 999],
            vec![ids[2], ids[1], ids[0], 999],
        ] {
            let result = store.reorder(&bad).await;
            assert!(matches!(result, Err(PortalError::InvalidArgument(_))));
            assert_eq!(order_of(&store).await, before);
        }
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = store().await;
        let mut input = dto("bus", Some("grade-1"));
        input.icon_url = Some("https://files/bus.png".into());
        let original = store.create(input).await.unwrap();

        let updated = store
            .update(UpdateLinkDto {
                id: original.id,
                title: Some("School bus".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.title, "School bus");
        assert_eq!(
            Link {
                title: original.title.clone(),
                ..updated.clone()
            },
            original
        );
    }

    #[tokio::test]
    async fn test_update_clears_icon_and_recomputes_path() {
        let store = store().await;
        let mut input = dto("bus", Some("grade-1"));
        input.icon_url = Some("https://files/bus.png".into());
        let original = store.create(input).await.unwrap();

        let updated = store
            .update(UpdateLinkDto {
                id: original.id,
                icon_url: Some(None),
                category: Some("grade-3-A".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(updated.icon_url.is_none());
        assert_eq!(updated.category, "grade-3-A");
        assert_eq!(updated.category_path.root, "grade-3");
        assert_eq!(updated.order, original.order);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let store = store().await;
        let link = store.create(dto("a", None)).await.unwrap();

        let missing = store
            .update(UpdateLinkDto {
                id: 404,
                title: Some("x".into()),
                ..Default::default()
            })
            .await;
        assert!(matches!(missing, Err(PortalError::NotFound(_))));

        let blank = store
            .update(UpdateLinkDto {
                id: link.id,
                description: Some("".into()),
                ..Default::default()
            })
            .await;
        assert!(matches!(blank, Err(PortalError::Validation(_))));

        let noop = store
            .update(UpdateLinkDto {
                id: link.id,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(noop, link);
    }

    #[test]
    fn test_vanished_row_on_update_is_not_found() {
        assert!(matches!(
            updated_row_error(DbErr::RecordNotUpdated, 4),
            PortalError::NotFound(ref what) if what == "link 4"
        ));
        assert!(matches!(
            updated_row_error(DbErr::Custom("disk".into()), 4),
            PortalError::Backend(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_compacts_order() {
        let store = store().await;
        let ids = seed(&store, 5).await;

        store.delete(ids[1]).await.unwrap();
        store.delete(ids[4]).await.unwrap();

        let listed = order_of(&store).await;
        assert_dense(&listed);
        assert_eq!(
            listed.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![ids[0], ids[2], ids[3]]
        );

        let appended = store.create(dto("new", None)).await.unwrap();
        assert_eq!(appended.order, 3);

        assert!(matches!(store.delete(ids[1]).await, Err(PortalError::NotFound(_))));
        assert!(matches!(store.get(ids[1]).await, Err(PortalError::NotFound(_))));
    }
}
