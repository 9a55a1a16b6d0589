use std::sync::Arc;

use chrono::Utc;
use contracts::domain::a001_link::CategoryRoots;
use contracts::domain::a003_subscriber::{SubscribeDto, Subscriber, UpdateSubscriberDto};
use sea_orm::{DatabaseConnection, DbErr, Set, SqlErr};

use super::repository;
use crate::shared::error::{PortalError, PortalResult};

const DUPLICATE_EMAIL: &str = "this email address is already registered";

/// Normalized, validated subscription form
struct Subscription {
    student_name: String,
    email: String,
    grade: String,
}

/// Email notification list managed by parents (subscribe) and the admin
#[derive(Clone)]
pub struct SubscriberService {
    db: DatabaseConnection,
    categories: Arc<CategoryRoots>,
}

impl SubscriberService {
    pub fn new(db: DatabaseConnection, categories: Arc<CategoryRoots>) -> Self {
        Self { db, categories }
    }

    fn check(&self, dto: &SubscribeDto) -> PortalResult<Subscription> {
        dto.validate().map_err(PortalError::Validation)?;

        let grade = dto.grade.trim();
        if !self.categories.grades().any(|g| g == grade) {
            return Err(PortalError::Validation(format!("unknown grade: {}", grade)));
        }

        Ok(Subscription {
            student_name: dto.student_name.trim().to_string(),
            email: dto.email.trim().to_lowercase(),
            grade: grade.to_string(),
        })
    }

    /// Public registration form
    pub async fn subscribe(&self, dto: SubscribeDto) -> PortalResult<Subscriber> {
        let form = self.check(&dto)?;

        if repository::find_by_email(&self.db, &form.email).await?.is_some() {
            return Err(PortalError::Conflict(DUPLICATE_EMAIL.into()));
        }

        let subscriber = repository::insert(&self.db, form.student_name, form.email, form.grade)
            .await
            .map_err(map_duplicate)?;

        tracing::info!(
            "Subscriber {} registered for {}",
            subscriber.id,
            subscriber.grade
        );
        Ok(subscriber)
    }

    pub async fn list(&self) -> PortalResult<Vec<Subscriber>> {
        Ok(repository::list_all(&self.db).await?)
    }

    pub async fn update(&self, dto: UpdateSubscriberDto) -> PortalResult<Subscriber> {
        let form = self.check(&dto.as_form())?;

        let model = repository::get_by_id(&self.db, dto.id)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("subscriber {}", dto.id)))?;

        if let Some(other) = repository::find_by_email(&self.db, &form.email).await? {
            if other.id != model.id {
                return Err(PortalError::Conflict(DUPLICATE_EMAIL.into()));
            }
        }

        let mut active: repository::ActiveModel = model.into();
        active.student_name = Set(form.student_name);
        active.email = Set(form.email);
        active.grade = Set(form.grade);
        active.updated_at = Set(Utc::now());

        repository::update(&self.db, active)
            .await
            .map_err(map_duplicate)
    }

    pub async fn delete(&self, id: i32) -> PortalResult<()> {
        if !repository::delete(&self.db, id).await? {
            return Err(PortalError::NotFound(format!("subscriber {}", id)));
        }
        tracing::info!("Subscriber {} removed", id);
        Ok(())
    }

    /// Subscribers addressed by a send; `everyone` ignores `grades`
    pub async fn recipients(&self, grades: &[String], everyone: bool) -> PortalResult<Vec<Subscriber>> {
        if everyone {
            let mut all = repository::list_all(&self.db).await?;
            all.reverse();
            return Ok(all);
        }
        Ok(repository::list_by_grades(&self.db, grades).await?)
    }
}

fn map_duplicate(err: DbErr) -> PortalError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => PortalError::Conflict(DUPLICATE_EMAIL.into()),
        _ => PortalError::Backend(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    async fn service() -> SubscriberService {
        SubscriberService::new(test_connection().await, Arc::new(CategoryRoots::default()))
    }

    fn form(name: &str, email: &str, grade: &str) -> SubscribeDto {
        SubscribeDto {
            student_name: name.into(),
            email: email.into(),
            grade: grade.into(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_validates() {
        let svc = service().await;
        assert!(matches!(
            svc.subscribe(form("Taro", "taro@example", "grade-1")).await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.subscribe(form("Taro", "taro@example.org", "grade-9")).await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.subscribe(form("Taro", "taro@example.org", "common")).await,
            Err(PortalError::Validation(_))
        ));

        let ok = svc
            .subscribe(form(" Taro ", " Taro@Example.org ", "grade-1"))
            .await
            .unwrap();
        assert_eq!(ok.student_name, "Taro");
        assert_eq!(ok.email, "taro@example.org");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let svc = service().await;
        svc.subscribe(form("A", "a@example.org", "grade-1")).await.unwrap();
        let err = svc
            .subscribe(form("B", "A@example.org", "grade-2"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let svc = service().await;
        let a = svc.subscribe(form("A", "a@example.org", "grade-1")).await.unwrap();
        let b = svc.subscribe(form("B", "b@example.org", "grade-2")).await.unwrap();

        let moved = svc
            .update(UpdateSubscriberDto {
                id: a.id,
                student_name: "A".into(),
                email: "a@example.org".into(),
                grade: "grade-3".into(),
            })
            .await
            .unwrap();
        assert_eq!(moved.grade, "grade-3");

        let clash = svc
            .update(UpdateSubscriberDto {
                id: a.id,
                student_name: "A".into(),
                email: "b@example.org".into(),
                grade: "grade-3".into(),
            })
            .await;
        assert!(matches!(clash, Err(PortalError::Conflict(_))));

        svc.delete(b.id).await.unwrap();
        assert!(matches!(svc.delete(b.id).await, Err(PortalError::NotFound(_))));
        assert_eq!(svc.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recipients_filtered_by_grade() {
        let svc = service().await;
        svc.subscribe(form("A", "a@example.org", "grade-1")).await.unwrap();
        svc.subscribe(form("B", "b@example.org", "grade-2")).await.unwrap();
        svc.subscribe(form("C", "c@example.org", "grade-1")).await.unwrap();

        let g1 = svc.recipients(&["grade-1".into()], false).await.unwrap();
        assert_eq!(
            g1.iter().map(|s| s.email.as_str()).collect::<Vec<_>>(),
            vec!["a@example.org", "c@example.org"]
        );

        let none = svc.recipients(&["grade-3".into()], false).await.unwrap();
        assert!(none.is_empty());

        let everyone = svc.recipients(&[], true).await.unwrap();
        assert_eq!(everyone.len(), 3);
    }
}
