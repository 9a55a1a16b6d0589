use chrono::Utc;
use contracts::domain::a003_subscriber::Subscriber;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a003_subscribers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub grade: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Subscriber {
    fn from(m: Model) -> Self {
        Subscriber {
            id: m.id,
            student_name: m.student_name,
            email: m.email,
            grade: m.grade,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Subscriber>, DbErr> {
    let items = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Subscribers of the given grades, oldest first
pub async fn list_by_grades(
    db: &DatabaseConnection,
    grades: &[String],
) -> Result<Vec<Subscriber>, DbErr> {
    let items = Entity::find()
        .filter(Column::Grade.is_in(grades.iter().cloned()))
        .order_by_asc(Column::Id)
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

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Email.eq(email)).one(db).await
}

pub async fn insert(
    db: &DatabaseConnection,
    student_name: String,
    email: String,
    grade: String,
) -> Result<Subscriber, DbErr> {
    let now = Utc::now();
    let active = ActiveModel {
        id: NotSet,
        student_name: Set(student_name),
        email: Set(email),
        grade: Set(grade),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(active.insert(db).await?.into())
}

pub async fn update(db: &DatabaseConnection, active: ActiveModel) -> Result<Subscriber, DbErr> {
    Ok(active.update(db).await?.into())
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
