use chrono::Utc;
use contracts::system::users::User;
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, QueryResult, Statement};

use crate::shared::data::parse_timestamp;

const USER_COLUMNS: &str = "id, username, full_name, is_admin, created_at";

fn map_user(row: &QueryResult) -> Result<User, DbErr> {
    let created_at: String = row.try_get("", "created_at")?;
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        full_name: row.try_get("", "full_name")?,
        is_admin: row.try_get::<i32>("", "is_admin")? != 0,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Insert a user with an already hashed password, returning the stored row
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    password_hash: &str,
    full_name: &str,
    is_admin: bool,
) -> Result<User, DbErr> {
    let created_at = Utc::now();

    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_users (username, password_hash, full_name, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                username.into(),
                password_hash.into(),
                full_name.into(),
                (if is_admin { 1 } else { 0 }).into(),
                created_at.to_rfc3339().into(),
            ],
        ))
        .await?;

    Ok(User {
        id: result.last_insert_id() as i32,
        username: username.to_string(),
        full_name: full_name.to_string(),
        is_admin,
        created_at,
    })
}

/// Get user by ID
pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<User>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} FROM sys_users WHERE id = ?", USER_COLUMNS),
            [id.into()],
        ))
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Get user by username
pub async fn get_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<User>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} FROM sys_users WHERE username = ?", USER_COLUMNS),
            [username.into()],
        ))
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Get password hash for user
pub async fn get_password_hash<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<String>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

/// List all users, newest first
pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<User>, DbErr> {
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                "SELECT {} FROM sys_users ORDER BY created_at DESC, id DESC",
                USER_COLUMNS
            ),
        ))
        .await?;

    rows.iter().map(map_user).collect()
}

/// Delete user (hard delete)
pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_users WHERE id = ?",
            [id.into()],
        ))
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every account without admin rights
pub async fn delete_non_admins<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let result = conn
        .execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_users WHERE is_admin = 0".to_string(),
        ))
        .await?;

    Ok(result.rows_affected())
}

/// Count administrator accounts
pub async fn count_admins<C: ConnectionTrait>(conn: &C) -> Result<usize, DbErr> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users WHERE is_admin = 1".to_string(),
        ))
        .await?;

    match row {
        Some(row) => {
            let count: i64 = row.try_get("", "count")?;
            Ok(count as usize)
        }
        None => Ok(0),
    }
}
