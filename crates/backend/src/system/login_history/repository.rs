use chrono::Utc;
use contracts::system::auth::LoginHistoryEntry;
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, QueryResult, Statement};

use crate::shared::data::parse_timestamp;

/// Client details captured at login
#[derive(Debug, Clone, Default)]
pub struct LoginContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

fn map_entry(row: &QueryResult) -> Result<LoginHistoryEntry, DbErr> {
    let login_time: String = row.try_get("", "login_time")?;
    Ok(LoginHistoryEntry {
        id: row.try_get("", "id")?,
        user_id: row.try_get("", "user_id")?,
        username: row.try_get("", "username")?,
        full_name: row.try_get("", "full_name")?,
        ip_address: row.try_get("", "ip_address")?,
        user_agent: row.try_get("", "user_agent")?,
        login_time: parse_timestamp(&login_time)?,
    })
}

pub async fn record<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    username: &str,
    context: &LoginContext,
) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_login_history (user_id, username, ip_address, user_agent, login_time)
         VALUES (?, ?, ?, ?, ?)",
        [
            user_id.into(),
            username.into(),
            context.ip_address.clone().into(),
            context.user_agent.clone().into(),
            Utc::now().to_rfc3339().into(),
        ],
    ))
    .await?;

    Ok(())
}

/// Latest logins of one user
pub async fn list_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    limit: u64,
) -> Result<Vec<LoginHistoryEntry>, DbErr> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT h.id, h.user_id, h.username, u.full_name, h.ip_address, h.user_agent, h.login_time
             FROM sys_login_history h
             LEFT JOIN sys_users u ON u.id = h.user_id
             WHERE h.user_id = ?
             ORDER BY h.login_time DESC, h.id DESC
             LIMIT ?",
            [user_id.into(), (limit as i64).into()],
        ))
        .await?;

    rows.iter().map(map_entry).collect()
}

/// Latest logins of all users
pub async fn list_all<C: ConnectionTrait>(
    conn: &C,
    limit: u64,
) -> Result<Vec<LoginHistoryEntry>, DbErr> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT h.id, h.user_id, h.username, u.full_name, h.ip_address, h.user_agent, h.login_time
             FROM sys_login_history h
             LEFT JOIN sys_users u ON u.id = h.user_id
             ORDER BY h.login_time DESC, h.id DESC
             LIMIT ?",
            [(limit as i64).into()],
        ))
        .await?;

    rows.iter().map(map_entry).collect()
}
