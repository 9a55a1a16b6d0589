use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use std::path::Path;

/// Schema bootstrap, applied on every start
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sys_settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        created_at TEXT,
        updated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sys_users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        full_name TEXT NOT NULL,
        is_admin INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sys_login_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        username TEXT NOT NULL,
        ip_address TEXT,
        user_agent TEXT,
        login_time TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sys_login_history_user ON sys_login_history (user_id, login_time)",
    r#"
    CREATE TABLE IF NOT EXISTS a001_links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        url TEXT NOT NULL,
        sort_order INTEGER NOT NULL,
        display_type TEXT NOT NULL DEFAULT 'card',
        icon_url TEXT,
        category TEXT NOT NULL,
        category_root TEXT NOT NULL,
        category_sub TEXT,
        documents TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a001_links_order ON a001_links (sort_order)",
    "CREATE INDEX IF NOT EXISTS idx_a001_links_category ON a001_links (category_root, category_sub)",
    r#"
    CREATE TABLE IF NOT EXISTS a002_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author TEXT NOT NULL,
        documents TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a003_subscribers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        grade TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a004_email_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        target_grades TEXT NOT NULL,
        recipient_count INTEGER NOT NULL,
        sent_by TEXT NOT NULL,
        sent_at TEXT NOT NULL
    )
    "#,
];

/// Open the SQLite file (creating it and its directory when missing) and
/// make sure the schema exists.
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Opening database: {}", absolute_path.display());

    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    bootstrap_schema(&conn).await?;

    Ok(conn)
}

pub async fn bootstrap_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    for sql in SCHEMA {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.trim().to_string(),
        ))
        .await?;
    }
    tracing::debug!("Schema bootstrap complete ({} statements)", SCHEMA.len());
    Ok(())
}

/// Fresh in-memory database with the full schema.
///
/// Single connection: every pooled SQLite memory connection would otherwise
/// see its own empty database.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory database");
    bootstrap_schema(&conn).await.expect("schema bootstrap");
    conn
}
