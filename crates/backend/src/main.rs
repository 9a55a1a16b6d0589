#![allow(clippy::type_complexity)]

pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::domain::a004_notification::mailer;
use crate::shared::config;
use crate::shared::state::AppState;
use crate::system::auth::jwt::{self, JwtKeys};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;

    let db_path = config::get_database_path(&config)?;
    let db = shared::data::db::initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let secret = match config.auth.jwt_secret.clone().filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => jwt::load_or_create_secret(&db).await?,
    };
    let jwt = JwtKeys::from_secret(&secret, config.auth.token_lifetime_hours);

    let mailer = mailer::from_config(&config.mail)?;
    tracing::info!("Outgoing mail via {}", mailer.provider_name());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server address: {e}"))?;

    let state = AppState::new(db, config, jwt, Arc::from(mailer));

    system::initialization::ensure_admin_user_exists(&state.users(), &state.config.auth).await?;

    let app = routes::build_router(state);

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
