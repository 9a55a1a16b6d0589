pub mod auth;
pub mod handlers;
pub mod initialization;
pub mod login_history;
pub mod middleware;
pub mod tracing;
pub mod users;
