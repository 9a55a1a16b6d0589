pub mod repository;
pub mod service;

pub use repository::{LinkStore, SqlLinkStore};
pub use service::LinkAdminService;
