pub mod bulk_import;
pub mod repository;
pub mod service;

pub use bulk_import::{import_users, UserCreator};
pub use service::UserDirectory;
