pub mod mailer;
pub mod repository;
pub mod service;

pub use mailer::{LogMailer, Mailer, ResendMailer};
pub use service::NotificationService;
