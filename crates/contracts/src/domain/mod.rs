pub mod a001_link;
pub mod a002_article;
pub mod a003_subscriber;
pub mod a004_notification;
pub mod common;
