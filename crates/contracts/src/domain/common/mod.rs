//! Common types shared by all aggregates

pub mod document;
pub mod serde_helpers;

// Re-exports
pub use document::Document;
pub use serde_helpers::deserialize_some;
