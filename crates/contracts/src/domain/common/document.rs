use serde::{Deserialize, Serialize};

/// Attached document (PDF, handout, form) referenced by URL.
///
/// The bytes live in external file storage; only the returned URL is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub url: String,
}

impl Document {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Document name cannot be empty".into());
        }
        if self.url.trim().is_empty() {
            return Err("Document URL cannot be empty".into());
        }
        Ok(())
    }
}

/// Validate every document of a list, reporting the first bad one.
pub fn validate_documents(documents: &[Document]) -> Result<(), String> {
    for (idx, doc) in documents.iter().enumerate() {
        doc.validate()
            .map_err(|e| format!("Document #{}: {}", idx + 1, e))?;
    }
    Ok(())
}
