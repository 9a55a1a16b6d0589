use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{CategoryGroup, CategoryPath};
use crate::domain::common::document::validate_documents;
use crate::domain::common::{deserialize_some, Document};

// ============================================================================
// Display type
// ============================================================================

/// How a link is rendered on the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    #[default]
    Card,
    Icon,
}

impl DisplayType {
    pub fn code(&self) -> &'static str {
        match self {
            DisplayType::Card => "card",
            DisplayType::Icon => "icon",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "card" => Some(DisplayType::Card),
            "icon" => Some(DisplayType::Icon),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Access-portal entry shown to parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Zero-based display position, dense across the whole collection
    pub order: i32,
    pub display_type: DisplayType,
    pub icon_url: Option<String>,
    pub category: String,
    pub category_path: CategoryPath,
    pub documents: Vec<Document>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Payload for creating a link
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    pub display_type: Option<DisplayType>,
    pub icon_url: Option<String>,
    pub category: Option<String>,
    pub documents: Option<Vec<Document>>,
}

impl CreateLinkDto {
    pub fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        require_text("url", &self.url)?;
        if let Some(ref docs) = self.documents {
            validate_documents(docs)?;
        }
        Ok(())
    }
}

/// Partial update: omitted fields stay unchanged.
///
/// `icon_url` is doubly optional: omitted keeps the icon, `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkDto {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub display_type: Option<DisplayType>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub icon_url: Option<Option<String>>,
    pub category: Option<String>,
    pub documents: Option<Vec<Document>>,
}

impl UpdateLinkDto {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref title) = self.title {
            require_text("title", title)?;
        }
        if let Some(ref description) = self.description {
            require_text("description", description)?;
        }
        if let Some(ref url) = self.url {
            require_text("url", url)?;
        }
        if let Some(ref docs) = self.documents {
            validate_documents(docs)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.display_type.is_none()
            && self.icon_url.is_none()
            && self.category.is_none()
            && self.documents.is_none()
    }
}

/// Full permutation of link ids submitted after a drag-and-drop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLinksDto {
    pub link_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkGroupsResponse {
    pub groups: Vec<CategoryGroup>,
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_text_fields() {
        let dto = CreateLinkDto {
            title: "Timetable".into(),
            description: " ".into(),
            url: "https://example.org".into(),
            ..Default::default()
        };
        assert_eq!(dto.validate().unwrap_err(), "description cannot be empty");
    }

    #[test]
    fn test_create_dto_accepts_camel_case() {
        let dto: CreateLinkDto = serde_json::from_str(
            r#"{"title":"t","description":"d","url":"u","displayType":"icon","iconUrl":"/i.png"}"#,
        )
        .unwrap();
        assert_eq!(dto.display_type, Some(DisplayType::Icon));
        assert_eq!(dto.icon_url.as_deref(), Some("/i.png"));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_distinguishes_cleared_icon() {
        let keep: UpdateLinkDto = serde_json::from_str(r#"{"id":1,"title":"new"}"#).unwrap();
        assert_eq!(keep.icon_url, None);
        assert!(keep.description.is_none());

        let clear: UpdateLinkDto = serde_json::from_str(r#"{"id":1,"iconUrl":null}"#).unwrap();
        assert_eq!(clear.icon_url, Some(None));
        assert!(!clear.is_empty());
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let dto = UpdateLinkDto {
            id: 1,
            title: Some("".into()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_link_serializes_camel_case_aliases() {
        let link = Link {
            id: 7,
            title: "t".into(),
            description: "d".into(),
            url: "u".into(),
            order: 0,
            display_type: DisplayType::Icon,
            icon_url: Some("/i.png".into()),
            category: "grade-1-A".into(),
            category_path: CategoryPath {
                root: "grade-1".into(),
                sub: Some("grade-1-A".into()),
            },
            documents: vec![],
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["displayType"], "icon");
        assert_eq!(json["iconUrl"], "/i.png");
        assert_eq!(json["categoryPath"]["root"], "grade-1");
    }

    #[test]
    fn test_reorder_dto_field_name() {
        let dto: ReorderLinksDto = serde_json::from_str(r#"{"linkIds":[3,1,2]}"#).unwrap();
        assert_eq!(dto.link_ids, vec![3, 1, 2]);
    }
}
