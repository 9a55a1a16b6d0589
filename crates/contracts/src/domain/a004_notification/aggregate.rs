use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target value selecting every subscriber regardless of grade
pub const ALL_GRADES: &str = "all";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationDto {
    #[serde(default)]
    pub target_grades: Vec<String>,
}

impl SendNotificationDto {
    pub fn targets_everyone(&self) -> bool {
        self.target_grades.iter().any(|g| g == ALL_GRADES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub recipient_count: usize,
    pub message: String,
}

/// One recorded notification send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailHistoryEntry {
    pub id: i32,
    pub target_grades: Vec<String>,
    pub recipient_count: i32,
    pub sent_by: String,
    pub sent_at: DateTime<Utc>,
}
