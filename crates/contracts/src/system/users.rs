use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portal account (parent or administrator); the password hash never
/// leaves the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl CreateUserDto {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty()
            || self.password.is_empty()
            || self.full_name.trim().is_empty()
        {
            return Err("username, password and fullName are required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetUsersResponse {
    pub success: bool,
    pub deleted: u64,
    pub message: String,
}

// ============================================================================
// Bulk import ledger
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOutcome {
    Success,
    Failure,
}

/// Result of processing one data line of an import file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowResult {
    pub row_number: usize,
    pub outcome: RowOutcome,
    pub reason: Option<String>,
}

impl ImportRowResult {
    pub fn success(row_number: usize) -> Self {
        Self {
            row_number,
            outcome: RowOutcome::Success,
            reason: None,
        }
    }

    pub fn failure(row_number: usize, reason: impl Into<String>) -> Self {
        Self {
            row_number,
            outcome: RowOutcome::Failure,
            reason: Some(reason.into()),
        }
    }
}

/// Aggregated outcome of a bulk import.
///
/// `success + failed` always equals the number of processed rows; `errors`
/// keeps one message per failed row in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkImportResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl BulkImportResult {
    pub fn record(&mut self, row: ImportRowResult) {
        match row.outcome {
            RowOutcome::Success => self.success += 1,
            RowOutcome::Failure => {
                self.failed += 1;
                self.errors.push(row.reason.unwrap_or_else(|| {
                    format!("row {}: import failed", row.row_number)
                }));
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.success + self.failed
    }

    pub fn summary(&self) -> String {
        format!("imported: {}, failed: {}", self.success, self.failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkImportResponse {
    pub results: BulkImportResult,
    pub message: String,
}
