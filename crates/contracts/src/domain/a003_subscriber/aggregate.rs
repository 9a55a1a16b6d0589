use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parent subscribed to update notifications for one grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: i32,
    pub student_name: String,
    pub email: String,
    pub grade: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeDto {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub grade: String,
}

impl SubscribeDto {
    /// Field checks that do not depend on configuration; the grade is
    /// checked against the configured roots by the service.
    pub fn validate(&self) -> Result<(), String> {
        if self.student_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.grade.trim().is_empty()
        {
            return Err("studentName, email and grade are required".into());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("invalid email address".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriberDto {
    pub id: i32,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub grade: String,
}

impl UpdateSubscriberDto {
    pub fn as_form(&self) -> SubscribeDto {
        SubscribeDto {
            student_name: self.student_name.clone(),
            email: self.email.clone(),
            grade: self.grade.clone(),
        }
    }
}

/// `local@domain.tld` with no whitespace and a single `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("parent@example.org"));
        assert!(is_valid_email("a.b+c@mail.school.jp"));
        assert!(!is_valid_email("parent@example"));
        assert!(!is_valid_email("parent example@x.org"));
        assert!(!is_valid_email("@example.org"));
        assert!(!is_valid_email("a@@example.org"));
        assert!(!is_valid_email("a@.org"));
        assert!(!is_valid_email("a@example."));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_subscribe_requires_all_fields() {
        let dto = SubscribeDto {
            student_name: "Taro".into(),
            email: "taro@example.org".into(),
            grade: "".into(),
        };
        assert!(dto.validate().is_err());
    }
}
