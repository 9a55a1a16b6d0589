pub mod db;

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

/// Parse an RFC 3339 column written by the raw-SQL repositories
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbErr> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbErr::Type(format!("invalid timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2025-04-01T09:30:00+09:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-04-01T00:30:00+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
