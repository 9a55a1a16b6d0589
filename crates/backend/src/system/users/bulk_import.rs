//! CSV bulk import of parent accounts.
//!
//! Expected layout, one account per line:
//!
//! ```text
//! ID,氏名,パスワード
//! s1001,山田 太郎,pass1001
//! s1002,"Suzuki, Hanako",pass1002
//! ```
//!
//! The header line is optional. Every data line is validated and written
//! independently: a bad line becomes a ledger entry and the batch goes on.

use async_trait::async_trait;
use contracts::system::users::{BulkImportResult, ImportRowResult};

use crate::shared::error::PortalResult;

/// Markers that identify the first line as a header
pub const HEADER_MARKERS: [&str; 2] = ["ID", "学籍番号"];

/// identifier, full name, password
pub const REQUIRED_COLUMNS: usize = 3;

/// Account sink used by the importer
#[async_trait]
pub trait UserCreator: Send + Sync {
    async fn create_user(&self, identifier: &str, secret: &str, full_name: &str)
        -> PortalResult<()>;
}

/// Data line of an import file, numbered from 1 over data lines only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,
    pub fields: Vec<String>,
}

/// Account fields of a line that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow<'a> {
    pub identifier: &'a str,
    pub full_name: &'a str,
    pub secret: &'a str,
}

/// Split the upload into numbered data rows.
///
/// Strips a UTF-8 BOM, drops blank lines and a leading header line.
pub fn parse_rows(text: &str) -> Vec<RawRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .peekable();

    if let Some(first) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    lines
        .enumerate()
        .map(|(idx, line)| RawRow {
            row_number: idx + 1,
            fields: split_fields(line),
        })
        .collect()
}

/// A header line starts with one of the marker column names
fn is_header(line: &str) -> bool {
    split_fields(line)
        .first()
        .is_some_and(|first| HEADER_MARKERS.contains(&first.as_str()))
}

/// Split one line by comma honoring double quotes; fields are trimmed and
/// stripped of stray surrounding quotes.
pub fn split_fields(line: &str) -> Vec<String> {
    // An unclosed quote would swallow the rest of the line into one field
    if line.matches('"').count() % 2 != 0 {
        return line.split(',').map(clean_field).collect();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(clean_field).collect(),
        Some(Err(e)) => {
            tracing::debug!("Unparsable import line, splitting plainly: {}", e);
            line.split(',').map(clean_field).collect()
        }
        None => Vec::new(),
    }
}

fn clean_field(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

/// Check arity and required fields of one row.
pub fn validate_row(row: &RawRow) -> Result<AccountRow<'_>, String> {
    if row.fields.len() < REQUIRED_COLUMNS {
        return Err(format!(
            "row {}: insufficient columns ({} required)",
            row.row_number, REQUIRED_COLUMNS
        ));
    }

    let identifier = row.fields[0].as_str();
    let full_name = row.fields[1].as_str();
    let secret = row.fields[2].as_str();

    if identifier.is_empty() || full_name.is_empty() || secret.is_empty() {
        return Err(format!("row {}: empty field", row.row_number));
    }

    Ok(AccountRow {
        identifier,
        full_name,
        secret,
    })
}

/// Import every data line of `text`, collecting a per-row ledger.
///
/// Rows are created one by one; already created accounts stay when a later
/// row fails.
pub async fn import_users<C>(creator: &C, text: &str) -> BulkImportResult
where
    C: UserCreator + ?Sized,
{
    let mut ledger = BulkImportResult::default();

    for row in parse_rows(text) {
        let outcome = match validate_row(&row) {
            Err(reason) => ImportRowResult::failure(row.row_number, reason),
            Ok(account) => match creator
                .create_user(account.identifier, account.secret, account.full_name)
                .await
            {
                Ok(()) => ImportRowResult::success(row.row_number),
                Err(e) => ImportRowResult::failure(
                    row.row_number,
                    format!("row {} ({}): {}", row.row_number, account.identifier, e),
                ),
            },
        };
        ledger.record(outcome);
    }

    tracing::info!("Bulk import finished: {}", ledger.summary());
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::PortalError;
    use std::sync::Mutex;

    /// In-memory account sink with unique identifiers
    #[derive(Default)]
    struct FakeCreator {
        created: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeCreator {
        fn identifiers(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|(id, _, _)| id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl UserCreator for FakeCreator {
        async fn create_user(
            &self,
            identifier: &str,
            secret: &str,
            full_name: &str,
        ) -> PortalResult<()> {
            let mut created = self.created.lock().unwrap();
            if created.iter().any(|(id, _, _)| id == identifier) {
                return Err(PortalError::DuplicateIdentifier(identifier.to_string()));
            }
            created.push((identifier.into(), secret.into(), full_name.into()));
            Ok(())
        }
    }

    #[test]
    fn test_split_fields_with_quotes() {
        assert_eq!(
            split_fields(r#"s1002,"Suzuki, Hanako", pass "#),
            vec!["s1002", "Suzuki, Hanako", "pass"]
        );
        assert_eq!(split_fields("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_fields_unclosed_quote() {
        assert_eq!(split_fields(r#"s1,"Yamada,pass"#), vec!["s1", "Yamada", "pass"]);
    }

    #[tokio::test]
    async fn test_unclosed_quote_row_is_imported() {
        let creator = FakeCreator::default();
        let ledger = import_users(&creator, "s1,\"Yamada,pass\n").await;
        assert_eq!(ledger.success, 1);
        assert_eq!(
            creator.created.lock().unwrap()[0],
            ("s1".to_string(), "pass".to_string(), "Yamada".to_string())
        );
    }

    #[test]
    fn test_identifier_containing_marker_is_data() {
        let rows = parse_rows("IDA01,Alice,pw\ns2,B,p2\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields[0], "IDA01");

        let rows = parse_rows("ID,Name,Password\ns2,B,p2\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields[0], "s2");
    }

    #[test]
    fn test_parse_rows_skips_header_bom_and_blank_lines() {
        let rows = parse_rows("\u{feff}学籍番号,氏名,パスワード\r\n\r\ns1,A,p1\r\n   \ns2,B,p2\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].fields, vec!["s1", "A", "p1"]);
        assert_eq!(rows[1].row_number, 2);
    }

    #[test]
    fn test_parse_rows_without_header() {
        let rows = parse_rows("s1,A,p1\ns2,B,p2");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields[0], "s1");
    }

    #[test]
    fn test_validate_row_messages() {
        let short = RawRow {
            row_number: 4,
            fields: vec!["s1".into(), "A".into()],
        };
        assert_eq!(
            validate_row(&short).unwrap_err(),
            "row 4: insufficient columns (3 required)"
        );

        let blank = RawRow {
            row_number: 5,
            fields: vec!["s1".into(), "".into(), "p".into()],
        };
        assert_eq!(validate_row(&blank).unwrap_err(), "row 5: empty field");
    }

    #[tokio::test]
    async fn test_short_row_fails_alone() {
        let creator = FakeCreator::default();
        let ledger = import_users(&creator, "s1,A,p1\ns2,B\ns3,C,p3\n").await;

        assert_eq!(ledger.success, 2);
        assert_eq!(ledger.failed, 1);
        assert_eq!(
            ledger.errors,
            vec!["row 2: insufficient columns (3 required)".to_string()]
        );
        assert_eq!(creator.identifiers(), vec!["s1", "s3"]);
    }

    #[tokio::test]
    async fn test_duplicate_identifier_keeps_earlier_rows() {
        let creator = FakeCreator::default();
        let ledger = import_users(&creator, "ID,name,pw\ns1,A,p1\ns2,B,p2\ns1,C,p3\n").await;

        assert_eq!(ledger.success, 2);
        assert_eq!(ledger.failed, 1);
        assert_eq!(
            ledger.errors,
            vec!["row 3 (s1): identifier already exists: s1".to_string()]
        );
        assert_eq!(creator.identifiers(), vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_counts_always_cover_every_row() {
        let creator = FakeCreator::default();
        let text = "a,b,c\n,,\nonly-one\n\"q\",\"r\",\"s\"\nx,y\n";
        let ledger = import_users(&creator, text).await;
        assert_eq!(ledger.processed(), 5);
        assert_eq!(ledger.success, 2);
        assert_eq!(ledger.errors[0], "row 2: empty field");
    }

    #[tokio::test]
    async fn test_empty_upload() {
        let creator = FakeCreator::default();
        let ledger = import_users(&creator, "ID,name,pw\n\n").await;
        assert_eq!(ledger, BulkImportResult::default());
    }
}
