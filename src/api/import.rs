use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::job::models::JobCreate;

pub const REQUIRED_COLUMNS: [&str; 3] = ["title", "company", "location"];
pub const OPTIONAL_COLUMNS: [&str; 8] = [
    "status",
    "applied_date",
    "follow_up_date",
    "job_link",
    "job_description",
    "job_board_id",
    "source",
    "notes",
];

/// One parsed row/object, keyed by normalized column name
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unrecognized columns: {}", .0.join(", "))]
    UnknownColumns(Vec<String>),
}

/// Everything that blocks an import before or at upload time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Unsupported file type. Upload CSV or JSON")]
    UnsupportedFileType,

    #[error("File is {size} bytes, over the {limit} byte import limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    MalformedInput(String),

    #[error(transparent)]
    Columns(#[from] ColumnError),

    #[error("Row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("No jobs to upload")]
    NothingToUpload,
}

/// Parsed file contents: the column names seen and one record per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl ParsedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Converts every record into a create payload. Any record that does not
    /// fit the model fails the whole batch.
    pub fn to_payloads(&self) -> Result<Vec<JobCreate>, ImportError> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::from_value(Value::Object(record.clone())).map_err(|e| {
                    ImportError::InvalidRecord {
                        row: index + 1,
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }
}

/// Picks the parser from the file extension (case-insensitive).
pub fn detect_format(filename: &str) -> Result<ImportFormat, ImportError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if extension.eq_ignore_ascii_case("csv") {
        Ok(ImportFormat::Csv)
    } else if extension.eq_ignore_ascii_case("json") {
        Ok(ImportFormat::Json)
    } else {
        Err(ImportError::UnsupportedFileType)
    }
}

fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Checks a header set against the known columns.
///
/// Missing required columns are reported ahead of unknown ones.
pub fn validate_columns<S: AsRef<str>>(headers: &[S]) -> Result<(), ColumnError> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_column(h.as_ref())).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !normalized.iter().any(|h| h == **required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ColumnError::MissingColumns(missing));
    }

    let unknown: Vec<String> = normalized
        .into_iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(&h.as_str()) && !OPTIONAL_COLUMNS.contains(&h.as_str()))
        .collect();
    if !unknown.is_empty() {
        return Err(ColumnError::UnknownColumns(unknown));
    }

    Ok(())
}

/// Parses CSV with the first row as header. Rows whose cells are all blank
/// are skipped.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedBatch, ImportError> {
    let malformed = |e: csv::Error| ImportError::MalformedInput(e.to_string());

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(normalize_column)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(malformed)?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let record: RawRecord = columns
            .iter()
            .cloned()
            .zip(row.iter().map(|cell| Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }

    debug!("Parsed CSV: {} columns, {} rows", columns.len(), records.len());
    Ok(ParsedBatch { columns, records })
}

/// Parses a top-level JSON array of objects. Keys are normalized the same
/// way CSV headers are.
pub fn parse_json(bytes: &[u8]) -> Result<ParsedBatch, ImportError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ImportError::MalformedInput(format!("Invalid JSON format: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(ImportError::MalformedInput(
            "Invalid JSON format: expected an array of job objects".to_string(),
        ));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(object) = item else {
            return Err(ImportError::MalformedInput(format!(
                "Invalid JSON format: item {} is not an object",
                index + 1
            )));
        };

        let record: RawRecord = object
            .into_iter()
            .map(|(key, value)| (normalize_column(&key), value))
            .collect();
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        records.push(record);
    }

    debug!("Parsed JSON: {} columns, {} objects", columns.len(), records.len());
    Ok(ParsedBatch { columns, records })
}

/// Parses and column-checks a file body.
///
/// CSV is checked on its header row. JSON has no header, so every object's
/// key set is checked on its own.
pub fn parse(format: ImportFormat, bytes: &[u8]) -> Result<ParsedBatch, ImportError> {
    match format {
        ImportFormat::Csv => {
            let batch = parse_csv(bytes)?;
            validate_columns(&batch.columns)?;
            Ok(batch)
        }
        ImportFormat::Json => {
            let batch = parse_json(bytes)?;
            for (index, record) in batch.records.iter().enumerate() {
                let keys: Vec<&str> = record.keys().map(String::as_str).collect();
                validate_columns(&keys).map_err(|e| {
                    debug!("JSON object {} failed column check", index + 1);
                    e
                })?;
            }
            Ok(batch)
        }
    }
}

/// Where an import currently stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImportState {
    #[default]
    Idle,
    Parsing(ImportFormat),
    Validated(ParsedBatch),
    Rejected(ImportError),
}

/// One file import: `Idle -> Parsing -> {Validated, Rejected}`.
///
/// The batch is all-or-nothing; nothing reaches the store unless the state is
/// `Validated` with at least one record.
#[derive(Debug)]
pub struct ImportSession {
    state: ImportState,
    max_size: usize,
}

impl ImportSession {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: ImportState::Idle,
            max_size,
        }
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// Loads a new file, replacing whatever was loaded before.
    pub fn load(&mut self, filename: &str, bytes: &[u8]) -> &ImportState {
        self.state = match self.read(filename, bytes) {
            Ok(batch) => {
                info!("Import of {} validated: {} records", filename, batch.len());
                ImportState::Validated(batch)
            }
            Err(err) => {
                warn!("Import of {} rejected: {}", filename, err);
                ImportState::Rejected(err)
            }
        };
        &self.state
    }

    fn read(&mut self, filename: &str, bytes: &[u8]) -> Result<ParsedBatch, ImportError> {
        let format = detect_format(filename)?;
        if bytes.len() > self.max_size {
            return Err(ImportError::FileTooLarge {
                size: bytes.len(),
                limit: self.max_size,
            });
        }

        self.state = ImportState::Parsing(format);
        debug!("Parsing {} as {:?}", filename, format);
        parse(format, bytes)
    }

    pub fn batch(&self) -> Option<&ParsedBatch> {
        match &self.state {
            ImportState::Validated(batch) => Some(batch),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ImportError> {
        match &self.state {
            ImportState::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Payloads ready for `create_batch`, or the reason the upload is blocked.
    pub fn payloads(&self) -> Result<Vec<JobCreate>, ImportError> {
        match &self.state {
            ImportState::Validated(batch) if !batch.is_empty() => batch.to_payloads(),
            ImportState::Rejected(err) => Err(err.clone()),
            _ => Err(ImportError::NothingToUpload),
        }
    }

    pub fn reset(&mut self) {
        self.state = ImportState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::JobStatus;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(detect_format("jobs.csv"), Ok(ImportFormat::Csv));
        assert_eq!(detect_format("Jobs.JSON"), Ok(ImportFormat::Json));
        assert_eq!(detect_format("jobs.txt"), Err(ImportError::UnsupportedFileType));
        assert_eq!(detect_format("csv"), Err(ImportError::UnsupportedFileType));
    }

    #[test]
    fn accepts_required_plus_optional_columns() {
        assert_eq!(validate_columns(&["title", "company", "location", "status"]), Ok(()));
        assert_eq!(validate_columns(&[" Title", "COMPANY ", "location"]), Ok(()));
    }

    #[test]
    fn reports_missing_columns() {
        assert_eq!(
            validate_columns(&["title", "company"]),
            Err(ColumnError::MissingColumns(vec!["location".into()]))
        );
    }

    #[test]
    fn reports_unknown_columns() {
        assert_eq!(
            validate_columns(&["title", "company", "location", "salary"]),
            Err(ColumnError::UnknownColumns(vec!["salary".into()]))
        );
    }

    #[test]
    fn missing_columns_take_priority() {
        assert_eq!(
            validate_columns(&["title", "salary"]),
            Err(ColumnError::MissingColumns(vec!["company".into(), "location".into()]))
        );
    }

    #[test]
    fn column_check_is_repeatable() {
        let headers = ["title", "company", "salary"];
        assert_eq!(validate_columns(&headers), validate_columns(&headers));
    }

    #[test]
    fn csv_rows_become_records() {
        let body = b"Title,Company,Location,Status\nDev,Acme,Remote,Applied\n\n,,,\nOps,Globex,Berlin,\n";
        let batch = parse_csv(body).unwrap();
        assert_eq!(batch.columns, ["title", "company", "location", "status"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0]["company"], Value::String("Acme".into()));
        assert_eq!(batch.records[1]["status"], Value::String(String::new()));
    }

    #[test]
    fn ragged_csv_is_malformed() {
        let body = b"title,company,location\nDev,Acme\n";
        let err = parse_csv(body).unwrap_err();
        assert!(matches!(err, ImportError::MalformedInput(_)));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(parse_json(b"{\"title\": 1}"), Err(ImportError::MalformedInput(_))));
        assert!(matches!(parse_json(b"[1, 2]"), Err(ImportError::MalformedInput(_))));
        assert!(matches!(parse_json(b"[{"), Err(ImportError::MalformedInput(_))));
        assert_eq!(parse_json(b"[]").unwrap(), ParsedBatch::default());
    }

    #[test]
    fn json_objects_are_column_checked() {
        let body = br#"[{"title": "Dev", "company": "Acme", "location": "Remote", "salary": "100k"}]"#;
        assert_eq!(
            parse(ImportFormat::Json, body),
            Err(ImportError::Columns(ColumnError::UnknownColumns(vec!["salary".into()])))
        );
    }

    #[test]
    fn empty_json_array_has_nothing_to_upload() {
        let mut session = ImportSession::new(1024);
        session.load("jobs.json", b"[]");
        assert_eq!(session.batch().map(ParsedBatch::len), Some(0));
        assert_eq!(session.payloads(), Err(ImportError::NothingToUpload));
    }

    #[test]
    fn unsupported_file_never_parses() {
        let mut session = ImportSession::new(1024);
        let state = session.load("jobs.txt", b"title,company,location\n");
        assert_eq!(state, &ImportState::Rejected(ImportError::UnsupportedFileType));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut session = ImportSession::new(8);
        session.load("jobs.csv", b"title,company,location\n");
        assert!(matches!(session.error(), Some(ImportError::FileTooLarge { limit: 8, .. })));
        assert!(session.payloads().is_err());
    }

    #[test]
    fn validated_csv_yields_payloads() {
        let mut session = ImportSession::new(1024);
        session.load("jobs.csv", b"title,company,location,status\nDev,Acme,Remote,interview\n");
        let payloads = session.payloads().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].status, JobStatus::Interview);

        session.reset();
        assert_eq!(session.state(), &ImportState::Idle);
    }

    #[test]
    fn bad_status_fails_whole_batch() {
        let mut session = ImportSession::new(1024);
        session.load(
            "jobs.csv",
            b"title,company,location,status\nDev,Acme,Remote,Saved\nOps,Globex,Berlin,Hired\n",
        );
        assert!(matches!(
            session.payloads(),
            Err(ImportError::InvalidRecord { row: 2, .. })
        ));
    }
}
