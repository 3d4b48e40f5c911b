//! CSV record source
//!
//! [`RecordSource`] reads a headed CSV file lazily. Every call to [`RecordSource::rows`]
//! reopens the file, so the sequence can be replayed. Rows are raw dictionaries keyed by
//! header; conversion to [`EmployeeRecord`] is a separate step so invalid rows can be
//! reported with their line numbers instead of aborting the run.

use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use csv::{Reader, ReaderBuilder, StringRecord};
use hrsync_common::employee::FIELDS;
use hrsync_common::{EmployeeRecord, RecordError};
use thiserror::Error;
use tracing::debug;

/// Fatal problems with the input file as a whole
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row
    #[error("'{}' is missing required column: {source}", path.display())]
    MissingField {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One data row keyed by header
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the file (the header is line 1)
    pub line: u64,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn to_record(&self) -> Result<EmployeeRecord, RecordError> {
        EmployeeRecord::from_raw(&self.fields)
    }
}

/// A row that failed client-side validation and will not be sent
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRow {
    pub line: u64,
    pub error: RecordError,
}

/// Everything read from one pass over the file
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub rows_read: usize,
    pub records: Vec<EmployeeRecord>,
    pub invalid: Vec<InvalidRow>,
}

/// A restartable, lazily read CSV file of employee rows
#[derive(Debug, Clone)]
pub struct RecordSource {
    path: PathBuf,
}

impl RecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Start a fresh pass over the file
    ///
    /// Fails if the file cannot be opened or its header lacks a required column.
    pub fn rows(&self) -> Result<Rows, SourceError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)
            .map_err(|source| SourceError::Open {
                path: self.path.clone(),
                source,
            })?;

        let headers = reader
            .headers()
            .map_err(|source| SourceError::Read {
                path: self.path.clone(),
                source,
            })?
            .clone();

        if let Some(missing) = FIELDS.iter().find(|field| !headers.iter().any(|h| h == **field)) {
            return Err(SourceError::MissingField {
                path: self.path.clone(),
                source: RecordError::MissingField(*missing),
            });
        }

        Ok(Rows {
            reader,
            headers,
            path: self.path.clone(),
            record: StringRecord::new(),
        })
    }

    /// Read the whole file, splitting valid records from invalid rows
    pub fn load(&self) -> Result<LoadedRecords, SourceError> {
        let mut loaded = LoadedRecords::default();

        for row in self.rows()? {
            let row = row?;
            loaded.rows_read += 1;
            match row.to_record() {
                Ok(record) => loaded.records.push(record),
                Err(error) => {
                    debug!(line = row.line, error = %error, "Skipping invalid row");
                    loaded.invalid.push(InvalidRow {
                        line: row.line,
                        error,
                    });
                },
            }
        }

        Ok(loaded)
    }
}

/// Iterator over the data rows of one pass
#[derive(Debug)]
pub struct Rows {
    reader: Reader<File>,
    headers: StringRecord,
    path: PathBuf,
    record: StringRecord,
}

impl Iterator for Rows {
    type Item = Result<RawRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or_default();
                // Short rows simply lack the trailing keys
                let fields = self
                    .headers
                    .iter()
                    .zip(self.record.iter())
                    .map(|(header, value)| (header.to_string(), value.to_string()))
                    .collect();
                Some(Ok(RawRecord { line, fields }))
            },
            Err(source) => Some(Err(SourceError::Read {
                path: self.path.clone(),
                source,
            })),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "employee_id,name,email,department,designation,salary,date_of_joining";

    fn csv_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let file = csv_file(&format!(
            "{HEADER}\n1,Ada,ada@example.com,Eng,Analyst,100.5,2020-01-02\n"
        ));
        let rows: Vec<_> = RecordSource::new(file.path()).rows().unwrap().collect();
        assert_eq!(rows.len(), 1);

        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.line, 2);
        assert_eq!(row.fields["email"], "ada@example.com");
        assert_eq!(row.to_record().unwrap().employee_id, 1);
    }

    #[test]
    fn test_source_is_restartable() {
        let file = csv_file(&format!(
            "{HEADER}\n1,A,a@example.com,D,X,1,2020-01-01\n2,B,b@example.com,D,X,2,2020-01-01\n"
        ));
        let source = RecordSource::new(file.path());
        assert_eq!(source.rows().unwrap().count(), 2);
        assert_eq!(source.rows().unwrap().count(), 2);
    }

    #[test]
    fn test_missing_column_is_missing_field() {
        let file = csv_file("employee_id,name,email\n1,A,a@example.com\n");
        let err = RecordSource::new(file.path()).rows().unwrap_err();
        match err {
            SourceError::MissingField { source, .. } => {
                assert_eq!(source, RecordError::MissingField("department"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_separates_invalid_rows() {
        let file = csv_file(&format!(
            "{HEADER}\n\
             1,A,a@example.com,D,X,1,2020-01-01\n\
             2,B,not-an-email,D,X,2,2020-01-01\n\
             3,C,c@example.com,D\n\
             4,D,d@example.com,D,X,4,2020-01-01\n"
        ));
        let loaded = RecordSource::new(file.path()).load().unwrap();

        assert_eq!(loaded.rows_read, 4);
        assert_eq!(
            loaded.records.iter().map(|r| r.employee_id).collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert_eq!(loaded.invalid.len(), 2);
        assert_eq!(loaded.invalid[0].line, 3);
        assert_eq!(loaded.invalid[0].error.field(), Some("email"));
        assert_eq!(loaded.invalid[1].line, 4);
        assert_eq!(loaded.invalid[1].error, RecordError::MissingField("salary"));
    }

    #[test]
    fn test_missing_file() {
        let err = RecordSource::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn test_extra_columns_and_header_whitespace() {
        let file = csv_file(
            " employee_id , name,email,department,designation,salary,date_of_joining,notes\n\
             9,I,i@example.com,D,X,9,2020-01-01,ignored\n",
        );
        let loaded = RecordSource::new(file.path()).load().unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.invalid.is_empty());
    }
}
