mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use crate::tracking::domain::EnrichedPerson;

/// One importable roster entry: who to track and for which company.
#[derive(Debug, Clone)]
pub struct RosterImportRecord {
    pub original_company: String,
    pub person: EnrichedPerson,
}

/// Outcome of parsing one export file.
#[derive(Debug)]
pub struct RosterImport {
    pub records: Vec<RosterImportRecord>,
    /// Rows dropped for missing a person id or any usable company.
    pub skipped_rows: usize,
}

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads an enrichment-tool CSV export into trackable roster records.
pub struct RosterCsvImporter;

impl RosterCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RosterImport, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RosterImport, RosterImportError> {
        let mut records = Vec::new();
        let mut skipped_rows = 0;

        for row in parser::parse_rows(reader)? {
            match row {
                Some(row) => records.push(RosterImportRecord {
                    original_company: row.tracked_company,
                    person: row.person,
                }),
                None => skipped_rows += 1,
            }
        }

        Ok(RosterImport {
            records,
            skipped_rows,
        })
    }
}
