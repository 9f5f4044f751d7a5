use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    Drivers,
    Vehicles,
    Schedules,
}

/// A CSV row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line in the file, header included.
    pub line: usize,
    pub reason: String,
}

/// Parsed records plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport<T> {
    pub kind: ImportKind,
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> ImportReport<T> {
    pub fn new(kind: ImportKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn skip(&mut self, line: usize, reason: impl Into<String>) {
        self.skipped.push(SkippedRow {
            line,
            reason: reason.into(),
        });
    }
}
