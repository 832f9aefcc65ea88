//! Read shapes returned by the journal and printed as JSON by the `stride` CLI.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Entry, Interpretation};

/// An entry with at most its most recent interpretation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EntryWithLatest {
    pub entry: Entry,
    pub latest: Option<Interpretation>,
}

/// An entry with its full interpretation history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EntryDetail {
    pub entry: Entry,
    pub interpretations: Vec<Interpretation>,
}

impl EntryDetail {
    /// The authoritative interpretation, if any analysis has completed.
    #[must_use]
    pub fn latest(&self) -> Option<&Interpretation> {
        self.interpretations.first()
    }
}

/// Outcome of reanalyzing several entries outside the queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BatchReport {
    pub requested: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
