//! High-level consultation API.
//!
//! Wraps the destiny table and the backend source into a single entry
//! point: validate the submitted year, resolve its element, fetch the
//! relation payload, and assemble the complete view-model.

use crate::destiny::{DestinyElement, DestinyTable};
use crate::source::RelationSource;
use koi_api::RelationEntry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from running a consultation.
#[derive(Debug, Error)]
pub enum ConsultationError {
    /// The submitted year was absent or not a parseable integer.
    /// Detected before any network call is made.
    #[error("Invalid year. Please select a valid year.")]
    InvalidYear,

    /// A relation fetch failed while assembling the result. Nothing
    /// partial is produced; the backend message travels with the error.
    #[error("Relation lookup failed: {0}")]
    RelationFetchFailed(#[from] koi_api::Error),
}

/// Complete consultation view-model for one birth year.
///
/// Constructed only when both relation entries resolved; a consultation
/// is never rendered half-populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationResult {
    /// The target destiny element.
    pub destiny: DestinyElement,
    /// Name of the element that generates the destiny.
    pub generating: String,
    /// Attributes of the generating element.
    pub generation: RelationEntry,
    /// Attributes of the destiny itself.
    pub own: RelationEntry,
}

/// Year-based consultation service.
pub struct Consultant<S> {
    source: S,
    table: DestinyTable,
}

impl<S: RelationSource> Consultant<S> {
    /// Create a consultant over the given backend source, using the
    /// default destiny table.
    pub fn new(source: S) -> Self {
        Self {
            source,
            table: DestinyTable::default(),
        }
    }

    /// Replace the year lookup table.
    pub fn with_table(mut self, table: DestinyTable) -> Self {
        self.table = table;
        self
    }

    /// The year lookup table in use.
    pub fn table(&self) -> &DestinyTable {
        &self.table
    }

    /// Run a consultation for raw form input.
    ///
    /// Empty or non-numeric input fails with [`ConsultationError::InvalidYear`]
    /// without touching the backend.
    pub async fn consult(&self, input: &str) -> Result<ConsultationResult, ConsultationError> {
        let year: i32 = input
            .trim()
            .parse()
            .map_err(|_| ConsultationError::InvalidYear)?;
        self.consult_year(year).await
    }

    /// Run a consultation for an already-validated year.
    pub async fn consult_year(&self, year: i32) -> Result<ConsultationResult, ConsultationError> {
        let destiny = self.table.resolve(year);
        let payload = self.source.consultation_by_year(year).await?;

        if payload.destiny != destiny.name() {
            tracing::warn!(
                year,
                resolved = destiny.name(),
                backend = %payload.destiny,
                "backend destiny disagrees with lookup table"
            );
        }

        Ok(ConsultationResult {
            destiny,
            generating: payload.generating,
            generation: payload.generation,
            own: payload.own,
        })
    }
}
