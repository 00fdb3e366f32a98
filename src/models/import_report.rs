//! CSV import outcome

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One rejected CSV row; `row` is the 1-based line number in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Report returned by every CSV import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportResult {
    pub success: bool,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

impl ImportResult {
    pub fn record_success(&mut self) {
        self.imported += 1;
    }

    pub fn record_failure(&mut self, row: usize, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(RowError {
            row,
            message: message.into(),
        });
    }

    /// Seal the report; the import counts as successful when no row failed.
    pub fn finish(mut self) -> Self {
        self.success = self.failed == 0;
        self
    }
}
