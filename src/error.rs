//! Error types for pipeline stages.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal stage errors. Each variant carries enough context to name the
/// offending input and point at the upstream stage to (re-)run.
///
/// Empty inputs are deliberately not represented here: a stage that receives
/// zero rows degrades to an empty output and logs it, rather than failing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required upstream output does not exist.
    #[error("required input not found at {}; {hint}", path.display())]
    MissingArtifact { path: PathBuf, hint: &'static str },

    /// A required table is absent from the database.
    #[error("table `{table}` does not exist; {hint}")]
    MissingTable { table: &'static str, hint: &'static str },

    /// A required column is absent from an input table or CSV header.
    #[error("input `{table}` is missing required column `{column}`")]
    SchemaMismatch { table: String, column: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn missing_artifact(path: impl Into<PathBuf>, hint: &'static str) -> Self {
        Self::MissingArtifact {
            path: path.into(),
            hint,
        }
    }

    pub fn schema_mismatch(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            column: column.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_message_names_path_and_stage() {
        let err = PipelineError::missing_artifact(
            "data/raw/orders.csv",
            "run the data generation stage first",
        );
        let msg = err.to_string();
        assert!(msg.contains("data/raw/orders.csv"));
        assert!(msg.contains("run the data generation stage first"));
    }

    #[test]
    fn test_schema_mismatch_message_names_table_and_column() {
        let err = PipelineError::schema_mismatch("orders", "order_date");
        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("order_date"));
    }
}
