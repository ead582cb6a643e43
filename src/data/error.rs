use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while turning a source file into an
/// [`InstitutionTable`](super::model::InstitutionTable).
///
/// None of these reach the UI as a failure: [`DataSource::load`](super::source::DataSource::load)
/// converts them into an empty table plus a warning.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data source not found: {}", path.display())]
    DataSourceMissing { path: PathBuf },

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("row {row}, column '{column}': '{value}' is not a valid value")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("reading delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0:#}")]
    Malformed(#[from] anyhow::Error),
}

impl LoadError {
    /// Whether this is the "file not found" case, which the UI words differently.
    pub fn is_missing_source(&self) -> bool {
        matches!(self, LoadError::DataSourceMissing { .. })
    }
}
