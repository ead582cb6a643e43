use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::error::LoadError;
use super::loader::read_table;
use super::model::InstitutionTable;

// ---------------------------------------------------------------------------
// DataSource – one input file, read at most once
// ---------------------------------------------------------------------------

/// Result of [`DataSource::load`]: always a table, plus the reason when that
/// table is the empty stand-in for a failed read.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Arc<InstitutionTable>,
    pub warning: Option<Arc<LoadError>>,
}

/// A lazily loaded, immutable institution table bound to one path.
///
/// The first successful read is kept for the lifetime of the value and every
/// later [`load`](Self::load) hands out the same `Arc`. Failed reads are not
/// kept, so the next call tries the file again.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    table: OnceLock<Arc<InstitutionTable>>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a table has already been read successfully.
    pub fn is_cached(&self) -> bool {
        self.table.get().is_some()
    }

    /// Return the normalized table, reading the file on first use.
    ///
    /// Never fails: any [`LoadError`] becomes an empty table and a warning.
    pub fn load(&self) -> Loaded {
        if let Some(table) = self.table.get() {
            log::debug!("Serving {} from cache", self.path.display());
            return Loaded {
                table: Arc::clone(table),
                warning: None,
            };
        }

        match read_table(&self.path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} institutions with {} columns from {}",
                    table.len(),
                    table.columns.len(),
                    self.path.display()
                );
                if !table.missing.is_empty() {
                    log::warn!(
                        "{} lacks {}; dependent charts stay empty",
                        self.path.display(),
                        table.missing.join(", ")
                    );
                }
                let table = self.table.get_or_init(|| Arc::new(table));
                Loaded {
                    table: Arc::clone(table),
                    warning: None,
                }
            }
            Err(e) => {
                log::warn!("Failed to load {}: {e}", self.path.display());
                Loaded {
                    table: Arc::new(InstitutionTable::empty()),
                    warning: Some(Arc::new(e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::write_two_row_csv;

    #[test]
    fn second_load_returns_the_same_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::new(write_two_row_csv(&dir));

        let first = source.load();
        assert!(first.warning.is_none());
        assert_eq!(first.table.len(), 2);

        // The file is gone, the cache is not.
        std::fs::remove_file(source.path()).unwrap();
        let second = source.load();
        assert!(Arc::ptr_eq(&first.table, &second.table));
    }

    #[test]
    fn missing_file_yields_empty_table_and_warning() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::new(dir.path().join("Kmeans_assignment_data.csv"));

        let loaded = source.load();
        assert!(loaded.table.is_empty());
        assert!(loaded.table.columns.is_empty());
        assert!(loaded.warning.as_deref().is_some_and(LoadError::is_missing_source));
        assert!(!source.is_cached());
    }

    #[test]
    fn failure_is_retried_once_the_file_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colleges.csv");
        let source = DataSource::new(&path);
        assert!(source.load().table.is_empty());

        let written = write_two_row_csv(&dir);
        assert_eq!(written, path);
        let loaded = source.load();
        assert_eq!(loaded.table.len(), 2);
        assert!(source.is_cached());
    }

    #[test]
    fn separate_sources_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_two_row_csv(&dir);
        let a = DataSource::new(&path).load();
        let b = DataSource::new(&path).load();
        assert!(!Arc::ptr_eq(&a.table, &b.table));
        assert_eq!(a.table, b.table);
    }
}
