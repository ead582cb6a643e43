use std::fmt;

use super::model::{Institution, InstitutionTable, PRIVATE_NO, PRIVATE_YES};

// ---------------------------------------------------------------------------
// Filter controls
// ---------------------------------------------------------------------------

/// Which sector the cohort is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sector {
    #[default]
    All,
    PrivateOnly,
    PublicOnly,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::All, Sector::PrivateOnly, Sector::PublicOnly];

    /// Parse a selector label. Anything unrecognized means [`Sector::All`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "private" | "private only" | "private (non-profit)" => Sector::PrivateOnly,
            "public" | "public only" | "public (state)" => Sector::PublicOnly,
            _ => Sector::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sector::All => "All sectors",
            Sector::PrivateOnly => "Private (non-profit)",
            Sector::PublicOnly => "Public (state)",
        }
    }

    fn admits(self, record: &Institution) -> bool {
        match self {
            Sector::All => true,
            Sector::PrivateOnly => record.private == PRIVATE_YES,
            Sector::PublicOnly => record.private == PRIVATE_NO,
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive completion-rate bounds, applied exactly as given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRange {
    pub low: f64,
    pub high: f64,
}

impl Default for CompletionRange {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 100.0,
        }
    }
}

impl CompletionRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// NaN never falls inside a range.
    pub fn contains(&self, rate: f64) -> bool {
        self.low <= rate && rate <= self.high
    }
}

/// The active cohort definition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CohortFilter {
    pub sector: Sector,
    pub completion: CompletionRange,
}

impl CohortFilter {
    pub fn new(sector: Sector, completion: CompletionRange) -> Self {
        Self { sector, completion }
    }

    pub fn admits(&self, record: &Institution) -> bool {
        self.sector.admits(record) && self.completion.contains(record.completion_rate)
    }
}

// ---------------------------------------------------------------------------
// Applying the filter
// ---------------------------------------------------------------------------

/// Return indices of institutions that pass the filter, in table order.
pub fn filtered_indices(table: &InstitutionTable, filter: &CohortFilter) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.admits(record))
        .map(|(i, _)| i)
        .collect()
}

/// Build the cohort table: matching rows, every column.
///
/// An empty table comes back unchanged. No matches is an ordinary empty
/// result, not an error.
pub fn apply(table: &InstitutionTable, filter: &CohortFilter) -> InstitutionTable {
    if table.is_empty() {
        return table.clone();
    }
    table.select(&filtered_indices(table, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{institution, two_row_table};

    fn within(sector: Sector, low: f64, high: f64) -> CohortFilter {
        CohortFilter::new(sector, CompletionRange::new(low, high))
    }

    fn names(table: &InstitutionTable) -> Vec<&str> {
        table.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn private_only_keeps_yes_rows() {
        let table = two_row_table();
        let cohort = apply(&table, &within(Sector::PrivateOnly, 0.0, 100.0));
        assert_eq!(names(&cohort), ["A"]);
        assert_eq!(cohort.columns, table.columns);
    }

    #[test]
    fn public_only_keeps_no_rows() {
        let cohort = apply(
            &two_row_table(),
            &CohortFilter::new(Sector::PublicOnly, CompletionRange::default()),
        );
        assert_eq!(names(&cohort), ["B"]);
    }

    #[test]
    fn completion_range_is_inclusive() {
        let table = two_row_table();
        let cohort = apply(&table, &within(Sector::All, 50.0, 100.0));
        assert_eq!(names(&cohort), ["A"]);

        let edges = apply(&table, &within(Sector::All, 40.0, 90.0));
        assert_eq!(names(&edges), ["A", "B"]);
    }

    #[test]
    fn degenerate_ranges_are_applied_literally() {
        let table = two_row_table();
        let inverted = apply(&table, &within(Sector::All, 80.0, 20.0));
        assert!(inverted.is_empty());
        assert_eq!(inverted.columns, table.columns);

        let point = apply(&table, &within(Sector::All, 40.0, 40.0));
        assert_eq!(names(&point), ["B"]);
    }

    #[test]
    fn empty_table_passes_through() {
        let empty = InstitutionTable::empty();
        for sector in Sector::ALL {
            let out = apply(&empty, &CohortFilter::new(sector, CompletionRange::new(10.0, 20.0)));
            assert_eq!(out, empty);
        }
    }

    #[test]
    fn filtering_is_idempotent_and_never_grows() {
        let mut table = two_row_table();
        table
            .records
            .push(institution("C", "Yes", 50, 40, 65.0, [9000.0, 4000.0, 600.0, 900.0]));
        table
            .records
            .push(institution("D", "No", 80, 70, f64::NAN, [3000.0, 2500.0, 400.0, 800.0]));

        for sector in Sector::ALL {
            for (low, high) in [(0.0, 100.0), (50.0, 70.0), (95.0, 100.0)] {
                let filter = CohortFilter::new(sector, CompletionRange::new(low, high));
                let once = apply(&table, &filter);
                assert!(once.len() <= table.len());
                assert_eq!(apply(&once, &filter), once);
            }
        }
    }

    #[test]
    fn nan_completion_never_matches() {
        let mut table = two_row_table();
        table.records[0].completion_rate = f64::NAN;
        let cohort = apply(&table, &CohortFilter::default());
        assert_eq!(names(&cohort), ["B"]);
    }

    #[test]
    fn unrecognized_sector_label_means_all() {
        assert_eq!(Sector::from_label("bogus"), Sector::All);
        assert_eq!(Sector::from_label(""), Sector::All);
        assert_eq!(Sector::from_label("Private"), Sector::PrivateOnly);
        assert_eq!(Sector::from_label(" public "), Sector::PublicOnly);
        for sector in Sector::ALL {
            assert_eq!(Sector::from_label(sector.label()), sector);
        }
    }

    #[test]
    fn indices_preserve_order() {
        let mut table = two_row_table();
        table
            .records
            .insert(0, institution("Z", "Yes", 10, 5, 99.0, [1.0, 1.0, 1.0, 1.0]));
        let filter = CohortFilter::new(Sector::PrivateOnly, CompletionRange::default());
        assert_eq!(filtered_indices(&table, &filter), [0, 1]);
    }
}
