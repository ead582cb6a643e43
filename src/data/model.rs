use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Header given to the first source column, whatever it was called.
pub const NAME_COLUMN: &str = "Institution";
/// Derived: `Accept / Apps * 100`.
pub const ACCEPTANCE_RATE_COLUMN: &str = "Acceptance.Rate";
/// Derived: `Outstate + Room.Board + Books + Personal`.
pub const TOTAL_COST_COLUMN: &str = "Total.Cost";

pub const PRIVATE_COLUMN: &str = "Private";
pub const APPS_COLUMN: &str = "Apps";
pub const ACCEPT_COLUMN: &str = "Accept";
pub const ENROLL_COLUMN: &str = "Enroll";
pub const GRAD_RATE_COLUMN: &str = "Grad.Rate";
pub const OUTSTATE_COLUMN: &str = "Outstate";
pub const ROOM_BOARD_COLUMN: &str = "Room.Board";
pub const BOOKS_COLUMN: &str = "Books";
pub const PERSONAL_COLUMN: &str = "Personal";
pub const EXPEND_COLUMN: &str = "Expend";
pub const F_UNDERGRAD_COLUMN: &str = "F.Undergrad";
pub const PHD_COLUMN: &str = "PhD";
pub const TOP10_COLUMN: &str = "Top10perc";
pub const ALUMNI_COLUMN: &str = "perc.alumni";
pub const SF_RATIO_COLUMN: &str = "S.F.Ratio";

/// Columns only some views read. A missing one loads as NaN on every row and
/// is listed in [`InstitutionTable::missing`]. Every other typed column is
/// required.
pub const VIEW_COLUMNS: [&str; 6] = [
    EXPEND_COLUMN,
    F_UNDERGRAD_COLUMN,
    PHD_COLUMN,
    TOP10_COLUMN,
    ALUMNI_COLUMN,
    SF_RATIO_COLUMN,
];

/// Source value of `Private` for privately controlled institutions.
pub const PRIVATE_YES: &str = "Yes";
/// Source value of `Private` for publicly controlled institutions.
pub const PRIVATE_NO: &str = "No";

// ---------------------------------------------------------------------------
// MetadataValue – a single untyped cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as read from CSV text or an Arrow column.
///
/// Required columns are converted into typed [`Institution`] fields; every
/// other column keeps its cells in this form so nothing is dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => Ok(()),
        }
    }
}

impl MetadataValue {
    /// Numeric view of the cell. `Null` reads as NaN, text as `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            MetadataValue::Null => Some(f64::NAN),
            _ => None,
        }
    }

    /// Non-negative whole number, accepting integral floats like `120.0`.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            MetadataValue::Integer(i) => u32::try_from(*i).ok(),
            MetadataValue::Float(v) if v.is_finite() && v.fract() == 0.0 && *v >= 0.0 => {
                (*v <= u32::MAX as f64).then_some(*v as u32)
            }
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Institution – one row of the table
// ---------------------------------------------------------------------------

/// A single institution (one row of the source table) with its derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Institution {
    pub name: String,
    /// Sector flag exactly as it appears in the source ("Yes" / "No").
    pub private: String,
    /// `None` for an empty cell.
    pub applications: Option<u32>,
    pub accepted: Option<u32>,
    pub enrolled: Option<u32>,
    /// `Grad.Rate`; not clamped to [0, 100].
    pub completion_rate: f64,
    pub out_of_state_tuition: f64,
    pub room_board: f64,
    pub books: f64,
    pub personal: f64,
    pub instructional_expenditure: f64,
    pub full_time_undergrads: f64,
    pub phd_faculty_pct: f64,
    pub top10_pct: f64,
    pub alumni_donation_pct: f64,
    pub student_faculty_ratio: f64,
    /// Percentage of applicants accepted. NaN or infinite when there were no
    /// applications, NaN when either count is missing.
    pub acceptance_rate: f64,
    /// Annual cost of attendance.
    pub total_cost: f64,
    /// Source columns that have no typed field, by header.
    pub extra: BTreeMap<String, MetadataValue>,
}

impl Institution {
    /// `accepted / applications * 100`, with IEEE semantics for zero applications.
    /// A missing count reads as NaN.
    pub fn acceptance_rate_of(accepted: Option<u32>, applications: Option<u32>) -> f64 {
        let as_f64 = |n: Option<u32>| n.map_or(f64::NAN, f64::from);
        as_f64(accepted) / as_f64(applications) * 100.0
    }

    /// Sum of the four annual cost components, left to right.
    pub fn total_cost_of(tuition: f64, room_board: f64, books: f64, personal: f64) -> f64 {
        tuition + room_board + books + personal
    }

    /// `Some(true)` for "Yes", `Some(false)` for "No", `None` for anything else.
    pub fn is_private(&self) -> Option<bool> {
        match self.private.as_str() {
            PRIVATE_YES => Some(true),
            PRIVATE_NO => Some(false),
            _ => None,
        }
    }

    /// Display value of any column of the table, typed or extra.
    pub fn cell(&self, column: &str) -> MetadataValue {
        match column {
            NAME_COLUMN => MetadataValue::String(self.name.clone()),
            PRIVATE_COLUMN => MetadataValue::String(self.private.clone()),
            APPS_COLUMN => count_cell(self.applications),
            ACCEPT_COLUMN => count_cell(self.accepted),
            ENROLL_COLUMN => count_cell(self.enrolled),
            GRAD_RATE_COLUMN => MetadataValue::Float(self.completion_rate),
            OUTSTATE_COLUMN => MetadataValue::Float(self.out_of_state_tuition),
            ROOM_BOARD_COLUMN => MetadataValue::Float(self.room_board),
            BOOKS_COLUMN => MetadataValue::Float(self.books),
            PERSONAL_COLUMN => MetadataValue::Float(self.personal),
            EXPEND_COLUMN => MetadataValue::Float(self.instructional_expenditure),
            F_UNDERGRAD_COLUMN => MetadataValue::Float(self.full_time_undergrads),
            PHD_COLUMN => MetadataValue::Float(self.phd_faculty_pct),
            TOP10_COLUMN => MetadataValue::Float(self.top10_pct),
            ALUMNI_COLUMN => MetadataValue::Float(self.alumni_donation_pct),
            SF_RATIO_COLUMN => MetadataValue::Float(self.student_faculty_ratio),
            ACCEPTANCE_RATE_COLUMN => MetadataValue::Float(self.acceptance_rate),
            TOTAL_COST_COLUMN => MetadataValue::Float(self.total_cost),
            other => self.extra.get(other).cloned().unwrap_or(MetadataValue::Null),
        }
    }
}

fn count_cell(n: Option<u32>) -> MetadataValue {
    n.map_or(MetadataValue::Null, |n| MetadataValue::Integer(i64::from(n)))
}

// ---------------------------------------------------------------------------
// InstitutionTable – the normalized dataset
// ---------------------------------------------------------------------------

/// An ordered table of institutions plus its column header.
///
/// `columns` lists every column a record carries, in source order with the
/// first entry renamed to [`NAME_COLUMN`] and the two derived columns last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstitutionTable {
    pub columns: Vec<String>,
    pub records: Vec<Institution>,
    /// Entries of [`VIEW_COLUMNS`] absent from the source, filled with NaN.
    pub missing: Vec<String>,
}

impl InstitutionTable {
    /// Zero rows, zero columns: what a failed load resolves to.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of institutions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New table holding the rows at `indices`, in that order, with every column.
    pub fn select(&self, indices: &[usize]) -> Self {
        InstitutionTable {
            columns: self.columns.clone(),
            missing: self.missing.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Iterate one numeric field over all rows.
    pub fn values<'a, F>(&'a self, field: F) -> impl Iterator<Item = f64> + 'a
    where
        F: Fn(&Institution) -> f64 + 'a,
    {
        self.records.iter().map(field)
    }

    /// Rows of one sector (`true` = private), by exact source flag.
    pub fn sector(&self, private: bool) -> impl Iterator<Item = &Institution> {
        self.records
            .iter()
            .filter(move |r| r.is_private() == Some(private))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a record from the fields the filter tests vary; the rest are
    /// neutral numbers.
    pub(crate) fn institution(
        name: &str,
        private: &str,
        apps: u32,
        accept: u32,
        grad: f64,
        costs: [f64; 4],
    ) -> Institution {
        Institution {
            name: name.to_string(),
            private: private.to_string(),
            applications: Some(apps),
            accepted: Some(accept),
            enrolled: None,
            completion_rate: grad,
            out_of_state_tuition: costs[0],
            room_board: costs[1],
            books: costs[2],
            personal: costs[3],
            instructional_expenditure: 8000.0,
            full_time_undergrads: 1500.0,
            phd_faculty_pct: 70.0,
            top10_pct: 25.0,
            alumni_donation_pct: 20.0,
            student_faculty_ratio: 14.0,
            acceptance_rate: Institution::acceptance_rate_of(Some(accept), Some(apps)),
            total_cost: Institution::total_cost_of(costs[0], costs[1], costs[2], costs[3]),
            extra: BTreeMap::new(),
        }
    }

    pub(crate) fn two_row_table() -> InstitutionTable {
        InstitutionTable {
            columns: vec![
                NAME_COLUMN.to_string(),
                PRIVATE_COLUMN.to_string(),
                ACCEPTANCE_RATE_COLUMN.to_string(),
                TOTAL_COST_COLUMN.to_string(),
            ],
            records: vec![
                institution("A", "Yes", 100, 20, 90.0, [10000.0, 5000.0, 500.0, 500.0]),
                institution("B", "No", 200, 150, 40.0, [2000.0, 3000.0, 300.0, 200.0]),
            ],
            missing: Vec::new(),
        }
    }

    #[test]
    fn zero_applications_is_non_finite() {
        assert!(Institution::acceptance_rate_of(Some(0), Some(0)).is_nan());
        assert!(Institution::acceptance_rate_of(Some(5), Some(0)).is_infinite());
        assert_eq!(Institution::acceptance_rate_of(Some(20), Some(100)), 20.0);
    }

    #[test]
    fn missing_count_gives_nan_rate() {
        assert!(Institution::acceptance_rate_of(Some(20), None).is_nan());
        assert!(Institution::acceptance_rate_of(None, Some(100)).is_nan());
    }

    #[test]
    fn select_keeps_columns_and_order() {
        let table = two_row_table();
        let picked = table.select(&[1, 0, 7]);
        assert_eq!(picked.columns, table.columns);
        let names: Vec<_> = picked.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn sector_matches_exact_flag() {
        let mut table = two_row_table();
        table.records[1].private = "no".to_string();
        assert_eq!(table.sector(true).count(), 1);
        assert_eq!(table.sector(false).count(), 0);
    }

    #[test]
    fn count_accepts_integral_floats_only() {
        assert_eq!(MetadataValue::Float(120.0).as_count(), Some(120));
        assert_eq!(MetadataValue::Float(1.5).as_count(), None);
        assert_eq!(MetadataValue::Integer(-1).as_count(), None);
        assert_eq!(MetadataValue::Null.as_count(), None);
    }

    #[test]
    fn cell_reads_typed_and_extra_columns() {
        let mut record = two_row_table().records.remove(0);
        record
            .extra
            .insert("Terminal".to_string(), MetadataValue::Integer(78));
        assert_eq!(record.cell(NAME_COLUMN).to_string(), "A");
        assert_eq!(record.cell(TOTAL_COST_COLUMN), MetadataValue::Float(16000.0));
        assert_eq!(record.cell("Terminal"), MetadataValue::Integer(78));
        assert!(record.cell("Nope").is_null());

        record.applications = None;
        assert!(record.cell(APPS_COLUMN).is_null());
        assert_eq!(record.cell(ACCEPT_COLUMN), MetadataValue::Integer(20));
    }
}
