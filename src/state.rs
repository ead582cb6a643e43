use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::filter::{self, CohortFilter, CompletionRange, Sector};
use crate::data::model::InstitutionTable;
use crate::data::source::DataSource;
use crate::report::views::DashboardReport;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The four thematic views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Benchmarks,
    FiscalEfficiency,
    Accessibility,
    InstructionalQuality,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Benchmarks,
        View::FiscalEfficiency,
        View::Accessibility,
        View::InstructionalQuality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Benchmarks => "📊 National Performance Benchmarks",
            View::FiscalEfficiency => "💵 Fiscal Efficiency & ROI",
            View::Accessibility => "🔓 Accessibility & Pathway Equity",
            View::InstructionalQuality => "🎓 Instructional Capacity & Quality",
        }
    }
}

/// Tabs of the benchmark rankings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BenchmarkTab {
    #[default]
    TopCompletion,
    MostSelective,
    MostAffordable,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Where the base table comes from; read once.
    pub source: DataSource,

    /// Whole dataset, shared read-only with every cohort computation.
    pub base: Arc<InstitutionTable>,

    /// Active sector and completion-rate selection.
    pub filter: CohortFilter,

    /// Rows of `base` passing `filter` (recomputed on every control change).
    pub cohort: InstitutionTable,

    /// Statistics for `cohort`; `None` when the cohort is empty.
    pub report: Option<DashboardReport>,

    pub view: View,
    pub benchmark_tab: BenchmarkTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let source = DataSource::new(config.data_path.clone());
        let filter = CohortFilter::new(
            Sector::from_label(&config.initial_sector),
            CompletionRange::default(),
        );
        let mut state = Self {
            config,
            source,
            base: Arc::new(InstitutionTable::empty()),
            filter,
            cohort: InstitutionTable::empty(),
            report: None,
            view: View::default(),
            benchmark_tab: BenchmarkTab::default(),
            status_message: None,
        };
        state.reload();
        state
    }

    /// Pull the base table from the source and rebuild the cohort.
    pub fn reload(&mut self) {
        if self.source.is_cached() {
            log::debug!(
                "Reload keeps the table already read from {}",
                self.source.path().display()
            );
        }
        let loaded = self.source.load();
        self.status_message = match loaded.warning {
            Some(e) if e.is_missing_source() => Some(format!(
                "⚠ Data source not found. Make sure '{}' is in the working directory.",
                self.source.path().display()
            )),
            Some(e) => Some(format!("Error: {e}")),
            None if !loaded.table.missing.is_empty() => Some(format!(
                "⚠ Missing columns: {}. Charts that need them are empty.",
                loaded.table.missing.join(", ")
            )),
            None => None,
        };
        self.base = loaded.table;
        self.refilter();
    }

    /// Point the dashboard at another file, keeping the filter.
    pub fn open_path(&mut self, path: PathBuf) {
        if path.as_path() != self.source.path() {
            self.source = DataSource::new(path);
        }
        self.reload();
    }

    /// Whether the source failed to produce any rows.
    pub fn has_data(&self) -> bool {
        !self.base.is_empty()
    }

    /// Recompute `cohort` and `report` after a filter change.
    pub fn refilter(&mut self) {
        self.cohort = filter::apply(&self.base, &self.filter);
        self.report = DashboardReport::build(&self.cohort, &self.base, &self.config);
        log::debug!(
            "Cohort {:?}: {} of {} institutions",
            self.filter,
            self.cohort.len(),
            self.base.len()
        );
    }

    pub fn set_sector(&mut self, sector: Sector) {
        if self.filter.sector != sector {
            self.filter.sector = sector;
            self.refilter();
        }
    }

    pub fn set_completion_range(&mut self, range: CompletionRange) {
        if self.filter.completion != range {
            self.filter.completion = range;
            self.refilter();
        }
    }
}
