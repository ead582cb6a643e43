use crate::config::DashboardConfig;
use crate::data::model::{Institution, InstitutionTable};

use super::stats::{
    Bin, BinLayout, BoxSummary, LinearFit, cmp_finite_first, histogram, linear_fit, mean,
    median, pearson,
};

// ---------------------------------------------------------------------------
// Shared shapes
// ---------------------------------------------------------------------------

/// One value per sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorPair<T> {
    pub public: T,
    pub private: T,
}

impl<T> SectorPair<T> {
    /// Compute `f` for the public (`false`) and private (`true`) rows.
    fn split<'a>(
        cohort: &'a InstitutionTable,
        mut f: impl FnMut(Vec<&'a Institution>) -> T,
    ) -> Self {
        SectorPair {
            public: f(cohort.sector(false).collect()),
            private: f(cohort.sector(true).collect()),
        }
    }
}

/// A row of a ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub name: String,
    pub private: String,
    /// The ranked quantity.
    pub value: f64,
    /// Shown next to it for context.
    pub context: f64,
}

/// The `n` best rows by `key`, non-finite keys last, ties in table order.
fn rank(
    cohort: &InstitutionTable,
    n: usize,
    descending: bool,
    key: impl Fn(&Institution) -> f64,
    context: impl Fn(&Institution) -> f64,
) -> Vec<RankedRow> {
    let mut rows: Vec<&Institution> = cohort.records.iter().collect();
    rows.sort_by(|a, b| cmp_finite_first(key(a), key(b), descending));
    rows.into_iter()
        .take(n)
        .map(|r| RankedRow {
            name: r.name.clone(),
            private: r.private.clone(),
            value: key(r),
            context: context(r),
        })
        .collect()
}

fn finite_point(x: f64, y: f64) -> Option<[f64; 2]> {
    (x.is_finite() && y.is_finite()).then_some([x, y])
}

// ---------------------------------------------------------------------------
// Headline indicators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub institutions: usize,
    pub mean_completion: Option<f64>,
    /// Cohort mean completion minus the whole-dataset mean.
    pub completion_delta: Option<f64>,
    pub mean_total_cost: Option<f64>,
    pub mean_phd: Option<f64>,
}

impl Kpis {
    pub fn build(cohort: &InstitutionTable, base: &InstitutionTable) -> Self {
        let mean_completion = mean(cohort.values(|r| r.completion_rate));
        let baseline = mean(base.values(|r| r.completion_rate));
        Kpis {
            institutions: cohort.len(),
            mean_completion,
            completion_delta: mean_completion.zip(baseline).map(|(c, b)| c - b),
            mean_total_cost: mean(cohort.values(|r| r.total_cost)),
            mean_phd: mean(cohort.values(|r| r.phd_faculty_pct)),
        }
    }
}

// ---------------------------------------------------------------------------
// Benchmarks view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Benchmarks {
    /// Highest completion rate first; context is total cost.
    pub top_completion: Vec<RankedRow>,
    /// Lowest acceptance rate first; context is Top10perc.
    pub most_selective: Vec<RankedRow>,
    /// Lowest total cost first; context is completion rate.
    pub most_affordable: Vec<RankedRow>,
    pub completion_by_sector: SectorPair<Option<BoxSummary>>,
    /// (total cost, completion rate) per institution.
    pub cost_benefit: SectorPair<Vec<[f64; 2]>>,
}

impl Benchmarks {
    pub fn build(cohort: &InstitutionTable, top_n: usize) -> Self {
        Benchmarks {
            top_completion: rank(cohort, top_n, true, |r| r.completion_rate, |r| r.total_cost),
            most_selective: rank(cohort, top_n, false, |r| r.acceptance_rate, |r| r.top10_pct),
            most_affordable: rank(cohort, top_n, false, |r| r.total_cost, |r| r.completion_rate),
            completion_by_sector: SectorPair::split(cohort, |rows| {
                BoxSummary::from_values(rows.iter().map(|r| r.completion_rate))
            }),
            cost_benefit: SectorPair::split(cohort, |rows| {
                rows.iter()
                    .filter_map(|r| finite_point(r.total_cost, r.completion_rate))
                    .collect()
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Fiscal efficiency view
// ---------------------------------------------------------------------------

/// Expenditure vs completion marker, sized by enrolment.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub expenditure: f64,
    pub completion: f64,
    /// Full-time undergraduates / 30.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Efficiency {
    pub bubbles: SectorPair<Vec<Bubble>>,
    pub mean_expenditure: Option<f64>,
    pub mean_completion: Option<f64>,
    /// Label position for the high-cost / low-outcome quadrant.
    pub at_risk_anchor: Option<[f64; 2]>,
    /// Label position for the low-cost / high-outcome quadrant.
    pub high_performer_anchor: Option<[f64; 2]>,
}

impl Efficiency {
    pub fn build(cohort: &InstitutionTable) -> Self {
        let expend: Vec<f64> = cohort
            .values(|r| r.instructional_expenditure)
            .filter(|v| v.is_finite())
            .collect();
        let max = expend.iter().copied().reduce(f64::max);
        let min = expend.iter().copied().reduce(f64::min);

        Efficiency {
            bubbles: SectorPair::split(cohort, |rows| {
                rows.iter()
                    .filter(|r| {
                        finite_point(r.instructional_expenditure, r.completion_rate).is_some()
                    })
                    .map(|r| Bubble {
                        expenditure: r.instructional_expenditure,
                        completion: r.completion_rate,
                        size: r.full_time_undergrads / 30.0,
                    })
                    .collect()
            }),
            mean_expenditure: mean(expend.iter().copied()),
            mean_completion: mean(cohort.values(|r| r.completion_rate)),
            at_risk_anchor: max.map(|m| [m * 0.8, 10.0]),
            high_performer_anchor: min.map(|m| [m + 1000.0, 95.0]),
        }
    }
}

// ---------------------------------------------------------------------------
// Accessibility view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Accessibility {
    pub acceptance_by_sector: SectorPair<Option<BoxSummary>>,
    pub median_acceptance: SectorPair<Option<f64>>,
    pub mean_top10: Option<f64>,
}

impl Accessibility {
    pub fn build(cohort: &InstitutionTable) -> Self {
        Accessibility {
            acceptance_by_sector: SectorPair::split(cohort, |rows| {
                BoxSummary::from_values(rows.iter().map(|r| r.acceptance_rate))
            }),
            median_acceptance: SectorPair::split(cohort, |rows| {
                median(rows.iter().map(|r| r.acceptance_rate))
            }),
            mean_top10: mean(cohort.values(|r| r.top10_pct)),
        }
    }

    /// Mean Top10perc truncated to a whole percent, for the progress gauge.
    pub fn talent_share_pct(&self) -> Option<i64> {
        self.mean_top10.map(|m| m.trunc() as i64)
    }
}

// ---------------------------------------------------------------------------
// Instructional quality view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Quality {
    /// (PhD %, completion rate) per institution.
    pub phd_vs_completion: Vec<[f64; 2]>,
    pub fit: Option<LinearFit>,
    pub correlation: Option<f64>,
    /// Correlation is above the configured threshold.
    pub faculty_drives_completion: bool,
    pub ratio_histogram: SectorPair<Vec<Bin>>,
    pub mean_alumni_donation: SectorPair<Option<f64>>,
}

impl Quality {
    pub fn build(cohort: &InstitutionTable, bin_width: f64, threshold: f64) -> Self {
        let pairs: Vec<(f64, f64)> = cohort
            .records
            .iter()
            .map(|r| (r.phd_faculty_pct, r.completion_rate))
            .collect();
        let correlation = pearson(pairs.iter().copied());

        // Both sectors share one set of bins so the bars stack.
        let ratios: Vec<f64> = cohort
            .values(|r| r.student_faculty_ratio)
            .filter(|v| v.is_finite())
            .collect();
        let layout = match (
            ratios.iter().copied().reduce(f64::min),
            ratios.iter().copied().reduce(f64::max),
        ) {
            (Some(lo), Some(hi)) => BinLayout::new(lo, hi, bin_width),
            _ => BinLayout::default(),
        };

        Quality {
            phd_vs_completion: pairs
                .iter()
                .filter_map(|&(x, y)| finite_point(x, y))
                .collect(),
            fit: linear_fit(pairs.iter().copied()),
            correlation,
            faculty_drives_completion: correlation.is_some_and(|c| c > threshold),
            ratio_histogram: SectorPair::split(cohort, |rows| {
                histogram(rows.iter().map(|r| r.student_faculty_ratio), &layout)
            }),
            mean_alumni_donation: SectorPair::split(cohort, |rows| {
                mean(rows.iter().map(|r| r.alumni_donation_pct))
            }),
        }
    }

    /// Smallest and largest PhD share plotted, for drawing the fit line.
    pub fn phd_span(&self) -> Option<(f64, f64)> {
        let xs = self.phd_vs_completion.iter().map(|p| p[0]);
        let lo = xs.clone().reduce(f64::min)?;
        let hi = xs.reduce(f64::max)?;
        Some((lo, hi))
    }
}

// ---------------------------------------------------------------------------
// Everything the dashboard shows for one cohort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub kpis: Kpis,
    pub benchmarks: Benchmarks,
    pub efficiency: Efficiency,
    pub accessibility: Accessibility,
    pub quality: Quality,
}

impl DashboardReport {
    /// `None` for an empty cohort: there is nothing to aggregate.
    pub fn build(
        cohort: &InstitutionTable,
        base: &InstitutionTable,
        config: &DashboardConfig,
    ) -> Option<Self> {
        if cohort.is_empty() {
            return None;
        }
        Some(DashboardReport {
            kpis: Kpis::build(cohort, base),
            benchmarks: Benchmarks::build(cohort, config.top_n),
            efficiency: Efficiency::build(cohort),
            accessibility: Accessibility::build(cohort),
            quality: Quality::build(cohort, config.ratio_bin_width, config.correlation_threshold),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{CohortFilter, CompletionRange, Sector, apply};
    use crate::data::model::tests::{institution, two_row_table};
    use crate::report::stats::MAX_BINS;

    fn four_rows() -> InstitutionTable {
        let mut table = two_row_table();
        table.records[0].phd_faculty_pct = 85.0;
        table.records[1].phd_faculty_pct = 45.0;
        let mut c = institution("C", "Yes", 50, 40, 65.0, [9000.0, 4000.0, 600.0, 900.0]);
        c.phd_faculty_pct = 90.0;
        c.student_faculty_ratio = 11.0;
        let mut d = institution("D", "No", 0, 0, 55.0, [3000.0, 2500.0, 400.0, 800.0]);
        d.phd_faculty_pct = 50.0;
        d.student_faculty_ratio = 19.0;
        table.records.push(c);
        table.records.push(d);
        table
    }

    #[test]
    fn empty_cohort_has_no_report() {
        let base = two_row_table();
        let filter = CohortFilter::new(Sector::All, CompletionRange::new(95.0, 100.0));
        let cohort = apply(&base, &filter);
        assert!(DashboardReport::build(&cohort, &base, &DashboardConfig::default()).is_none());
    }

    #[test]
    fn kpis_compare_against_baseline() {
        let base = two_row_table();
        let filter = CohortFilter::new(Sector::PrivateOnly, CompletionRange::default());
        let cohort = apply(&base, &filter);
        let kpis = Kpis::build(&cohort, &base);
        assert_eq!(kpis.institutions, 1);
        assert_eq!(kpis.mean_completion, Some(90.0));
        assert_eq!(kpis.completion_delta, Some(25.0));
        assert_eq!(kpis.mean_total_cost, Some(16000.0));
    }

    #[test]
    fn rankings_order_and_truncate() {
        let table = four_rows();
        let b = Benchmarks::build(&table, 3);

        let top: Vec<_> = b.top_completion.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(top, ["A", "C", "D"]);

        // D has no applications, so its undefined rate ranks last.
        let selective: Vec<_> = b.most_selective.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(selective, ["A", "B", "C"]);
        assert_eq!(b.most_selective[0].value, 20.0);
        assert_eq!(b.most_selective[0].context, 25.0);

        let cheap: Vec<_> = b.most_affordable.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(cheap, ["B", "D", "C"]);
    }

    #[test]
    fn sector_splits_follow_private_flag() {
        let b = Benchmarks::build(&four_rows(), 10);
        assert_eq!(b.cost_benefit.private, [[16000.0, 90.0], [14500.0, 65.0]]);
        assert_eq!(b.cost_benefit.public.len(), 2);
        assert_eq!(b.completion_by_sector.private.as_ref().map(|s| s.median), Some(77.5));
    }

    #[test]
    fn efficiency_anchors_follow_expenditure() {
        let mut table = two_row_table();
        table.records[0].instructional_expenditure = 20000.0;
        table.records[1].instructional_expenditure = 5000.0;
        let e = Efficiency::build(&table);
        assert_eq!(e.at_risk_anchor, Some([16000.0, 10.0]));
        assert_eq!(e.high_performer_anchor, Some([6000.0, 95.0]));
        assert_eq!(e.mean_expenditure, Some(12500.0));
        assert_eq!(e.bubbles.private[0].size, 50.0);
    }

    #[test]
    fn accessibility_medians_skip_undefined_rates() {
        let a = Accessibility::build(&four_rows());
        assert_eq!(a.median_acceptance.public, Some(75.0));
        assert_eq!(a.median_acceptance.private, Some(50.0));
        assert_eq!(a.talent_share_pct(), Some(25));
    }

    #[test]
    fn quality_correlation_and_histogram() {
        let q = Quality::build(&four_rows(), 2.0, 0.3);
        let corr = q.correlation.unwrap();
        assert!(corr > 0.3);
        assert!(q.faculty_drives_completion);
        assert!(q.fit.is_some_and(|f| f.slope > 0.0));
        assert_eq!(q.phd_span(), Some((45.0, 90.0)));

        let public: usize = q.ratio_histogram.public.iter().map(|b| b.count).sum();
        let private: usize = q.ratio_histogram.private.iter().map(|b| b.count).sum();
        assert_eq!((public, private), (2, 2));
        assert_eq!(q.ratio_histogram.public.len(), q.ratio_histogram.private.len());
        assert_eq!(q.mean_alumni_donation.private, Some(20.0));
    }

    #[test]
    fn noisy_ratio_keeps_histogram_bounded() {
        let mut table = four_rows();
        table.records[3].student_faculty_ratio = 4.0e11;
        let q = Quality::build(&table, 2.0, 0.3);

        assert!(q.ratio_histogram.public.len() <= MAX_BINS);
        assert_eq!(q.ratio_histogram.public.len(), q.ratio_histogram.private.len());
        let total: usize = q
            .ratio_histogram
            .public
            .iter()
            .chain(&q.ratio_histogram.private)
            .map(|b| b.count)
            .sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn flat_data_is_not_called_a_driver() {
        let q = Quality::build(&two_row_table(), 2.0, 0.3);
        // Both rows share one PhD share, so there is no correlation to speak of.
        assert_eq!(q.correlation, None);
        assert!(!q.faculty_drives_completion);
    }
}
