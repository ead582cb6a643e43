use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::{DANGER, Gradient, PRIMARY, SECONDARY};
use crate::report::views::{Accessibility, Benchmarks, DashboardReport, Efficiency, Quality};
use crate::state::{AppState, BenchmarkTab, View};
use crate::ui::plot;
use crate::ui::tables::{self, RankingStyle, dollars, percent};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected view for the current cohort.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if !state.has_data() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an institution table to begin  (File → Open…)");
        });
        return;
    }

    // An empty cohort has no report; nothing below would be meaningful.
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new(
                    "⚠ No institutions match these filters. Adjust the cohort segmentation.",
                )
                .color(DANGER)
                .size(18.0),
            );
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(
                RichText::new("🇺🇸 National Higher Education Performance Matrix")
                    .color(PRIMARY)
                    .strong(),
            );
            ui.label(
                RichText::new("Strategic intelligence summary for education policy makers")
                    .color(SECONDARY)
                    .strong(),
            );
            ui.add_space(8.0);

            tables::kpi_row(ui, &report.kpis);
            ui.separator();

            match state.view {
                View::Benchmarks => benchmarks(ui, report, &mut state.benchmark_tab),
                View::FiscalEfficiency => efficiency(ui, &report.efficiency),
                View::Accessibility => accessibility(ui, &report.accessibility),
                View::InstructionalQuality => quality(
                    ui,
                    &report.quality,
                    state.config.correlation_threshold,
                ),
            }

            ui.separator();
            let title = format!("🗂 Cohort data ({} institutions)", state.cohort.len());
            egui::CollapsingHeader::new(title)
                .default_open(false)
                .show(ui, |ui: &mut Ui| tables::cohort_table(ui, &state.cohort));
        });
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn benchmarks(ui: &mut Ui, report: &DashboardReport, tab: &mut BenchmarkTab) {
    let b: &Benchmarks = &report.benchmarks;
    ui.heading("📊 Strategic benchmarks & rankings");
    ui.label(
        "Where is the gap between the cost of education and student success? \
         Look for institutions that graduate students without a heavy financial burden.",
    );
    ui.add_space(6.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(tab, BenchmarkTab::TopCompletion, "🎓 High performers");
        ui.selectable_value(tab, BenchmarkTab::MostSelective, "💎 Elite selectivity");
        ui.selectable_value(tab, BenchmarkTab::MostAffordable, "📉 Affordability leaders");
    });

    let n = report.benchmarks.top_completion.len();
    match tab {
        BenchmarkTab::TopCompletion => {
            ui.strong(format!("🏆 Top {n} institutions by completion rate"));
            tables::ranking_table(
                ui,
                "top_completion",
                &b.top_completion,
                &RankingStyle {
                    value_header: "Completion rate",
                    context_header: "Total cost",
                    format_value: |v| percent(v, 1),
                    format_context: dollars,
                    gradient: Gradient::Blues,
                    reversed: false,
                },
            );
        }
        BenchmarkTab::MostSelective => {
            ui.strong(format!("🔒 {n} most selective institutions"));
            tables::ranking_table(
                ui,
                "most_selective",
                &b.most_selective,
                &RankingStyle {
                    value_header: "Acceptance rate",
                    context_header: "Top 10% of class",
                    format_value: |v| percent(v, 2),
                    format_context: |v| percent(v, 0),
                    gradient: Gradient::Reds,
                    reversed: true,
                },
            );
        }
        BenchmarkTab::MostAffordable => {
            ui.strong(format!("💰 {n} lowest-cost institutions"));
            tables::ranking_table(
                ui,
                "most_affordable",
                &b.most_affordable,
                &RankingStyle {
                    value_header: "Total cost",
                    context_header: "Completion rate",
                    format_value: dollars,
                    format_context: |v| percent(v, 1),
                    gradient: Gradient::Greens,
                    reversed: true,
                },
            );
        }
    }

    ui.separator();
    ui.columns(2, |cols| {
        cols[0].strong("Sector analysis: completion rate");
        cols[0].label(
            RichText::new("Spread of outcomes in the public and private sectors.").small(),
        );
        plot::completion_by_sector(&mut cols[0], b);

        cols[1].strong("Cost-benefit matrix");
        cols[1].label(
            RichText::new("Annual financial burden against educational outcome.").small(),
        );
        plot::cost_benefit(&mut cols[1], b);
    });
}

// ---------------------------------------------------------------------------
// Fiscal efficiency
// ---------------------------------------------------------------------------

fn efficiency(ui: &mut Ui, e: &Efficiency) {
    ui.heading("💵 Fiscal efficiency & institutional ROI");
    ui.label(
        RichText::new(
            "💡 Find the high-ROI institutions: strong completion rates achieved with \
             optimised instructional spending. Marker size follows full-time enrolment.",
        )
        .color(PRIMARY),
    );
    ui.add_space(6.0);
    plot::roi_matrix(ui, e);
}

// ---------------------------------------------------------------------------
// Accessibility
// ---------------------------------------------------------------------------

fn accessibility(ui: &mut Ui, a: &Accessibility) {
    ui.heading("🔓 Accessibility & pathway equity audit");
    ui.label(
        "Compare selectivity across sectors to check that talented students have \
         equal access to elite education.",
    );
    ui.add_space(6.0);

    ui.columns(2, |cols| {
        cols[0].strong("Selectivity distribution by sector");
        plot::selectivity_by_sector(&mut cols[0], a);

        let ui = &mut cols[1];
        ui.strong("💡 Sector statistics");
        ui.label(format!(
            "Median public acceptance: {}",
            a.median_acceptance.public.map_or_else(|| "–".to_owned(), |v| percent(v, 1))
        ));
        ui.label(format!(
            "Median private acceptance: {}",
            a.median_acceptance.private.map_or_else(|| "–".to_owned(), |v| percent(v, 1))
        ));
        ui.separator();
        ui.strong("Talent pipeline (top high-school graduates)");
        if let Some(share) = a.talent_share_pct() {
            ui.add(egui::ProgressBar::new((share.clamp(0, 100) as f32) / 100.0).show_percentage());
            ui.label(
                RichText::new(format!(
                    "Nationally, {share}% of enrolled students come from the top 10% of their \
                     high-school class."
                ))
                .small(),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Instructional quality
// ---------------------------------------------------------------------------

fn quality(ui: &mut Ui, q: &Quality, threshold: f64) {
    ui.heading("🎓 Instructional capacity & quality assurance");
    ui.label(
        "How faculty qualifications, class sizes and long-run stakeholder satisfaction \
         relate to one another.",
    );
    ui.add_space(6.0);

    ui.strong("1. Faculty qualification and student success");
    ui.columns(2, |cols| {
        plot::phd_vs_completion(&mut cols[0], q);

        let ui = &mut cols[1];
        ui.strong("Statistical insight");
        let corr = q
            .correlation
            .map_or_else(|| "–".to_owned(), |c| format!("{c:.2}"));
        ui.label(RichText::new("Correlation coefficient").weak());
        ui.label(RichText::new(corr).size(24.0).color(PRIMARY).strong());
        let insight = if q.faculty_drives_completion {
            "A positive correlation suggests faculty qualification is a key driver of \
             student outcomes."
        } else {
            "A weak correlation suggests other variables (such as funding) may matter more."
        };
        ui.label(RichText::new(insight).small());
        ui.label(RichText::new(format!("Threshold: r > {threshold:.2}")).weak().small());
    });

    ui.separator();
    ui.columns(2, |cols| {
        cols[0].strong("2. Student/faculty ratio distribution");
        cols[0].label(
            RichText::new("Lower ratios mean more personal attention and resources.").small(),
        );
        plot::ratio_histogram(&mut cols[0], q);

        cols[1].strong("3. Alumni engagement (donations)");
        cols[1].label(
            RichText::new("A signal of long-run graduate satisfaction and financial health.")
                .small(),
        );
        plot::alumni_giving(&mut cols[1], q);
    });
}
