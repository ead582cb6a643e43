use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, HLine, Legend, Line, LineStyle, Plot,
    PlotPoint, PlotPoints, PlotUi, Points, Text, VLine,
};

use crate::color::{ACCENT, DANGER, PRIMARY, SUCCESS, sector_color};
use crate::data::filter::Sector;
use crate::report::stats::{Bin, BoxSummary};
use crate::report::views::{Accessibility, Benchmarks, Efficiency, Quality, SectorPair};

const PRIVATE_LABEL: &str = "Private";
const PUBLIC_LABEL: &str = "Public";

/// Category ticks: public at x = 0, private at x = 1.
fn sector_ticks(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if mark.value.abs() < 1e-6 {
        PUBLIC_LABEL.to_owned()
    } else if (mark.value - 1.0).abs() < 1e-6 {
        PRIVATE_LABEL.to_owned()
    } else {
        String::new()
    }
}

/// Box per sector, outliers as dots.
fn sector_boxes(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    summaries: &SectorPair<Option<BoxSummary>>,
    height: f32,
) {
    let entries = [
        (0.0, PUBLIC_LABEL, false, &summaries.public),
        (1.0, PRIVATE_LABEL, true, &summaries.private),
    ];

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Sector")
        .y_axis_label(y_label)
        .x_axis_formatter(sector_ticks)
        .height(height)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (x, label, private, summary) in entries {
                let Some(s) = summary else { continue };
                let color = sector_color(private);
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .name(format!("{label} (n = {})", s.count))
                .fill(color.gamma_multiply(0.8))
                .stroke(Stroke::new(1.5, ACCENT))
                .box_width(0.5);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label).color(color));

                if !s.outliers.is_empty() {
                    let points: PlotPoints = s.outliers.iter().map(|&y| [x, y]).collect();
                    plot_ui.points(Points::new(points).name(label).color(color).radius(2.5));
                }
            }
        });
}

/// One point series per sector.
fn sector_scatter(plot_ui: &mut PlotUi, points: &SectorPair<Vec<[f64; 2]>>, radius: f32) {
    for (label, private, series) in [
        (PUBLIC_LABEL, false, &points.public),
        (PRIVATE_LABEL, true, &points.private),
    ] {
        plot_ui.points(
            Points::new(PlotPoints::from(series.clone()))
                .name(label)
                .color(sector_color(private).gamma_multiply(0.7))
                .radius(radius)
                .filled(true),
        );
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

pub fn completion_by_sector(ui: &mut Ui, b: &Benchmarks) {
    sector_boxes(
        ui,
        "completion_by_sector",
        "Completion rate (%)",
        &b.completion_by_sector,
        300.0,
    );
}

pub fn cost_benefit(ui: &mut Ui, b: &Benchmarks) {
    Plot::new("cost_benefit")
        .legend(Legend::default())
        .x_axis_label("Total annual cost ($)")
        .y_axis_label("Completion rate (%)")
        .height(300.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| sector_scatter(plot_ui, &b.cost_benefit, 3.0));
}

// ---------------------------------------------------------------------------
// Fiscal efficiency
// ---------------------------------------------------------------------------

fn bubble_radius(size: f64) -> f32 {
    if size.is_finite() && size > 0.0 {
        (size.sqrt() as f32 * 0.8).clamp(1.5, 22.0)
    } else {
        1.5
    }
}

pub fn roi_matrix(ui: &mut Ui, e: &Efficiency) {
    Plot::new("roi_matrix")
        .legend(Legend::default())
        .x_axis_label("Instructional expenditure per student ($)")
        .y_axis_label("Completion rate (%)")
        .height(460.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // Items sharing a name share one legend entry.
            for (sector, private, bubbles) in [
                (Sector::PublicOnly, false, &e.bubbles.public),
                (Sector::PrivateOnly, true, &e.bubbles.private),
            ] {
                let color = sector_color(private).gamma_multiply(0.6);
                for b in bubbles {
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[b.expenditure, b.completion]]))
                            .name(sector.label())
                            .color(color)
                            .radius(bubble_radius(b.size))
                            .filled(true),
                    );
                }
            }

            if let Some(x) = e.mean_expenditure {
                plot_ui.vline(VLine::new(x).color(Color32::GRAY).style(LineStyle::dashed_loose()));
            }
            if let Some(y) = e.mean_completion {
                plot_ui.hline(HLine::new(y).color(Color32::GRAY).style(LineStyle::dashed_loose()));
            }
            if let Some([x, y]) = e.at_risk_anchor {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, y),
                        RichText::new("⚠ At risk / inefficient\n(high cost, low outcome)")
                            .color(DANGER)
                            .strong(),
                    )
                    .anchor(Align2::CENTER_CENTER),
                );
            }
            if let Some([x, y]) = e.high_performer_anchor {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, y),
                        RichText::new("✔ High-performance model\n(low cost, high outcome)")
                            .color(SUCCESS)
                            .strong(),
                    )
                    .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Accessibility
// ---------------------------------------------------------------------------

pub fn selectivity_by_sector(ui: &mut Ui, a: &Accessibility) {
    sector_boxes(
        ui,
        "selectivity_by_sector",
        "Acceptance rate (%)",
        &a.acceptance_by_sector,
        380.0,
    );
}

// ---------------------------------------------------------------------------
// Instructional quality
// ---------------------------------------------------------------------------

pub fn phd_vs_completion(ui: &mut Ui, q: &Quality) {
    Plot::new("phd_vs_completion")
        .legend(Legend::default())
        .x_axis_label("Faculty with PhD (%)")
        .y_axis_label("Completion rate (%)")
        .height(280.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(q.phd_vs_completion.clone()))
                    .name("Institutions")
                    .color(PRIMARY.gamma_multiply(0.3))
                    .radius(2.5)
                    .filled(true),
            );
            if let (Some(fit), Some((lo, hi))) = (q.fit, q.phd_span()) {
                let line = PlotPoints::from(vec![[lo, fit.at(lo)], [hi, fit.at(hi)]]);
                plot_ui.line(Line::new(line).name("Least-squares fit").color(DANGER).width(2.0));
            }
        });
}

fn bins_to_bars(bins: &[Bin]) -> Vec<Bar> {
    bins.iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width * 0.95))
        .collect()
}

pub fn ratio_histogram(ui: &mut Ui, q: &Quality) {
    Plot::new("ratio_histogram")
        .legend(Legend::default())
        .x_axis_label("Students per faculty member")
        .y_axis_label("Institutions")
        .height(300.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let public = BarChart::new(bins_to_bars(&q.ratio_histogram.public))
                .name(PUBLIC_LABEL)
                .color(sector_color(false));
            let private = BarChart::new(bins_to_bars(&q.ratio_histogram.private))
                .name(PRIVATE_LABEL)
                .color(sector_color(true))
                .stack_on(&[&public]);
            plot_ui.bar_chart(public);
            plot_ui.bar_chart(private);
        });
}

pub fn alumni_giving(ui: &mut Ui, q: &Quality) {
    let entries = [
        (0.0, PUBLIC_LABEL, false, q.mean_alumni_donation.public),
        (1.0, PRIVATE_LABEL, true, q.mean_alumni_donation.private),
    ];

    Plot::new("alumni_giving")
        .legend(Legend::default())
        .x_axis_label("Sector")
        .y_axis_label("Alumni who donate (%)")
        .x_axis_formatter(sector_ticks)
        .include_y(0.0)
        .include_y(50.0)
        .height(300.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (x, label, private, value) in entries {
                let Some(v) = value else { continue };
                plot_ui.bar_chart(
                    BarChart::new(vec![Bar::new(x, v).width(0.5)])
                        .name(label)
                        .color(sector_color(private)),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, v + 1.0),
                        RichText::new(format!("{v:.1}%")).color(PRIMARY).strong(),
                    )
                    .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}
