use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{Gradient, PRIMARY, text_on};
use crate::data::model::{InstitutionTable, MetadataValue};
use crate::report::views::{Kpis, RankedRow};

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `1234567.8` → `"$1,234,568"`.
pub fn dollars(v: f64) -> String {
    if !v.is_finite() {
        return "–".to_owned();
    }
    let rounded = v.round().abs() as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    let sign = if v < 0.0 && rounded > 0 { "-" } else { "" };
    format!("{sign}${out}")
}

pub fn percent(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{v:.decimals$}%")
    } else {
        "–".to_owned()
    }
}

fn opt_percent(v: Option<f64>) -> String {
    v.map_or_else(|| "–".to_owned(), |v| percent(v, 1))
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn metric_card(ui: &mut Ui, label: &str, value: String, detail: Option<String>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(180.0);
        ui.label(RichText::new(label).weak().strong());
        ui.label(RichText::new(value).size(24.0).color(PRIMARY).strong());
        if let Some(detail) = detail {
            ui.label(RichText::new(detail).small());
        }
    });
}

pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.heading("📊 Key performance indicators");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        metric_card(ui, "Institutions monitored", kpis.institutions.to_string(), None);
        metric_card(
            ui,
            "Mean completion rate",
            opt_percent(kpis.mean_completion),
            kpis.completion_delta
                .map(|d| format!("{d:+.1}% vs national baseline")),
        );
        metric_card(
            ui,
            "Mean cost of attendance",
            kpis.mean_total_cost.map_or_else(|| "–".to_owned(), dollars),
            Some("Tuition + room/board + books + personal".to_owned()),
        );
        metric_card(
            ui,
            "Instructional quality index",
            opt_percent(kpis.mean_phd),
            Some("Faculty holding a PhD".to_owned()),
        );
    });
}

// ---------------------------------------------------------------------------
// Ranking tables
// ---------------------------------------------------------------------------

/// How a ranking table labels and shades its two numeric columns.
pub struct RankingStyle {
    pub value_header: &'static str,
    pub context_header: &'static str,
    pub format_value: fn(f64) -> String,
    pub format_context: fn(f64) -> String,
    pub gradient: Gradient,
    /// Dark for low values instead of high ones.
    pub reversed: bool,
}

pub fn ranking_table(ui: &mut Ui, id: &str, rows: &[RankedRow], style: &RankingStyle) {
    let finite = rows.iter().map(|r| r.value).filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::exact(28.0))
            .column(Column::remainder().at_least(200.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(110.0))
            .column(Column::auto().at_least(110.0))
            .header(22.0, |mut header| {
                let titles = [
                    "#",
                    "Institution",
                    "Private",
                    style.value_header,
                    style.context_header,
                ];
                for title in titles {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for (i, row) in rows.iter().enumerate() {
                    body.row(20.0, |mut table_row| {
                        table_row.col(|ui: &mut Ui| {
                            ui.label((i + 1).to_string());
                        });
                        table_row.col(|ui: &mut Ui| {
                            ui.label(&row.name);
                        });
                        table_row.col(|ui: &mut Ui| {
                            ui.label(&row.private);
                        });
                        table_row.col(|ui: &mut Ui| {
                            let bg = style.gradient.color_for(row.value, min, max, style.reversed);
                            ui.label(
                                RichText::new((style.format_value)(row.value))
                                    .background_color(bg)
                                    .color(text_on(bg)),
                            );
                        });
                        table_row.col(|ui: &mut Ui| {
                            ui.label((style.format_context)(row.context));
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Cohort data grid
// ---------------------------------------------------------------------------

fn cell_text(value: &MetadataValue) -> String {
    match value {
        MetadataValue::Float(v) if !v.is_finite() => "–".to_owned(),
        MetadataValue::Float(v) if v.fract() == 0.0 => format!("{v:.0}"),
        MetadataValue::Float(v) => format!("{v:.2}"),
        other => other.to_string(),
    }
}

/// Every column of the cohort, one row per institution.
pub fn cohort_table(ui: &mut Ui, table: &InstitutionTable) {
    egui::ScrollArea::horizontal()
        .id_salt("cohort_table_scroll")
        .show(ui, |ui: &mut Ui| {
            let mut builder = TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(360.0)
                .column(Column::auto().at_least(220.0));
            for _ in 1..table.columns.len() {
                builder = builder.column(Column::auto().at_least(70.0));
            }
            builder
                .header(22.0, |mut header| {
                    for title in &table.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let record = &table.records[row.index()];
                        for column in &table.columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell_text(&record.cell(column)));
                            });
                        }
                    });
                });
        });
}
