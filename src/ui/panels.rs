use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::{PRIMARY, SECONDARY};
use crate::data::filter::{CompletionRange, Sector};
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – navigation and cohort filters
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading(RichText::new("🇺🇸 Higher Education Analytics").color(PRIMARY).strong());
    ui.label(RichText::new("Office of Postsecondary Performance").weak());
    ui.separator();

    ui.strong("🧭 Policy focus");
    for view in View::ALL {
        ui.selectable_value(&mut state.view, view, view.label());
    }
    ui.separator();

    ui.strong("🎚 Cohort segmentation");
    if !state.has_data() {
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Sector selector ----
    let mut sector = state.filter.sector;
    egui::ComboBox::from_label("Sector")
        .selected_text(sector.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in Sector::ALL {
                ui.selectable_value(&mut sector, option, option.label());
            }
        });
    state.set_sector(sector);

    // ---- Completion-rate range ----
    ui.add_space(6.0);
    ui.label("Target completion rate (%)");
    let CompletionRange { mut low, mut high } = state.filter.completion;
    let low_changed = ui
        .add(egui::Slider::new(&mut low, 0.0..=100.0).integer().text("from"))
        .changed();
    let high_changed = ui
        .add(egui::Slider::new(&mut high, 0.0..=100.0).integer().text("to"))
        .changed();

    // The two handles never cross: the one being dragged pushes the other.
    if low_changed && low > high {
        high = low;
    }
    if high_changed && high < low {
        low = high;
    }
    if ui.small_button("Reset range").clicked() {
        (low, high) = (0.0, 100.0);
    }
    state.set_completion_range(CompletionRange::new(low, high));

    ui.add_space(6.0);
    ui.label(format!(
        "{} of {} institutions in cohort",
        state.cohort.len(),
        state.base.len()
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(state.source.path().display().to_string()).weak());

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("Data source: IPEDS Integrated Postsecondary Education Data System")
                .small()
                .color(SECONDARY),
        );
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open institution table")
        .add_filter("Supported files", &["csv", "tsv", "txt", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open_path(path);
        if let Some(msg) = &state.status_message {
            log::error!("Failed to load file: {msg}");
        }
    }
}
