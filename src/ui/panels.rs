use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::smooth::WindowShape;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – records and transform controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Spectra");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            records_list(ui, state);
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Load options").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| load_options(ui, state));

            egui::CollapsingHeader::new(RichText::new("Transform").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| transform_controls(ui, state));

            egui::CollapsingHeader::new(RichText::new("Axes").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| axis_controls(ui, state));
        });
}

fn records_list(ui: &mut Ui, state: &mut AppState) {
    if state.records.is_empty() {
        ui.label("No spectrum loaded.");
        return;
    }

    let labels: Vec<String> = state
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {} – {}", i + 1, r.action(), r.name()))
        .collect();

    for (i, label) in labels.iter().enumerate() {
        let response = ui.selectable_label(state.selected == Some(i), label);
        if response.clicked() {
            state.select_record(i);
        }
        if let Some(record) = state.records.get(i) {
            response.on_hover_text(format!(
                "{}\n{}\next {} row {}, {} pixels",
                record.file_name(),
                record.path().display(),
                record.extension(),
                record.row(),
                record.header().naxis1
            ));
        }
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Replot").clicked() {
            let result = state.replot_selected();
            state.report(result);
        }
        if ui.small_button("Remove").clicked() {
            state.remove_selected();
        }
    });
}

fn load_options(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Extension");
        ui.add(
            egui::TextEdit::singleline(&mut state.form.extension)
                .hint_text("index or EXTNAME")
                .desired_width(100.0),
        );
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Row");
        ui.add(egui::DragValue::new(&mut state.form.row));
    });
}

fn transform_controls(ui: &mut Ui, state: &mut AppState) {
    let names: Vec<String> = state
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r.name()))
        .collect();

    // ---- Subtract ----
    ui.strong("Subtract");
    ui.horizontal(|ui: &mut Ui| {
        let current = state
            .form
            .subtract_target
            .and_then(|i| names.get(i).cloned())
            .unwrap_or_else(|| "choose…".to_string());
        egui::ComboBox::from_id_salt("subtract_target")
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                for (i, name) in names.iter().enumerate() {
                    ui.selectable_value(&mut state.form.subtract_target, Some(i), name);
                }
            });
        if ui.button("Subtract").clicked() {
            let result = state.subtract_selected();
            state.report(result);
        }
    });
    ui.separator();

    // ---- Smooth ----
    ui.strong("Smooth");
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::DragValue::new(&mut state.form.smoothing_length).range(1..=1001));
        egui::ComboBox::from_id_salt("smooth_window")
            .selected_text(state.form.window.name())
            .show_ui(ui, |ui: &mut Ui| {
                for shape in WindowShape::ALL {
                    ui.selectable_value(&mut state.form.window, shape, shape.name());
                }
            });
        if ui.button("Smooth").clicked() {
            let result = state.smooth_selected();
            state.report(result);
        }
    });
    ui.separator();

    // ---- Line lookup ----
    ui.strong("Line lookup");
    match &state.catalog {
        Some(catalog) if catalog.is_empty() => {
            ui.colored_label(Color32::GRAY, "Catalog has no lines")
        }
        Some(catalog) => ui.label(format!("{} lines in catalog", catalog.len())),
        None => ui.colored_label(Color32::GRAY, "No catalog (File → Open line catalog…)"),
    };
    ui.horizontal(|ui: &mut Ui| {
        let edit = ui.add(
            egui::TextEdit::singleline(&mut state.form.line_name)
                .hint_text("e.g. Halpha")
                .desired_width(100.0),
        );
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Show").clicked() || submitted {
            let result = state.lookup_line();
            state.report(result);
        }
    });
}

fn axis_controls(ui: &mut Ui, state: &mut AppState) {
    let form = &mut state.form;
    egui::Grid::new("axis_overrides")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for (label, value, hint) in [
                ("Title", &mut form.title, ""),
                ("X label", &mut form.xlabel, "Wavelength [unit]"),
                ("Y label", &mut form.ylabel, "Flux [unit]"),
                ("X range", &mut form.xr, "min, max"),
                ("Y range", &mut form.yr, "min, max"),
            ] {
                ui.label(label);
                ui.add(egui::TextEdit::singleline(value).hint_text(hint));
                ui.end_row();
            }
        });
    ui.label(RichText::new("Empty fields keep the derived value.").small());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open spectrum…").clicked() {
                open_spectrum_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open line catalog…").clicked() {
                open_catalog_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(record) = state.selected_record() {
            ui.label(record.to_string());
        }

        ui.separator();

        ui.checkbox(&mut state.form.noplot, "noplot")
            .on_hover_text("Skip the figure after loading or transforming");
        ui.checkbox(&mut state.form.quiet, "quiet")
            .on_hover_text("Skip the informational summary");
        ui.checkbox(&mut state.form.show_raw, "raw")
            .on_hover_text("Overlay the flux as originally loaded");

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom console – informational summaries
// ---------------------------------------------------------------------------

pub fn console(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            for message in &state.figures.console {
                ui.monospace(message);
                ui.add_space(2.0);
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_spectrum_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open FITS spectrum")
        .add_filter("FITS", &["fits", "fit", "fts", "gz"])
        .pick_file();

    if let Some(path) = file {
        let result = state.open_spectrum(&path);
        state.report(result);
    }
}

pub fn open_catalog_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open line catalog")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let result = state.open_catalog(&path);
        state.report(result);
    }
}
