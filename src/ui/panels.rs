use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::ALL_SENTINEL;
use crate::state::{ChartKind, Session};
use crate::ui::{chart, preview};

// ---------------------------------------------------------------------------
// Left side panel – filter form
// ---------------------------------------------------------------------------

/// Render the filter form. Changes only take effect on "Apply".
pub fn side_panel(ui: &mut Ui, state: &mut Session) {
    ui.heading("Filters");
    ui.separator();

    let Some(form) = state.form.as_mut() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut submit = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Chart type ----
            ui.strong("Chart type");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut form.chart_kind, ChartKind::Bar, "Bars");
                ui.radio_value(&mut form.chart_kind, ChartKind::Pie, "Pie");
            });
            ui.separator();

            // ---- Range ----
            let (min, max) = form.bounds;
            let integral = min.fract() == 0.0 && max.fract() == 0.0;
            let (mut lo, mut hi) = form.range;
            ui.strong(form.range_column.as_str());
            let mut from = egui::Slider::new(&mut lo, min..=max).text("from");
            let mut to = egui::Slider::new(&mut hi, min..=max).text("to");
            if integral {
                from = from.integer();
                to = to.integer();
            }
            let changed = ui.add(from).changed() | ui.add(to).changed();
            if changed {
                form.set_range(lo, hi);
            }
            ui.separator();

            // ---- Per-column multi-selects (collapsible) ----
            let mut toggles: Vec<(String, String)> = Vec::new();
            for choice in &form.choices {
                let all_on = choice.selected.contains(ALL_SENTINEL);
                let header_text = if all_on {
                    format!("{}  (all)", choice.column)
                } else {
                    format!("{}  ({}/{})", choice.column, choice.selected.len(), choice.options.len() - 1)
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&choice.column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        for option in &choice.options {
                            let mut checked = choice.selected.contains(option);
                            if ui.checkbox(&mut checked, option.as_str()).changed() {
                                toggles.push((choice.column.clone(), option.clone()));
                            }
                        }
                    });
            }
            for (column, value) in toggles {
                form.toggle(&column, &value);
            }

            ui.add_space(8.0);
            submit = ui.button("Apply").clicked();
        });

    if submit {
        if let Err(e) = state.submit() {
            log::error!("Failed to apply filters: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(raw), Some(working)) =
            (state.file_name(), state.raw(), state.working())
        {
            ui.label(format!("{name}: {} rows loaded, {} after filters", raw.len(), working.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – previews, export, chart
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut Session) {
    let (Some(raw_head), Some(working_head)) = (state.raw_preview(), state.working_preview()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a bank marketing file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Before filters");
        preview::table_preview(ui, "raw_preview", &raw_head);
        ui.add_space(8.0);

        ui.heading("After filters");
        preview::table_preview(ui, "working_preview", &working_head);
        ui.add_space(4.0);

        if ui.button("📥 Download filtered table as Excel").clicked() {
            save_export_dialog(state);
        }

        ui.separator();
        ui.heading("Acceptance rate");
        match state.comparison() {
            Ok(Some(comparison)) => chart::comparison_chart(ui, &comparison, state.chart_kind),
            Ok(None) => {}
            Err(e) => {
                ui.label(RichText::new(format!("Error: {e:#}")).color(Color32::RED));
            }
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Open bank marketing data")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "ods", "json"])
        .add_filter("Delimited text", &["csv", "txt"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "ods"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        load_path(state, &path);
    }
}

fn load_path(state: &mut Session, path: &Path) {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let result = std::fs::read(path)
        .map_err(|e| format!("reading {}: {e}", path.display()))
        .and_then(|bytes| state.upload(&name, &bytes).map_err(|e| format!("{e:#}")));

    match result {
        Ok(()) => state.status_message = None,
        Err(msg) => {
            log::error!("Failed to load file: {msg}");
            state.status_message = Some(format!("Error: {msg}"));
        }
    }
}

fn save_export_dialog(state: &mut Session) {
    let target = rfd::FileDialog::new()
        .set_title("Save filtered table")
        .set_file_name(state.config.export_file_name.as_str())
        .add_filter("Excel", &["xlsx"])
        .save_file();

    if let Some(path) = target {
        if let Err(e) = state.export_to(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
