use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Table;

/// Render the head of a table as a striped grid.
pub fn table_preview(ui: &mut Ui, id: &str, table: &Table) {
    if table.n_columns() == 0 {
        ui.label("No columns.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(32.0))
                .columns(Column::auto().at_least(60.0), table.n_columns())
                .header(20.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("#");
                    });
                    for name in table.column_names() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in table.index() {
                        body.row(18.0, |mut cells| {
                            cells.col(|ui: &mut Ui| {
                                ui.label(row.to_string());
                            });
                            for column in table.columns() {
                                cells.col(|ui: &mut Ui| {
                                    ui.label(column.cell(row).to_string());
                                });
                            }
                        });
                    }
                });
        });
    });

    if table.is_empty() {
        ui.label("No rows match the current filters.");
    }
}
