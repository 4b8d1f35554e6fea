//! Dialog to edit a chart's title, axis labels, grid and per-line appearance.

use egui::Color32;

use crate::data::color;
use crate::data::session::{ChartLabels, LiveChart};
use crate::panels::add_channel_ui::{ChartSlot, DialogOutcome};

#[derive(Debug, Clone)]
struct LineEdit {
    label: String,
    color: Color32,
    original_color: Color32,
    visible: bool,
    multiplier: f64,
    remove: bool,
}

/// Pending edits; nothing touches the chart until [`EditChartDialog::apply`].
pub struct EditChartDialog {
    pub slot: ChartSlot,
    labels: ChartLabels,
    lines: Vec<LineEdit>,
}

impl EditChartDialog {
    pub fn new(slot: ChartSlot, chart: &LiveChart) -> Self {
        let mut labels = chart.labels();
        if labels.x_label.is_empty() {
            labels.x_label = crate::data::session::DEFAULT_X_LABEL.to_string();
        }
        Self {
            slot,
            labels,
            lines: chart
                .lines
                .iter()
                .map(|l| {
                    let c = l.descriptor.color32();
                    LineEdit {
                        label: l.descriptor.label.clone(),
                        color: c,
                        original_color: c,
                        visible: l.descriptor.visible,
                        multiplier: l.multiplier(),
                        remove: false,
                    }
                })
                .collect(),
        }
    }

    /// Write the edits into `chart`. Colors are only rewritten when changed
    /// so named colors survive an edit that does not touch them.
    pub fn apply(&self, chart: &mut LiveChart) {
        chart.apply_labels(&self.labels);
        if chart.lines.len() != self.lines.len() {
            log::warn!("chart changed while the edit dialog was open; line edits ignored");
            return;
        }
        for (line, edit) in chart.lines.iter_mut().zip(self.lines.iter()) {
            line.descriptor.label = edit.label.clone();
            line.descriptor.visible = edit.visible;
            if edit.color != edit.original_color {
                line.descriptor.color = color::to_hex(edit.color);
            }
            line.set_multiplier(edit.multiplier);
        }
        let mut idx = 0;
        chart.lines.retain(|_| {
            let keep = !self.lines[idx].remove;
            idx += 1;
            keep
        });
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome<()> {
        let mut outcome = DialogOutcome::Open;
        let mut open = true;
        egui::Window::new("Edit chart")
            .collapsible(false)
            .resizable(true)
            .default_width(480.0)
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new("edit_chart_labels")
                    .num_columns(2)
                    .show(ui, |ui| {
                        ui.label("Title");
                        ui.text_edit_singleline(&mut self.labels.title);
                        ui.end_row();
                        ui.label("X label");
                        ui.text_edit_singleline(&mut self.labels.x_label);
                        ui.end_row();
                        ui.label("Y label");
                        ui.text_edit_singleline(&mut self.labels.y_label);
                        ui.end_row();
                    });
                ui.checkbox(&mut self.labels.grid_enabled, "Show grid");

                ui.separator();
                ui.strong("Lines");
                if self.lines.is_empty() {
                    ui.weak("(no lines)");
                }
                egui::Grid::new("edit_chart_lines")
                    .num_columns(5)
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("Color");
                        ui.label("Label");
                        ui.label("Visible");
                        ui.label("Multiplier");
                        ui.label("");
                        ui.end_row();
                        for line in self.lines.iter_mut() {
                            ui.color_edit_button_srgba(&mut line.color);
                            ui.add_enabled(
                                !line.remove,
                                egui::TextEdit::singleline(&mut line.label).desired_width(180.0),
                            );
                            ui.checkbox(&mut line.visible, "");
                            ui.add(egui::DragValue::new(&mut line.multiplier).speed(0.01))
                                .on_hover_text("Scale applied to the values; the data read from file is kept");
                            ui.checkbox(&mut line.remove, egui_phosphor::regular::TRASH)
                                .on_hover_text("Remove line");
                            ui.end_row();
                        }
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        outcome = DialogOutcome::Accepted(());
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = DialogOutcome::Cancelled;
                    }
                });
            });
        if !open {
            outcome = DialogOutcome::Cancelled;
        }
        outcome
    }
}
