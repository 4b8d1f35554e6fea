//! Per-frame update logic for [`ViewerApp`].
//!
//! Each frame renders the command bar, the file browser on the left, the
//! status bar at the bottom and the active tab's charts in the centre. User
//! interactions are collected while drawing and applied afterwards so the
//! session is never mutated while a chart is borrowed for rendering.

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::panels::{render_chart, render_files_panel, ChartAction, ChartSlot, DialogOutcome};

use super::ViewerApp;

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("command_bar").show(ctx, |ui| self.ui_command_bar(ui));

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status.render_bar(ui);
        });

        egui::SidePanel::left("file_browser")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                render_files_panel(ui, &mut self.session.files, &mut self.status);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui_tab_strip(ui);
            ui.separator();
            self.ui_active_tab(ui);
        });

        self.show_dialogs(ctx);
    }
}

impl ViewerApp {
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }
        let (templates, data): (Vec<PathBuf>, Vec<PathBuf>) =
            dropped.into_iter().partition(|p| is_template(p));
        if !data.is_empty() {
            self.add_files(data);
        }
        // Only the last dropped template wins.
        if let Some(t) = templates.last() {
            self.load_template(t);
        }
    }

    fn ui_command_bar(&mut self, ui: &mut egui::Ui) {
        use egui_phosphor::regular as icons;
        ui.horizontal(|ui| {
            if ui
                .button(format!("{} New tab", icons::BROWSERS))
                .clicked()
            {
                self.new_tab();
            }
            if ui
                .button(format!("{} Add chart", icons::CHART_LINE))
                .clicked()
            {
                self.add_chart(self.active_tab);
            }
            ui.separator();
            if ui
                .button(format!("{} Save template", icons::FLOPPY_DISK))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .set_file_name("template.json")
                    .add_filter("JSON", &["json"])
                    .save_file()
                {
                    self.save_template(&path);
                }
            }
            if ui
                .button(format!("{} Load template", icons::FOLDER_OPEN))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                {
                    self.load_template(&path);
                }
            }
            ui.separator();
            if ui
                .button(format!("{} Reload data", icons::ARROWS_CLOCKWISE))
                .on_hover_text("Re-read every plotted channel from disk")
                .clicked()
            {
                self.reload_data();
            }
            if ui
                .button(format!("{} Reset zoom", icons::ARROWS_COUNTER_CLOCKWISE))
                .on_hover_text("Reset zoom on every chart of this tab")
                .clicked()
            {
                if let Some(tab) = self.session.tabs.get_mut(self.active_tab) {
                    tab.reset_zoom();
                }
            }
        });
    }

    fn ui_tab_strip(&mut self, ui: &mut egui::Ui) {
        let mut select = None;
        let mut close = None;
        let mut open_new = false;
        ui.horizontal_wrapped(|ui| {
            for (i, tab) in self.session.tabs.iter().enumerate() {
                if ui
                    .selectable_label(i == self.active_tab, &tab.name)
                    .clicked()
                {
                    select = Some(i);
                }
                if ui
                    .small_button(egui_phosphor::regular::X)
                    .on_hover_text("Close tab")
                    .clicked()
                {
                    close = Some(i);
                }
                ui.add_space(8.0);
            }
            if ui
                .small_button(egui_phosphor::regular::PLUS)
                .on_hover_text("New tab")
                .clicked()
            {
                open_new = true;
            }
        });
        if let Some(i) = select {
            self.active_tab = i;
        }
        if let Some(i) = close {
            self.close_tab(i);
        }
        if open_new {
            self.new_tab();
        }
    }

    fn ui_active_tab(&mut self, ui: &mut egui::Ui) {
        let tab_idx = self.active_tab;
        let Some(tab) = self.session.tabs.get(tab_idx) else {
            ui.centered_and_justified(|ui| {
                ui.label("No tab open. Use \"New tab\" to create one.");
            });
            return;
        };

        let height = self.chart_height;
        let mut pending: Vec<(usize, ChartAction)> = Vec::new();
        let mut add_chart = false;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if tab.charts.is_empty() {
                    ui.label("This tab has no charts yet.");
                }
                for (i, chart) in tab.charts.iter().enumerate() {
                    pending.extend(render_chart(ui, chart, height).into_iter().map(|a| (i, a)));
                    ui.separator();
                }
                if ui
                    .button(format!("{} Add chart", egui_phosphor::regular::PLUS))
                    .clicked()
                {
                    add_chart = true;
                }
            });

        // Removal shifts indices, so removals run last and back to front.
        let mut removals = Vec::new();
        for (chart, action) in pending {
            let slot = ChartSlot { tab: tab_idx, chart };
            match action {
                ChartAction::AddChannel => self.open_add_channel(slot),
                ChartAction::Edit => self.open_edit(slot),
                ChartAction::ResetZoom => {
                    if let Some(c) = self.chart_mut(slot) {
                        c.reset_zoom();
                    }
                }
                ChartAction::Clear => {
                    if let Some(c) = self.chart_mut(slot) {
                        c.clear();
                    }
                }
                ChartAction::Remove => removals.push(slot),
                ChartAction::ViewChanged { x, y } => self.view_changed(slot, x, y),
            }
        }
        removals.sort_by(|a, b| b.chart.cmp(&a.chart));
        for slot in removals {
            self.remove_chart(slot);
        }
        if add_chart {
            self.add_chart(tab_idx);
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(mut dlg) = self.add_dialog.take() {
            match dlg.show(ctx, &self.session.files, self.source.as_ref()) {
                DialogOutcome::Open => self.add_dialog = Some(dlg),
                DialogOutcome::Cancelled => {}
                DialogOutcome::Accepted(desc) => {
                    if !self.add_line(dlg.slot, desc) {
                        // Keep the dialog so the user can pick another channel.
                        self.add_dialog = Some(dlg);
                    }
                }
            }
        }

        if let Some(mut dlg) = self.edit_dialog.take() {
            match dlg.show(ctx) {
                DialogOutcome::Open => self.edit_dialog = Some(dlg),
                DialogOutcome::Cancelled => {}
                DialogOutcome::Accepted(()) => {
                    if let Some(chart) = self.chart_mut(dlg.slot) {
                        dlg.apply(chart);
                    }
                }
            }
        }
    }
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
