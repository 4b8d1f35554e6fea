//! Dialog to pick a file, a channel, a label and (for `.csv`) the init time.

use std::path::PathBuf;

use crate::data::layout::{ChannelRef, FileKind, KnownFiles, LineDescriptor};
use crate::data::source::DataSourceProvider;

/// Where the new line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSlot {
    pub tab: usize,
    pub chart: usize,
}

pub enum DialogOutcome<T> {
    Open,
    Cancelled,
    Accepted(T),
}

pub struct AddChannelDialog {
    pub slot: ChartSlot,
    file: Option<PathBuf>,
    channels: Vec<String>,
    channel: Option<String>,
    label: String,
    init_time: f64,
    color: String,
}

impl AddChannelDialog {
    pub fn new(slot: ChartSlot, default_init_time: f64, color: String) -> Self {
        Self {
            slot,
            file: None,
            channels: Vec::new(),
            channel: None,
            label: String::new(),
            init_time: default_init_time,
            color,
        }
    }

    fn select_file(&mut self, path: PathBuf, source: &dyn DataSourceProvider) {
        self.channels = source.list_channels(&path);
        self.channel = None;
        self.label.clear();
        self.file = Some(path);
    }

    fn descriptor(&self) -> Option<LineDescriptor> {
        let file = self.file.as_ref()?;
        let channel = self.channel.as_ref()?;
        let mut desc = LineDescriptor::new(
            ChannelRef::new(file.to_string_lossy(), channel.clone()),
            self.color.clone(),
        );
        if !self.label.trim().is_empty() {
            desc.label = self.label.clone();
        }
        if FileKind::from_path(file) == Some(FileKind::Delimited) {
            desc.init_time = Some(self.init_time);
        }
        Some(desc)
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        files: &KnownFiles,
        source: &dyn DataSourceProvider,
    ) -> DialogOutcome<LineDescriptor> {
        let mut outcome = DialogOutcome::Open;
        let mut open = true;
        egui::Window::new("Add channel")
            .collapsible(false)
            .resizable(true)
            .default_width(420.0)
            .open(&mut open)
            .show(ctx, |ui| {
                if files.is_empty() {
                    ui.label("No files loaded. Drop .out or .csv files on the window first.");
                    return;
                }

                let mut picked: Option<PathBuf> = None;
                egui::ComboBox::from_id_salt("add_channel_file")
                    .width(360.0)
                    .selected_text(
                        self.file
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "Select file".to_string()),
                    )
                    .show_ui(ui, |ui| {
                        for p in files.all() {
                            let selected = self.file.as_ref() == Some(p);
                            if ui.selectable_label(selected, p.display().to_string()).clicked() {
                                picked = Some(p.clone());
                            }
                        }
                    });
                if let Some(p) = picked {
                    self.select_file(p, source);
                }

                if self.file.is_some() {
                    if self.channels.is_empty() {
                        ui.colored_label(
                            egui::Color32::from_rgb(230, 160, 30),
                            "No channels could be read from this file.",
                        );
                    }
                    egui::ComboBox::from_id_salt("add_channel_channel")
                        .width(360.0)
                        .selected_text(self.channel.clone().unwrap_or_else(|| "Select channel".to_string()))
                        .show_ui(ui, |ui| {
                            for c in &self.channels {
                                let selected = self.channel.as_ref() == Some(c);
                                if ui.selectable_label(selected, c).clicked() {
                                    self.channel = Some(c.clone());
                                    self.label = c.clone();
                                }
                            }
                        });
                }

                if self.channel.is_some() {
                    ui.horizontal(|ui| {
                        ui.label("Label");
                        ui.text_edit_singleline(&mut self.label);
                    });
                }

                let is_csv = self
                    .file
                    .as_deref()
                    .and_then(FileKind::from_path)
                    == Some(FileKind::Delimited);
                if is_csv {
                    ui.horizontal(|ui| {
                        ui.label("Ignore time before");
                        ui.add(
                            egui::DragValue::new(&mut self.init_time)
                                .speed(0.1)
                                .range(0.0..=f64::MAX)
                                .suffix(" s"),
                        );
                    });
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let ready = self.descriptor();
                    if ui.add_enabled(ready.is_some(), egui::Button::new("Add")).clicked() {
                        if let Some(desc) = ready {
                            outcome = DialogOutcome::Accepted(desc);
                        }
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
