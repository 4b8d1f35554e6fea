//! In-app status log shown in the bottom bar.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use egui::{Color32, Ui};

use crate::data::reconcile::{LineWarning, StatusSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub at: DateTime<Local>,
    pub level: StatusLevel,
    pub text: String,
}

/// Bounded list of recent messages. Every message is also sent to `log`.
#[derive(Debug)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
    capacity: usize,
    show_history: bool,
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            show_history: false,
        }
    }

    pub fn push(&mut self, level: StatusLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            StatusLevel::Info => log::info!("{text}"),
            StatusLevel::Warning => log::warn!("{text}"),
            StatusLevel::Error => log::error!("{text}"),
        }
        self.entries.push_back(StatusEntry {
            at: Local::now(),
            level,
            text,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(StatusLevel::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(StatusLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(StatusLevel::Error, text);
    }

    pub fn entries(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&StatusEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn level_color(level: StatusLevel) -> Color32 {
        match level {
            StatusLevel::Info => Color32::GRAY,
            StatusLevel::Warning => Color32::from_rgb(230, 160, 30),
            StatusLevel::Error => Color32::from_rgb(220, 60, 60),
        }
    }

    fn entry_text(e: &StatusEntry) -> String {
        format!("{}  {}", e.at.format("%H:%M:%S"), e.text)
    }

    /// Last message plus a toggle for the full history window.
    pub fn render_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui
                .small_button(egui_phosphor::regular::LIST)
                .on_hover_text("Show message history")
                .clicked()
            {
                self.show_history = !self.show_history;
            }
            if let Some(e) = self.entries.back() {
                ui.colored_label(Self::level_color(e.level), Self::entry_text(e));
            }
        });

        if self.show_history {
            let mut open = self.show_history;
            egui::Window::new("Messages")
                .open(&mut open)
                .default_width(520.0)
                .show(ui.ctx(), |ui| {
                    egui::ScrollArea::vertical()
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for e in self.entries.iter() {
                                ui.colored_label(Self::level_color(e.level), Self::entry_text(e));
                            }
                        });
                    if ui.button("Clear").clicked() {
                        self.entries.clear();
                    }
                });
            self.show_history = open;
        }
    }
}

impl StatusSink for StatusLog {
    fn warn(&mut self, warning: &LineWarning) {
        self.warning(warning.to_string());
    }

    fn info(&mut self, message: &str) {
        StatusLog::info(self, message);
    }
}
