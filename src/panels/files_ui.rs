//! File browser: the two lists of loaded input files.

use std::path::{Path, PathBuf};

use egui::Ui;

use crate::data::layout::{FileKind, KnownFiles};
use crate::panels::status_ui::StatusLog;

/// Add files by path, rejecting unknown extensions with a status warning.
/// Returns how many were accepted.
pub fn add_paths(
    files: &mut KnownFiles,
    paths: impl IntoIterator<Item = PathBuf>,
    status: &mut StatusLog,
) -> usize {
    let mut added = 0;
    for path in paths {
        match files.insert(path.clone()) {
            Some(kind) => {
                log::debug!("added {} as {}", path.display(), kind.category());
                added += 1;
            }
            None => status.warning(format!(
                "{} ignored: only .out and .csv files can be loaded",
                path.display()
            )),
        }
    }
    added
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render both categories. Files can be removed from the list or added via a
/// file picker.
pub fn render_files_panel(ui: &mut Ui, files: &mut KnownFiles, status: &mut StatusLog) {
    ui.horizontal(|ui| {
        ui.heading("Files");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(egui_phosphor::regular::FOLDER_OPEN)
                .on_hover_text("Add .out / .csv files")
                .clicked()
            {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Simulation output", &["out", "csv"])
                    .pick_files()
                {
                    add_paths(files, paths, status);
                }
            }
        });
    });
    ui.label("Drop files here");
    ui.separator();

    let mut remove: Option<PathBuf> = None;
    for kind in [FileKind::ChannelFile, FileKind::Delimited] {
        ui.strong(kind.label());
        let list = files.list(kind);
        if list.is_empty() {
            ui.weak("(none)");
        }
        for path in list {
            ui.horizontal(|ui| {
                if ui
                    .small_button(egui_phosphor::regular::X)
                    .on_hover_text("Remove from list")
                    .clicked()
                {
                    remove = Some(path.clone());
                }
                ui.label(file_name(path))
                    .on_hover_text(path.display().to_string());
            });
        }
        ui.add_space(8.0);
    }

    if let Some(path) = remove {
        files.remove(&path);
    }
}
