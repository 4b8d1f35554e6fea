//! Top-level entry point for running the viewer as a native window.

use std::path::PathBuf;

use eframe::egui;

use crate::config::ViewerConfig;

use super::ViewerApp;

/// Launch the viewer in a native window.
///
/// When `template` is given it is loaded before the first frame; a template
/// that cannot be read is reported in the status bar and the viewer starts
/// with an empty session. The call blocks until the window is closed.
pub fn run_viewer(mut cfg: ViewerConfig, template: Option<PathBuf>) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let mut opts = cfg
        .native_options
        .take()
        .unwrap_or_else(eframe::NativeOptions::default);

    if opts.viewport.inner_size.is_none() {
        opts.viewport = opts
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1400.0, 900.0));
    }

    let mut app = ViewerApp::new(cfg);
    if let Some(path) = template {
        log::info!("loading template {}", path.display());
        app.load_template(&path);
    }

    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}
