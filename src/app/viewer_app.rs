//! Application state and the operations the UI triggers.

use std::path::{Path, PathBuf};

use crate::config::ViewerConfig;
use crate::data::layout::{AxisLimits, LineDescriptor};
use crate::data::reconcile::{self, Reconciler};
use crate::data::session::{LiveChart, Session};
use crate::data::source::{DataSourceProvider, SimulationSource};
use crate::panels::{AddChannelDialog, ChartSlot, EditChartDialog, StatusLog};
use crate::persistence::{self, Template};

/// The viewer: live session, data source, status log and open dialogs.
pub struct ViewerApp {
    pub session: Session,
    pub config: ViewerConfig,
    pub(crate) source: Box<dyn DataSourceProvider>,
    pub(crate) status: StatusLog,
    pub(crate) active_tab: usize,
    pub(crate) add_dialog: Option<AddChannelDialog>,
    pub(crate) edit_dialog: Option<EditChartDialog>,
    pub(crate) chart_height: f32,
}

impl ViewerApp {
    /// Viewer backed by [`SimulationSource`] built from `config`.
    pub fn new(config: ViewerConfig) -> Self {
        let source = SimulationSource::from_config(&config.legacy);
        Self::with_source(config, Box::new(source))
    }

    /// Viewer with an injected data source.
    pub fn with_source(config: ViewerConfig, source: Box<dyn DataSourceProvider>) -> Self {
        let status = StatusLog::new(config.status_capacity);
        Self {
            session: Session::new(),
            config,
            source,
            status,
            active_tab: 0,
            add_dialog: None,
            edit_dialog: None,
            chart_height: 260.0,
        }
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tabs and charts
    // ─────────────────────────────────────────────────────────────────────────

    pub fn new_tab(&mut self) {
        self.active_tab = self.session.new_tab();
    }

    pub fn close_tab(&mut self, index: usize) {
        if self.session.close_tab(index).is_some() {
            self.add_dialog = None;
            self.edit_dialog = None;
        }
        if self.active_tab >= self.session.tabs.len() {
            self.active_tab = self.session.tabs.len().saturating_sub(1);
        }
    }

    pub fn add_chart(&mut self, tab: usize) {
        if let Some(t) = self.session.tabs.get_mut(tab) {
            t.add_chart();
        }
    }

    pub fn remove_chart(&mut self, slot: ChartSlot) {
        if let Some(t) = self.session.tabs.get_mut(slot.tab) {
            if t.remove_chart(slot.chart).is_some() {
                self.add_dialog = None;
                self.edit_dialog = None;
            }
        }
    }

    pub fn open_add_channel(&mut self, slot: ChartSlot) {
        let Some(chart) = self.chart_mut(slot) else {
            return;
        };
        let color = chart.next_color();
        self.add_dialog = Some(AddChannelDialog::new(
            slot,
            self.config.default_init_time,
            color,
        ));
    }

    pub fn open_edit(&mut self, slot: ChartSlot) {
        if let Some(chart) = self.chart_mut(slot) {
            let dlg = EditChartDialog::new(slot, chart);
            self.edit_dialog = Some(dlg);
        }
    }

    pub(crate) fn chart_mut(&mut self, slot: ChartSlot) -> Option<&mut LiveChart> {
        self.session.tabs.get_mut(slot.tab)?.charts.get_mut(slot.chart)
    }

    /// Read the line's series and plot it. Nothing is added when the read fails.
    pub fn add_line(&mut self, slot: ChartSlot, desc: LineDescriptor) -> bool {
        let init_time = desc.init_time_or(self.config.default_init_time);
        match self.source.fetch(&desc.channel, init_time) {
            Ok(series) => {
                if series.is_empty() {
                    self.status.warning(format!(
                        "'{}' from {} has no samples",
                        desc.channel.channel_name, desc.channel.file_path
                    ));
                }
                let Some(chart) = self.chart_mut(slot) else {
                    return false;
                };
                chart.add_line(desc, series);
                true
            }
            Err(e) => {
                self.status
                    .warning(format!("could not extract data from the channel: {e}"));
                false
            }
        }
    }

    /// Propagate a user pan/zoom on one chart to the rest of its tab.
    pub fn view_changed(&mut self, slot: ChartSlot, x: AxisLimits, y: AxisLimits) {
        let Some(tab) = self.session.tabs.get_mut(slot.tab) else {
            return;
        };
        if let Some(chart) = tab.charts.get_mut(slot.chart) {
            chart.y_limits = Some(y);
        }
        tab.notify_x_range_changed(slot.chart, x);
    }

    pub fn add_files(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> usize {
        crate::panels::add_paths(&mut self.session.files, paths, &mut self.status)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Templates
    // ─────────────────────────────────────────────────────────────────────────

    pub fn export_template(&self) -> Template {
        reconcile::export(&self.session)
    }

    pub fn save_template(&mut self, path: &Path) -> bool {
        let template = self.export_template();
        match persistence::save_template_to_path(&template, path) {
            Ok(()) => {
                self.status.info(format!(
                    "template saved to {} ({} charts, {} lines)",
                    path.display(),
                    template.chart_count(),
                    template.line_count()
                ));
                true
            }
            Err(e) => {
                self.status.error(format!("failed to save template: {e}"));
                false
            }
        }
    }

    /// Replace the session with the template at `path`. An unreadable or
    /// malformed template leaves the current session untouched.
    pub fn load_template(&mut self, path: &Path) -> bool {
        let template = match persistence::load_template_from_path(path) {
            Ok(t) => t,
            Err(e) => {
                self.status
                    .error(format!("failed to load template {}: {e}", path.display()));
                return false;
            }
        };
        let mut reconciler = Reconciler::new(self.source.as_ref(), &mut self.status)
            .with_default_init_time(self.config.default_init_time);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            reconciler = reconciler.with_base_dir(dir);
        }
        let session = reconciler.import(&template);
        self.session = session;
        if self.session.tabs.is_empty() {
            self.session.new_tab();
        }
        self.active_tab = 0;
        self.add_dialog = None;
        self.edit_dialog = None;
        true
    }

    /// Re-read every plotted line from disk.
    pub fn reload_data(&mut self) {
        let mut reconciler = Reconciler::new(self.source.as_ref(), &mut self.status)
            .with_default_init_time(self.config.default_init_time);
        reconciler.reload(&mut self.session.tabs);
    }
}
