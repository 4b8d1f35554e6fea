//! Conversion between live chart state and templates.
//!
//! - [`export`] projects a [`Session`] onto a [`Template`] (no sample data).
//! - [`Reconciler::import`] rebuilds a [`Session`] from a template, reading
//!   every line's series again.
//! - [`Reconciler::reload`] re-reads every plotted line in place.
//!
//! Problems with individual files or channels never abort these operations:
//! the affected line is skipped and reported to the [`StatusSink`].

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_INIT_TIME;
use crate::data::layout::{ChannelRef, FileKind, LineDescriptor, TabDescriptor};
use crate::data::series::Series;
use crate::data::session::{LiveChart, LiveTab, Session};
use crate::data::source::DataSourceProvider;
use crate::error::SourceError;
use crate::persistence::Template;

/// Why a line was left out.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FileUnavailable,
    ChannelNotFound,
    ReadFailed(String),
}

impl From<&SourceError> for SkipReason {
    fn from(e: &SourceError) -> Self {
        match e {
            SourceError::FileUnavailable(_) => SkipReason::FileUnavailable,
            SourceError::ChannelNotFound { .. } => SkipReason::ChannelNotFound,
            other => SkipReason::ReadFailed(other.to_string()),
        }
    }
}

/// A line that could not be restored or refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineWarning {
    pub tab: String,
    pub chart: usize,
    pub channel: ChannelRef,
    pub reason: SkipReason,
}

impl fmt::Display for LineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let why = match &self.reason {
            SkipReason::FileUnavailable => "file not found".to_string(),
            SkipReason::ChannelNotFound => "channel not in file".to_string(),
            SkipReason::ReadFailed(e) => e.clone(),
        };
        write!(
            f,
            "[{} / chart {}] skipped '{}' from {}: {}",
            self.tab,
            self.chart + 1,
            self.channel.channel_name,
            self.channel.file_path,
            why
        )
    }
}

/// Receives non-fatal conditions found while reconciling.
pub trait StatusSink {
    fn warn(&mut self, warning: &LineWarning);

    fn info(&mut self, _message: &str) {}
}

/// Collects warnings; handy for tests and batch use.
impl StatusSink for Vec<LineWarning> {
    fn warn(&mut self, warning: &LineWarning) {
        self.push(warning.clone());
    }
}

/// Forwards everything to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn warn(&mut self, warning: &LineWarning) {
        log::warn!("{warning}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }
}

/// Counts from a [`Reconciler::reload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub reloaded: usize,
    pub dropped: usize,
}

/// Snapshot the session as a template. Series data is not included.
pub fn export(session: &Session) -> Template {
    Template {
        tabs: session
            .tabs
            .iter()
            .map(|tab| TabDescriptor {
                name: tab.name.clone(),
                charts: tab.charts.iter().map(LiveChart::descriptor).collect(),
            })
            .collect(),
        known_files: session.files.clone(),
    }
}

/// Rebuilds and refreshes live state through a [`DataSourceProvider`].
pub struct Reconciler<'a> {
    source: &'a dyn DataSourceProvider,
    status: &'a mut dyn StatusSink,
    default_init_time: f64,
    base_dir: Option<PathBuf>,
}

impl<'a> Reconciler<'a> {
    pub fn new(source: &'a dyn DataSourceProvider, status: &'a mut dyn StatusSink) -> Self {
        Self {
            source,
            status,
            default_init_time: DEFAULT_INIT_TIME,
            base_dir: None,
        }
    }

    /// Truncation threshold for lines that do not carry their own.
    pub fn with_default_init_time(mut self, init_time: f64) -> Self {
        self.default_init_time = init_time;
        self
    }

    /// Directory that relative template paths are resolved against
    /// (normally the template file's directory).
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.to_path_buf(),
        }
    }

    /// Rebuild live state from a template.
    ///
    /// Known files that no longer exist are omitted. Each line is read again;
    /// lines whose file or channel is gone are skipped with a warning. Axis
    /// limits are applied after the lines so they win over autoscaling.
    pub fn import(&mut self, template: &Template) -> Session {
        let mut session = Session::default();

        for kind in [FileKind::ChannelFile, FileKind::Delimited] {
            for path in template.known_files.list(kind) {
                let resolved = self.resolve(path);
                if self.source.file_exists(&resolved) {
                    session.files.insert_as(kind, resolved);
                } else {
                    log::debug!("known file {} no longer exists; omitted", path.display());
                }
            }
        }

        for tab_desc in &template.tabs {
            let mut tab = LiveTab::new(tab_desc.name.clone());
            for (chart_idx, chart_desc) in tab_desc.charts.iter().enumerate() {
                let mut chart = LiveChart::with_presentation(chart_desc);
                for line_desc in &chart_desc.lines {
                    let mut desc = line_desc.clone();
                    desc.channel.file_path = self
                        .resolve(Path::new(&line_desc.channel.file_path))
                        .to_string_lossy()
                        .into_owned();
                    if let Some(series) = self.fetch_line(&tab.name, chart_idx, &desc) {
                        chart.add_line(desc, series);
                    }
                }
                chart.x_limits = chart_desc.x_limits;
                chart.y_limits = chart_desc.y_limits;
                tab.charts.push(chart);
            }
            session.tabs.push(tab);
        }

        self.status.info(&format!(
            "template loaded: {} tabs, {} of {} lines restored",
            session.tabs.len(),
            session.line_count(),
            template.line_count()
        ));
        session
    }

    /// Re-read every plotted line from disk.
    ///
    /// Labels, colors, visibility and multipliers are kept. Each chart's
    /// x-range survives the refresh; the y-axis goes back to autoscale so new
    /// data is fully visible. Lines whose data can no longer be read are
    /// dropped with a warning.
    pub fn reload(&mut self, tabs: &mut [LiveTab]) -> ReloadSummary {
        let mut summary = ReloadSummary::default();
        for tab in tabs.iter_mut() {
            for (chart_idx, chart) in tab.charts.iter_mut().enumerate() {
                let x_limits = chart.x_limits;
                let labels = chart.labels();
                let lines = std::mem::take(&mut chart.lines);
                for mut line in lines {
                    match self.fetch_line(&tab.name, chart_idx, &line.descriptor) {
                        Some(series) => {
                            line.replace_series(series);
                            chart.lines.push(line);
                            summary.reloaded += 1;
                        }
                        None => summary.dropped += 1,
                    }
                }
                chart.y_limits = None;
                chart.x_limits = x_limits;
                chart.apply_labels(&labels);
            }
        }
        self.status.info(&format!(
            "reloaded {} lines, dropped {}",
            summary.reloaded, summary.dropped
        ));
        summary
    }

    fn fetch_line(&mut self, tab: &str, chart: usize, desc: &LineDescriptor) -> Option<Series> {
        if !self.source.file_exists(desc.channel.path()) {
            self.skip(tab, chart, desc, SkipReason::FileUnavailable);
            return None;
        }
        let init_time = desc.init_time_or(self.default_init_time);
        match self.source.fetch(&desc.channel, init_time) {
            Ok(series) => Some(series),
            Err(e) => {
                self.skip(tab, chart, desc, SkipReason::from(&e));
                None
            }
        }
    }

    fn skip(&mut self, tab: &str, chart: usize, desc: &LineDescriptor, reason: SkipReason) {
        self.status.warn(&LineWarning {
            tab: tab.to_string(),
            chart,
            channel: desc.channel.clone(),
            reason,
        });
    }
}
