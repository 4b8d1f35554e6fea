//! Live chart state: tabs, charts, plotted lines and the known-files list.
//!
//! This is what the UI edits and renders. Templates are produced from it and
//! turned back into it by [`crate::data::reconcile`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::data::color;
use crate::data::layout::{AxisLimits, ChartDescriptor, KnownFiles, LineDescriptor};
use crate::data::series::{PlottedLine, Series};

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

/// Default x-axis label for new charts.
pub const DEFAULT_X_LABEL: &str = "(s)";

/// Editable chart-level presentation, as used by the edit dialog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid_enabled: bool,
}

/// One chart on a tab.
#[derive(Debug, Clone)]
pub struct LiveChart {
    id: u64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid_enabled: bool,
    /// `None` means autoscale to the data.
    pub x_limits: Option<AxisLimits>,
    pub y_limits: Option<AxisLimits>,
    pub lines: Vec<PlottedLine>,
    /// Last x-range pushed into this chart by synchronization. A change
    /// notification carrying this range is an echo and is not propagated.
    sync_echo: Option<AxisLimits>,
}

impl Default for LiveChart {
    fn default() -> Self {
        Self {
            id: NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed),
            title: String::new(),
            x_label: DEFAULT_X_LABEL.to_string(),
            y_label: String::new(),
            grid_enabled: false,
            x_limits: None,
            y_limits: None,
            lines: Vec::new(),
            sync_echo: None,
        }
    }
}

impl LiveChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chart with the descriptor's presentation applied; lines and limits are
    /// left for the caller to add.
    pub fn with_presentation(desc: &ChartDescriptor) -> Self {
        let mut chart = Self::new();
        chart.apply_labels(&ChartLabels {
            title: desc.title.clone(),
            x_label: desc.x_label.clone(),
            y_label: desc.y_label.clone(),
            grid_enabled: desc.grid_enabled,
        });
        chart
    }

    /// Stable identifier, unique within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn labels(&self) -> ChartLabels {
        ChartLabels {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            grid_enabled: self.grid_enabled,
        }
    }

    pub fn apply_labels(&mut self, labels: &ChartLabels) {
        self.title = labels.title.clone();
        self.x_label = labels.x_label.clone();
        self.y_label = labels.y_label.clone();
        self.grid_enabled = labels.grid_enabled;
    }

    /// Snapshot of this chart without sample data.
    pub fn descriptor(&self) -> ChartDescriptor {
        ChartDescriptor {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            lines: self.lines.iter().map(|l| l.descriptor.clone()).collect(),
            x_limits: self.x_limits,
            y_limits: self.y_limits,
            grid_enabled: self.grid_enabled,
        }
    }

    /// Palette color for the next line added.
    pub fn next_color(&self) -> String {
        color::alloc_color_hex(self.lines.len())
    }

    pub fn add_line(&mut self, descriptor: LineDescriptor, series: Series) {
        self.lines.push(PlottedLine::new(descriptor, series));
    }

    pub fn remove_line(&mut self, index: usize) -> Option<PlottedLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn toggle_visible(&mut self, index: usize) {
        if let Some(l) = self.lines.get_mut(index) {
            l.descriptor.visible = !l.descriptor.visible;
        }
    }

    /// Back to a fresh chart: no lines, no title, default axis labels, grid
    /// off and autoscale.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.title.clear();
        self.x_label = DEFAULT_X_LABEL.to_string();
        self.y_label.clear();
        self.grid_enabled = false;
        self.x_limits = None;
        self.y_limits = None;
        self.sync_echo = None;
    }

    /// Back to autoscale on both axes.
    pub fn reset_zoom(&mut self) {
        self.x_limits = None;
        self.y_limits = None;
    }

    /// Bounds of all visible lines as `(x_min, x_max, y_min, y_max)`.
    pub fn data_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.lines
            .iter()
            .filter(|l| l.descriptor.visible)
            .filter_map(PlottedLine::bounds)
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3)))
    }

    /// Set the x-range as instructed by a sibling chart.
    fn apply_synced_x(&mut self, range: AxisLimits) {
        self.x_limits = Some(range);
        self.sync_echo = Some(range);
    }

    /// Whether a change notification is the echo of a synchronized update.
    /// Consumes the echo marker either way.
    fn take_echo(&mut self, range: &AxisLimits) -> bool {
        match self.sync_echo.take() {
            Some(echo) => echo.approx_eq(range),
            None => false,
        }
    }
}

/// A named tab of charts whose x-axes are linked.
#[derive(Debug, Clone, Default)]
pub struct LiveTab {
    pub name: String,
    pub charts: Vec<LiveChart>,
}

impl LiveTab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            charts: Vec::new(),
        }
    }

    pub fn add_chart(&mut self) -> &mut LiveChart {
        self.charts.push(LiveChart::new());
        let last = self.charts.len() - 1;
        &mut self.charts[last]
    }

    pub fn remove_chart(&mut self, index: usize) -> Option<LiveChart> {
        (index < self.charts.len()).then(|| self.charts.remove(index))
    }

    /// React to a user-driven x-range change on chart `index`.
    ///
    /// The chart takes the new range and every other chart on the tab is set
    /// to the same range; their y-ranges are left alone. Returns `true` when
    /// the change was propagated and `false` for an echo of a previous
    /// synchronization or an invalid range.
    pub fn notify_x_range_changed(&mut self, index: usize, range: AxisLimits) -> bool {
        if !range.is_valid() {
            return false;
        }
        let Some(chart) = self.charts.get_mut(index) else {
            return false;
        };
        if chart.take_echo(&range) {
            return false;
        }
        chart.x_limits = Some(range);
        for (i, other) in self.charts.iter_mut().enumerate() {
            if i != index {
                other.apply_synced_x(range);
            }
        }
        true
    }

    /// Clear zoom on every chart of the tab.
    pub fn reset_zoom(&mut self) {
        for c in &mut self.charts {
            c.reset_zoom();
        }
    }
}

/// Everything that is open: tabs plus the file browser contents.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub tabs: Vec<LiveTab>,
    pub files: KnownFiles,
}

impl Session {
    /// Fresh session with one empty tab.
    pub fn new() -> Self {
        let mut s = Self::default();
        s.new_tab();
        s
    }

    /// Append a tab named "Tab N" and return its index.
    pub fn new_tab(&mut self) -> usize {
        let name = format!("Tab {}", self.tabs.len() + 1);
        self.tabs.push(LiveTab::new(name));
        self.tabs.len() - 1
    }

    pub fn close_tab(&mut self, index: usize) -> Option<LiveTab> {
        (index < self.tabs.len()).then(|| self.tabs.remove(index))
    }

    pub fn line_count(&self) -> usize {
        self.tabs
            .iter()
            .flat_map(|t| t.charts.iter())
            .map(|c| c.lines.len())
            .sum()
    }
}
