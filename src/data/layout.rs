//! Plain descriptor records: what is plotted and how it is presented.
//!
//! These are the persistent half of the chart state. They carry no sample
//! data; [`crate::data::session`] pairs them with series read from disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_INIT_TIME;
use crate::data::color;

/// Identifies one time series: a file and a channel name inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    #[serde(rename = "file")]
    pub file_path: String,
    #[serde(rename = "channel")]
    pub channel_name: String,
}

impl ChannelRef {
    pub fn new(file_path: impl Into<String>, channel_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            channel_name: channel_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.file_path)
    }
}

/// Inclusive axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
}

impl AxisLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Finite and non-degenerate.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    /// Equal within a small fraction of the span.
    pub fn approx_eq(&self, other: &AxisLimits) -> bool {
        let tol = 1e-9 * self.span().abs().max(other.span().abs()).max(1e-12);
        (self.min - other.min).abs() <= tol && (self.max - other.max).abs() <= tol
    }
}

impl From<[f64; 2]> for AxisLimits {
    fn from(v: [f64; 2]) -> Self {
        Self { min: v[0], max: v[1] }
    }
}

impl From<AxisLimits> for [f64; 2] {
    fn from(l: AxisLimits) -> Self {
        [l.min, l.max]
    }
}

fn default_true() -> bool {
    true
}

fn default_multiplier() -> f64 {
    1.0
}

/// One plotted channel with its presentation attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDescriptor {
    #[serde(flatten)]
    pub channel: ChannelRef,
    pub label: String,
    /// Hex (`#rrggbb`) or a named color.
    pub color: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Truncation threshold used when reading delimited-text files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_time: Option<f64>,
}

impl LineDescriptor {
    /// New visible line labelled after its channel, multiplier 1.
    pub fn new(channel: ChannelRef, color: impl Into<String>) -> Self {
        Self {
            label: channel.channel_name.clone(),
            channel,
            color: color.into(),
            visible: true,
            multiplier: 1.0,
            init_time: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_init_time(mut self, init_time: f64) -> Self {
        self.init_time = Some(init_time);
        self
    }

    pub fn init_time_or(&self, fallback: f64) -> f64 {
        self.init_time.unwrap_or(fallback)
    }

    pub fn init_time_or_default(&self) -> f64 {
        self.init_time_or(DEFAULT_INIT_TIME)
    }

    /// Resolved RGB color; unknown names fall back to gray.
    pub fn color32(&self) -> egui::Color32 {
        color::parse_color(&self.color).unwrap_or(egui::Color32::GRAY)
    }
}

/// A chart: ordered lines plus chart-level presentation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "xlabel", default)]
    pub x_label: String,
    #[serde(rename = "ylabel", default)]
    pub y_label: String,
    #[serde(default)]
    pub lines: Vec<LineDescriptor>,
    #[serde(rename = "xlim", default, skip_serializing_if = "Option::is_none")]
    pub x_limits: Option<AxisLimits>,
    #[serde(rename = "ylim", default, skip_serializing_if = "Option::is_none")]
    pub y_limits: Option<AxisLimits>,
    #[serde(rename = "grid", default)]
    pub grid_enabled: bool,
}

/// A named group of charts sharing a linked x-axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabDescriptor {
    pub name: String,
    #[serde(rename = "plots", default)]
    pub charts: Vec<ChartDescriptor>,
}

/// Category of an input file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Binary channel file (`.out`).
    ChannelFile,
    /// Delimited-text export (`.csv`).
    Delimited,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "out" => Some(FileKind::ChannelFile),
            "csv" => Some(FileKind::Delimited),
            _ => None,
        }
    }

    /// Key used for this category in the template `files` object.
    pub fn category(self) -> &'static str {
        match self {
            FileKind::ChannelFile => "psse",
            FileKind::Delimited => "pscad",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::ChannelFile => "PSS/E .out files",
            FileKind::Delimited => "PSCAD .csv files",
        }
    }
}

/// Input files the user has loaded, partitioned by category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnownFiles {
    #[serde(default)]
    pub psse: Vec<PathBuf>,
    #[serde(default)]
    pub pscad: Vec<PathBuf>,
}

impl KnownFiles {
    pub fn list(&self, kind: FileKind) -> &[PathBuf] {
        match kind {
            FileKind::ChannelFile => &self.psse,
            FileKind::Delimited => &self.pscad,
        }
    }

    fn list_mut(&mut self, kind: FileKind) -> &mut Vec<PathBuf> {
        match kind {
            FileKind::ChannelFile => &mut self.psse,
            FileKind::Delimited => &mut self.pscad,
        }
    }

    /// Add a file under the category given by its extension.
    ///
    /// Returns the category, or `None` when the extension is not recognised.
    /// Adding a path twice keeps a single entry.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> Option<FileKind> {
        let path = path.into();
        let kind = FileKind::from_path(&path)?;
        let list = self.list_mut(kind);
        if !list.contains(&path) {
            list.push(path);
        }
        Some(kind)
    }

    /// Add a file to an explicit category (used when restoring templates).
    pub fn insert_as(&mut self, kind: FileKind, path: impl Into<PathBuf>) {
        let path = path.into();
        let list = self.list_mut(kind);
        if !list.contains(&path) {
            list.push(path);
        }
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let mut removed = false;
        for list in [&mut self.psse, &mut self.pscad] {
            let before = list.len();
            list.retain(|p| p != path);
            removed |= list.len() != before;
        }
        removed
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.psse.iter().chain(self.pscad.iter()).any(|p| p == path)
    }

    /// All files, channel files first.
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.psse.iter().chain(self.pscad.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.psse.is_empty() && self.pscad.is_empty()
    }
}
