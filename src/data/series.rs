//! Sample data attached to plotted lines.

use crate::data::layout::LineDescriptor;

/// A time series as read from disk. Values are never scaled in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(time: Vec<f64>, values: Vec<f64>) -> Self {
        Self { time, values }
    }

    /// Number of complete (time, value) pairs.
    pub fn len(&self) -> usize {
        self.time.len().min(self.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest and largest time, if any sample exists.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        min_max(self.time.iter().take(self.len()).copied())
    }
}

fn min_max(iter: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    iter.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// A line on a live chart: its descriptor plus the raw series.
#[derive(Debug, Clone)]
pub struct PlottedLine {
    pub descriptor: LineDescriptor,
    raw: Series,
}

impl PlottedLine {
    pub fn new(descriptor: LineDescriptor, raw: Series) -> Self {
        Self { descriptor, raw }
    }

    /// The series exactly as read, before the multiplier.
    pub fn raw(&self) -> &Series {
        &self.raw
    }

    /// Swap in freshly read data, keeping the descriptor.
    pub fn replace_series(&mut self, raw: Series) {
        self.raw = raw;
    }

    pub fn multiplier(&self) -> f64 {
        self.descriptor.multiplier
    }

    /// Change the scale factor. The raw values are untouched so any change can
    /// be undone by setting the previous factor again.
    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.descriptor.multiplier = multiplier;
    }

    /// Values with the multiplier applied.
    pub fn values(&self) -> Vec<f64> {
        let m = self.descriptor.multiplier;
        self.raw.values.iter().map(|v| v * m).collect()
    }

    /// `[t, v * multiplier]` pairs ready for plotting.
    pub fn points(&self) -> Vec<[f64; 2]> {
        let m = self.descriptor.multiplier;
        self.raw
            .time
            .iter()
            .zip(self.raw.values.iter())
            .map(|(t, v)| [*t, v * m])
            .collect()
    }

    /// Bounds of the scaled data as `(x_min, x_max, y_min, y_max)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let (x0, x1) = self.raw.time_range()?;
        let m = self.descriptor.multiplier;
        let (y0, y1) = min_max(self.raw.values.iter().take(self.raw.len()).map(|v| v * m))?;
        Some((x0, x1, y0, y1))
    }
}
