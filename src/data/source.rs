//! Channel data access for both simulation output formats.
//!
//! [`DataSourceProvider`] is the capability the reconciler and the UI depend
//! on. [`SimulationSource`] is the production implementation: `.csv` files are
//! read directly, `.out` files go through a [`ChannelReader`] first and fall
//! back to the legacy helper process when that fails.

use std::collections::HashMap;
use std::path::Path;

use crate::config::{LegacyConfig, DEFAULT_INIT_TIME};
use crate::data::csv_source;
use crate::data::layout::{ChannelRef, FileKind};
use crate::data::legacy::{CallOutcome, CancelToken, LegacyBridge};
use crate::data::series::Series;
use crate::error::SourceError;

/// Contents of a binary channel file as delivered by a [`ChannelReader`].
#[derive(Debug, Clone, Default)]
pub struct ChannelFile {
    /// `(id, name)` in file order.
    pub channels: Vec<(String, String)>,
    pub time: Vec<f64>,
    pub values: HashMap<String, Vec<f64>>,
}

impl ChannelFile {
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|(_, n)| n.clone()).collect()
    }

    /// First channel with this name.
    pub fn series(&self, name: &str) -> Option<Series> {
        let (id, _) = self.channels.iter().find(|(_, n)| n == name)?;
        let values = self.values.get(id)?.clone();
        Some(Series::new(self.time.clone(), values))
    }
}

/// Native reader for the binary channel-file format.
pub trait ChannelReader {
    fn read(&self, path: &Path) -> Result<ChannelFile, SourceError>;
}

/// Placeholder used when no native reader is linked in; always fails so the
/// legacy helper is consulted.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableReader;

impl ChannelReader for UnavailableReader {
    fn read(&self, path: &Path) -> Result<ChannelFile, SourceError> {
        Err(SourceError::ReaderUnavailable(path.to_path_buf()))
    }
}

/// Read access to simulation channels.
///
/// `channels` and `fetch` report typed failures. `list_channels` and
/// `read_series` are the lenient forms: they log the failure and return empty
/// data, which callers treat as "no data available".
pub trait DataSourceProvider {
    fn channels(&self, path: &Path) -> Result<Vec<String>, SourceError>;

    /// `init_time` only affects delimited-text files.
    fn fetch(&self, channel: &ChannelRef, init_time: f64) -> Result<Series, SourceError>;

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_channels(&self, path: &Path) -> Vec<String> {
        match self.channels(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("cannot list channels of {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    fn read_series(&self, channel: &ChannelRef, init_time: Option<f64>) -> Series {
        match self.fetch(channel, init_time.unwrap_or(DEFAULT_INIT_TIME)) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(
                    "cannot read '{}' from {}: {e}",
                    channel.channel_name,
                    channel.file_path
                );
                Series::default()
            }
        }
    }
}

/// Production data source.
pub struct SimulationSource {
    reader: Box<dyn ChannelReader>,
    legacy: Option<LegacyBridge>,
    cancel: CancelToken,
}

impl SimulationSource {
    pub fn new(reader: Box<dyn ChannelReader>, legacy: Option<LegacyBridge>) -> Self {
        Self {
            reader,
            legacy,
            cancel: CancelToken::new(),
        }
    }

    /// No native reader; legacy helper as configured.
    pub fn from_config(cfg: &LegacyConfig) -> Self {
        let legacy = cfg.enabled.then(|| LegacyBridge::new(cfg.clone()));
        Self::new(Box::new(UnavailableReader), legacy)
    }

    /// Token that aborts a running legacy helper call.
    ///
    /// Calls run on the caller's thread, so the token is meant for embedders
    /// that drive the source from a worker thread. A cancel aborts the running
    /// call, or the next one if none is running, and is consumed by it.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn consume_cancel<T>(&self, outcome: CallOutcome<T>) -> Result<T, SourceError> {
        if matches!(outcome, CallOutcome::Cancelled) {
            self.cancel.reset();
        }
        outcome.into_result()
    }

    fn out_channels(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        match self.reader.read(path) {
            Ok(file) => Ok(file.channel_names()),
            Err(primary) => {
                let Some(bridge) = &self.legacy else {
                    return Err(primary);
                };
                log::warn!("primary reader failed on {}: {primary}", path.display());
                log::info!("trying legacy helper for {}", path.display());
                let names = self.consume_cancel(bridge.list_channels(path, &self.cancel))?;
                log::info!("legacy helper listed {} channels", names.len());
                Ok(names)
            }
        }
    }

    fn out_series(&self, channel: &ChannelRef) -> Result<Series, SourceError> {
        let path = channel.path();
        match self.reader.read(path) {
            Ok(file) => file.series(&channel.channel_name).ok_or_else(|| {
                SourceError::ChannelNotFound {
                    file: path.to_path_buf(),
                    channel: channel.channel_name.clone(),
                }
            }),
            Err(primary) => {
                let Some(bridge) = &self.legacy else {
                    return Err(primary);
                };
                log::warn!("primary reader failed on {}: {primary}", path.display());
                self.consume_cancel(bridge.read_series(path, &channel.channel_name, &self.cancel))
            }
        }
    }
}

impl DataSourceProvider for SimulationSource {
    fn channels(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        if !path.is_file() {
            return Err(SourceError::FileUnavailable(path.to_path_buf()));
        }
        match FileKind::from_path(path) {
            Some(FileKind::Delimited) => csv_source::list_channels(path),
            Some(FileKind::ChannelFile) => self.out_channels(path),
            None => Err(SourceError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn fetch(&self, channel: &ChannelRef, init_time: f64) -> Result<Series, SourceError> {
        let path = channel.path();
        if !path.is_file() {
            return Err(SourceError::FileUnavailable(path.to_path_buf()));
        }
        match FileKind::from_path(path) {
            Some(FileKind::Delimited) => {
                csv_source::read_series(path, &channel.channel_name, init_time)
            }
            Some(FileKind::ChannelFile) => self.out_series(channel),
            None => Err(SourceError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
