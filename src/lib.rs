//! simview crate root: re-exports and module wiring.
//!
//! A viewer for power-system simulation output. Channels from binary `.out`
//! channel files and `.csv` exports are plotted on charts grouped in tabs;
//! layouts are saved to and restored from JSON templates.
//!
//! - `data`: descriptors, channel readers, live session state and reconciliation
//! - `persistence`: template file format
//! - `config`: viewer configuration
//! - `app` / `panels`: the egui front-end

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod panels;
pub mod persistence;

pub use app::{run_viewer, ViewerApp};
pub use config::{LegacyConfig, ViewerConfig};
pub use data::layout::{AxisLimits, ChannelRef, ChartDescriptor, FileKind, KnownFiles, LineDescriptor, TabDescriptor};
pub use data::reconcile::{export, LineWarning, LogSink, Reconciler, SkipReason, StatusSink};
pub use data::series::{PlottedLine, Series};
pub use data::session::{LiveChart, LiveTab, Session};
pub use data::source::{ChannelReader, DataSourceProvider, SimulationSource};
pub use error::{ConfigError, SourceError, TemplateError};
pub use persistence::Template;
