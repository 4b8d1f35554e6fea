//! Main application module for the viewer.
//!
//! | Sub-module       | Responsibility |
//! | ---------------- | -------------- |
//! | [`viewer_app`]   | [`ViewerApp`] state and the operations behind each button |
//! | [`update`]       | Per-frame rendering: menu bar, file browser, tabs, charts, dialogs |
//! | [`run`]          | Top-level [`run_viewer()`] entry point |

mod run;
mod update;
mod viewer_app;

pub use run::run_viewer;
pub use viewer_app::ViewerApp;
