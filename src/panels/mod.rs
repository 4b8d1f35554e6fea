pub mod add_channel_ui;
pub mod chart_ui;
pub mod edit_chart_ui;
pub mod files_ui;
pub mod status_ui;

pub use add_channel_ui::{AddChannelDialog, ChartSlot, DialogOutcome};
pub use chart_ui::{render_chart, ChartAction};
pub use edit_chart_ui::EditChartDialog;
pub use files_ui::{add_paths, render_files_panel};
pub use status_ui::{StatusLevel, StatusLog};
