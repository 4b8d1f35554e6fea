//! Templates: save and load chart layouts to/from JSON files.
//!
//! A template lists tabs, charts and lines by file and channel name together
//! with the known input files. Sample data is never stored; it is read again
//! from disk when a template is imported.
//!
//! ```json
//! {"tabs": [{"name": "T1", "plots": [{"title": "V1", "xlabel": "(s)", "ylabel": "pu",
//!   "lines": [{"file": "a.csv", "channel": "V1", "label": "Bus1", "color": "#ff0000",
//!              "visible": true, "multiplier": 1.0}],
//!   "xlim": [0, 10], "ylim": [0.9, 1.1], "grid": true}]}],
//!  "files": {"psse": [], "pscad": ["a.csv"]}}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::layout::{KnownFiles, TabDescriptor};
use crate::error::TemplateError;

/// Serializable snapshot of the open tabs and known files.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub tabs: Vec<TabDescriptor>,
    #[serde(rename = "files", default)]
    pub known_files: KnownFiles,
}

impl Template {
    pub fn chart_count(&self) -> usize {
        self.tabs.iter().map(|t| t.charts.len()).sum()
    }

    pub fn line_count(&self) -> usize {
        self.tabs
            .iter()
            .flat_map(|t| t.charts.iter())
            .map(|c| c.lines.len())
            .sum()
    }
}

// ---------- Public API ----------

/// Serialize a template as pretty JSON.
pub fn template_to_json(template: &Template) -> Result<String, TemplateError> {
    Ok(serde_json::to_string_pretty(template)?)
}

/// Deserialize a template from JSON.
pub fn template_from_json(json: &str) -> Result<Template, TemplateError> {
    Ok(serde_json::from_str(json)?)
}

/// Save a template to a JSON file at the given path.
pub fn save_template_to_path(template: &Template, path: &Path) -> Result<(), TemplateError> {
    let txt = template_to_json(template)?;
    std::fs::write(path, txt)?;
    Ok(())
}

/// Load a template from a JSON file at the given path.
pub fn load_template_from_path(path: &Path) -> Result<Template, TemplateError> {
    let txt = std::fs::read_to_string(path)?;
    template_from_json(&txt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_optional() {
        let t = template_from_json(
            r#"{"tabs":[{"name":"A","plots":[{"title":"","xlabel":"","ylabel":"","lines":[],"grid":false}]}],"files":{"psse":[],"pscad":[]}}"#,
        )
        .unwrap();
        assert_eq!(t.tabs[0].charts[0].x_limits, None);
        let json = template_to_json(&t).unwrap();
        assert!(!json.contains("xlim"));
    }

    #[test]
    fn missing_files_object_is_empty() {
        let t = template_from_json(r#"{"tabs":[]}"#).unwrap();
        assert!(t.known_files.is_empty());
    }

    #[test]
    fn line_defaults_when_fields_absent() {
        let t = template_from_json(
            r#"{"tabs":[{"name":"A","plots":[{"lines":[{"file":"a.csv","channel":"V","label":"V","color":"red"}]}]}]}"#,
        )
        .unwrap();
        let line = &t.tabs[0].charts[0].lines[0];
        assert!(line.visible);
        assert_eq!(line.multiplier, 1.0);
        assert_eq!(line.init_time, None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(template_from_json("{tabs"), Err(TemplateError::Json(_))));
    }
}
