//! Viewer configuration: defaults, optional TOML file and environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// File name looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "simview.toml";

/// Left-truncation threshold applied to delimited-text files by default.
pub const DEFAULT_INIT_TIME: f64 = 2.0;

// ─────────────────────────────────────────────────────────────────────────────
// Legacy helper
// ─────────────────────────────────────────────────────────────────────────────

/// How to reach the external legacy-runtime helper used when the primary
/// channel-file reader cannot open a `.out` file.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyConfig {
    /// Disable to never spawn the helper; `.out` files then need a native reader.
    pub enabled: bool,
    /// Interpreter executable.
    pub interpreter: PathBuf,
    /// Helper script passed as first argument to the interpreter.
    pub script: PathBuf,
    /// Upper bound for a single helper invocation.
    pub timeout: Duration,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        let interpreter = if cfg!(windows) {
            PathBuf::from("C:/Python27/python.exe")
        } else {
            PathBuf::from("python2")
        };
        Self {
            enabled: true,
            interpreter,
            script: PathBuf::from("lector_out_legacy.py"),
            timeout: Duration::from_secs(60),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewerConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for the viewer.
///
/// Not `Debug`: `eframe::NativeOptions` has no `Debug` impl.
#[derive(Clone)]
pub struct ViewerConfig {
    /// Native window title.
    pub title: String,
    /// Rows of a `.csv` file earlier than this are dropped and the time axis is
    /// shifted so that `init_time` becomes zero.
    pub default_init_time: f64,
    /// Number of messages kept in the in-app status log.
    pub status_capacity: usize,
    /// Legacy helper process settings.
    pub legacy: LegacyConfig,
    /// Optional eframe native-window options.
    pub native_options: Option<eframe::NativeOptions>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "PSS/E - PSCAD Viewer".to_string(),
            default_init_time: DEFAULT_INIT_TIME,
            status_capacity: 200,
            legacy: LegacyConfig::default(),
            native_options: None,
        }
    }
}

/// On-disk shape of `simview.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    title: Option<String>,
    default_init_time: Option<f64>,
    status_capacity: Option<usize>,
    legacy: LegacyFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyFile {
    enabled: Option<bool>,
    interpreter: Option<PathBuf>,
    script: Option<PathBuf>,
    timeout_secs: Option<f64>,
}

impl ViewerConfig {
    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut cfg = Self::default();
        if let Some(t) = file.title {
            cfg.title = t;
        }
        if let Some(t) = file.default_init_time {
            cfg.default_init_time = t;
        }
        if let Some(n) = file.status_capacity {
            cfg.status_capacity = n.max(1);
        }
        if let Some(e) = file.legacy.enabled {
            cfg.legacy.enabled = e;
        }
        if let Some(p) = file.legacy.interpreter {
            cfg.legacy.interpreter = p;
        }
        if let Some(p) = file.legacy.script {
            cfg.legacy.script = p;
        }
        if let Some(secs) = file.legacy.timeout_secs {
            if secs.is_finite() && secs > 0.0 {
                cfg.legacy.timeout = Duration::from_secs_f64(secs);
            }
        }
        Ok(cfg)
    }

    /// Load a TOML configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Resolve the configuration the binary starts with.
    ///
    /// Order: explicit path (or `SIMVIEW_CONFIG`), then `simview.toml` in the
    /// working directory if present, otherwise defaults. Environment
    /// overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os("SIMVIEW_CONFIG").map(PathBuf::from);
        let mut cfg = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_path(&path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_path(local)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply `SIMVIEW_LEGACY_*` overrides using the provided lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("SIMVIEW_LEGACY_PYTHON") {
            self.legacy.interpreter = PathBuf::from(v);
        }
        if let Some(v) = lookup("SIMVIEW_LEGACY_SCRIPT") {
            self.legacy.script = PathBuf::from(v);
        }
        if let Some(v) = lookup("SIMVIEW_LEGACY_TIMEOUT_SECS") {
            let secs: f64 = v.trim().parse().map_err(|_| ConfigError::Env {
                key: "SIMVIEW_LEGACY_TIMEOUT_SECS",
                value: v.clone(),
            })?;
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::Env {
                    key: "SIMVIEW_LEGACY_TIMEOUT_SECS",
                    value: v,
                });
            }
            self.legacy.timeout = Duration::from_secs_f64(secs);
        }
        Ok(())
    }
}
