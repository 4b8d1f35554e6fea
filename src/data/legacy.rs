//! Bridge to the legacy-runtime helper process.
//!
//! The helper is started as `<interpreter> <script> <file> [<channel>]` and
//! answers on stdout with either `{"canales": {id: name, ...}}` (no channel
//! given) or `{"time": [...], "valores": [...]}`. Every call is bounded by the
//! configured timeout and can be cancelled; the child is killed in both cases.

use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::LegacyConfig;
use crate::data::series::Series;
use crate::error::SourceError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared flag to abort a running helper call from another place.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one bounded helper invocation.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    Timeout(Duration),
    Cancelled,
    Failure(SourceError),
}

impl<T> CallOutcome<T> {
    pub fn into_result(self) -> Result<T, SourceError> {
        match self {
            CallOutcome::Success(v) => Ok(v),
            CallOutcome::Timeout(after) => Err(SourceError::Timeout { after }),
            CallOutcome::Cancelled => Err(SourceError::Cancelled),
            CallOutcome::Failure(e) => Err(e),
        }
    }

    fn and_then<U>(self, f: impl FnOnce(T) -> Result<U, SourceError>) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(v) => match f(v) {
                Ok(u) => CallOutcome::Success(u),
                Err(e) => CallOutcome::Failure(e),
            },
            CallOutcome::Timeout(d) => CallOutcome::Timeout(d),
            CallOutcome::Cancelled => CallOutcome::Cancelled,
            CallOutcome::Failure(e) => CallOutcome::Failure(e),
        }
    }
}

#[derive(Deserialize)]
struct ChannelListing {
    canales: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct ChannelData {
    time: Vec<f64>,
    valores: Vec<f64>,
}

/// Channel names from a listing response, ordered by numeric channel id.
pub fn parse_channel_listing(path: &Path, stdout: &[u8]) -> Result<Vec<String>, SourceError> {
    let listing: ChannelListing =
        serde_json::from_slice(stdout).map_err(|e| SourceError::parse(path, e))?;
    let mut entries: Vec<(String, String)> = listing
        .canales
        .into_iter()
        .map(|(id, name)| {
            let name = match name {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (id, name)
        })
        .collect();
    entries.sort_by(|a, b| match (a.0.parse::<i64>(), b.0.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.0.cmp(&b.0),
    });
    Ok(entries.into_iter().map(|(_, name)| name).collect())
}

/// Series from a single-channel response. The helper prints nothing when the
/// channel is absent.
pub fn parse_channel_data(path: &Path, channel: &str, stdout: &[u8]) -> Result<Series, SourceError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Err(SourceError::ChannelNotFound {
            file: path.to_path_buf(),
            channel: channel.to_string(),
        });
    }
    let data: ChannelData = serde_json::from_slice(stdout).map_err(|e| SourceError::parse(path, e))?;
    Ok(Series::new(data.time, data.valores))
}

/// Spawns the legacy helper with bounded waiting.
#[derive(Debug, Clone)]
pub struct LegacyBridge {
    config: LegacyConfig,
}

impl LegacyBridge {
    pub fn new(config: LegacyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LegacyConfig {
        &self.config
    }

    pub fn list_channels(&self, path: &Path, cancel: &CancelToken) -> CallOutcome<Vec<String>> {
        self.run(&[path.as_os_str()], cancel)
            .and_then(|out| parse_channel_listing(path, &out))
    }

    pub fn read_series(&self, path: &Path, channel: &str, cancel: &CancelToken) -> CallOutcome<Series> {
        self.run(&[path.as_os_str(), OsStr::new(channel)], cancel)
            .and_then(|out| parse_channel_data(path, channel, &out))
    }

    fn run(&self, args: &[&OsStr], cancel: &CancelToken) -> CallOutcome<Vec<u8>> {
        if cancel.is_cancelled() {
            return CallOutcome::Cancelled;
        }
        let mut cmd = Command::new(&self.config.interpreter);
        cmd.arg(&self.config.script)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!(
            "starting legacy helper {} {}",
            self.config.interpreter.display(),
            self.config.script.display()
        );
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                return CallOutcome::Failure(SourceError::ExternalProcess {
                    status: "spawn error".to_string(),
                    stderr: format!("cannot start {}: {e}", self.config.interpreter.display()),
                })
            }
        };

        // Drain both pipes concurrently so a large answer cannot block the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.config.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return CallOutcome::Failure(SourceError::Io(e));
                }
            }
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return CallOutcome::Cancelled;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return CallOutcome::Timeout(self.config.timeout);
            }
            thread::sleep(POLL_INTERVAL);
        };

        // A process left behind by the helper can hold the pipes open after
        // the helper itself exited; reading them is bounded by the same deadline.
        let out = match collect(stdout, deadline, cancel, self.config.timeout) {
            CallOutcome::Success(buf) => buf,
            other => return other,
        };
        let err = match collect(stderr, deadline, cancel, self.config.timeout) {
            CallOutcome::Success(buf) => buf,
            other => return other,
        };
        if !status.success() {
            return CallOutcome::Failure(SourceError::ExternalProcess {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            });
        }
        CallOutcome::Success(out)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

fn collect(
    pipe: Option<Receiver<Vec<u8>>>,
    deadline: Instant,
    cancel: &CancelToken,
    timeout: Duration,
) -> CallOutcome<Vec<u8>> {
    let Some(rx) = pipe else {
        return CallOutcome::Success(Vec::new());
    };
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining.min(POLL_INTERVAL)) {
            Ok(buf) => return CallOutcome::Success(buf),
            Err(RecvTimeoutError::Disconnected) => return CallOutcome::Success(Vec::new()),
            Err(RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    return CallOutcome::Cancelled;
                }
                if Instant::now() >= deadline {
                    log::warn!("legacy helper output still open after {timeout:?}; giving up");
                    return CallOutcome::Timeout(timeout);
                }
            }
        }
    }
}
