//! Legacy helper process tests, using `/bin/sh` as the interpreter.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use simview::data::legacy::{CallOutcome, CancelToken, LegacyBridge};
use simview::data::source::UnavailableReader;
use simview::{ChannelRef, DataSourceProvider, LegacyConfig, SimulationSource, SourceError};

const HELPER: &str = r#"
if [ "$#" -eq 1 ]; then
  echo '{"canales": {"3": "FREQ", "1": "VOLT 101", "2": "POWR 101"}}'
  exit 0
fi
case "$2" in
  "VOLT 101") echo '{"time": [0.0, 0.01, 0.02], "valores": [1.0, 0.97, 0.99]}' ;;
  "crash") echo "Traceback: file is corrupt" >&2; exit 3 ;;
  "slow") sleep 5; echo '{"time": [], "valores": []}' ;;
  "linger") sleep 6 & echo '{"time": [0.0], "valores": [1.0]}' ;;
  *) ;;
esac
"#;

fn setup(timeout: Duration) -> (tempfile::TempDir, LegacyConfig, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("helper.sh");
    std::fs::write(&script, HELPER).unwrap();
    let out = dir.path().join("run.out");
    std::fs::write(&out, b"\x00binary").unwrap();
    let cfg = LegacyConfig {
        enabled: true,
        interpreter: PathBuf::from("/bin/sh"),
        script,
        timeout,
    };
    (dir, cfg, out)
}

#[test]
fn lists_channels_in_id_order() {
    let (_dir, cfg, out) = setup(Duration::from_secs(10));
    let bridge = LegacyBridge::new(cfg);
    let names = bridge.list_channels(&out, &CancelToken::new()).into_result().unwrap();
    assert_eq!(names, vec!["VOLT 101", "POWR 101", "FREQ"]);
}

#[test]
fn reads_one_channel() {
    let (_dir, cfg, out) = setup(Duration::from_secs(10));
    let bridge = LegacyBridge::new(cfg);
    let s = bridge
        .read_series(&out, "VOLT 101", &CancelToken::new())
        .into_result()
        .unwrap();
    assert_eq!(s.time, vec![0.0, 0.01, 0.02]);
    assert_eq!(s.values, vec![1.0, 0.97, 0.99]);
}

#[test]
fn silent_helper_means_channel_not_found() {
    let (_dir, cfg, out) = setup(Duration::from_secs(10));
    let bridge = LegacyBridge::new(cfg);
    let err = bridge
        .read_series(&out, "ANGL 9", &CancelToken::new())
        .into_result()
        .unwrap_err();
    assert!(matches!(err, SourceError::ChannelNotFound { .. }));
}

#[test]
fn nonzero_exit_carries_stderr() {
    let (_dir, cfg, out) = setup(Duration::from_secs(10));
    let bridge = LegacyBridge::new(cfg);
    match bridge.read_series(&out, "crash", &CancelToken::new()) {
        CallOutcome::Failure(SourceError::ExternalProcess { stderr, .. }) => {
            assert_eq!(stderr, "Traceback: file is corrupt");
        }
        other => panic!("expected process failure, got {other:?}"),
    }
}

#[test]
fn slow_helper_times_out() {
    let (_dir, cfg, out) = setup(Duration::from_millis(200));
    let bridge = LegacyBridge::new(cfg);
    let started = Instant::now();
    let outcome = bridge.read_series(&out, "slow", &CancelToken::new());
    assert!(matches!(outcome, CallOutcome::Timeout(d) if d == Duration::from_millis(200)));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn output_held_open_by_a_leftover_process_times_out() {
    let (_dir, cfg, out) = setup(Duration::from_millis(500));
    let bridge = LegacyBridge::new(cfg);
    let started = Instant::now();
    let outcome = bridge.read_series(&out, "linger", &CancelToken::new());
    assert!(matches!(outcome, CallOutcome::Timeout(_)), "{outcome:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn cancel_stops_a_running_call() {
    let (_dir, cfg, out) = setup(Duration::from_secs(30));
    let bridge = LegacyBridge::new(cfg);
    let token = CancelToken::new();
    let remote = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        remote.cancel();
    });
    let started = Instant::now();
    let outcome = bridge.read_series(&out, "slow", &token);
    canceller.join().unwrap();
    assert!(matches!(outcome, CallOutcome::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn source_falls_back_to_helper_for_out_files() {
    let (_dir, cfg, out) = setup(Duration::from_secs(10));
    let src = SimulationSource::new(Box::new(UnavailableReader), Some(LegacyBridge::new(cfg)));

    assert_eq!(src.list_channels(&out).len(), 3);
    let s = src
        .fetch(&ChannelRef::new(out.to_string_lossy(), "VOLT 101"), 2.0)
        .unwrap();
    // No truncation for channel files.
    assert_eq!(s.len(), 3);

    let missing = src.fetch(&ChannelRef::new(out.to_string_lossy(), "nope"), 2.0);
    assert!(matches!(missing, Err(SourceError::ChannelNotFound { .. })));
}

#[test]
fn source_cancel_is_consumed_by_the_next_call() {
    let (_dir, cfg, out) = setup(Duration::from_secs(10));
    let src = SimulationSource::new(Box::new(UnavailableReader), Some(LegacyBridge::new(cfg)));
    let channel = ChannelRef::new(out.to_string_lossy(), "VOLT 101");

    src.cancel_token().cancel();
    assert!(matches!(src.fetch(&channel, 0.0), Err(SourceError::Cancelled)));
    assert!(!src.cancel_token().is_cancelled());
    assert_eq!(src.fetch(&channel, 0.0).unwrap().len(), 3);
}

#[test]
fn without_helper_out_files_are_unreadable_but_not_fatal() {
    let (_dir, _cfg, out) = setup(Duration::from_secs(1));
    let src = SimulationSource::new(Box::new(UnavailableReader), None);
    assert!(src.list_channels(&out).is_empty());
    assert!(src.read_series(&ChannelRef::new(out.to_string_lossy(), "VOLT 101"), None).is_empty());
    assert!(matches!(
        src.channels(Path::new("/nonexistent/run.out")),
        Err(SourceError::FileUnavailable(_))
    ));
}
