use std::collections::HashMap;
use std::path::{Path, PathBuf};

use simview::data::reconcile::ReloadSummary;
use simview::data::source::UnavailableReader;
use simview::persistence::{load_template_from_path, template_from_json};
use simview::{
    export, AxisLimits, ChannelRef, DataSourceProvider, LineDescriptor, LineWarning, Reconciler,
    Series, Session, SimulationSource, SkipReason, SourceError, ViewerApp, ViewerConfig,
};

fn csv_source() -> SimulationSource {
    SimulationSource::new(Box::new(UnavailableReader), None)
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p
}

fn ramp_csv(columns: &[&str], rows: usize, scale: f64) -> String {
    let mut s = format!("time,{}\n", columns.join(","));
    for i in 0..rows {
        let t = i as f64;
        let vals: Vec<String> = (0..columns.len())
            .map(|c| format!("{}", (c as f64 + 1.0) * t * scale))
            .collect();
        s.push_str(&format!("{t},{}\n", vals.join(",")));
    }
    s
}

fn line(path: &Path, channel: &str, color: &str) -> LineDescriptor {
    LineDescriptor::new(ChannelRef::new(path.to_string_lossy(), channel), color)
}

/// Session with two tabs: "Voltages" reads `a.csv`, "Power" reads `b.csv`.
fn build_session(src: &SimulationSource, a: &Path, b: &Path) -> Session {
    let mut session = Session::new();
    session.files.insert(a);
    session.files.insert(b);
    session.tabs[0].name = "Voltages".into();

    let chart = session.tabs[0].add_chart();
    chart.title = "Bus voltages".into();
    chart.y_label = "pu".into();
    chart.grid_enabled = true;
    chart.x_limits = Some(AxisLimits::new(0.0, 5.0));
    for (ch, color) in [("V1", "#ff0000"), ("V2", "C1")] {
        let desc = line(a, ch, color).with_label(format!("Bus {ch}"));
        let series = src.fetch(&desc.channel, 2.0).unwrap();
        chart.add_line(desc, series);
    }
    chart.lines[1].descriptor.visible = false;

    let idx = session.new_tab();
    session.tabs[idx].name = "Power".into();
    let chart = session.tabs[idx].add_chart();
    chart.title = "Active power".into();
    chart.y_limits = Some(AxisLimits::new(-1.0, 50.0));
    let desc = line(b, "P", "#00ff00");
    let series = src.fetch(&desc.channel, 2.0).unwrap();
    chart.add_line(desc, series);
    session
}

#[test]
fn documented_template_imports_as_described() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", &ramp_csv(&["V1"], 12, 0.1));
    let tpl = write(
        dir.path(),
        "template.json",
        r##"{"tabs":[{"name":"T1","plots":[{"title":"V1","xlabel":"(s)","ylabel":"pu","lines":[{"file":"a.csv","channel":"V1","label":"Bus1","color":"#ff0000","visible":true}],"xlim":[0,10],"ylim":[0.9,1.1],"grid":true}]}],"files":{"psse":[],"pscad":["a.csv"]}}"##,
    );

    let template = load_template_from_path(&tpl).unwrap();
    let src = csv_source();
    let mut warnings: Vec<LineWarning> = Vec::new();
    let session = Reconciler::new(&src, &mut warnings)
        .with_base_dir(dir.path())
        .import(&template);

    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(session.tabs.len(), 1);
    assert_eq!(session.tabs[0].name, "T1");
    assert_eq!(session.tabs[0].charts.len(), 1);
    let chart = &session.tabs[0].charts[0];
    assert_eq!(chart.title, "V1");
    assert_eq!(chart.x_limits, Some(AxisLimits::new(0.0, 10.0)));
    assert_eq!(chart.lines.len(), 1);
    let l = &chart.lines[0];
    assert_eq!(l.descriptor.label, "Bus1");
    assert!(l.descriptor.visible);
    assert_eq!(l.descriptor.color32(), egui::Color32::from_rgb(255, 0, 0));
    // Rows before t = 2 s are dropped by default.
    assert_eq!(l.raw().len(), 10);
    assert!(session.files.contains(&dir.path().join("a.csv")));
}

#[test]
fn export_then_import_reproduces_layout() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1", "V2"], 20, 0.01));
    let b = write(dir.path(), "b.csv", &ramp_csv(&["P", "Q"], 20, 2.0));
    let src = csv_source();
    let session = build_session(&src, &a, &b);

    let template = export(&session);
    let mut warnings: Vec<LineWarning> = Vec::new();
    let restored = Reconciler::new(&src, &mut warnings).import(&template);

    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(export(&restored), template);
    for (orig, back) in session.tabs.iter().zip(restored.tabs.iter()) {
        for (oc, bc) in orig.charts.iter().zip(back.charts.iter()) {
            for (ol, bl) in oc.lines.iter().zip(bc.lines.iter()) {
                assert_eq!(ol.points(), bl.points());
            }
        }
    }
}

#[test]
fn deleted_file_only_drops_its_own_lines() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1", "V2"], 10, 0.01));
    let b = write(dir.path(), "b.csv", &ramp_csv(&["P"], 10, 2.0));
    let src = csv_source();
    let template = export(&build_session(&src, &a, &b));
    std::fs::remove_file(&b).unwrap();

    let mut warnings: Vec<LineWarning> = Vec::new();
    let restored = Reconciler::new(&src, &mut warnings).import(&template);

    assert_eq!(restored.tabs.len(), 2);
    assert_eq!(restored.tabs[0].charts[0].lines.len(), 2);
    assert_eq!(restored.tabs[1].name, "Power");
    assert_eq!(restored.tabs[1].charts.len(), 1);
    assert!(restored.tabs[1].charts[0].lines.is_empty());
    assert_eq!(restored.tabs[1].charts[0].title, "Active power");

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].tab, "Power");
    assert_eq!(warnings[0].reason, SkipReason::FileUnavailable);

    assert!(restored.files.contains(&a));
    assert!(!restored.files.contains(&b));
}

#[test]
fn missing_channel_is_skipped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1"], 10, 0.01));
    let mut template = template_from_json(r#"{"tabs":[{"name":"T","plots":[{"lines":[]}]}]}"#).unwrap();
    template.tabs[0].charts[0].lines = vec![line(&a, "V1", "C0"), line(&a, "V9", "C1")];

    let src = csv_source();
    let mut warnings: Vec<LineWarning> = Vec::new();
    let restored = Reconciler::new(&src, &mut warnings).import(&template);

    assert_eq!(restored.tabs[0].charts[0].lines.len(), 1);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].channel.channel_name, "V9");
    assert_eq!(warnings[0].reason, SkipReason::ChannelNotFound);
}

#[test]
fn persisted_multiplier_is_applied_on_import() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1"], 6, 1.0));
    let mut template = template_from_json(r#"{"tabs":[{"name":"T","plots":[{"lines":[]}]}]}"#).unwrap();
    let mut desc = line(&a, "V1", "C0").with_init_time(0.0);
    desc.multiplier = -2.0;
    template.tabs[0].charts[0].lines.push(desc);

    let src = csv_source();
    let mut warnings: Vec<LineWarning> = Vec::new();
    let restored = Reconciler::new(&src, &mut warnings).import(&template);

    let l = &restored.tabs[0].charts[0].lines[0];
    assert_eq!(l.raw().values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(l.values(), vec![-0.0, -2.0, -4.0, -6.0, -8.0, -10.0]);
}

#[test]
fn per_line_init_time_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1"], 10, 1.0));
    let mut template = template_from_json(r#"{"tabs":[{"name":"T","plots":[{"lines":[]}]}]}"#).unwrap();
    template.tabs[0].charts[0].lines = vec![
        line(&a, "V1", "C0").with_init_time(5.0),
        line(&a, "V1", "C1"),
    ];

    let src = csv_source();
    let mut warnings: Vec<LineWarning> = Vec::new();
    let restored = Reconciler::new(&src, &mut warnings)
        .with_default_init_time(0.0)
        .import(&template);

    let lines = &restored.tabs[0].charts[0].lines;
    assert_eq!(lines[0].raw().len(), 5);
    assert_eq!(lines[0].raw().values[0], 5.0);
    assert_eq!(lines[1].raw().len(), 10);
}

#[test]
fn reload_is_idempotent_and_keeps_x_range() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1", "V2"], 20, 0.01));
    let b = write(dir.path(), "b.csv", &ramp_csv(&["P"], 20, 2.0));
    let src = csv_source();
    let mut session = build_session(&src, &a, &b);
    session.tabs[0].charts[0].y_limits = Some(AxisLimits::new(0.0, 0.1));

    let snapshot = |s: &Session| -> Vec<Vec<[f64; 2]>> {
        s.tabs
            .iter()
            .flat_map(|t| t.charts.iter())
            .flat_map(|c| c.lines.iter())
            .map(|l| l.points())
            .collect()
    };

    let mut warnings: Vec<LineWarning> = Vec::new();
    let first = Reconciler::new(&src, &mut warnings).reload(&mut session.tabs);
    let after_first = snapshot(&session);
    let second = Reconciler::new(&src, &mut warnings).reload(&mut session.tabs);

    assert_eq!(first, ReloadSummary { reloaded: 3, dropped: 0 });
    assert_eq!(first, second);
    assert_eq!(after_first, snapshot(&session));
    assert!(warnings.is_empty());

    let chart = &session.tabs[0].charts[0];
    assert_eq!(chart.x_limits, Some(AxisLimits::new(0.0, 5.0)));
    assert_eq!(chart.y_limits, None);
    assert_eq!(chart.title, "Bus voltages");
    assert_eq!(chart.lines[0].descriptor.label, "Bus V1");
    assert!(!chart.lines[1].descriptor.visible);
}

#[test]
fn reload_picks_up_rewritten_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1", "V2"], 10, 1.0));
    let b = write(dir.path(), "b.csv", &ramp_csv(&["P"], 10, 1.0));
    let src = csv_source();
    let mut session = build_session(&src, &a, &b);
    let before = session.tabs[1].charts[0].lines[0].raw().clone();

    write(dir.path(), "b.csv", &ramp_csv(&["P"], 10, 3.0));
    std::fs::remove_file(&a).unwrap();
    let mut warnings: Vec<LineWarning> = Vec::new();
    let summary = Reconciler::new(&src, &mut warnings).reload(&mut session.tabs);

    assert_eq!(summary, ReloadSummary { reloaded: 1, dropped: 2 });
    assert!(session.tabs[0].charts[0].lines.is_empty());
    let after = session.tabs[1].charts[0].lines[0].raw();
    assert_eq!(after.time, before.time);
    assert_eq!(after.values[1], before.values[1] * 3.0);
}

/// In-memory channels for `.out` paths; every file "exists".
struct FakeOut {
    data: HashMap<(String, String), Series>,
}

impl DataSourceProvider for FakeOut {
    fn channels(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        let file = path.to_string_lossy();
        Ok(self
            .data
            .keys()
            .filter(|(f, _)| *f == file)
            .map(|(_, c)| c.clone())
            .collect())
    }

    fn fetch(&self, channel: &ChannelRef, _init_time: f64) -> Result<Series, SourceError> {
        if channel.channel_name == "broken" {
            return Err(SourceError::ExternalProcess {
                status: "exit status: 1".into(),
                stderr: "Traceback: boom".into(),
            });
        }
        self.data
            .get(&(channel.file_path.clone(), channel.channel_name.clone()))
            .cloned()
            .ok_or_else(|| SourceError::ChannelNotFound {
                file: channel.path().to_path_buf(),
                channel: channel.channel_name.clone(),
            })
    }

    fn file_exists(&self, _path: &Path) -> bool {
        true
    }
}

#[test]
fn helper_failure_is_reported_not_fatal() {
    let mut data = HashMap::new();
    data.insert(
        ("run.out".to_string(), "1 - VOLT 101".to_string()),
        Series::new(vec![0.0, 0.01], vec![1.0, 0.99]),
    );
    let src = FakeOut { data };
    let mut template = template_from_json(r#"{"tabs":[{"name":"T","plots":[{"lines":[]}]}]}"#).unwrap();
    template.tabs[0].charts[0].lines = vec![
        LineDescriptor::new(ChannelRef::new("run.out", "1 - VOLT 101"), "C0"),
        LineDescriptor::new(ChannelRef::new("run.out", "broken"), "C1"),
    ];

    let mut warnings: Vec<LineWarning> = Vec::new();
    let restored = Reconciler::new(&src, &mut warnings).import(&template);

    assert_eq!(restored.tabs[0].charts[0].lines.len(), 1);
    assert_eq!(warnings.len(), 1);
    match &warnings[0].reason {
        SkipReason::ReadFailed(msg) => assert!(msg.contains("Traceback: boom"), "{msg}"),
        other => panic!("unexpected reason {other:?}"),
    }
}

#[test]
fn unreadable_template_leaves_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1"], 10, 1.0));
    let bad = write(dir.path(), "bad.json", "{ not json");

    let mut app = ViewerApp::with_source(ViewerConfig::default(), Box::new(csv_source()));
    app.session.tabs[0].add_chart();
    assert!(app.add_line(
        simview::panels::ChartSlot { tab: 0, chart: 0 },
        line(&a, "V1", "C0"),
    ));
    let before = export(&app.session);

    assert!(!app.load_template(&bad));
    assert!(!app.load_template(&dir.path().join("missing.json")));
    assert_eq!(export(&app.session), before);
    assert_eq!(app.session.line_count(), 1);
}

#[test]
fn saved_template_loads_back_into_viewer() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", &ramp_csv(&["V1"], 10, 1.0));
    let tpl = dir.path().join("saved.json");

    let mut app = ViewerApp::with_source(ViewerConfig::default(), Box::new(csv_source()));
    app.add_files([a.clone()]);
    app.session.tabs[0].add_chart().title = "Saved".into();
    assert!(app.add_line(simview::panels::ChartSlot { tab: 0, chart: 0 }, line(&a, "V1", "C3")));
    assert!(app.save_template(&tpl));
    let saved = export(&app.session);

    let mut other = ViewerApp::with_source(ViewerConfig::default(), Box::new(csv_source()));
    assert!(other.load_template(&tpl));
    assert_eq!(export(&other.session), saved);
}
