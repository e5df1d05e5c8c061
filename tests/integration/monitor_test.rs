// End-to-end tests for the monitoring runtime with a scripted process probe

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use handleit::core::handle_monitor::{MonitorRuntime, UiMessage, WAITING_TEXT};
use handleit::core::settings::{Settings, SettingsStore};
use handleit::platform::ProcessProbe;
use tempfile::TempDir;

/// Each cycle consumes one script entry; `None` means the process is not running.
/// Once the script runs out the process stays gone.
struct ScriptedProbe {
    script: VecDeque<Option<u32>>,
    pending: Option<u32>,
    queried_names: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProbe {
    fn new(script: impl IntoIterator<Item = Option<u32>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            pending: None,
            queried_names: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ProcessProbe for ScriptedProbe {
    fn resolve_process_id(&mut self, name: &str) -> Option<u32> {
        self.queried_names.lock().unwrap().push(name.to_string());
        self.pending = self.script.pop_front().flatten();
        self.pending.map(|_| 4242)
    }

    fn query_handle_count(&mut self, _pid: u32) -> Option<u32> {
        self.pending.take()
    }
}

fn fast_store(temp_dir: &TempDir) -> Arc<SettingsStore> {
    Arc::new(SettingsStore::new(Settings {
        polling_interval_ms: 1,
        ..Settings::with_store_path(temp_dir.path().join("HandleIt.ini"))
    }))
}

/// Human-readable form of the first `count` messages
fn collect(runtime: &mut MonitorRuntime, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| match runtime.next_message() {
            Some(UiMessage::DisplayText(text)) => text,
            Some(UiMessage::ThresholdAlert(alert)) => format!("ALERT {}", alert.count),
            Some(UiMessage::SettingChanged(field)) => format!("CHANGED {:?}", field),
            None => "CLOSED".to_string(),
        })
        .collect()
}

#[test]
fn test_reference_samples_raise_two_alerts() {
    let temp_dir = TempDir::new().unwrap();
    let samples = [8000, 8999, 9000, 9500, 8800, 9100];
    let probe = ScriptedProbe::new(samples.iter().copied().map(Some));

    let mut runtime = MonitorRuntime::start(fast_store(&temp_dir), probe, 10_000).unwrap();
    let messages = collect(&mut runtime, 9);
    runtime.shutdown();

    assert_eq!(
        messages,
        vec![
            "8000",
            "8999",
            "9000",
            "ALERT 9000",
            "9500",
            "8800",
            "9100",
            "ALERT 9100",
            WAITING_TEXT,
        ]
    );
}

#[test]
fn test_absent_samples_do_not_reset_latch() {
    let temp_dir = TempDir::new().unwrap();
    let probe = ScriptedProbe::new([Some(9500), None, Some(9600), Some(8000), Some(9700)]);

    let mut runtime = MonitorRuntime::start(fast_store(&temp_dir), probe, 10_000).unwrap();
    let messages = collect(&mut runtime, 7);
    runtime.shutdown();

    assert_eq!(
        messages,
        vec![
            "9500",
            "ALERT 9500",
            WAITING_TEXT,
            "9600",
            "8000",
            "9700",
            "ALERT 9700",
        ]
    );
}

#[test]
fn test_process_name_change_applies_on_next_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let store = fast_store(&temp_dir);
    let probe = ScriptedProbe::new([]);
    let queried_names = Arc::clone(&probe.queried_names);

    let mut runtime = MonitorRuntime::start(Arc::clone(&store), probe, 10_000).unwrap();
    assert_eq!(collect(&mut runtime, 1), vec![WAITING_TEXT]);

    store.set_process_name("notepad.exe").unwrap();

    let mut switched = false;
    for _ in 0..1000 {
        runtime.next_message();
        if queried_names
            .lock()
            .unwrap()
            .last()
            .is_some_and(|name| name == "notepad.exe")
        {
            switched = true;
            break;
        }
    }
    runtime.shutdown();

    assert!(switched);
    assert_eq!(queried_names.lock().unwrap()[0], "explorer.exe");
}

#[test]
fn test_next_message_returns_none_after_shutdown_signal() {
    let temp_dir = TempDir::new().unwrap();
    let mut runtime =
        MonitorRuntime::start(fast_store(&temp_dir), ScriptedProbe::new([]), 10_000).unwrap();

    let signal = runtime.shutdown_signal();
    assert!(signal.trigger());
    assert!(runtime.next_message().is_none());

    runtime.shutdown();
}

#[test]
fn test_setting_changes_can_share_the_ui_queue() {
    use handleit::core::settings::{SettingField, ThemeMode};

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SettingsStore::new(Settings {
        polling_interval_ms: 60_000,
        ..Settings::with_store_path(temp_dir.path().join("HandleIt.ini"))
    }));
    let mut runtime =
        MonitorRuntime::start(Arc::clone(&store), ScriptedProbe::new([Some(10)]), 10_000).unwrap();

    assert_eq!(collect(&mut runtime, 1), vec!["10"]);

    let ui_tx = runtime.ui_sender();
    store.subscribe(move |field| {
        let _ = ui_tx.try_send(UiMessage::SettingChanged(field));
    });
    store.set_theme_mode(ThemeMode::Light);

    let messages = collect(&mut runtime, 2);
    runtime.shutdown();

    assert_eq!(
        messages,
        vec![
            format!("CHANGED {:?}", SettingField::ThemeMode),
            format!("CHANGED {:?}", SettingField::IsCustomTheme),
        ]
    );
}
