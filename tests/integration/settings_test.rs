// Tests for the INI-backed settings store: first run, load guard,
// save/load round trips and tolerance of corrupted files

use std::fs;
use std::path::Path;

use handleit::core::settings::{
    IniFile, Rgb, SettingField, Settings, SettingsStore, ThemeMode, WindowPosition,
};
use tempfile::TempDir;

fn loaded_store(path: &Path) -> SettingsStore {
    let store = SettingsStore::with_store_path(path);
    assert!(store.load());
    store
}

#[test]
fn test_first_run_uses_defaults_and_save_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");

    let store = loaded_store(&path);
    let settings = store.snapshot();
    assert_eq!(settings.process_name, "explorer.exe");
    assert_eq!(settings.polling_interval_ms, 5000);
    assert_eq!(settings.warning_threshold_percent, 90);
    assert!(!path.exists());

    store.try_save().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    for section in ["[General]", "[Theme]", "[Window]", "[Process]"] {
        assert!(contents.contains(section), "missing {} in:\n{}", section, contents);
    }

    let ini = IniFile::parse(&contents);
    assert_eq!(ini.get("Process", "Name"), Some("explorer.exe"));
    assert_eq!(ini.get("Process", "PollingRate"), Some("5000"));
    assert_eq!(ini.get("Process", "WarningThreshold"), Some("90"));
    assert_eq!(ini.get("General", "AlwaysOnTop"), Some("False"));
    assert_eq!(ini.get("Theme", "Mode"), Some("System"));
    assert_eq!(ini.get("Theme", "BackgroundColor"), Some("#FFFFFF"));
    assert_eq!(ini.get("Theme", "ForegroundColor"), Some("#000000"));
    assert_eq!(ini.get("Theme", "FontSize"), Some("12"));
}

#[test]
fn test_second_load_is_a_no_op() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    fs::write(&path, "[Process]\nName=notepad.exe\nPollingRate=750\n").unwrap();

    let store = loaded_store(&path);
    let after_first = store.snapshot();
    assert_eq!(after_first.process_name, "notepad.exe");
    assert_eq!(after_first.polling_interval_ms, 750);

    fs::write(&path, "[Process]\nName=calc.exe\nPollingRate=100\n").unwrap();
    assert!(!store.load());
    assert_eq!(store.snapshot(), after_first);
}

#[test]
fn test_second_load_keeps_in_flight_edits() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    fs::write(&path, "[Process]\nName=notepad.exe\n").unwrap();

    let store = loaded_store(&path);
    store.set_process_name("mspaint.exe").unwrap();
    store.load();

    assert_eq!(store.read(|s| s.process_name.clone()), "mspaint.exe");
}

fn assert_round_trip(settings: Settings) {
    let store = SettingsStore::new(settings.clone());
    store.try_save().unwrap();

    let reloaded = loaded_store(&settings.store_path);
    assert_eq!(reloaded.snapshot(), settings);
}

#[test]
fn test_round_trip_custom_theme_and_threshold_bounds() {
    let temp_dir = TempDir::new().unwrap();

    for (index, threshold) in [0u8, 100].into_iter().enumerate() {
        assert_round_trip(Settings {
            process_name: "Some Tool.exe".to_string(),
            polling_interval_ms: 250,
            warning_threshold_percent: threshold,
            always_on_top: true,
            lock_position: true,
            theme_mode: ThemeMode::Custom,
            font_family: "Cascadia Mono".to_string(),
            font_size: 15.5,
            background_color: Rgb::BLACK,
            foreground_color: Rgb::WHITE,
            window_width: 140.25,
            window_height: 42.0,
            window_position: Some(WindowPosition { x: 1234.5, y: -20.125 }),
            store_path: temp_dir.path().join(format!("round-trip-{}.ini", index)),
        });
    }
}

#[test]
fn test_round_trip_defaults() {
    let temp_dir = TempDir::new().unwrap();
    assert_round_trip(Settings::with_store_path(temp_dir.path().join("HandleIt.ini")));
}

#[test]
fn test_corrupt_polling_rate_falls_back_alone() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    fs::write(
        &path,
        "[General]\nAlwaysOnTop=True\n\
         [Theme]\nMode=Dark\nForegroundColor=#00FF00\n\
         [Process]\nName=notepad.exe\nPollingRate=fast\nWarningThreshold=75\n",
    )
    .unwrap();

    let settings = loaded_store(&path).snapshot();

    assert_eq!(settings.polling_interval_ms, 5000);
    assert!(settings.always_on_top);
    assert_eq!(settings.theme_mode, ThemeMode::Dark);
    assert_eq!(settings.foreground_color, Rgb::new(0x00, 0xFF, 0x00));
    assert_eq!(settings.process_name, "notepad.exe");
    assert_eq!(settings.warning_threshold_percent, 75);
}

#[test]
fn test_out_of_range_values_keep_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    fs::write(
        &path,
        "[Theme]\nMode=Neon\nFontSize=-3\nBackgroundColor=#12345\n\
         [Process]\nName=\nPollingRate=0\nWarningThreshold=101\n",
    )
    .unwrap();

    let settings = loaded_store(&path).snapshot();
    let defaults = Settings::with_store_path(&path);

    assert_eq!(settings, defaults);
}

#[test]
fn test_booleans_parse_case_insensitively() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    fs::write(&path, "[general]\nalwaysontop=TRUE\nLockPosition=true\n").unwrap();

    let settings = loaded_store(&path).snapshot();
    assert!(settings.always_on_top);
    assert!(settings.lock_position);
}

#[test]
fn test_utf16_file_is_read() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");

    let mut bytes = vec![0xFF, 0xFE];
    for unit in "[Process]\r\nName=winword.exe\r\nWarningThreshold=50\r\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let settings = loaded_store(&path).snapshot();
    assert_eq!(settings.process_name, "winword.exe");
    assert_eq!(settings.warning_threshold_percent, 50);
}

#[test]
fn test_save_keeps_unknown_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    fs::write(&path, "; user notes\n[Extra]\nKeep=me\n").unwrap();

    let store = loaded_store(&path);
    store.try_save().unwrap();

    let ini = IniFile::read(&path).unwrap();
    assert_eq!(ini.get("Extra", "Keep"), Some("me"));
    assert_eq!(ini.get("Process", "Name"), Some("explorer.exe"));
    assert!(fs::read_to_string(&path).unwrap().starts_with("; user notes"));
}

#[test]
fn test_apply_transaction_persists_and_notifies() {
    use std::sync::{Arc, Mutex};

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    let store = loaded_store(&path);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |field| sink.lock().unwrap().push(field));

    let mut draft = store.begin_edit();
    draft.theme_mode = ThemeMode::Custom;
    draft.background_color = Rgb::new(0x20, 0x20, 0x20);
    draft.commit().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            SettingField::ThemeMode,
            SettingField::IsCustomTheme,
            SettingField::BackgroundColor
        ]
    );

    let reloaded = loaded_store(&path).snapshot();
    assert_eq!(reloaded.theme_mode, ThemeMode::Custom);
    assert_eq!(reloaded.background_color, Rgb::new(0x20, 0x20, 0x20));
}

#[test]
fn test_window_position_is_persisted_immediately() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HandleIt.ini");
    let store = loaded_store(&path);

    store.set_window_position(300.0, 512.5);

    let ini = IniFile::read(&path).unwrap();
    assert_eq!(ini.get("Window", "X"), Some("300"));
    assert_eq!(ini.get("Window", "Y"), Some("512.5"));
    assert_eq!(ini.get("Process", "Name"), None);
}
