use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::ini::{IniFile, IniValue};
use super::{SettingField, Settings, ThemeMode, WindowPosition};
use crate::error::{HandleItError, Result};

pub const SECTION_GENERAL: &str = "General";
pub const SECTION_THEME: &str = "Theme";
pub const SECTION_WINDOW: &str = "Window";
pub const SECTION_PROCESS: &str = "Process";

type Listener = Arc<dyn Fn(SettingField) + Send + Sync>;

/// Live settings plus their INI backing file.
///
/// Readers on other threads always see a whole record: every mutation
/// happens under one write lock. Listeners are called synchronously on the
/// mutating thread after the lock is released, once per changed field.
pub struct SettingsStore {
    settings: RwLock<Settings>,
    initialized: AtomicBool,
    listeners: Mutex<Vec<Listener>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            initialized: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Store with default settings backed by `path`
    pub fn with_store_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Settings::with_store_path(path))
    }

    /// Register a listener for field changes
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(SettingField) + Send + Sync + 'static,
    {
        self.listeners.lock().push(Arc::new(listener));
    }

    /// Copy of the current record
    pub fn snapshot(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Borrow the current record for the duration of `f`
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        let settings = self.settings.read();
        f(&*settings)
    }

    pub fn store_path(&self) -> PathBuf {
        self.settings.read().store_path.clone()
    }

    /// Mutate the record in place and notify about every field that changed
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> Vec<SettingField> {
        let changed = {
            let mut settings = self.settings.write();
            let before = settings.clone();
            f(&mut *settings);
            before.changed_fields(&*settings)
        };
        self.notify(&changed);
        changed
    }

    fn notify(&self, fields: &[SettingField]) {
        if fields.is_empty() {
            return;
        }
        // Listeners may call back into the store
        let listeners: Vec<Listener> = self.listeners.lock().clone();
        for field in fields {
            for listener in listeners.iter() {
                listener(*field);
            }
        }
    }

    pub fn set_process_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HandleItError::config("process name must not be empty"));
        }
        self.update(|s| s.process_name = name.to_string());
        Ok(())
    }

    pub fn set_polling_interval_ms(&self, interval_ms: u64) -> Result<()> {
        if interval_ms == 0 {
            return Err(HandleItError::config("polling interval must be positive"));
        }
        self.update(|s| s.polling_interval_ms = interval_ms);
        Ok(())
    }

    pub fn set_warning_threshold_percent(&self, percent: u8) -> Result<()> {
        if percent > 100 {
            return Err(HandleItError::config(format!(
                "warning threshold {}% is outside 0-100",
                percent
            )));
        }
        self.update(|s| s.warning_threshold_percent = percent);
        Ok(())
    }

    pub fn set_always_on_top(&self, enabled: bool) {
        self.update(|s| s.always_on_top = enabled);
    }

    pub fn set_lock_position(&self, locked: bool) {
        self.update(|s| s.lock_position = locked);
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) {
        self.update(|s| s.theme_mode = mode);
    }

    /// Point the store at another backing file
    pub fn set_store_path(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.update(|s| s.store_path = path);
    }

    /// Move the display and persist just `X`/`Y`, best effort
    pub fn set_window_position(&self, x: f64, y: f64) {
        self.update(|s| s.window_position = Some(WindowPosition { x, y }));
        let result = self.edit_file(&self.store_path(), |ini| {
            ini.set_as(SECTION_WINDOW, "X", &x);
            ini.set_as(SECTION_WINDOW, "Y", &y);
        });
        if let Err(e) = result {
            log::warn!("Failed to persist window position: {}", e);
        }
    }

    /// Start a private edit of the whole record
    pub fn begin_edit(&self) -> SettingsDraft<'_> {
        SettingsDraft {
            store: self,
            draft: self.snapshot(),
        }
    }

    /// Replace every field with `settings` in one step, notify, then save.
    ///
    /// Invalid records are rejected without touching the live copy.
    pub fn apply(&self, settings: Settings) -> Result<Vec<SettingField>> {
        validate(&settings)?;
        let changed = self.update(|s| *s = settings);
        self.save();
        Ok(changed)
    }

    /// Typed read from the backing file; `default` on any failure
    pub fn get<T: IniValue>(&self, section: &str, key: &str, default: T) -> T {
        let path = self.store_path();
        match IniFile::read(&path) {
            Ok(ini) => ini.get_as(section, key).unwrap_or(default),
            Err(e) => {
                log::debug!("Failed to read {}: {}", path.display(), e);
                default
            }
        }
    }

    /// Typed write of one key.
    ///
    /// Keys that map onto a field update the live record (and notify) even
    /// when the file cannot be written. Values the field would reject on load
    /// leave the record as it was. The file write is best effort.
    pub fn set<T: IniValue>(&self, section: &str, key: &str, value: &T) {
        self.update(|s| {
            let mut single = IniFile::new();
            write_settings(&mut single, s);
            single.set_as(section, key, value);
            read_settings(&single, s);
        });

        let path = self.store_path();
        if let Err(e) = self.edit_file(&path, |ini| ini.set_as(section, key, value)) {
            log::warn!("Failed to write [{}] {} to {}: {}", section, key, path.display(), e);
        }
    }

    /// Populate every field from the backing file.
    ///
    /// Runs at most once per store; returns whether this call did the load.
    /// Missing or malformed keys keep their current values.
    pub fn load(&self) -> bool {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let path = self.store_path();
        let ini = match IniFile::read(&path) {
            Ok(ini) => ini,
            Err(e) => {
                log::warn!("Failed to read settings from {}: {}", path.display(), e);
                IniFile::new()
            }
        };

        let changed = self.update(|s| read_settings(&ini, s));
        log::info!(
            "Loaded settings from {} ({} fields changed)",
            path.display(),
            changed.len()
        );
        true
    }

    /// Write every field to the backing file, logging failures
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Write every field to the backing file
    pub fn try_save(&self) -> Result<()> {
        let settings = self.snapshot();
        self.edit_file(&settings.store_path, |ini| write_settings(ini, &settings))?;
        log::info!("Saved settings to {}", settings.store_path.display());
        Ok(())
    }

    fn edit_file(&self, path: &Path, edit: impl FnOnce(&mut IniFile)) -> Result<()> {
        let mut ini = IniFile::read(path)?;
        edit(&mut ini);
        ini.write(path)
    }
}

/// Edit of a private copy, applied to the store only on `commit`
pub struct SettingsDraft<'a> {
    store: &'a SettingsStore,
    draft: Settings,
}

impl SettingsDraft<'_> {
    /// Copy every field back into the store and persist
    pub fn commit(self) -> Result<Vec<SettingField>> {
        self.store.apply(self.draft)
    }
}

impl Deref for SettingsDraft<'_> {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.draft
    }
}

impl DerefMut for SettingsDraft<'_> {
    fn deref_mut(&mut self) -> &mut Settings {
        &mut self.draft
    }
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.process_name.trim().is_empty() {
        return Err(HandleItError::config("process name must not be empty"));
    }
    if settings.polling_interval_ms == 0 {
        return Err(HandleItError::config("polling interval must be positive"));
    }
    if settings.warning_threshold_percent > 100 {
        return Err(HandleItError::config(format!(
            "warning threshold {}% is outside 0-100",
            settings.warning_threshold_percent
        )));
    }
    if !(settings.font_size.is_finite() && settings.font_size > 0.0) {
        return Err(HandleItError::config("font size must be positive"));
    }
    if !(settings.window_width.is_finite() && settings.window_width > 0.0)
        || !(settings.window_height.is_finite() && settings.window_height > 0.0)
    {
        return Err(HandleItError::config("window size must be positive"));
    }
    if let Some(position) = settings.window_position {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(HandleItError::config("window position must be finite"));
        }
    }
    Ok(())
}

fn read_field<T: IniValue>(
    ini: &IniFile,
    section: &str,
    key: &str,
    target: &mut T,
    valid: impl Fn(&T) -> bool,
) {
    let Some(raw) = ini.get(section, key) else {
        return;
    };
    match T::from_ini(raw).filter(|value| valid(value)) {
        Some(value) => *target = value,
        None => log::debug!("Ignoring invalid value '{}' for [{}] {}", raw, section, key),
    }
}

fn any<T>(_: &T) -> bool {
    true
}

fn read_settings(ini: &IniFile, s: &mut Settings) {
    read_field(ini, SECTION_GENERAL, "AlwaysOnTop", &mut s.always_on_top, any);
    read_field(ini, SECTION_GENERAL, "LockPosition", &mut s.lock_position, any);

    read_field(ini, SECTION_THEME, "Mode", &mut s.theme_mode, any);
    read_field(ini, SECTION_THEME, "FontFamily", &mut s.font_family, |f: &String| {
        !f.trim().is_empty()
    });
    read_field(ini, SECTION_THEME, "FontSize", &mut s.font_size, |v: &f64| *v > 0.0);
    read_field(ini, SECTION_THEME, "BackgroundColor", &mut s.background_color, any);
    read_field(ini, SECTION_THEME, "ForegroundColor", &mut s.foreground_color, any);

    read_field(ini, SECTION_WINDOW, "Width", &mut s.window_width, |v: &f64| *v > 0.0);
    read_field(ini, SECTION_WINDOW, "Height", &mut s.window_height, |v: &f64| *v > 0.0);
    let x = ini.get_as::<f64>(SECTION_WINDOW, "X");
    let y = ini.get_as::<f64>(SECTION_WINDOW, "Y");
    if let (Some(x), Some(y)) = (x, y) {
        s.window_position = Some(WindowPosition { x, y });
    }

    read_field(ini, SECTION_PROCESS, "Name", &mut s.process_name, |n: &String| {
        !n.trim().is_empty()
    });
    read_field(ini, SECTION_PROCESS, "PollingRate", &mut s.polling_interval_ms, |v: &u64| {
        *v > 0
    });
    read_field(
        ini,
        SECTION_PROCESS,
        "WarningThreshold",
        &mut s.warning_threshold_percent,
        |v: &u8| *v <= 100,
    );
}

fn write_settings(ini: &mut IniFile, s: &Settings) {
    ini.set_as(SECTION_GENERAL, "AlwaysOnTop", &s.always_on_top);
    ini.set_as(SECTION_GENERAL, "LockPosition", &s.lock_position);

    ini.set_as(SECTION_THEME, "Mode", &s.theme_mode);
    ini.set_as(SECTION_THEME, "FontFamily", &s.font_family);
    ini.set_as(SECTION_THEME, "FontSize", &s.font_size);
    ini.set_as(SECTION_THEME, "BackgroundColor", &s.background_color);
    ini.set_as(SECTION_THEME, "ForegroundColor", &s.foreground_color);

    ini.set_as(SECTION_WINDOW, "Width", &s.window_width);
    ini.set_as(SECTION_WINDOW, "Height", &s.window_height);
    if let Some(position) = s.window_position {
        ini.set_as(SECTION_WINDOW, "X", &position.x);
        ini.set_as(SECTION_WINDOW, "Y", &position.y);
    }

    ini.set_as(SECTION_PROCESS, "Name", &s.process_name);
    ini.set_as(SECTION_PROCESS, "PollingRate", &s.polling_interval_ms);
    ini.set_as(SECTION_PROCESS, "WarningThreshold", &s.warning_threshold_percent);
}
