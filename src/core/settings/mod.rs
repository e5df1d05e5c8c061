//! User-tunable settings and their INI-backed store.
//!
//! `Settings` is the plain record shared by the monitor and the presentation
//! layer. `SettingsStore` owns the live copy, persists it and notifies
//! subscribers about every field that changes.

mod ini;
mod store;

pub use ini::{IniFile, IniValue};
pub use store::{SettingsDraft, SettingsStore};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PROCESS_NAME: &str = "explorer.exe";
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_WARNING_THRESHOLD: u8 = 90;
pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_WINDOW_WIDTH: f64 = 100.0;
pub const DEFAULT_WINDOW_HEIGHT: f64 = 30.0;
pub const CONFIG_FILE_NAME: &str = "HandleIt.ini";

/// How the display should be colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
    Custom,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::System => "System",
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
            ThemeMode::Custom => "Custom",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "custom" => Ok(ThemeMode::Custom),
            other => Err(format!("unknown theme mode '{}'", other)),
        }
    }
}

/// 24-bit color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase `#RRGGBB`, no alpha
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse `#RRGGBB` (the `#` is optional, hex digits in either case)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Last known screen placement of the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPosition {
    pub x: f64,
    pub y: f64,
}

/// Identifies a single observable setting in change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    ProcessName,
    PollingInterval,
    WarningThreshold,
    AlwaysOnTop,
    LockPosition,
    ThemeMode,
    /// Derived from `ThemeMode`, fired alongside it
    IsCustomTheme,
    FontFamily,
    FontSize,
    BackgroundColor,
    ForegroundColor,
    WindowWidth,
    WindowHeight,
    WindowPosition,
    StorePath,
}

/// The full configuration record.
///
/// This is the unit of persistence and of UI binding. Appearance fields only
/// matter when `theme_mode` is `Custom`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub process_name: String,
    pub polling_interval_ms: u64,
    pub warning_threshold_percent: u8,
    pub always_on_top: bool,
    pub lock_position: bool,
    pub theme_mode: ThemeMode,
    pub font_family: String,
    pub font_size: f64,
    pub background_color: Rgb,
    pub foreground_color: Rgb,
    pub window_width: f64,
    pub window_height: f64,
    /// `None` until a position has been stored
    pub window_position: Option<WindowPosition>,
    pub store_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            polling_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
            warning_threshold_percent: DEFAULT_WARNING_THRESHOLD,
            always_on_top: false,
            lock_position: false,
            theme_mode: ThemeMode::System,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            background_color: Rgb::WHITE,
            foreground_color: Rgb::BLACK,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            window_position: None,
            store_path: default_store_path(),
        }
    }
}

impl Settings {
    /// Defaults backed by a specific file
    pub fn with_store_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: path.into(),
            ..Default::default()
        }
    }

    pub fn is_custom_theme(&self) -> bool {
        self.theme_mode == ThemeMode::Custom
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// Fields whose values differ between `self` and `other`.
    ///
    /// A theme mode change also reports `IsCustomTheme`.
    pub fn changed_fields(&self, other: &Settings) -> Vec<SettingField> {
        let mut fields = Vec::new();
        let mut check = |differs: bool, field: SettingField| {
            if differs {
                fields.push(field);
            }
        };

        check(self.process_name != other.process_name, SettingField::ProcessName);
        check(
            self.polling_interval_ms != other.polling_interval_ms,
            SettingField::PollingInterval,
        );
        check(
            self.warning_threshold_percent != other.warning_threshold_percent,
            SettingField::WarningThreshold,
        );
        check(self.always_on_top != other.always_on_top, SettingField::AlwaysOnTop);
        check(self.lock_position != other.lock_position, SettingField::LockPosition);
        check(self.theme_mode != other.theme_mode, SettingField::ThemeMode);
        check(self.theme_mode != other.theme_mode, SettingField::IsCustomTheme);
        check(self.font_family != other.font_family, SettingField::FontFamily);
        check(self.font_size != other.font_size, SettingField::FontSize);
        check(
            self.background_color != other.background_color,
            SettingField::BackgroundColor,
        );
        check(
            self.foreground_color != other.foreground_color,
            SettingField::ForegroundColor,
        );
        check(self.window_width != other.window_width, SettingField::WindowWidth);
        check(self.window_height != other.window_height, SettingField::WindowHeight);
        check(
            self.window_position != other.window_position,
            SettingField::WindowPosition,
        );
        check(self.store_path != other.store_path, SettingField::StorePath);

        fields
    }
}

/// `HandleIt.ini` next to the executable.
///
/// Falls back to the user config directory, then the working directory.
pub fn default_store_path() -> PathBuf {
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
    {
        return dir.join(CONFIG_FILE_NAME);
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("handleit").join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}
