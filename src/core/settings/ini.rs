//! Minimal INI document used as the settings backing file.
//!
//! Lookups are case-insensitive on section and key names. Comments, blank
//! lines and unknown keys survive a read/modify/write cycle.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::{Rgb, ThemeMode};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Section(String),
    Entry { key: String, value: String },
    Raw(String),
}

/// An INI file held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniFile {
    lines: Vec<Line>,
}

impl IniFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|raw| {
                let trimmed = raw.trim();
                if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2 {
                    Line::Section(trimmed[1..trimmed.len() - 1].trim().to_string())
                } else if trimmed.starts_with(';') || trimmed.starts_with('#') {
                    Line::Raw(raw.to_string())
                } else if let Some((key, value)) = trimmed.split_once('=') {
                    Line::Entry {
                        key: key.trim().to_string(),
                        value: value.trim().to_string(),
                    }
                } else {
                    Line::Raw(raw.to_string())
                }
            })
            .collect();

        Self { lines }
    }

    /// Read and parse a file. A missing file is an empty document.
    pub fn read(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::parse(&decode(&bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the document as UTF-8, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let mut in_section = false;
        for line in &self.lines {
            match line {
                Line::Section(name) => in_section = name.eq_ignore_ascii_case(section),
                Line::Entry { key: k, value } if in_section && k.eq_ignore_ascii_case(key) => {
                    return Some(value.as_str());
                }
                _ => {}
            }
        }
        None
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let mut in_section = false;
        let mut insert_at = None;

        for (index, line) in self.lines.iter_mut().enumerate() {
            match line {
                Line::Section(name) => {
                    if in_section {
                        break;
                    }
                    in_section = name.eq_ignore_ascii_case(section);
                    if in_section {
                        insert_at = Some(index + 1);
                    }
                }
                Line::Entry { key: k, value: v } if in_section => {
                    if k.eq_ignore_ascii_case(key) {
                        *v = value.to_string();
                        return;
                    }
                    insert_at = Some(index + 1);
                }
                _ => {}
            }
        }

        let entry = Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
        };

        match insert_at {
            Some(index) => self.lines.insert(index, entry),
            None => {
                if !self.lines.is_empty() {
                    self.lines.push(Line::Raw(String::new()));
                }
                self.lines.push(Line::Section(section.to_string()));
                self.lines.push(entry);
            }
        }
    }

    /// Typed lookup; `None` when missing or unparsable
    pub fn get_as<T: IniValue>(&self, section: &str, key: &str) -> Option<T> {
        self.get(section, key).and_then(T::from_ini)
    }

    pub fn set_as<T: IniValue>(&mut self, section: &str, key: &str, value: &T) {
        self.set(section, key, &value.to_ini());
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Section(name) => writeln!(f, "[{}]", name)?,
                Line::Entry { key, value } => writeln!(f, "{}={}", key, value)?,
                Line::Raw(raw) => writeln!(f, "{}", raw)?,
            }
        }
        Ok(())
    }
}

/// UTF-16 (either endianness, BOM required) or UTF-8 with optional BOM
fn decode(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Conversion between a typed value and its INI text form
pub trait IniValue: Sized {
    fn to_ini(&self) -> String;
    fn from_ini(raw: &str) -> Option<Self>;
}

impl IniValue for bool {
    fn to_ini(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }

    fn from_ini(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

impl IniValue for String {
    fn to_ini(&self) -> String {
        self.clone()
    }

    fn from_ini(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl IniValue for f64 {
    fn to_ini(&self) -> String {
        self.to_string()
    }

    fn from_ini(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

macro_rules! impl_ini_integer {
    ($($ty:ty),*) => {
        $(
            impl IniValue for $ty {
                fn to_ini(&self) -> String {
                    self.to_string()
                }

                fn from_ini(raw: &str) -> Option<Self> {
                    raw.trim().parse::<$ty>().ok()
                }
            }
        )*
    };
}

impl_ini_integer!(u8, u32, u64, i32, i64);

impl IniValue for Rgb {
    fn to_ini(&self) -> String {
        self.to_hex()
    }

    fn from_ini(raw: &str) -> Option<Self> {
        Rgb::from_hex(raw)
    }
}

impl IniValue for ThemeMode {
    fn to_ini(&self) -> String {
        self.as_str().to_string()
    }

    fn from_ini(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}
