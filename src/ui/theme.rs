use crossterm::style::Color;

use crate::core::settings::{Rgb, Settings, ThemeMode};

/// Terminal colors for the handle counter; `None` keeps the terminal default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl Palette {
    pub fn for_settings(settings: &Settings) -> Self {
        match settings.theme_mode {
            ThemeMode::System => Palette::default(),
            ThemeMode::Light => Palette {
                foreground: Some(to_color(Rgb::BLACK)),
                background: Some(to_color(Rgb::WHITE)),
            },
            ThemeMode::Dark => Palette {
                foreground: Some(to_color(Rgb::WHITE)),
                background: Some(to_color(Rgb::BLACK)),
            },
            ThemeMode::Custom => Palette {
                foreground: Some(to_color(settings.foreground_color)),
                background: Some(to_color(settings.background_color)),
            },
        }
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
