//! Single-line terminal display for the handle counter.
//!
//! Runs on the thread that owns the `MonitorRuntime` and is the only code that
//! writes to the terminal.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use super::theme::Palette;
use crate::core::handle_monitor::{MonitorRuntime, ThresholdAlert, UiMessage, WAITING_TEXT};
use crate::core::settings::{SettingField, SettingsStore};

pub struct Overlay<W: Write> {
    out: W,
    store: Arc<SettingsStore>,
    palette: Palette,
    text: String,
}

impl<W: Write> Overlay<W> {
    pub fn new(out: W, store: Arc<SettingsStore>) -> Self {
        let palette = store.read(Palette::for_settings);
        Self {
            out,
            store,
            palette,
            text: WAITING_TEXT.to_string(),
        }
    }

    /// Current counter text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn handle(&mut self, message: UiMessage) -> io::Result<()> {
        match message {
            UiMessage::DisplayText(text) => {
                self.text = text;
                self.render_line()
            }
            UiMessage::ThresholdAlert(alert) => self.render_alert(&alert),
            UiMessage::SettingChanged(field) => match field {
                SettingField::ThemeMode
                | SettingField::IsCustomTheme
                | SettingField::ForegroundColor
                | SettingField::BackgroundColor => {
                    self.palette = self.store.read(Palette::for_settings);
                    self.render_line()
                }
                SettingField::ProcessName => self.render_line(),
                _ => Ok(()),
            },
        }
    }

    pub fn render_line(&mut self) -> io::Result<()> {
        let process_name = self.store.read(|s| s.process_name.clone());

        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        if let Some(color) = self.palette.foreground {
            queue!(self.out, SetForegroundColor(color))?;
        }
        if let Some(color) = self.palette.background {
            queue!(self.out, SetBackgroundColor(color))?;
        }
        queue!(
            self.out,
            Print(format!(" {} GDI: {} ", process_name, self.text)),
            ResetColor
        )?;
        self.out.flush()
    }

    fn render_alert(&mut self, alert: &ThresholdAlert) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        writeln!(
            self.out,
            "{} {}",
            format!("! {}", alert.title()).yellow().bold(),
            alert.raised_at.format("%H:%M:%S").to_string().dimmed()
        )?;
        for line in alert.message().lines() {
            writeln!(self.out, "  {}", line)?;
        }
        // Terminal bell stands in for the modal notice
        write!(self.out, "\x07")?;
        self.render_line()
    }

    fn finish(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, Print("\n"), Show)
    }
}

/// Drain the runtime's queue onto stdout until shutdown is requested
pub fn run_overlay(runtime: &mut MonitorRuntime, store: Arc<SettingsStore>) -> Result<()> {
    let mut overlay = Overlay::new(io::stdout(), store);
    execute!(overlay.out, Hide).context("Failed to hide cursor")?;
    overlay.render_line().context("Failed to draw display")?;

    while let Some(message) = runtime.next_message() {
        overlay.handle(message).context("Failed to draw display")?;
    }

    overlay.finish().context("Failed to restore terminal")?;
    Ok(())
}
