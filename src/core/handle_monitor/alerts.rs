//! One-shot alerting on GDI handle consumption.
//!
//! The latch fires once when the count reaches the alert line and stays
//! silent until a sample drops strictly below it again.

use chrono::{DateTime, Local};

/// Latch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Normal,
    Latched,
}

/// Emitted on every `Normal -> Latched` transition
#[derive(Debug, Clone)]
pub struct ThresholdAlert {
    pub count: u32,
    pub threshold_percent: u8,
    pub quota: u32,
    pub raised_at: DateTime<Local>,
}

impl ThresholdAlert {
    pub fn title(&self) -> &'static str {
        "GDI Handle Warning"
    }

    pub fn message(&self) -> String {
        format!(
            "GDI handle count ({}) has reached {}% of maximum ({}).\n\
             Please save your work and restart the application to free up resources.",
            self.count, self.threshold_percent, self.quota
        )
    }
}

/// `quota * percent / 100`, truncated
pub fn alert_line(quota: u32, threshold_percent: u8) -> u64 {
    u64::from(quota) * u64::from(threshold_percent) / 100
}

/// Two-state latch evaluated once per poll cycle.
///
/// Only the monitoring task owns one; evaluations must be sequential.
#[derive(Debug, Default)]
pub struct AlertLatch {
    state: AlertState,
}

impl AlertLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Feed one sample; returns an alert only on a fresh crossing
    pub fn evaluate(
        &mut self,
        count: u32,
        quota: u32,
        threshold_percent: u8,
    ) -> Option<ThresholdAlert> {
        let line = alert_line(quota, threshold_percent);
        let above = u64::from(count) >= line;

        match (self.state, above) {
            (AlertState::Normal, true) => {
                self.state = AlertState::Latched;
                Some(ThresholdAlert {
                    count,
                    threshold_percent,
                    quota,
                    raised_at: Local::now(),
                })
            }
            (AlertState::Latched, false) => {
                self.state = AlertState::Normal;
                None
            }
            _ => None,
        }
    }
}
