//! The monitoring loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::alerts::AlertLatch;
use super::runtime::{wait_for_shutdown, UiMessage};
use super::sample::Sample;
use crate::core::settings::SettingsStore;
use crate::platform::ProcessProbe;

/// Shown while the process is missing or cannot be queried
pub const WAITING_TEXT: &str = "Waiting for process...";

/// Task that samples the configured process until shutdown.
///
/// Polling frequency: `polling_interval_ms` from the live settings, re-read
/// every cycle together with the process name and threshold.
pub async fn handle_monitor_task<P: ProcessProbe>(
    store: Arc<SettingsStore>,
    mut probe: P,
    quota: u32,
    ui_tx: mpsc::Sender<UiMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    log::info!("Handle monitor task started (GDI quota {})", quota);

    let mut latch = AlertLatch::new();

    loop {
        if *shutdown.borrow() {
            break;
        }

        let (process_name, threshold_percent, interval) = store.read(|s| {
            (
                s.process_name.clone(),
                s.warning_threshold_percent,
                s.polling_interval(),
            )
        });

        let sample = Sample::take(&mut probe, &process_name);
        log::trace!(
            "{}: pid={:?} handles={:?}",
            process_name,
            sample.process_id,
            sample.handle_count
        );

        let mut messages = Vec::with_capacity(2);
        match sample.handle_count {
            Some(count) => {
                messages.push(UiMessage::DisplayText(count.to_string()));
                if let Some(alert) = latch.evaluate(count, quota, threshold_percent) {
                    log::warn!(
                        "{} reached {} GDI handles ({}% of {})",
                        process_name,
                        count,
                        threshold_percent,
                        quota
                    );
                    messages.push(UiMessage::ThresholdAlert(alert));
                }
            }
            None => messages.push(UiMessage::DisplayText(WAITING_TEXT.to_string())),
        }

        for message in messages {
            if !publish(&ui_tx, &mut shutdown, message).await {
                log::info!("Handle monitor task shutting down");
                return;
            }
        }

        tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    log::info!("Handle monitor task shutting down");
}

/// Queue `message` for the UI.
///
/// Counter updates are dropped when the queue is full so sampling never
/// stalls behind the UI. Alerts wait for room unless shutdown wins first.
/// Returns `false` when the task should stop.
async fn publish(
    ui_tx: &mpsc::Sender<UiMessage>,
    shutdown: &mut watch::Receiver<bool>,
    message: UiMessage,
) -> bool {
    if let UiMessage::DisplayText(_) = message {
        return match ui_tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::debug!("UI queue full, dropping counter update");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        };
    }

    tokio::select! {
        biased;
        _ = wait_for_shutdown(shutdown) => false,
        sent = ui_tx.send(message) => sent.is_ok(),
    }
}
