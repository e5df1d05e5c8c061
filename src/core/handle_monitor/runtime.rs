//! Tokio runtime that hosts the monitoring task.
//!
//! The UI side owns a `MonitorRuntime`, drains `UiMessage`s from it on its own
//! thread and triggers the shutdown signal when it wants the task gone.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::alerts::ThresholdAlert;
use super::task::handle_monitor_task;
use crate::core::settings::{SettingField, SettingsStore};
use crate::error::{HandleItError, Result};
use crate::platform::ProcessProbe;

/// Capacity of the queue between the monitor and the UI
pub const UI_QUEUE_CAPACITY: usize = 32;

/// Messages posted to the UI thread, delivered in order
#[derive(Debug, Clone)]
pub enum UiMessage {
    /// New text for the handle counter
    DisplayText(String),
    /// The latch just fired
    ThresholdAlert(ThresholdAlert),
    /// A setting changed; the UI re-reads what it needs
    SettingChanged(SettingField),
}

/// Set-once cancellation flag shared by the UI and the monitor task
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Returns `false` if it was already requested.
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Resolves once shutdown has been requested or the signal is gone
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Wrapper around the Tokio runtime running the monitor.
pub struct MonitorRuntime {
    ui_rx: mpsc::Receiver<UiMessage>,
    ui_tx: mpsc::Sender<UiMessage>,
    shutdown: ShutdownSignal,
    task: Option<JoinHandle<()>>,
    runtime: tokio::runtime::Runtime,
}

impl MonitorRuntime {
    /// Build the runtime and spawn the monitoring task.
    pub fn start<P>(store: Arc<SettingsStore>, probe: P, quota: u32) -> Result<Self>
    where
        P: ProcessProbe + 'static,
    {
        log::info!("Starting handle monitor runtime");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .thread_name("handle-monitor")
            .build()
            .map_err(|e| HandleItError::runtime(format!("failed to build runtime: {}", e)))?;

        let (ui_tx, ui_rx) = mpsc::channel(UI_QUEUE_CAPACITY);
        let shutdown = ShutdownSignal::new();

        let task = runtime.spawn(handle_monitor_task(
            store,
            probe,
            quota,
            ui_tx.clone(),
            shutdown.subscribe(),
        ));

        Ok(Self {
            ui_rx,
            ui_tx,
            shutdown,
            task: Some(task),
            runtime,
        })
    }

    /// Sender for posting extra messages (e.g. setting changes) to the UI queue
    pub fn ui_sender(&self) -> mpsc::Sender<UiMessage> {
        self.ui_tx.clone()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Block the calling (UI) thread until the next message.
    ///
    /// Returns `None` once shutdown has been requested.
    pub fn next_message(&mut self) -> Option<UiMessage> {
        let mut stop = self.shutdown.subscribe();
        let ui_rx = &mut self.ui_rx;

        self.runtime.block_on(async {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut stop) => None,
                message = ui_rx.recv() => message,
            }
        })
    }

    /// Signal the task, wait for it to finish and tear the runtime down.
    pub fn shutdown(mut self) {
        log::info!("Shutting down handle monitor runtime");
        self.shutdown.trigger();

        if let Some(task) = self.task.take() {
            let joined = self
                .runtime
                .block_on(async { tokio::time::timeout(Duration::from_secs(5), task).await });
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::error!("Monitor task failed: {}", e),
                Err(_) => log::warn!("Monitor task did not stop in time"),
            }
        }

        self.runtime.shutdown_timeout(Duration::from_secs(1));
    }
}
