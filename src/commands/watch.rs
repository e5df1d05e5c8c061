//! Watch command handler.
//!
//! Composition root: loads settings, starts the monitor and runs the display
//! until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::handle_monitor::{MonitorRuntime, UiMessage};
use crate::core::settings::{Settings, SettingsStore};
use crate::platform::{gdi_handle_quota, SystemProcessProbe};
use crate::ui::run_overlay;

/// Execute the watch command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let process_name = matches
        .get_one::<String>("process")
        .context("Missing process name")?;

    let store = Arc::new(SettingsStore::new(Settings::default()));
    store.load();
    store
        .set_process_name(process_name)
        .context("Invalid process name")?;

    let quota = gdi_handle_quota();
    log::info!("Watching {} (GDI quota {})", process_name, quota);

    let mut runtime = MonitorRuntime::start(Arc::clone(&store), SystemProcessProbe::new(), quota)
        .context("Failed to start handle monitor")?;

    let ui_tx = runtime.ui_sender();
    store.subscribe(move |field| {
        if let Err(e) = ui_tx.try_send(UiMessage::SettingChanged(field)) {
            log::debug!("Dropped setting change {:?}: {}", field, e);
        }
    });

    let shutdown = runtime.shutdown_signal();
    ctrlc::set_handler(move || {
        shutdown.trigger();
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let result = run_overlay(&mut runtime, Arc::clone(&store));

    runtime.shutdown();
    store.save();

    result
}
