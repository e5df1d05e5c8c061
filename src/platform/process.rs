//! Process resolution and handle queries.

use std::ffi::OsStr;
use std::path::Path;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use super::gui_resources::gdi_object_count;

/// Trait for process resource queries
///
/// Every failure is reported as `None`; callers treat it as "no data".
pub trait ProcessProbe: Send {
    /// PID of the first running process whose image name matches `name`,
    /// ignoring the extension and ASCII case
    fn resolve_process_id(&mut self, name: &str) -> Option<u32>;

    /// Current GDI handle count of `pid`
    fn query_handle_count(&mut self, pid: u32) -> Option<u32>;
}

/// Probe backed by sysinfo for process lookup and Win32 for handle counts
pub struct SystemProcessProbe {
    system: System,
}

impl SystemProcessProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SystemProcessProbe {
    fn resolve_process_id(&mut self, name: &str) -> Option<u32> {
        let target = image_stem(OsStr::new(name))?;

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        // Lowest PID keeps the choice stable across cycles
        self.system
            .processes()
            .iter()
            .filter(|(_, process)| image_stem(process.name()).as_deref() == Some(target.as_str()))
            .map(|(pid, _)| pid.as_u32())
            .min()
    }

    fn query_handle_count(&mut self, pid: u32) -> Option<u32> {
        gdi_object_count(pid)
    }
}

/// Lowercased file name without extension; `None` for blank names
pub fn image_stem(name: &OsStr) -> Option<String> {
    let stem = Path::new(name).file_stem()?.to_string_lossy().trim().to_ascii_lowercase();
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}
