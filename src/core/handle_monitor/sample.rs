use std::time::Instant;

use crate::platform::ProcessProbe;

/// One poll cycle's observation. Never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub process_id: Option<u32>,
    pub handle_count: Option<u32>,
    pub taken_at: Instant,
}

impl Sample {
    /// Resolve `process_name` and query its handle count
    pub fn take<P: ProcessProbe + ?Sized>(probe: &mut P, process_name: &str) -> Self {
        let process_id = probe.resolve_process_id(process_name);
        let handle_count = process_id.and_then(|pid| probe.query_handle_count(pid));

        Self {
            process_id,
            handle_count,
            taken_at: Instant::now(),
        }
    }
}
