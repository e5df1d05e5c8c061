//! GDI object counting and the per-process GDI quota.

/// Quota used when the registry value cannot be read
pub const DEFAULT_GDI_HANDLE_QUOTA: u32 = 10_000;

/// Number of GDI objects held by `pid`.
///
/// `None` when the process cannot be opened, has exited, or reports zero
/// (a live GUI process always holds at least one object).
#[cfg(windows)]
pub fn gdi_object_count(pid: u32) -> Option<u32> {
    use windows_sys::Win32::System::Threading::{GetGuiResources, GR_GDIOBJECTS};

    let process = ProcessHandle::open(pid)?;
    let count = unsafe { GetGuiResources(process.0, GR_GDIOBJECTS) };
    (count != 0).then_some(count)
}

#[cfg(not(windows))]
pub fn gdi_object_count(_pid: u32) -> Option<u32> {
    // GDI objects only exist on Windows
    None
}

/// Owned process handle, closed on drop
#[cfg(windows)]
struct ProcessHandle(windows_sys::Win32::Foundation::HANDLE);

#[cfg(windows)]
impl ProcessHandle {
    fn open(pid: u32) -> Option<Self> {
        use windows_sys::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_INFORMATION};

        let handle = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION, 0, pid) };
        if handle.is_null() {
            log::debug!("OpenProcess failed for PID {}", pid);
            None
        } else {
            Some(Self(handle))
        }
    }
}

#[cfg(windows)]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe {
            windows_sys::Win32::Foundation::CloseHandle(self.0);
        }
    }
}

/// `GDIProcessHandleQuota` from the registry, or the default
#[cfg(windows)]
pub fn gdi_handle_quota() -> u32 {
    use winreg::enums::HKEY_LOCAL_MACHINE;
    use winreg::RegKey;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let quota = hklm
        .open_subkey(r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Windows")
        .and_then(|key| key.get_value::<u32, _>("GDIProcessHandleQuota"));

    match quota {
        Ok(quota) if quota > 0 => quota,
        Ok(_) => DEFAULT_GDI_HANDLE_QUOTA,
        Err(e) => {
            log::debug!("Falling back to default GDI quota: {}", e);
            DEFAULT_GDI_HANDLE_QUOTA
        }
    }
}

#[cfg(not(windows))]
pub fn gdi_handle_quota() -> u32 {
    DEFAULT_GDI_HANDLE_QUOTA
}
