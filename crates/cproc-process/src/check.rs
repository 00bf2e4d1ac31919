//! Process existence checking.

use cproc_common::{ProcessError, ProcessResult};

/// Check if a process with the given PID exists.
///
/// Non-destructive: on Unix this is `kill(pid, 0)`, which sends nothing; on
/// Windows it opens the process for a limited query. A child that has exited
/// but not been reaped yet (a zombie) still exists.
///
/// # Returns
///
/// * `Ok(true)` - a process with this PID exists (possibly owned by another user)
/// * `Ok(false)` - no such process
/// * `Err(_)` - the check itself failed
pub fn process_exists(pid: u32) -> ProcessResult<bool> {
    #[cfg(unix)]
    {
        process_exists_unix(pid)
    }

    #[cfg(windows)]
    {
        process_exists_windows(pid)
    }
}

#[cfg(unix)]
fn process_exists_unix(pid: u32) -> ProcessResult<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;

    let nix_pid = crate::terminate::to_pid(pid)?;
    match kill(nix_pid, None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        // Exists, but belongs to someone else.
        Err(Errno::EPERM) => Ok(true),
        Err(e) => Err(ProcessError::control(pid, "kill(0)", e)),
    }
}

#[cfg(windows)]
fn process_exists_windows(pid: u32) -> ProcessResult<bool> {
    use windows::Win32::Foundation::{CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER};
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

    match unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) } {
        Ok(handle) => {
            let _ = unsafe { CloseHandle(handle) };
            Ok(true)
        }
        Err(e) if e.code() == ERROR_INVALID_PARAMETER.to_hresult() => Ok(false),
        Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => Ok(true),
        Err(e) => Err(ProcessError::control(pid, "OpenProcess", e)),
    }
}
