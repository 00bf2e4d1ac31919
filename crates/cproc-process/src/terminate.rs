//! Process termination primitives.
//!
//! Building blocks for callers that put a deadline on a child: send the
//! request, then reap through [`crate::Process::wait`] as usual.

use cproc_common::ProcessResult;
use tracing::debug;

#[cfg(unix)]
use cproc_common::ProcessError;

/// Ask a process to exit (SIGTERM on Unix).
///
/// Windows has no equivalent request for a console-less child, so there this
/// is the same as [`force_kill`].
pub fn terminate_gracefully(pid: u32) -> ProcessResult<()> {
    debug!("Requesting termination of PID {}", pid);

    #[cfg(unix)]
    {
        send_signal(pid, nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(windows)]
    {
        terminate_windows(pid)
    }
}

/// Force kill a process (SIGKILL on Unix, TerminateProcess on Windows).
pub fn force_kill(pid: u32) -> ProcessResult<()> {
    debug!("Killing PID {}", pid);

    #[cfg(unix)]
    {
        send_signal(pid, nix::sys::signal::Signal::SIGKILL)
    }

    #[cfg(windows)]
    {
        terminate_windows(pid)
    }
}

/// PIDs 0 and above `i32::MAX` name process groups or nothing at all, never
/// a single process.
#[cfg(unix)]
pub(crate) fn to_pid(pid: u32) -> ProcessResult<nix::unistd::Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(nix::unistd::Pid::from_raw(raw)),
        _ => Err(ProcessError::control(pid, "resolve pid", "not a single-process PID")),
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: nix::sys::signal::Signal) -> ProcessResult<()> {
    nix::sys::signal::kill(to_pid(pid)?, signal).map_err(|e| ProcessError::control(pid, signal.as_str(), e))
}

#[cfg(windows)]
fn terminate_windows(pid: u32) -> ProcessResult<()> {
    use cproc_common::ProcessError;
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

    let handle = unsafe { OpenProcess(PROCESS_TERMINATE, false, pid) }
        .map_err(|e| ProcessError::control(pid, "OpenProcess", e))?;

    // Exit code 1, as a crashed console program would report.
    let result = unsafe { TerminateProcess(handle, 1) };
    let _ = unsafe { CloseHandle(handle) };

    result.map_err(|e| ProcessError::control(pid, "TerminateProcess", e))
}
