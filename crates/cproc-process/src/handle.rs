//! OS process references and reaping.

use cproc_common::{ExitStatus, ProcessError, ProcessResult};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

#[cfg(unix)]
pub type NativeProcessHandle = nix::unistd::Pid;

#[cfg(windows)]
pub type NativeProcessHandle = windows::Win32::Foundation::HANDLE;

/// Where a child is in its life, as far as this handle knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessLifecycle {
    /// Not waited on yet (it may already have exited).
    Running,
    /// Reaped after a normal exit.
    Exited(i32),
    /// Reaped after termination by a signal.
    Signaled(i32),
}

impl From<ExitStatus> for ProcessLifecycle {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Exited(code) => ProcessLifecycle::Exited(code),
            ExitStatus::Signaled(signal) => ProcessLifecycle::Signaled(signal),
        }
    }
}

/// A reference to an OS process plus what is known about its termination.
///
/// The first [`ProcessHandle::wait`] reaps the child and records the status.
/// Every later call returns the recorded status without another OS call, so
/// an already-reaped PID is never waited on twice.
pub struct ProcessHandle {
    native: NativeProcessHandle,
    pid: u32,
    state: ProcessLifecycle,
    #[cfg(windows)]
    owned: bool,
}

// SAFETY: a process HANDLE may be waited on and closed from any thread.
#[cfg(windows)]
unsafe impl Send for ProcessHandle {}

impl ProcessHandle {
    /// Wraps the handle of a freshly created child.
    #[cfg(unix)]
    pub fn new(native: NativeProcessHandle) -> Self {
        Self {
            native,
            pid: native.as_raw() as u32,
            state: ProcessLifecycle::Running,
        }
    }

    /// Wraps the handle of a freshly created child. The handle is closed
    /// once the child is reaped, or on drop.
    #[cfg(windows)]
    pub fn new(native: NativeProcessHandle) -> Self {
        use windows::Win32::System::Threading::GetProcessId;

        let pid = unsafe { GetProcessId(native) };
        Self {
            native,
            pid,
            state: ProcessLifecycle::Running,
            owned: true,
        }
    }

    /// A handle for the calling process, for identification only.
    /// Waiting on it fails.
    #[cfg(unix)]
    pub fn current() -> Self {
        Self::new(nix::unistd::Pid::this())
    }

    /// A handle for the calling process, for identification only.
    /// Waiting on it fails.
    #[cfg(windows)]
    pub fn current() -> Self {
        use windows::Win32::System::Threading::GetCurrentProcess;

        Self {
            native: unsafe { GetCurrentProcess() },
            pid: std::process::id(),
            state: ProcessLifecycle::Running,
            owned: false,
        }
    }

    /// The OS process id.
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// The recorded termination status, once the child has been reaped.
    pub fn status(&self) -> Option<ExitStatus> {
        match self.state {
            ProcessLifecycle::Running => None,
            ProcessLifecycle::Exited(code) => Some(ExitStatus::Exited(code)),
            ProcessLifecycle::Signaled(signal) => Some(ExitStatus::Signaled(signal)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessLifecycle::Running
    }

    /// Blocks until the process terminates and returns how it ended.
    pub fn wait(&mut self) -> ProcessResult<ExitStatus> {
        if let Some(status) = self.status() {
            return Ok(status);
        }

        let status = self.wait_native()?;
        self.state = status.into();
        debug!("Process {} reaped: {}", self.pid, status);
        Ok(status)
    }

    #[cfg(unix)]
    fn wait_native(&mut self) -> ProcessResult<ExitStatus> {
        use nix::errno::Errno;
        use nix::sys::wait::{waitpid, WaitStatus};

        loop {
            match waitpid(self.native, None) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(ExitStatus::Exited(code)),
                Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(ExitStatus::Signaled(signal as i32)),
                // Stop/continue notifications are not terminations.
                Ok(other) => debug!("Process {} reported {:?}, still waiting", self.pid, other),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ProcessError::wait_failed(self.pid, e)),
            }
        }
    }

    #[cfg(windows)]
    fn wait_native(&mut self) -> ProcessResult<ExitStatus> {
        use windows::Win32::Foundation::{CloseHandle, WAIT_FAILED};
        use windows::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject, INFINITE};

        if !self.owned {
            return Err(ProcessError::wait_failed(self.pid, "cannot wait on the calling process"));
        }

        let result = unsafe { WaitForSingleObject(self.native, INFINITE) };
        if result == WAIT_FAILED {
            return Err(ProcessError::wait_failed(self.pid, windows::core::Error::from_win32()));
        }

        let mut exit_code: u32 = 0;
        unsafe { GetExitCodeProcess(self.native, &mut exit_code) }
            .map_err(|e| ProcessError::wait_failed(self.pid, e))?;

        let _ = unsafe { CloseHandle(self.native) };
        self.owned = false;

        Ok(ExitStatus::Exited(exit_code as i32))
    }
}

#[cfg(windows)]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if self.owned {
            let _ = unsafe { windows::Win32::Foundation::CloseHandle(self.native) };
        }
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("state", &self.state)
            .finish()
    }
}

impl PartialEq for ProcessHandle {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for ProcessHandle {}

impl PartialOrd for ProcessHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProcessHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pid.cmp(&other.pid)
    }
}

/// Human-readable name of a signal number, e.g. `SIGKILL`.
#[cfg(unix)]
pub fn signal_name(signal: i32) -> String {
    match nix::sys::signal::Signal::try_from(signal) {
        Ok(signal) => signal.as_str().to_string(),
        Err(_) => format!("unknown signal {}", signal),
    }
}

/// Human-readable name of a signal number.
#[cfg(windows)]
pub fn signal_name(signal: i32) -> String {
    format!("signal {}", signal)
}
