//! Error types for child process execution.
//!
//! [`ProcessError`] covers everything the pipe and process layers can report:
//! OS resource exhaustion, a child that failed before its program started,
//! failed waits, signal termination and pipe I/O. Configuration loading and
//! the CLI wrap it with `anyhow` context.

use thiserror::Error;

/// Errors raised while launching, talking to, or reaping a child process.
///
/// Normal and abnormal exits are data ([`crate::ExitStatus`]), not errors.
/// The one exception is [`ProcessError::Signaled`], which the process facade
/// raises when the caller asks for an exit code and there is none.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Creating a pipe or a process failed at the OS level. Reported before a
    /// child exists; every pipe created up to that point has been closed.
    #[error("OS resource error: {operation} - {reason}")]
    OsResource { operation: String, reason: String },

    /// The child failed between fork and the target program starting. The
    /// message is what the child reported through the error channel.
    #[error("Process launch failed: {path} - {message}")]
    LaunchFailed { path: String, message: String },

    /// The OS wait call itself failed.
    #[error("Process wait failed: {pid} - {reason}")]
    WaitFailed { pid: u32, reason: String },

    /// The child was terminated by a signal instead of exiting.
    #[error("Process terminated by signal: {pid} - {signal_name} ({signal})")]
    Signaled {
        pid: u32,
        signal: i32,
        signal_name: String,
    },

    /// Reading, writing or closing a pipe descriptor failed.
    #[error("Pipe I/O error: {operation} - {reason}")]
    PipeIo { operation: String, reason: String },

    /// Caller-supplied input was rejected before any OS resource was touched.
    #[error("Process configuration error: {id} - {reason}")]
    Configuration { id: String, reason: String },

    /// Signalling or querying a process by PID failed.
    #[error("Process control failed: {pid} - {operation}: {reason}")]
    Control {
        pid: u32,
        operation: String,
        reason: String,
    },
}

impl ProcessError {
    pub fn os_resource(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::OsResource {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub fn launch_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LaunchFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn wait_failed(pid: u32, reason: impl ToString) -> Self {
        Self::WaitFailed {
            pid,
            reason: reason.to_string(),
        }
    }

    pub fn signaled(pid: u32, signal: i32, signal_name: impl Into<String>) -> Self {
        Self::Signaled {
            pid,
            signal,
            signal_name: signal_name.into(),
        }
    }

    pub fn pipe_io(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::PipeIo {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub fn configuration(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn control(pid: u32, operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Control {
            pid,
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures reported by the child before its program started.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::LaunchFailed { .. })
    }

    /// True when the child died from a signal.
    pub fn is_signal_termination(&self) -> bool {
        matches!(self, Self::Signaled { .. })
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;
