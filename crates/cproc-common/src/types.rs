//! Core vocabulary types shared by the pipe and process crates.

use std::fmt;

/// One of the three standard streams of a child process.
///
/// # Example
/// ```
/// use cproc_common::StdStream;
///
/// assert_eq!(StdStream::Out.fd(), 1);
/// assert_eq!(StdStream::Err.to_string(), "stderr");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StdStream {
    /// Standard input (descriptor 0)
    In,
    /// Standard output (descriptor 1)
    Out,
    /// Standard error (descriptor 2)
    Err,
}

impl StdStream {
    /// Every stream, in descriptor order.
    pub const ALL: [StdStream; 3] = [StdStream::In, StdStream::Out, StdStream::Err];

    /// Position of this stream in [`StdStream::ALL`].
    pub fn index(&self) -> usize {
        match self {
            StdStream::In => 0,
            StdStream::Out => 1,
            StdStream::Err => 2,
        }
    }

    /// The POSIX descriptor number this stream is bound to in any process.
    pub fn fd(&self) -> i32 {
        self.index() as i32
    }

    /// Returns the conventional stream name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StdStream::In => "stdin",
            StdStream::Out => "stdout",
            StdStream::Err => "stderr",
        }
    }
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which end of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipeSide {
    Read,
    Write,
}

impl fmt::Display for PipeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeSide::Read => write!(f, "read"),
            PipeSide::Write => write!(f, "write"),
        }
    }
}

/// How a child process terminated.
///
/// Exit codes are kept exactly as the OS reports them. On POSIX that means
/// modulo 256: a child calling `exit(256)` is observed as `Exited(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Normal termination with the given exit code.
    Exited(i32),
    /// Termination by the given signal number (POSIX only).
    Signaled(i32),
}

impl ExitStatus {
    /// The exit code, if the child exited normally.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(code) => Some(*code),
            ExitStatus::Signaled(_) => None,
        }
    }

    /// The terminating signal, if any.
    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(_) => None,
            ExitStatus::Signaled(signal) => Some(*signal),
        }
    }

    /// True for a normal exit with code 0.
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exit code {}", code),
            ExitStatus::Signaled(signal) => write!(f, "signal {}", signal),
        }
    }
}
