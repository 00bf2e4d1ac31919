//! The public face of a running child.

use crate::arguments::ProcessArguments;
use crate::config::ExecutionConfig;
use crate::handle::{signal_name, ProcessHandle};
use crate::launch::{PlatformLauncher, ProcessLauncher};
use cproc_common::{ExitStatus, ProcessError, ProcessResult, StdStream};
use cproc_pipe::{PipeDescriptor, StandardStreamSet};
use tracing::debug;

/// A child process whose stdin, stdout and stderr are pipes held by the caller.
///
/// The child is already running when construction returns. Talk to it with
/// the descriptors from [`Process::get_pipe`] and the helpers in
/// [`cproc_pipe::io`]. Close stdin with [`Process::close_pipe`] when there
/// is nothing more to send, and drain stdout and stderr concurrently if the
/// child can write more than a pipe buffer to both.
///
/// Dropping a `Process` closes whatever parent ends remain and then blocks
/// until the child has exited, so no zombie and no descriptor is left behind.
/// A child that never exits on its own makes the drop hang; kill it first
/// (see [`crate::terminate`]).
#[derive(Debug)]
pub struct Process {
    arguments: ProcessArguments,
    parent: ProcessHandle,
    child: ProcessHandle,
    pipes: StandardStreamSet,
}

impl Process {
    /// Starts `path` with `args`. `path` is resolved against `PATH` on POSIX.
    ///
    /// A program that cannot be started is reported here as
    /// [`ProcessError::LaunchFailed`], never later.
    pub fn new<I>(path: impl Into<String>, args: I) -> ProcessResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::spawn(ProcessArguments::new(path, args)?)
    }

    pub fn from_config(config: &ExecutionConfig) -> ProcessResult<Self> {
        Self::new(config.executable_path.as_str(), &config.args)
    }

    /// Starts prepared arguments with the platform's launcher.
    pub fn spawn(arguments: ProcessArguments) -> ProcessResult<Self> {
        Self::spawn_with(&PlatformLauncher::default(), arguments)
    }

    /// Starts prepared arguments with an explicit launch strategy.
    pub fn spawn_with(launcher: &dyn ProcessLauncher, arguments: ProcessArguments) -> ProcessResult<Self> {
        let launched = launcher.launch(&arguments)?;
        Ok(Self {
            arguments,
            parent: ProcessHandle::current(),
            child: launched.handle,
            pipes: launched.pipes,
        })
    }

    /// The parent's end of `stream`, or [`cproc_pipe::INVALID_PIPE_DESCRIPTOR`] once closed.
    ///
    /// The descriptor stays owned by this `Process`; do not close it directly.
    pub fn get_pipe(&self, stream: StdStream) -> PipeDescriptor {
        self.pipes.parent_descriptor(stream)
    }

    /// Closes the parent's end of `stream`. Closing it again does nothing.
    pub fn close_pipe(&mut self, stream: StdStream) -> ProcessResult<()> {
        self.pipes.close_parent_end(stream)
    }

    /// Hands the parent's end of `stream` to the caller, who must close it.
    ///
    /// Afterwards this `Process` behaves as if the end had been closed.
    pub fn take_pipe(&mut self, stream: StdStream) -> PipeDescriptor {
        self.pipes.get_mut(stream).forget(StandardStreamSet::parent_side(stream))
    }

    /// Waits for the child and returns its exit code.
    ///
    /// Termination by a signal is returned as [`ProcessError::Signaled`], on
    /// this and every later call. Safe to call repeatedly.
    pub fn wait(&mut self) -> ProcessResult<i32> {
        match self.wait_status()? {
            ExitStatus::Exited(code) => Ok(code),
            ExitStatus::Signaled(signal) => Err(ProcessError::signaled(self.id(), signal, signal_name(signal))),
        }
    }

    /// Waits for the child and returns how it ended, signals included.
    pub fn wait_status(&mut self) -> ProcessResult<ExitStatus> {
        self.child.wait()
    }

    /// The child's process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn parent(&self) -> &ProcessHandle {
        &self.parent
    }

    pub fn child(&self) -> &ProcessHandle {
        &self.child
    }

    pub fn arguments(&self) -> &ProcessArguments {
        &self.arguments
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        if let Err(e) = self.pipes.close_parent_side() {
            debug!("Closing pipes of PID {} on drop failed: {}", self.id(), e);
        }
        if let Err(e) = self.child.wait() {
            debug!("Reaping PID {} on drop failed: {}", self.id(), e);
        }
    }
}
