//! Starting a child with its standard streams redirected to pipes.
//!
//! The POSIX launcher forks and execs. Between the two, the child may only
//! make async-signal-safe calls: the parent can be multi-threaded, and any
//! lock held by another thread at `fork` time stays held forever in the
//! child. Everything the child touches is therefore prepared beforehand
//! ([`ProcessArguments`] owns a ready-made `argv`), failures are static
//! strings plus an [`Errno`], and nothing is logged until control is back in
//! the parent.
//!
//! The parent learns whether `exec` succeeded through an error channel: a
//! close-on-exec pipe whose write end the child holds. A successful `exec`
//! closes it silently, so EOF with no data means the program is running. A
//! failing child writes a message and exits.

use crate::arguments::ProcessArguments;
use crate::handle::ProcessHandle;
use cproc_common::ProcessResult;
use cproc_pipe::StandardStreamSet;

#[cfg(unix)]
use cproc_common::{PipeSide, ProcessError, StdStream};
#[cfg(unix)]
use cproc_pipe::{posix, read_all, to_native, PipeChannel};
#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use std::convert::Infallible;
#[cfg(unix)]
use std::os::unix::io::RawFd;
#[cfg(unix)]
use tracing::{debug, info, warn};

/// A child that is running its target program.
///
/// `pipes` holds only the parent's ends; the child's ends are already closed
/// in this process.
#[derive(Debug)]
pub struct LaunchedChild {
    pub handle: ProcessHandle,
    pub pipes: StandardStreamSet,
}

/// Platform strategy for creating a child wired to three fresh pipes.
///
/// On error nothing is left behind: every descriptor created for the launch
/// is closed and any child that was created has been reaped.
pub trait ProcessLauncher {
    fn launch(&self, arguments: &ProcessArguments) -> ProcessResult<LaunchedChild>;
}

#[cfg(unix)]
pub type PlatformLauncher = ForkExecLauncher;

#[cfg(windows)]
pub type PlatformLauncher = crate::launch_windows::CreateProcessLauncher;

/// A failed step inside the forked child, before `exec` took over.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSetupError {
    pub step: &'static str,
    pub errno: Errno,
}

#[cfg(unix)]
impl ChildSetupError {
    pub fn new(step: &'static str, errno: Errno) -> Self {
        Self { step, errno }
    }

    fn at(step: &'static str) -> impl Fn(Errno) -> Self {
        move |errno| Self::new(step, errno)
    }

    /// Sends `step: description` down the error channel. Allocation-free.
    fn report(&self, fd: RawFd) {
        let _ = posix::write_fd_all(fd, self.step.as_bytes())
            .and_then(|_| posix::write_fd_all(fd, b": "))
            .and_then(|_| posix::write_fd_all(fd, self.errno.desc().as_bytes()));
    }
}

/// `fork` + `execvp`, with the launch outcome reported over an error channel.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct ForkExecLauncher;

#[cfg(unix)]
impl ProcessLauncher for ForkExecLauncher {
    fn launch(&self, arguments: &ProcessArguments) -> ProcessResult<LaunchedChild> {
        let mut error_channel = PipeChannel::create(true)?;
        let mut pipes = match StandardStreamSet::open_pipes() {
            Ok(pipes) => pipes,
            Err(e) => {
                let _ = error_channel.close_all();
                return Err(e);
            }
        };

        debug!("Launching: {}", arguments);

        // SAFETY: the child branch below only calls async-signal-safe
        // functions on memory prepared before the fork, then execs or exits.
        match unsafe { nix::unistd::fork() } {
            Err(e) => {
                let _ = error_channel.close_all();
                let _ = pipes.close_all();
                Err(ProcessError::os_resource("fork", e))
            }
            Ok(nix::unistd::ForkResult::Child) => {
                let mut error_fd = to_native(error_channel.get(PipeSide::Write));
                let failure = match exec_child(arguments, &error_channel, &pipes, &mut error_fd) {
                    Ok(never) => match never {},
                    Err(failure) => failure,
                };
                failure.report(error_fd);
                // SAFETY: _exit skips destructors and atexit handlers, which
                // belong to the parent's copy of the address space.
                unsafe { nix::libc::_exit(nix::libc::EXIT_FAILURE) }
            }
            Ok(nix::unistd::ForkResult::Parent { child }) => {
                finish_in_parent(arguments, ProcessHandle::new(child), error_channel, pipes)
            }
        }
    }
}

/// Child half of the launch. Only returns on failure.
///
/// `error_fd` is updated if the error channel has to move out of the way of
/// descriptors 0..=2.
#[cfg(unix)]
fn exec_child(
    arguments: &ProcessArguments,
    error_channel: &PipeChannel,
    pipes: &StandardStreamSet,
    error_fd: &mut RawFd,
) -> Result<Infallible, ChildSetupError> {
    const FIRST_FREE_FD: RawFd = 3;

    posix::close_fd(to_native(error_channel.get(PipeSide::Read)))
        .map_err(ChildSetupError::at("close error channel"))?;
    pipes
        .close_parent_side_in_child()
        .map_err(ChildSetupError::at("close parent pipe ends"))?;

    // If the parent ran with 0, 1 or 2 closed, pipe ends may occupy those
    // numbers; a dup2 onto them would clobber another end.
    if *error_fd < FIRST_FREE_FD {
        let lifted = posix::dup_at_least(*error_fd, FIRST_FREE_FD).map_err(ChildSetupError::at("move error channel"))?;
        posix::close_fd(*error_fd).map_err(ChildSetupError::at("move error channel"))?;
        *error_fd = lifted;
    }

    let mut sources: [RawFd; 3] = [-1; 3];
    for stream in StdStream::ALL {
        let fd = to_native(pipes.child_descriptor(stream));
        sources[stream.index()] = if fd < FIRST_FREE_FD {
            let lifted = posix::dup_at_least(fd, FIRST_FREE_FD).map_err(ChildSetupError::at("move pipe end"))?;
            posix::close_fd(fd).map_err(ChildSetupError::at("move pipe end"))?;
            lifted
        } else {
            fd
        };
    }

    for stream in StdStream::ALL {
        let source = sources[stream.index()];
        // dup2 leaves FD_CLOEXEC clear on the target.
        nix::unistd::dup2(source, stream.fd()).map_err(ChildSetupError::at("dup2"))?;
        posix::close_fd(source).map_err(ChildSetupError::at("close pipe end"))?;
    }

    reset_signal_state()?;

    // SAFETY: file and argv point into `arguments`, which outlives this call;
    // argv is null-terminated.
    unsafe {
        nix::libc::execvp(arguments.file().as_ptr(), arguments.argv());
    }
    Err(ChildSetupError::new("execvp", Errno::last()))
}

/// Undoes the signal setup the program would otherwise inherit from this
/// process: the Rust runtime ignores SIGPIPE, and ignored dispositions and the
/// blocked mask both survive `exec`.
#[cfg(unix)]
fn reset_signal_state() -> Result<(), ChildSetupError> {
    use nix::sys::signal::{sigprocmask, signal, SigHandler, SigSet, SigmaskHow, Signal};

    // SAFETY: restoring the default disposition installs no handler code.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) }.map_err(ChildSetupError::at("reset SIGPIPE"))?;
    sigprocmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None)
        .map_err(ChildSetupError::at("reset signal mask"))?;
    Ok(())
}

/// Parent half of the launch: drop the child's ends and learn how `exec` went.
#[cfg(unix)]
fn finish_in_parent(
    arguments: &ProcessArguments,
    mut handle: ProcessHandle,
    mut error_channel: PipeChannel,
    mut pipes: StandardStreamSet,
) -> ProcessResult<LaunchedChild> {
    let report = error_channel
        .close(PipeSide::Write)
        .and_then(|_| pipes.close_child_side())
        .and_then(|_| read_all(error_channel.get(PipeSide::Read)));
    let _ = error_channel.close(PipeSide::Read);

    match report {
        Ok(message) if message.is_empty() => {
            info!("Process spawned successfully: {} (PID: {})", arguments.path(), handle.id());
            Ok(LaunchedChild { handle, pipes })
        }
        Ok(message) => {
            let message = String::from_utf8_lossy(&message).into_owned();
            warn!("Launching {} failed in child: {}", arguments.path(), message);
            let _ = pipes.close_parent_side();
            // The child exits right after reporting.
            if let Err(e) = handle.wait() {
                debug!("Reaping failed child {} failed: {}", handle.id(), e);
            }
            Err(ProcessError::launch_failed(arguments.path(), message))
        }
        Err(e) => {
            warn!("Could not determine launch outcome of PID {}: {}", handle.id(), e);
            let _ = pipes.close_parent_side();
            // The program may be running; without stdin it is expected to end.
            if let Err(wait_error) = handle.wait() {
                debug!("Reaping PID {} failed: {}", handle.id(), wait_error);
            }
            Err(e)
        }
    }
}
