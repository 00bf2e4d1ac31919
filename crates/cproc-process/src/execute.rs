//! Run-to-completion helper on top of [`Process`].
//!
//! Feeding stdin and draining stdout/stderr from one thread deadlocks as soon
//! as the child blocks on a full pipe the caller is not reading. Here stdin
//! is written from its own thread and stderr drained on another, while the
//! calling thread drains stdout.

use crate::process::Process;
use cproc_common::{ExitStatus, ProcessError, ProcessResult, StdStream};
use cproc_pipe::{close, read_all, write_all, PipeDescriptor};
use std::thread;
use tracing::debug;

/// Everything a finished child produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs `executable` with `args`, sends `input` to its stdin and collects its
/// output until it exits.
///
/// A child that stops reading stdin early is not an error; the unwritten part
/// of `input` is dropped.
pub fn execute_command<I>(executable: &str, args: I, input: &[u8]) -> ProcessResult<ExecutionOutput>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut process = Process::new(executable, args)?;
    let (stdout, stderr) = communicate(&mut process, input)?;
    let status = process.wait_status()?;
    Ok(ExecutionOutput { status, stdout, stderr })
}

/// Writes `input` to the child's stdin and closes it, while reading stdout
/// and stderr to EOF. Returns `(stdout, stderr)`.
///
/// Both output pipes stay owned by `process`; stdin is consumed.
pub fn communicate(process: &mut Process, input: &[u8]) -> ProcessResult<(Vec<u8>, Vec<u8>)> {
    let pid = process.id();
    let stdout_fd = process.get_pipe(StdStream::Out);
    let stderr_fd = process.get_pipe(StdStream::Err);

    let stderr_reader = thread::Builder::new()
        .name(format!("cproc-stderr-{}", pid))
        .spawn(move || read_all(stderr_fd))
        .map_err(|e| ProcessError::os_resource("spawn stderr reader", e))?;

    let stdin_fd = process.take_pipe(StdStream::In);
    let input = input.to_vec();
    let stdin_writer = thread::Builder::new()
        .name(format!("cproc-stdin-{}", pid))
        .spawn(move || feed_stdin(pid, stdin_fd, &input));

    let writer_spawn_error = match &stdin_writer {
        Ok(_) => None,
        Err(e) => {
            // The child still needs EOF on stdin.
            let _ = close(stdin_fd);
            Some(ProcessError::os_resource("spawn stdin writer", e))
        }
    };

    let stdout = read_all(stdout_fd);
    let stderr = join(stderr_reader);
    let fed = match stdin_writer {
        Ok(writer) => join(writer),
        Err(_) => Ok(()),
    };

    if let Some(e) = writer_spawn_error {
        return Err(e);
    }
    fed?;
    Ok((stdout?, stderr?))
}

fn feed_stdin(pid: u32, fd: PipeDescriptor, input: &[u8]) -> ProcessResult<()> {
    if let Err(e) = write_all(fd, input) {
        debug!("PID {} stopped reading stdin: {}", pid, e);
    }
    close(fd)
}

fn join<T>(handle: thread::JoinHandle<ProcessResult<T>>) -> ProcessResult<T> {
    handle
        .join()
        .map_err(|_| ProcessError::pipe_io("join", "pipe worker thread panicked"))?
}
