//! Queries about the calling process' own standard streams.

use crate::descriptor::PipeDescriptor;
use cproc_common::{ProcessResult, StdStream};

/// The calling process' own descriptor for `stream` (0, 1 or 2).
pub fn stream_descriptor(stream: StdStream) -> PipeDescriptor {
    PipeDescriptor::from(stream.fd())
}

/// True if `stream` of the calling process is attached to a terminal.
///
/// A stream that is not open at all is an error rather than `false`.
#[cfg(unix)]
pub fn is_interactive_terminal(stream: StdStream) -> ProcessResult<bool> {
    nix::unistd::isatty(stream.fd()).map_err(|e| cproc_common::ProcessError::pipe_io("isatty", e))
}

/// True if `stream` of the calling process is attached to a console.
#[cfg(windows)]
pub fn is_interactive_terminal(stream: StdStream) -> ProcessResult<bool> {
    use std::io::IsTerminal;

    Ok(match stream {
        StdStream::In => std::io::stdin().is_terminal(),
        StdStream::Out => std::io::stdout().is_terminal(),
        StdStream::Err => std::io::stderr().is_terminal(),
    })
}
