//! # cproc Pipe
//!
//! Pipe primitives used to redirect a child's standard streams.
//!
//! This crate provides:
//! - [`PipeDescriptor`], a platform-castable integer handle for either pipe end
//! - [`PipeChannel`], one unidirectional OS pipe
//! - [`StandardStreamSet`], the three pipes backing a child's stdin/stdout/stderr
//! - blocking read/write helpers operating directly on descriptors
//! - terminal queries on the calling process' own streams
//!
//! Nothing here closes descriptors implicitly. Descriptor values are reused
//! by the OS, so ownership is a protocol between the caller and the child:
//! whoever holds an end closes it exactly once.

pub mod channel;
pub mod descriptor;
pub mod io;
pub mod streams;
pub mod terminal;

#[cfg(unix)]
pub mod posix;

// Re-export main types
pub use channel::PipeChannel;
pub use descriptor::{from_native, is_valid, to_native, NativePipe, PipeDescriptor, INVALID_PIPE_DESCRIPTOR};
pub use io::{close, read, read_all, read_all_string, write, write_all};
pub use streams::StandardStreamSet;
pub use terminal::{is_interactive_terminal, stream_descriptor};
