//! # cproc Common
//!
//! Common types shared by the pipe and process crates.
//!
//! This crate provides the foundational vocabulary the rest of the workspace
//! builds upon: the error taxonomy for launching and reaping children, the
//! logical standard streams, pipe sides and the exit status type.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{ProcessError, ProcessResult};
pub use types::{ExitStatus, PipeSide, StdStream};
