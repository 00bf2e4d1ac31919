//! # cproc Process
//!
//! Child processes with piped standard streams.
//!
//! This crate provides:
//! - [`Process`], which starts a program with stdin, stdout and stderr
//!   redirected to pipes and reaps it on drop
//! - [`ProcessLauncher`] strategies: fork/exec on POSIX, `CreateProcessW` on Windows
//! - [`ProcessHandle`], an OS process reference with idempotent wait
//! - [`ExecutionConfig`], a YAML description of what to run
//! - helpers to run a child to completion, check for and terminate processes
//!
//! ```rust,no_run
//! use cproc_common::StdStream;
//! use cproc_pipe::{read_all_string, write_all};
//! use cproc_process::Process;
//!
//! let mut process = Process::new("tr", ["a-z", "A-Z"])?;
//! write_all(process.get_pipe(StdStream::In), b"hello")?;
//! process.close_pipe(StdStream::In)?;
//! assert_eq!(read_all_string(process.get_pipe(StdStream::Out))?, "HELLO");
//! assert_eq!(process.wait()?, 0);
//! # Ok::<(), cproc_common::ProcessError>(())
//! ```

pub mod arguments;
pub mod check;
pub mod config;
pub mod execute;
pub mod handle;
pub mod launch;
pub mod process;
pub mod terminate;
pub mod validation;

#[cfg(windows)]
pub mod launch_windows;

// Re-export main types
pub use arguments::ProcessArguments;
pub use check::process_exists;
pub use config::ExecutionConfig;
pub use execute::{communicate, execute_command, ExecutionOutput};
pub use handle::{signal_name, NativeProcessHandle, ProcessHandle};
pub use launch::{LaunchedChild, PlatformLauncher, ProcessLauncher};
pub use process::Process;
pub use terminate::{force_kill, terminate_gracefully};
pub use validation::{validate_arguments, validate_executable};

#[cfg(unix)]
pub use launch::{ChildSetupError, ForkExecLauncher};

#[cfg(windows)]
pub use launch_windows::CreateProcessLauncher;
