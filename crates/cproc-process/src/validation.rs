//! Process validation utilities.
//!
//! Checks run on caller input before any pipe or process is created, so a
//! rejected launch never touches the OS.

use cproc_common::{ProcessError, ProcessResult};

/// Validate that an executable path is usable for a launch.
///
/// Existence is not checked here: a missing program is reported by the child
/// itself, the same way any other exec failure is.
pub fn validate_executable(path: &str) -> ProcessResult<()> {
    if path.is_empty() {
        return Err(ProcessError::configuration(
            "validation",
            "Executable path cannot be empty",
        ));
    }

    if path.contains('\0') {
        return Err(ProcessError::configuration(
            path.replace('\0', "\\0"),
            "Executable path cannot contain NUL bytes",
        ));
    }

    Ok(())
}

/// Validate the argument list passed after the executable.
pub fn validate_arguments<S: AsRef<str>>(args: &[S]) -> ProcessResult<()> {
    for (index, arg) in args.iter().enumerate() {
        if arg.as_ref().contains('\0') {
            return Err(ProcessError::configuration(
                "validation",
                format!("Argument {} cannot contain NUL bytes", index),
            ));
        }
    }
    Ok(())
}
