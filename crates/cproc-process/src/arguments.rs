//! The argument vector handed to the OS when starting a child.

use crate::validation::{validate_arguments, validate_executable};
use cproc_common::{ProcessError, ProcessResult};
use std::fmt;

#[cfg(unix)]
use std::ffi::{CStr, CString};
#[cfg(unix)]
use std::os::raw::c_char;

/// Program path plus arguments, prepared once for the exec call.
///
/// On POSIX this owns a contiguous, null-terminated `argv` whose pointers
/// borrow from owned `CString`s; `argv[0]` is the path. The pointers stay
/// valid for as long as the value lives and nothing is allocated when the
/// child uses them after `fork`. On Windows it owns the UTF-16 command line.
pub struct ProcessArguments {
    path: String,
    arguments: Vec<String>,
    #[cfg(unix)]
    argv_storage: Vec<CString>,
    #[cfg(unix)]
    argv: Vec<*const c_char>,
    #[cfg(windows)]
    command_line: Vec<u16>,
}

// SAFETY: the raw pointers in `argv` only point into the heap buffers of
// `argv_storage`, which is owned by the same value, never mutated, and moves
// together with it.
#[cfg(unix)]
unsafe impl Send for ProcessArguments {}
#[cfg(unix)]
unsafe impl Sync for ProcessArguments {}

impl ProcessArguments {
    /// Builds the argument vector, rejecting input no OS could accept.
    pub fn new<I>(path: impl Into<String>, args: I) -> ProcessResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let path = path.into();
        let arguments: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();

        validate_executable(&path)?;
        validate_arguments(&arguments)?;

        #[cfg(unix)]
        {
            let argv_storage = std::iter::once(&path)
                .chain(arguments.iter())
                .map(|s| CString::new(s.as_str()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ProcessError::configuration(path.clone(), e.to_string()))?;
            let argv = argv_storage
                .iter()
                .map(|s| s.as_ptr())
                .chain(std::iter::once(std::ptr::null()))
                .collect();

            Ok(Self {
                path,
                arguments,
                argv_storage,
                argv,
            })
        }

        #[cfg(windows)]
        {
            let command_line = command_line(&path, &arguments)
                .encode_utf16()
                .chain(std::iter::once(0))
                .collect();
            Ok(Self {
                path,
                arguments,
                command_line,
            })
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The program to execute, as passed to `execvp`.
    #[cfg(unix)]
    pub fn file(&self) -> &CStr {
        &self.argv_storage[0]
    }

    /// Null-terminated argument vector. Valid while `self` is alive.
    #[cfg(unix)]
    pub fn argv(&self) -> *const *const c_char {
        self.argv.as_ptr()
    }

    /// NUL-terminated UTF-16 command line for `CreateProcessW`.
    #[cfg(windows)]
    pub fn command_line_wide(&self) -> &[u16] {
        &self.command_line
    }
}

impl fmt::Debug for ProcessArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessArguments")
            .field("path", &self.path)
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl fmt::Display for ProcessArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", command_line(&self.path, &self.arguments))
    }
}

/// Renders a command line the way the Windows C runtime splits it back up.
///
/// The path is always quoted; arguments only when they contain whitespace or
/// quotes (or are empty).
pub fn command_line<S: AsRef<str>>(path: &str, args: &[S]) -> String {
    let mut line = String::new();
    line.push('"');
    line.push_str(path);
    line.push('"');
    for arg in args {
        line.push(' ');
        quote_argument(arg.as_ref(), &mut line);
    }
    line
}

fn quote_argument(arg: &str, out: &mut String) {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t', '\n', '\x0b', '"']);
    if !needs_quotes {
        out.push_str(arg);
        return;
    }

    out.push('"');
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    // Backslashes before the closing quote must not escape it.
    out.extend(std::iter::repeat('\\').take(backslashes * 2));
    out.push('"');
}
