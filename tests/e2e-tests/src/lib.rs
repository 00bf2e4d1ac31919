// E2E test helpers for child process execution

pub mod assertions;
pub mod scenario;

pub use scenario::{EchoRun, EchoScenario};

use std::env;
use std::path::PathBuf;

/// Get the path to the TESTECHO (testecho) binary
pub fn get_testecho_path() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current exe path")
        .parent()
        .expect("Failed to get parent dir")
        .to_path_buf();

    // If we're in deps/, go up one level
    if path.ends_with("deps") {
        path.pop();
    }

    path.push(format!("testecho{}", env::consts::EXE_SUFFIX));

    if !path.exists() {
        panic!("TESTECHO binary not found at: {}", path.display());
    }

    path
}

/// Number of descriptors open in this process, where the OS exposes it.
pub fn open_descriptor_count() -> Option<usize> {
    let dir = if cfg!(target_os = "linux") {
        "/proc/self/fd"
    } else if cfg!(target_os = "macos") {
        "/dev/fd"
    } else {
        return None;
    };

    // The directory handle used for listing shows up in the listing itself.
    std::fs::read_dir(dir).ok().map(|entries| entries.count().saturating_sub(1))
}
