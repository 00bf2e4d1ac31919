//! Custom assertions for E2E tests

use crate::EchoRun;
use cproc_common::ExitStatus;

/// Assert that the run echoed `expected` to exactly the requested outputs
pub fn assert_echoed(run: &EchoRun, expected: &[u8], to_stdout: bool, to_stderr: bool) -> Result<(), String> {
    let want_stdout: &[u8] = if to_stdout { expected } else { b"" };
    let want_stderr: &[u8] = if to_stderr { expected } else { b"" };

    if run.stdout != want_stdout {
        return Err(format!(
            "stdout mismatch: expected {} bytes, got {} bytes ({:?})",
            want_stdout.len(),
            run.stdout.len(),
            String::from_utf8_lossy(&run.stdout)
        ));
    }
    if run.stderr != want_stderr {
        return Err(format!(
            "stderr mismatch: expected {} bytes, got {} bytes ({:?})",
            want_stderr.len(),
            run.stderr.len(),
            String::from_utf8_lossy(&run.stderr)
        ));
    }
    Ok(())
}

/// Assert that the run exited normally with `code`
pub fn assert_exit_code(run: &EchoRun, code: i32) -> Result<(), String> {
    match run.status {
        ExitStatus::Exited(actual) if actual == code => Ok(()),
        other => Err(format!("Expected exit code {}, got {}", code, other)),
    }
}
