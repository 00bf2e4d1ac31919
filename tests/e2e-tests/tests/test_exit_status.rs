//! Exit codes, signal termination and repeated waits.

use cproc_common::{ExitStatus, ProcessError, StdStream};
use e2e_tests::assertions::assert_exit_code;
use e2e_tests::EchoScenario;

#[test]
fn test_exit_codes_are_reported_verbatim() {
    for code in [0, 1, 2, 42, 127, 137, 255] {
        let run = EchoScenario::new("").exit_code(code).run().unwrap();
        assert_exit_code(&run, code).unwrap();
    }
}

#[cfg(unix)]
#[test]
fn test_exit_codes_wrap_modulo_256() {
    for (requested, observed) in [(256, 0), (257, 1), (300, 44), (511, 255)] {
        let run = EchoScenario::new("").exit_code(requested).run().unwrap();
        assert_exit_code(&run, observed).unwrap();
    }
}

#[test]
fn test_wait_twice_returns_same_code() {
    let mut process = EchoScenario::new("").exit_code(9).launch().unwrap();
    process.close_pipe(StdStream::In).unwrap();
    assert_eq!(process.wait().unwrap(), 9);
    assert_eq!(process.wait().unwrap(), 9);
}

#[cfg(unix)]
#[test]
fn test_abort_surfaces_as_signal_error() {
    let mut process = EchoScenario::new("").abort().launch().unwrap();
    process.close_pipe(StdStream::In).unwrap();

    let first = process.wait().unwrap_err();
    let second = process.wait().unwrap_err();
    assert_eq!(first, second);
    match first {
        ProcessError::Signaled { signal, signal_name, .. } => {
            assert_eq!(signal, 6);
            assert_eq!(signal_name, "SIGABRT");
        }
        other => panic!("Expected signal termination, got {other:?}"),
    }
    assert_eq!(process.wait_status().unwrap(), ExitStatus::Signaled(6));
}

#[test]
fn test_drop_without_wait_reaps_child() {
    let process = EchoScenario::new("").echo_stdout().launch().unwrap();
    let pid = process.id();
    drop(process);
    assert!(!cproc_process::process_exists(pid).unwrap());
}
