//! A program that cannot be started is reported by Process::new itself.

use cproc_common::ProcessError;
use cproc_process::{ExecutionConfig, Process};

#[test]
fn test_missing_executable_fails_synchronously() {
    let result = Process::new("/definitely/not/a/real/program", ["-1"]);
    match result {
        Err(ProcessError::LaunchFailed { path, message }) => {
            assert_eq!(path, "/definitely/not/a/real/program");
            assert!(!message.is_empty());
        }
        Err(other) => panic!("Wrong error type: {other:?}"),
        Ok(_) => panic!("Launching a missing program must fail"),
    }
}

#[test]
fn test_program_not_on_path_fails() {
    let err = Process::new("cproc-no-such-program-on-path", Vec::<String>::new()).unwrap_err();
    assert!(err.is_launch_failure());
}

#[cfg(unix)]
#[test]
fn test_non_executable_file_fails() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = Process::new(file.path().to_string_lossy(), Vec::<String>::new()).unwrap_err();
    match err {
        ProcessError::LaunchFailed { message, .. } => {
            assert!(message.contains("Permission denied"), "unexpected message: {}", message);
        }
        other => panic!("Wrong error type: {other:?}"),
    }
}

#[test]
fn test_invalid_config_never_launches() {
    let config = ExecutionConfig::new("", Vec::<String>::new());
    assert!(config.validate().is_err());
    assert!(matches!(Process::from_config(&config), Err(ProcessError::Configuration { .. })));
}

#[test]
fn test_launch_failure_then_success() {
    assert!(Process::new("/definitely/not/a/real/program", Vec::<String>::new()).is_err());
    let run = e2e_tests::EchoScenario::new("still works").echo_stdout().run().unwrap();
    assert_eq!(run.stdout, b"still works");
}
