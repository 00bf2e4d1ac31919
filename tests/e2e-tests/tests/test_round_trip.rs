//! Data written to a child's stdin comes back unchanged on stdout and stderr.

use cproc_common::StdStream;
use cproc_pipe::{read_all_string, write_all};
use e2e_tests::assertions::{assert_echoed, assert_exit_code};
use e2e_tests::{get_testecho_path, EchoScenario};

#[test]
fn test_concrete_echo_scenario() {
    let testecho = get_testecho_path();
    let mut process = cproc_process::Process::new(testecho.to_string_lossy(), ["-1", "-2", "-e", "137"])
        .expect("testecho should start");

    write_all(process.get_pipe(StdStream::In), b"this is a test").unwrap();
    process.close_pipe(StdStream::In).unwrap();

    assert_eq!(read_all_string(process.get_pipe(StdStream::Out)).unwrap(), "this is a test");
    assert_eq!(read_all_string(process.get_pipe(StdStream::Err)).unwrap(), "this is a test");
    assert_eq!(process.wait().unwrap(), 137);
}

#[test]
fn test_round_trip_preserves_arbitrary_bytes() {
    let inputs: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"x".to_vec(),
        (0..=255u8).collect(),
        // Longer than READ_BUFFER_SIZE and than a pipe buffer.
        (0..200_000u32).map(|i| (i % 251) as u8).collect(),
    ];

    for input in inputs {
        let run = EchoScenario::new(input.clone()).echo_stdout().echo_stderr().run().unwrap();
        if let Err(e) = assert_echoed(&run, &input, true, true).and_then(|_| assert_exit_code(&run, 0)) {
            panic!("Round trip of {} bytes failed: {}", input.len(), e);
        }
    }
}

#[test]
fn test_unselected_streams_stay_empty() {
    let run = EchoScenario::new("only stdout").echo_stdout().run().unwrap();
    assert_echoed(&run, b"only stdout", true, false).unwrap();

    let run = EchoScenario::new("only stderr").echo_stderr().exit_code(3).run().unwrap();
    assert_echoed(&run, b"only stderr", false, true).unwrap();
    assert_exit_code(&run, 3).unwrap();
}
