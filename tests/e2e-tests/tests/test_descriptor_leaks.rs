//! Launching and dropping children leaves the parent's descriptor table as it was.
//!
//! Kept as the only test in its binary so no other test opens descriptors
//! while the table is being counted.

use cproc_common::StdStream;
use cproc_pipe::write_all;
use e2e_tests::{open_descriptor_count, EchoScenario};

#[test]
fn test_no_descriptor_leak_after_drop() {
    let Some(before) = open_descriptor_count() else {
        eprintln!("Descriptor table not observable on this platform, skipping");
        return;
    };

    for round in 0..25 {
        // Dropped mid-conversation: stdout and stderr never read.
        let process = EchoScenario::new("").echo_stdout().echo_stderr().launch().unwrap();
        write_all(process.get_pipe(StdStream::In), b"unread").unwrap();
        drop(process);

        // Fully consumed and waited.
        let run = EchoScenario::new(format!("round {}", round)).echo_stdout().run().unwrap();
        assert!(run.status.success());

        // Failed launches release the error channel and all six pipe ends.
        assert!(cproc_process::Process::new("/definitely/not/a/real/program", Vec::<String>::new()).is_err());
    }

    assert_eq!(open_descriptor_count(), Some(before));
}
