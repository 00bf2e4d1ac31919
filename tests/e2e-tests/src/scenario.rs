//! Scripted runs of the testecho binary.

use crate::get_testecho_path;
use cproc_common::{ExitStatus, ProcessResult};
use cproc_process::{communicate, Process};

/// How testecho should behave for one run.
#[derive(Debug, Clone, Default)]
pub struct EchoScenario {
    pub to_stdout: bool,
    pub to_stderr: bool,
    pub exit_code: i32,
    pub abort: bool,
    pub input: Vec<u8>,
}

/// What a finished testecho run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRun {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl EchoScenario {
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn echo_stdout(mut self) -> Self {
        self.to_stdout = true;
        self
    }

    pub fn echo_stderr(mut self) -> Self {
        self.to_stderr = true;
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn abort(mut self) -> Self {
        self.abort = true;
        self
    }

    /// Command line arguments for testecho, program path excluded.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.to_stdout {
            args.push("-1".to_string());
        }
        if self.to_stderr {
            args.push("-2".to_string());
        }
        args.push("-e".to_string());
        args.push(self.exit_code.to_string());
        if self.abort {
            args.push("--abort".to_string());
        }
        args
    }

    /// Starts testecho without sending anything.
    pub fn launch(&self) -> ProcessResult<Process> {
        Process::new(get_testecho_path().to_string_lossy(), self.arguments())
    }

    /// Starts testecho, feeds the input and collects everything it produced.
    pub fn run(&self) -> ProcessResult<EchoRun> {
        let mut process = self.launch()?;
        let (stdout, stderr) = communicate(&mut process, &self.input)?;
        let status = process.wait_status()?;
        Ok(EchoRun { stdout, stderr, status })
    }
}
