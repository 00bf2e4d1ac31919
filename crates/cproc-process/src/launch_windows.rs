//! Windows process creation with redirected standard handles.
//!
//! `CreateProcessW` reports launch failures synchronously, so no error
//! channel is needed. The pipes are created non-inheritable; only the child
//! ends are made inheritable for the duration of the call.

use crate::arguments::ProcessArguments;
use crate::handle::ProcessHandle;
use crate::launch::{LaunchedChild, ProcessLauncher};
use cproc_common::{ProcessError, ProcessResult, StdStream};
use cproc_pipe::{to_native, StandardStreamSet};
use tracing::{debug, info, warn};
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, TRUE};
use windows::Win32::System::Threading::{
    CreateProcessW, PROCESS_CREATION_FLAGS, PROCESS_INFORMATION, STARTF_USESTDHANDLES, STARTUPINFOW,
};

/// `CreateProcessW` with `STARTF_USESTDHANDLES`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateProcessLauncher;

impl ProcessLauncher for CreateProcessLauncher {
    fn launch(&self, arguments: &ProcessArguments) -> ProcessResult<LaunchedChild> {
        let mut pipes = StandardStreamSet::open_pipes()?;

        for stream in StdStream::ALL {
            let side = StandardStreamSet::child_side(stream);
            if let Err(e) = pipes.get(stream).set_inheritable(side, true) {
                let _ = pipes.close_all();
                return Err(ProcessError::os_resource("SetHandleInformation", e));
            }
        }

        let startup = STARTUPINFOW {
            cb: std::mem::size_of::<STARTUPINFOW>() as u32,
            dwFlags: STARTF_USESTDHANDLES,
            hStdInput: to_native(pipes.child_descriptor(StdStream::In)),
            hStdOutput: to_native(pipes.child_descriptor(StdStream::Out)),
            hStdError: to_native(pipes.child_descriptor(StdStream::Err)),
            ..Default::default()
        };
        let mut info = PROCESS_INFORMATION::default();
        // CreateProcessW may write into the command line buffer.
        let mut command_line = arguments.command_line_wide().to_vec();

        debug!("Launching: {}", arguments);
        let created = unsafe {
            CreateProcessW(
                PCWSTR::null(),
                PWSTR(command_line.as_mut_ptr()),
                None,
                None,
                TRUE,
                PROCESS_CREATION_FLAGS(0),
                None,
                PCWSTR::null(),
                &startup,
                &mut info,
            )
        };

        if let Err(e) = created {
            warn!("CreateProcessW failed for {}: {}", arguments.path(), e);
            let _ = pipes.close_all();
            return Err(ProcessError::launch_failed(arguments.path(), e.to_string()));
        }

        let _ = unsafe { CloseHandle(info.hThread) };
        let handle = ProcessHandle::new(info.hProcess);

        if let Err(e) = pipes.close_child_side() {
            debug!("Closing child pipe ends of PID {} failed: {}", handle.id(), e);
        }

        info!("Process spawned successfully: {} (PID: {})", arguments.path(), handle.id());
        Ok(LaunchedChild { handle, pipes })
    }
}
