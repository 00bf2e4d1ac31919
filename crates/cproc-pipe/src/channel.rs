//! A single unidirectional OS pipe.

use crate::descriptor::{from_native, is_valid, PipeDescriptor, INVALID_PIPE_DESCRIPTOR};
use cproc_common::{PipeSide, ProcessError, ProcessResult};
use tracing::trace;

/// Both ends of an OS pipe.
///
/// `PipeChannel` has no `Drop` impl and is not `Clone`: the owner closes each
/// end explicitly, exactly once. Closing through [`PipeChannel::close`] stores
/// [`INVALID_PIPE_DESCRIPTOR`] in that side, which makes a second close a
/// no-op. Descriptors obtained through [`PipeChannel::get`] and closed by
/// other means are not tracked.
#[derive(Debug, PartialEq, Eq)]
pub struct PipeChannel {
    read: PipeDescriptor,
    write: PipeDescriptor,
}

impl PipeChannel {
    /// Creates a connected pipe.
    ///
    /// With `close_on_exec`, both ends are hidden from programs started
    /// later: `FD_CLOEXEC` on POSIX, non-inheritable handles on Windows.
    pub fn create(close_on_exec: bool) -> ProcessResult<Self> {
        let (mut channel, marked) = Self::open_native(close_on_exec)?;

        if close_on_exec && !marked {
            let marked = channel
                .set_inheritable(PipeSide::Read, false)
                .and_then(|_| channel.set_inheritable(PipeSide::Write, false));
            if let Err(e) = marked {
                let _ = channel.close_all();
                return Err(ProcessError::os_resource("pipe", e));
            }
        }

        trace!(
            "Opened pipe (read={}, write={}, close_on_exec={})",
            channel.read,
            channel.write,
            close_on_exec
        );
        Ok(channel)
    }

    /// Returns the raw descriptor for one side.
    pub fn get(&self, side: PipeSide) -> PipeDescriptor {
        match side {
            PipeSide::Read => self.read,
            PipeSide::Write => self.write,
        }
    }

    /// True while the given side has not been closed through this channel.
    pub fn is_open(&self, side: PipeSide) -> bool {
        is_valid(self.get(side))
    }

    /// Closes one side. Closing a side that is already closed does nothing.
    pub fn close(&mut self, side: PipeSide) -> ProcessResult<()> {
        crate::io::close(self.forget(side))
    }

    /// Stops tracking one side without closing it and returns its descriptor.
    /// The caller becomes responsible for closing it.
    pub fn forget(&mut self, side: PipeSide) -> PipeDescriptor {
        let slot = match side {
            PipeSide::Read => &mut self.read,
            PipeSide::Write => &mut self.write,
        };
        std::mem::replace(slot, INVALID_PIPE_DESCRIPTOR)
    }

    /// Closes both sides, attempting each even if the first fails.
    pub fn close_all(&mut self) -> ProcessResult<()> {
        let read = self.close(PipeSide::Read);
        let write = self.close(PipeSide::Write);
        read.and(write)
    }

    /// Controls whether one side survives into programs started later.
    pub fn set_inheritable(&self, side: PipeSide, inheritable: bool) -> ProcessResult<()> {
        let descriptor = self.get(side);
        if !is_valid(descriptor) {
            return Err(ProcessError::pipe_io("set_inheritable", "descriptor is closed"));
        }
        set_inheritable_native(descriptor, inheritable)
    }

    /// Opens the OS pipe. The flag in the result is true when the ends were
    /// already created close-on-exec.
    #[cfg(unix)]
    fn open_native(close_on_exec: bool) -> ProcessResult<(Self, bool)> {
        use std::os::fd::IntoRawFd;

        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        ))]
        let (pair, marked) = if close_on_exec {
            (nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC), true)
        } else {
            (nix::unistd::pipe(), false)
        };

        #[cfg(not(any(
            target_os = "linux",
            target_os = "android",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        )))]
        let (pair, marked) = {
            let _ = close_on_exec;
            (nix::unistd::pipe(), false)
        };

        let (read, write) = pair.map_err(|e| ProcessError::os_resource("pipe", e))?;
        let channel = Self {
            read: from_native(read.into_raw_fd()),
            write: from_native(write.into_raw_fd()),
        };
        Ok((channel, marked))
    }

    #[cfg(windows)]
    fn open_native(_close_on_exec: bool) -> ProcessResult<(Self, bool)> {
        use windows::Win32::Foundation::{HANDLE, TRUE};
        use windows::Win32::Security::SECURITY_ATTRIBUTES;
        use windows::Win32::System::Pipes::CreatePipe;

        let attributes = SECURITY_ATTRIBUTES {
            nLength: std::mem::size_of::<SECURITY_ATTRIBUTES>() as u32,
            lpSecurityDescriptor: std::ptr::null_mut(),
            bInheritHandle: TRUE,
        };

        let mut read = HANDLE::default();
        let mut write = HANDLE::default();
        unsafe { CreatePipe(&mut read, &mut write, Some(&attributes as *const _), 0) }
            .map_err(|e| ProcessError::os_resource("CreatePipe", e))?;

        let channel = Self {
            read: from_native(read),
            write: from_native(write),
        };
        Ok((channel, false))
    }
}

#[cfg(unix)]
fn set_inheritable_native(descriptor: PipeDescriptor, inheritable: bool) -> ProcessResult<()> {
    crate::posix::set_close_on_exec(crate::descriptor::to_native(descriptor), !inheritable)
        .map_err(|e| ProcessError::pipe_io("set_inheritable", e))
}

#[cfg(windows)]
fn set_inheritable_native(descriptor: PipeDescriptor, inheritable: bool) -> ProcessResult<()> {
    use windows::Win32::Foundation::{SetHandleInformation, HANDLE_FLAGS, HANDLE_FLAG_INHERIT};

    let flags = if inheritable { HANDLE_FLAG_INHERIT } else { HANDLE_FLAGS(0) };
    unsafe { SetHandleInformation(crate::descriptor::to_native(descriptor), HANDLE_FLAG_INHERIT.0, flags) }
        .map_err(|e| ProcessError::pipe_io("set_inheritable", e))
}
