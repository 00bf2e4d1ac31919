//! Raw descriptor operations, including ones safe to run between `fork` and `exec`.
//!
//! Nothing in this module allocates, locks or logs, so a freshly forked child
//! of a multi-threaded parent may call any of it. Errors are bare [`Errno`]
//! values for the same reason; callers in the parent wrap them.

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use std::os::fd::BorrowedFd;
use std::os::unix::io::RawFd;

/// Closes `fd`. Negative values are a no-op.
///
/// `EINTR` counts as success: Linux releases the descriptor before the
/// interruption is reported, so retrying could close a reused number.
pub fn close_fd(fd: RawFd) -> nix::Result<()> {
    if fd < 0 {
        return Ok(());
    }
    match nix::unistd::close(fd) {
        Ok(()) | Err(Errno::EINTR) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Sets or clears `FD_CLOEXEC` on `fd`.
pub fn set_close_on_exec(fd: RawFd, enabled: bool) -> nix::Result<()> {
    let current = FdFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFD)?);
    let mut flags = current;
    flags.set(FdFlag::FD_CLOEXEC, enabled);
    if flags != current {
        fcntl(fd, FcntlArg::F_SETFD(flags))?;
    }
    Ok(())
}

/// Duplicates `fd` onto the lowest free descriptor not below `min`.
/// The copy is close-on-exec.
pub fn dup_at_least(fd: RawFd, min: RawFd) -> nix::Result<RawFd> {
    fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(min))
}

/// Single `read`, retried on `EINTR`. Returns 0 at EOF.
pub fn read_fd(fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
    loop {
        match nix::unistd::read(fd, buf) {
            Err(Errno::EINTR) => continue,
            result => return result,
        }
    }
}

/// Single `write`, retried on `EINTR`. Returns the number of bytes written.
pub fn write_fd(fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
    if fd < 0 {
        return Err(Errno::EBADF);
    }
    // SAFETY: fd is non-negative and the caller keeps it open for this call.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    loop {
        match nix::unistd::write(borrowed, buf) {
            Err(Errno::EINTR) => continue,
            result => return result,
        }
    }
}

/// Writes all of `buf`, looping over partial writes.
pub fn write_fd_all(fd: RawFd, mut buf: &[u8]) -> nix::Result<()> {
    while !buf.is_empty() {
        match write_fd(fd, buf)? {
            0 => return Err(Errno::EIO),
            n => buf = &buf[n..],
        }
    }
    Ok(())
}
