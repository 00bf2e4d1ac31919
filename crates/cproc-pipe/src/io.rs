//! Blocking I/O on raw pipe descriptors.
//!
//! These helpers operate on the descriptors handed out by
//! `Process::get_pipe`, so a pipe carries no buffering state of its own.
//! Interrupted system calls are retried; every other failure is returned as
//! [`ProcessError::PipeIo`].

use crate::descriptor::{is_valid, to_native, PipeDescriptor};
use cproc_common::{ProcessError, ProcessResult};

const READ_BUFFER_SIZE: usize = 256;

/// Reads until `count` bytes have arrived or the writer closed the pipe.
pub fn read(descriptor: PipeDescriptor, count: usize) -> ProcessResult<Vec<u8>> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut data = Vec::with_capacity(count.min(READ_BUFFER_SIZE * 16));
    let mut remaining = count;

    while remaining > 0 {
        let chunk = remaining.min(buffer.len());
        let n = read_some(descriptor, &mut buffer[..chunk])?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
        remaining -= n;
    }

    Ok(data)
}

/// Reads until EOF.
pub fn read_all(descriptor: PipeDescriptor) -> ProcessResult<Vec<u8>> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut data = Vec::new();

    loop {
        let n = read_some(descriptor, &mut buffer)?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&buffer[..n]);
    }
}

/// Reads until EOF and decodes the bytes as UTF-8.
pub fn read_all_string(descriptor: PipeDescriptor) -> ProcessResult<String> {
    let data = read_all(descriptor)?;
    String::from_utf8(data).map_err(|e| ProcessError::pipe_io("read", e))
}

/// Performs a single write, returning how many bytes the OS accepted.
pub fn write(descriptor: PipeDescriptor, buf: &[u8]) -> ProcessResult<usize> {
    ensure_open(descriptor, "write")?;
    write_native(descriptor, buf)
}

/// Writes the whole buffer, looping over short writes.
pub fn write_all(descriptor: PipeDescriptor, mut buf: &[u8]) -> ProcessResult<()> {
    while !buf.is_empty() {
        match write(descriptor, buf)? {
            0 => return Err(ProcessError::pipe_io("write", "pipe accepted zero bytes")),
            n => buf = &buf[n..],
        }
    }
    Ok(())
}

/// Closes a descriptor. The closed sentinel is a no-op.
pub fn close(descriptor: PipeDescriptor) -> ProcessResult<()> {
    if !is_valid(descriptor) {
        return Ok(());
    }
    close_native(descriptor)
}

fn ensure_open(descriptor: PipeDescriptor, operation: &str) -> ProcessResult<()> {
    if is_valid(descriptor) {
        Ok(())
    } else {
        Err(ProcessError::pipe_io(operation, "descriptor is closed"))
    }
}

fn read_some(descriptor: PipeDescriptor, buf: &mut [u8]) -> ProcessResult<usize> {
    ensure_open(descriptor, "read")?;
    read_native(descriptor, buf)
}

#[cfg(unix)]
fn read_native(descriptor: PipeDescriptor, buf: &mut [u8]) -> ProcessResult<usize> {
    crate::posix::read_fd(to_native(descriptor), buf).map_err(|e| ProcessError::pipe_io("read", e))
}

#[cfg(unix)]
fn write_native(descriptor: PipeDescriptor, buf: &[u8]) -> ProcessResult<usize> {
    crate::posix::write_fd(to_native(descriptor), buf).map_err(|e| ProcessError::pipe_io("write", e))
}

#[cfg(unix)]
fn close_native(descriptor: PipeDescriptor) -> ProcessResult<()> {
    crate::posix::close_fd(to_native(descriptor)).map_err(|e| ProcessError::pipe_io("close", e))
}

#[cfg(windows)]
fn read_native(descriptor: PipeDescriptor, buf: &mut [u8]) -> ProcessResult<usize> {
    use windows::Win32::Foundation::ERROR_BROKEN_PIPE;
    use windows::Win32::Storage::FileSystem::ReadFile;

    let mut bytes_read: u32 = 0;
    let result = unsafe { ReadFile(to_native(descriptor), Some(buf), Some(&mut bytes_read), None) };
    match result {
        Ok(()) => Ok(bytes_read as usize),
        // Every writer is gone: that is EOF for an anonymous pipe.
        Err(e) if e.code() == ERROR_BROKEN_PIPE.to_hresult() => Ok(0),
        Err(e) => Err(ProcessError::pipe_io("read", e)),
    }
}

#[cfg(windows)]
fn write_native(descriptor: PipeDescriptor, buf: &[u8]) -> ProcessResult<usize> {
    use windows::Win32::Storage::FileSystem::WriteFile;

    let mut bytes_written: u32 = 0;
    unsafe { WriteFile(to_native(descriptor), Some(buf), Some(&mut bytes_written), None) }
        .map_err(|e| ProcessError::pipe_io("write", e))?;
    Ok(bytes_written as usize)
}

#[cfg(windows)]
fn close_native(descriptor: PipeDescriptor) -> ProcessResult<()> {
    use windows::Win32::Foundation::CloseHandle;

    unsafe { CloseHandle(to_native(descriptor)) }.map_err(|e| ProcessError::pipe_io("close", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PipeChannel;
    use crate::descriptor::INVALID_PIPE_DESCRIPTOR;
    use cproc_common::PipeSide;

    #[test]
    fn test_write_then_read_all() {
        let mut pipe = PipeChannel::create(false).unwrap();
        let written = write(pipe.get(PipeSide::Write), b"this is a test").unwrap();
        assert_eq!(written, 14);
        pipe.close(PipeSide::Write).unwrap();

        let data = read_all(pipe.get(PipeSide::Read)).unwrap();
        assert_eq!(data, b"this is a test");
        pipe.close(PipeSide::Read).unwrap();
    }

    #[test]
    fn test_read_stops_at_count() {
        let mut pipe = PipeChannel::create(false).unwrap();
        write_all(pipe.get(PipeSide::Write), b"abcdefgh").unwrap();

        let first = read(pipe.get(PipeSide::Read), 3).unwrap();
        assert_eq!(first, b"abc");

        pipe.close(PipeSide::Write).unwrap();
        let rest = read(pipe.get(PipeSide::Read), 100).unwrap();
        assert_eq!(rest, b"defgh");
        pipe.close_all().unwrap();
    }

    #[test]
    fn test_read_larger_than_buffer() {
        let mut pipe = PipeChannel::create(false).unwrap();
        let payload: Vec<u8> = (0..READ_BUFFER_SIZE * 3 + 7).map(|i| (i % 251) as u8).collect();
        write_all(pipe.get(PipeSide::Write), &payload).unwrap();
        pipe.close(PipeSide::Write).unwrap();

        assert_eq!(read_all(pipe.get(PipeSide::Read)).unwrap(), payload);
        pipe.close_all().unwrap();
    }

    #[test]
    fn test_read_all_string_rejects_invalid_utf8() {
        let mut pipe = PipeChannel::create(false).unwrap();
        write_all(pipe.get(PipeSide::Write), &[0xff, 0xfe]).unwrap();
        pipe.close(PipeSide::Write).unwrap();

        let err = read_all_string(pipe.get(PipeSide::Read)).unwrap_err();
        assert!(matches!(err, ProcessError::PipeIo { .. }));
        pipe.close_all().unwrap();
    }

    #[test]
    fn test_sentinel_descriptor() {
        assert!(close(INVALID_PIPE_DESCRIPTOR).is_ok());
        assert!(matches!(write(INVALID_PIPE_DESCRIPTOR, b"x"), Err(ProcessError::PipeIo { .. })));
        assert!(matches!(read_all(INVALID_PIPE_DESCRIPTOR), Err(ProcessError::PipeIo { .. })));
    }

    #[test]
    fn test_zero_count_read_returns_immediately() {
        let mut pipe = PipeChannel::create(false).unwrap();
        // Would block forever if a read were attempted.
        assert!(read(pipe.get(PipeSide::Read), 0).unwrap().is_empty());
        pipe.close_all().unwrap();
    }
}
