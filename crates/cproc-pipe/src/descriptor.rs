//! Platform-independent pipe descriptors.
//!
//! [`PipeDescriptor`] is wide enough to carry a POSIX file descriptor or a
//! Windows `HANDLE`, so the public API never mentions either.

/// The type used for pipe descriptors on all platforms.
pub type PipeDescriptor = i64;

/// Sentinel for a pipe end that is closed or was never opened.
pub const INVALID_PIPE_DESCRIPTOR: PipeDescriptor = -1;

#[cfg(unix)]
pub type NativePipe = std::os::unix::io::RawFd;

#[cfg(windows)]
pub type NativePipe = windows::Win32::Foundation::HANDLE;

const _: () = assert!(
    std::mem::size_of::<NativePipe>() <= std::mem::size_of::<PipeDescriptor>(),
    "native pipe representation must fit in PipeDescriptor"
);

/// Casts a descriptor back to the platform's native pipe type.
#[cfg(unix)]
pub fn to_native(descriptor: PipeDescriptor) -> NativePipe {
    descriptor as NativePipe
}

/// Casts a native pipe value to a [`PipeDescriptor`].
#[cfg(unix)]
pub fn from_native(native: NativePipe) -> PipeDescriptor {
    native as PipeDescriptor
}

/// Casts a descriptor back to the platform's native pipe type.
#[cfg(windows)]
pub fn to_native(descriptor: PipeDescriptor) -> NativePipe {
    windows::Win32::Foundation::HANDLE(descriptor as isize as *mut std::ffi::c_void)
}

/// Casts a native pipe value to a [`PipeDescriptor`].
#[cfg(windows)]
pub fn from_native(native: NativePipe) -> PipeDescriptor {
    native.0 as isize as PipeDescriptor
}

/// False for the closed/unopened sentinel.
pub fn is_valid(descriptor: PipeDescriptor) -> bool {
    descriptor != INVALID_PIPE_DESCRIPTOR
}
