//! The three pipes backing a child's standard streams.
//!
//! After the child is created each pipe has one end per process:
//!
//! | stream | parent keeps | child keeps |
//! |--------|--------------|-------------|
//! | In     | write        | read        |
//! | Out    | read         | write       |
//! | Err    | read         | write       |
//!
//! Each process closes the other's ends right away, otherwise EOF never
//! arrives and descriptors leak into the child's program.
//!
//! All six ends are created close-on-exec. Only the copies the child places
//! on its standard stream slots survive `exec`, so a launch running on
//! another thread at the same time never inherits them.

use crate::channel::PipeChannel;
use crate::descriptor::PipeDescriptor;
use cproc_common::{PipeSide, ProcessError, ProcessResult, StdStream};
use tracing::debug;

/// One [`PipeChannel`] per [`StdStream`].
#[derive(Debug)]
pub struct StandardStreamSet {
    pipes: [PipeChannel; 3],
}

impl StandardStreamSet {
    /// Creates the three close-on-exec pipes. If one fails, the ones already created are
    /// closed before the error is returned.
    pub fn open_pipes() -> ProcessResult<Self> {
        let mut opened = Vec::with_capacity(StdStream::ALL.len());
        for stream in StdStream::ALL {
            match PipeChannel::create(true) {
                Ok(pipe) => opened.push(pipe),
                Err(e) => {
                    debug!("Creating {} pipe failed, releasing {} pipes", stream, opened.len());
                    for mut pipe in opened {
                        let _ = pipe.close_all();
                    }
                    return Err(e);
                }
            }
        }

        let pipes = <[PipeChannel; 3]>::try_from(opened)
            .map_err(|_| ProcessError::os_resource("pipe", "incomplete standard stream set"))?;
        Ok(Self { pipes })
    }

    pub fn get(&self, stream: StdStream) -> &PipeChannel {
        &self.pipes[stream.index()]
    }

    pub fn get_mut(&mut self, stream: StdStream) -> &mut PipeChannel {
        &mut self.pipes[stream.index()]
    }

    /// The end of `stream`'s pipe that the parent uses.
    pub fn parent_side(stream: StdStream) -> PipeSide {
        match stream {
            StdStream::In => PipeSide::Write,
            StdStream::Out | StdStream::Err => PipeSide::Read,
        }
    }

    /// The end of `stream`'s pipe that becomes the child's descriptor.
    pub fn child_side(stream: StdStream) -> PipeSide {
        match stream {
            StdStream::In => PipeSide::Read,
            StdStream::Out | StdStream::Err => PipeSide::Write,
        }
    }

    /// Descriptor of the parent's end of `stream`.
    pub fn parent_descriptor(&self, stream: StdStream) -> PipeDescriptor {
        self.get(stream).get(Self::parent_side(stream))
    }

    /// Descriptor of the child's end of `stream`.
    pub fn child_descriptor(&self, stream: StdStream) -> PipeDescriptor {
        self.get(stream).get(Self::child_side(stream))
    }

    /// Closes the parent's end of one stream. Idempotent.
    pub fn close_parent_end(&mut self, stream: StdStream) -> ProcessResult<()> {
        self.get_mut(stream).close(Self::parent_side(stream))
    }

    /// Closes In.write, Out.read and Err.read.
    ///
    /// Every end is attempted; the first failure is returned.
    pub fn close_parent_side(&mut self) -> ProcessResult<()> {
        self.close_each(Self::parent_side)
    }

    /// Closes In.read, Out.write and Err.write.
    ///
    /// Every end is attempted; the first failure is returned.
    pub fn close_child_side(&mut self) -> ProcessResult<()> {
        self.close_each(Self::child_side)
    }

    /// Closes every end of every pipe.
    pub fn close_all(&mut self) -> ProcessResult<()> {
        let parent = self.close_parent_side();
        let child = self.close_child_side();
        parent.and(child)
    }

    /// Closes the parent's ends from inside a freshly forked child.
    ///
    /// Allocation-free and async-signal-safe. The set itself is not updated:
    /// the child's copy is abandoned at `exec`.
    #[cfg(unix)]
    pub fn close_parent_side_in_child(&self) -> nix::Result<()> {
        for stream in StdStream::ALL {
            crate::posix::close_fd(crate::descriptor::to_native(self.parent_descriptor(stream)))?;
        }
        Ok(())
    }

    fn close_each(&mut self, side_of: fn(StdStream) -> PipeSide) -> ProcessResult<()> {
        let mut first_error = None;
        for stream in StdStream::ALL {
            if let Err(e) = self.get_mut(stream).close(side_of(stream)) {
                debug!("Closing {} {} end failed: {}", stream, side_of(stream), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
