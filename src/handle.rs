//! # File Handles
//!
//! What [`AccessorIo::open`](crate::AccessorIo::open) returns, plus two
//! building blocks for backends:
//!
//! - [`Creator`]: a write handle that buffers everything and adds the entry
//!   through [`AccessorWrite::create`] on commit, for backends that can add
//!   members but not edit them in place.
//! - [`Window`]: a bounded, seekable view into a larger stream, for members
//!   stored inside one container file.

use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::binding::Session;
use crate::{AccessorWrite, PathError, PurePath, Stat};

/// A writable stream whose contents become visible on [`commit`](Sink::commit).
pub trait Sink: Write + Send {
    /// Make the written data durable. Called once, by [`FileHandle::close`].
    fn commit(self: Box<Self>) -> Result<(), PathError>;

    /// Release the stream without making its data visible. Called instead
    /// of `commit` when the backend closed first.
    fn discard(self: Box<Self>) {}
}

/// A stream open for both reading and writing.
pub trait Duplex: Read + Write + Send {
    /// Make the written data durable. Called once, by [`FileHandle::close`].
    fn commit(self: Box<Self>) -> Result<(), PathError> {
        Ok(())
    }

    /// Release the stream without making its data visible.
    fn discard(self: Box<Self>) {}
}

/// An open file.
///
/// Reading from a write-only handle (or the reverse) fails with
/// [`io::ErrorKind::Unsupported`]. Call [`close`](Self::close) to commit
/// writes and observe commit errors; dropping a handle leaves the commit to
/// the sink's own `Drop`, if any.
pub enum FileHandle {
    /// Read-only stream.
    Read(Box<dyn Read + Send>),
    /// Write-only stream.
    Write(Box<dyn Sink>),
    /// Read-write stream.
    ReadWrite(Box<dyn Duplex>),
}

impl FileHandle {
    /// Wrap a reader.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        FileHandle::Read(Box::new(reader))
    }

    /// Wrap a plain writer. Commit flushes it.
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        FileHandle::Write(Box::new(Flushing(writer)))
    }

    /// Returns `true` if the handle can be read from.
    pub fn is_readable(&self) -> bool {
        !matches!(self, FileHandle::Write(_))
    }

    /// Returns `true` if the handle can be written to.
    pub fn is_writable(&self) -> bool {
        !matches!(self, FileHandle::Read(_))
    }

    /// Commit pending writes and release the handle.
    pub fn close(self) -> Result<(), PathError> {
        match self {
            FileHandle::Read(_) => Ok(()),
            FileHandle::Write(sink) => sink.commit(),
            FileHandle::ReadWrite(duplex) => duplex.commit(),
        }
    }

    /// Tie the handle to `session`, so that it stops working once the
    /// session closes.
    pub(crate) fn guarded(self, session: Session, path: PurePath) -> FileHandle {
        match self {
            FileHandle::Read(r) => FileHandle::Read(Box::new(Guarded::new(r, session, path))),
            FileHandle::Write(w) => FileHandle::Write(Box::new(Guarded::new(w, session, path))),
            FileHandle::ReadWrite(d) => {
                FileHandle::ReadWrite(Box::new(Guarded::new(d, session, path)))
            }
        }
    }
}

/// Streams that can be let go of without committing.
trait Abandon {
    fn abandon(self: Box<Self>);
}

impl Abandon for dyn Read + Send {
    fn abandon(self: Box<Self>) {}
}

impl Abandon for dyn Sink {
    fn abandon(self: Box<Self>) {
        self.discard();
    }
}

impl Abandon for dyn Duplex {
    fn abandon(self: Box<Self>) {
        self.discard();
    }
}

/// A handle stream checked against its session before every call.
struct Guarded<T: Abandon + ?Sized> {
    inner: Option<Box<T>>,
    session: Session,
    path: PurePath,
}

impl<T: Abandon + ?Sized> Guarded<T> {
    fn new(inner: Box<T>, session: Session, path: PurePath) -> Self {
        Self {
            inner: Some(inner),
            session,
            path,
        }
    }

    fn live(&mut self, operation: &'static str) -> io::Result<&mut T> {
        if self.session.is_closed() {
            return Err(io::Error::other(closed(operation, &self.path)));
        }
        self.inner
            .as_deref_mut()
            .ok_or_else(|| io::Error::other(closed(operation, &self.path)))
    }

    /// The stream to commit, or `BackendClosed` after abandoning it.
    fn take_for_commit(&mut self) -> Result<Option<Box<T>>, PathError> {
        let inner = self.inner.take();
        if self.session.is_closed() {
            if let Some(inner) = inner {
                inner.abandon();
            }
            return Err(closed("close", &self.path));
        }
        Ok(inner)
    }
}

fn closed(operation: &'static str, path: &PurePath) -> PathError {
    PathError::BackendClosed {
        operation,
        path: Some(path.clone()),
    }
}

impl<T: Abandon + Read + ?Sized> Read for Guarded<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.live("read")?.read(buf)
    }
}

impl<T: Abandon + Write + ?Sized> Write for Guarded<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.live("write")?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.live("flush")?.flush()
    }
}

impl Sink for Guarded<dyn Sink> {
    fn commit(mut self: Box<Self>) -> Result<(), PathError> {
        match self.take_for_commit()? {
            Some(inner) => inner.commit(),
            None => Ok(()),
        }
    }

    fn discard(mut self: Box<Self>) {
        if let Some(inner) = self.inner.take() {
            inner.discard();
        }
    }
}

impl Duplex for Guarded<dyn Duplex> {
    fn commit(mut self: Box<Self>) -> Result<(), PathError> {
        match self.take_for_commit()? {
            Some(inner) => inner.commit(),
            None => Ok(()),
        }
    }

    fn discard(mut self: Box<Self>) {
        if let Some(inner) = self.inner.take() {
            inner.discard();
        }
    }
}

impl<T: Abandon + ?Sized> Drop for Guarded<T> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        if self.session.is_closed() {
            tracing::debug!(path = %self.path, "backend closed before handle; dropping without commit");
            inner.abandon();
        }
    }
}

fn wrong_direction(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("handle not open for {what}"),
    )
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FileHandle::Read(r) => r.read(buf),
            FileHandle::ReadWrite(d) => d.read(buf),
            FileHandle::Write(_) => Err(wrong_direction("reading")),
        }
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileHandle::Write(w) => w.write(buf),
            FileHandle::ReadWrite(d) => d.write(buf),
            FileHandle::Read(_) => Err(wrong_direction("writing")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileHandle::Write(w) => w.flush(),
            FileHandle::ReadWrite(d) => d.flush(),
            FileHandle::Read(_) => Ok(()),
        }
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FileHandle::Read(_) => "Read",
            FileHandle::Write(_) => "Write",
            FileHandle::ReadWrite(_) => "ReadWrite",
        };
        f.debug_tuple("FileHandle").field(&kind).finish()
    }
}

struct Flushing<W>(W);

impl<W: Write> Write for Flushing<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write + Send> Sink for Flushing<W> {
    fn commit(mut self: Box<Self>) -> Result<(), PathError> {
        self.0.flush().map_err(|source| PathError::Stream {
            operation: "close",
            path: PurePath::default(),
            source,
        })
    }
}

/// Write handle that creates its entry on commit.
///
/// On commit the parent must be an existing directory; an existing
/// non-directory at the target is unlinked first; then
/// [`AccessorWrite::create`] receives the buffered bytes. An uncommitted
/// `Creator` commits when dropped and logs failures, since `Drop` cannot
/// return them.
///
/// `W` is an owned handle to the backend's state (typically a cheap clone of
/// an `Arc`-based accessor).
///
/// # Example
///
/// ```rust,ignore
/// fn open(&self, path: &PurePath, mode: OpenMode) -> Result<FileHandle, PathError> {
///     if mode.write {
///         return Ok(FileHandle::Write(Box::new(Creator::new(self.clone(), path.clone()))));
///     }
///     // ...
/// }
/// ```
pub struct Creator<W: AccessorWrite + 'static> {
    accessor: W,
    path: PurePath,
    stat: Stat,
    buffer: Vec<u8>,
    committed: bool,
}

impl<W: AccessorWrite + 'static> Creator<W> {
    /// A creator for a regular file with default permissions.
    pub fn new(accessor: W, path: PurePath) -> Self {
        Self::with_stat(accessor, path, Stat::file(0))
    }

    /// A creator whose entry is described by `stat`. The size is filled in
    /// at commit.
    pub fn with_stat(accessor: W, path: PurePath, stat: Stat) -> Self {
        Self {
            accessor,
            path,
            stat,
            buffer: Vec::new(),
            committed: false,
        }
    }

    /// Start from existing contents (append mode).
    pub fn with_contents(mut self, contents: Vec<u8>) -> Self {
        self.buffer = contents;
        self
    }

    /// The path the entry will be created at.
    pub fn path(&self) -> &PurePath {
        &self.path
    }

    fn finish(&mut self) -> Result<(), PathError> {
        self.committed = true;
        let parent = self.path.parent();
        if !self.accessor.stat(&parent)?.is_dir() {
            return Err(PathError::not_a_directory("create", &parent));
        }
        match self.accessor.lstat(&self.path) {
            Ok(existing) if existing.is_dir() => {
                return Err(PathError::is_a_directory("create", &self.path));
            }
            Ok(_) => self.accessor.unlink(&self.path)?,
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        let data = std::mem::take(&mut self.buffer);
        let mut stat = self.stat.clone();
        stat.size = data.len() as u64;
        tracing::trace!(path = %self.path, size = stat.size, "creating entry from buffered writes");
        self.accessor
            .create(&self.path, &stat, Some(&mut Cursor::new(data)))
    }
}

impl<W: AccessorWrite + 'static> Write for Creator<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: AccessorWrite + 'static> Sink for Creator<W> {
    fn commit(mut self: Box<Self>) -> Result<(), PathError> {
        self.finish()
    }

    fn discard(mut self: Box<Self>) {
        self.committed = true;
        tracing::debug!(path = %self.path, discarded = self.buffer.len(), "write handle discarded");
    }
}

impl<W: AccessorWrite + 'static> Drop for Creator<W> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = self.finish() {
            tracing::warn!(path = %self.path, error = %e, "dropped write handle failed to commit");
        }
    }
}

impl<W: AccessorWrite + 'static> fmt::Debug for Creator<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creator")
            .field("path", &self.path)
            .field("buffered", &self.buffer.len())
            .field("committed", &self.committed)
            .finish()
    }
}

/// Read-only view of `len` bytes starting at `start` in `inner`.
///
/// Positions are relative to the window. Windows nest: a `Window` over a
/// `Window` addresses a sub-range of the outer one.
#[derive(Debug)]
pub struct Window<R> {
    inner: R,
    start: u64,
    len: u64,
    pos: u64,
}

impl<R: Read + Seek> Window<R> {
    /// A view of `inner[start..start + len]`.
    pub fn new(inner: R, start: u64, len: u64) -> Self {
        Self {
            inner,
            start,
            len,
            pos: 0,
        }
    }

    /// Length of the view in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` for a zero-length view.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for Window<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        self.inner.seek(SeekFrom::Start(self.start + self.pos))?;
        let want = remaining.min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for Window<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(d) => self.len.checked_add_signed(d),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
        };
        match target {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )),
        }
    }
}
