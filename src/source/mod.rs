// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `source` module implements composable byte-buffered data sources.
//!
//! A source exposes a bounded *window* of buffered bytes that a consumer
//! inspects in place with [`BufferedSource::window`], consumes with
//! [`BufferedSource::consume`], and refills on demand with
//! [`BufferedSource::fill`] or [`BufferedSource::ensure`].
//!
//! Sources are named for where their bytes come from:
//!  * [`ArraySource`] adapts an already-populated byte slice.
//!  * [`StreamSource`] adapts an external byte stream implementing
//!    [`ByteStream`] (aka. [`std::io::Read`]).
//!  * [`ScopedSource`], [`DelimitedSource`], [`PartitionedSource`] and
//!    [`TransformSource`] wrap another [`BufferedSource`] to limit, split, or
//!    transform its bytes.
//!  * [`SourceReader`] adapts any source back into [`std::io::Read`] and
//!    [`std::io::BufRead`].

use std::cmp;
use std::io;

use crate::errors::{decode_error, insufficient_data_error, Result};

mod array;
mod delimited;
mod partition;
mod reader;
mod scoped;
mod stream;
mod transform;

#[cfg(test)]
pub(crate) mod testutil;

pub use array::ArraySource;
pub use delimited::DelimitedSource;
pub use partition::{PartEvaluator, PartScan, PartitionedSource};
pub use reader::SourceReader;
pub use scoped::ScopedSource;
pub use stream::StreamSource;
pub use transform::{BlockTransform, TransformSource};

/// `BufferedSource` is the pull-based byte-window protocol every source
/// implements.
///
/// A source owns (or borrows from its inner source) a fixed-capacity buffer.
/// At any moment the *window* is the contiguous run of buffered bytes that
/// are valid for reading. Consuming advances the head of the window without
/// moving data; filling may shift the surviving bytes to the front of the
/// buffer to reclaim trailing capacity, but never reorders or alters them.
///
/// Exhaustion is monotone: once [`is_exhausted`](BufferedSource::is_exhausted)
/// reports `true`, the window already holds every byte the source will ever
/// produce, and no operation clears the flag.
pub trait BufferedSource {
    /// Gets the fixed capacity of the buffer backing this source.
    fn capacity(&self) -> usize;

    /// Gets the window of bytes currently valid for reading.
    fn window(&self) -> &[u8];

    /// Returns if the source will never produce more bytes than those already
    /// in the window.
    fn is_exhausted(&self) -> bool;

    /// Attempts to enlarge the window by acquiring more bytes, and returns the
    /// new window length.
    ///
    /// After the call the window is non-empty or the source is exhausted. A
    /// call on an exhausted source is a no-op.
    fn fill(&mut self) -> Result<usize>;

    /// Consumes `size` bytes from the head of the window without acquiring
    /// more data.
    ///
    /// Panics if `size` exceeds the window length.
    fn consume(&mut self, size: usize);

    /// Reads until the window holds at least `size` bytes.
    ///
    /// Returns an insufficient data error if the source exhausts first.
    /// Panics if `size` exceeds the buffer capacity.
    fn ensure(&mut self, size: usize) -> Result<()> {
        assert!(size <= self.capacity(), "requested size exceeds the buffer capacity");

        while self.window().len() < size {
            if self.is_exhausted() {
                return insufficient_data_error("source exhausted before the requested size");
            }

            let len = self.window().len();
            self.fill()?;

            // A source that can neither grow the window nor exhaust has run
            // out of buffer space (e.g. a part boundary straddling a full
            // buffer) and will never satisfy the request.
            if self.window().len() == len && !self.is_exhausted() {
                return insufficient_data_error("source cannot grow the window further");
            }
        }

        Ok(())
    }

    /// Skips up to `count` bytes, reading past the window if required, and
    /// returns the number of bytes actually skipped.
    ///
    /// The result is less than `count` only if the source exhausted. After
    /// the call the source resumes immediately after the skipped bytes.
    fn skip_bytes(&mut self, count: u64) -> Result<u64> {
        let mut skipped = 0u64;

        loop {
            let take = cmp::min(self.window().len() as u64, count - skipped) as usize;
            self.consume(take);
            skipped += take as u64;

            if skipped == count || self.is_exhausted() {
                return Ok(skipped);
            }

            // An empty window after a fill means no further progress is
            // possible, whether or not exhaustion has been flagged.
            if self.fill()? == 0 {
                return Ok(skipped);
            }
        }
    }
}

impl<'b, S: BufferedSource + ?Sized> BufferedSource for &'b mut S {
    #[inline(always)]
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    #[inline(always)]
    fn window(&self) -> &[u8] {
        (**self).window()
    }

    #[inline(always)]
    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    #[inline(always)]
    fn fill(&mut self) -> Result<usize> {
        (*self).fill()
    }

    #[inline(always)]
    fn consume(&mut self, size: usize) {
        (*self).consume(size)
    }

    #[inline(always)]
    fn ensure(&mut self, size: usize) -> Result<()> {
        (*self).ensure(size)
    }

    #[inline(always)]
    fn skip_bytes(&mut self, count: u64) -> Result<u64> {
        (*self).skip_bytes(count)
    }
}

/// `BufferedSourceExt` provides utility reads over any [`BufferedSource`].
pub trait BufferedSourceExt: BufferedSource {
    /// Returns if the source holds no bytes and will never produce any.
    ///
    /// May read from the underlying data to decide.
    fn is_empty(&mut self) -> Result<bool> {
        if !self.window().is_empty() {
            return Ok(false);
        }

        if self.is_exhausted() {
            return Ok(true);
        }

        Ok(self.fill()? == 0)
    }

    /// Searches the buffered bytes for `value`, filling as needed, and
    /// returns its position relative to the head of the window.
    ///
    /// The search horizon is one buffer's worth of data: `Ok(None)` means the
    /// byte is not within the exhausted remainder, or not within the furthest
    /// window the buffer can hold.
    fn index_of(&mut self, value: u8) -> Result<Option<usize>> {
        let mut searched = 0;

        loop {
            if let Some(found) = self.window()[searched..].iter().position(|&b| b == value) {
                return Ok(Some(searched + found));
            }

            searched = self.window().len();

            if self.is_exhausted() || searched == self.capacity() {
                return Ok(None);
            }

            self.fill()?;

            if self.window().len() == searched {
                return Ok(None);
            }
        }
    }

    /// Reads up to `dst.len()` bytes into `dst` and returns the number of
    /// bytes read. The result is short only if the source exhausted.
    fn read_into(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut read = 0;

        while read < dst.len() {
            if self.window().is_empty() {
                if self.is_exhausted() || self.fill()? == 0 {
                    break;
                }
            }

            let len = cmp::min(dst.len() - read, self.window().len());
            dst[read..read + len].copy_from_slice(&self.window()[..len]);
            self.consume(len);
            read += len;
        }

        Ok(read)
    }

    /// Reads all remaining bytes into `buf` and returns the number of bytes
    /// appended.
    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let mut read = 0;

        loop {
            let len = self.window().len();
            buf.extend_from_slice(self.window());
            self.consume(len);
            read += len;

            if self.is_exhausted() || self.fill()? == 0 {
                return Ok(read);
            }
        }
    }

    /// Reads all remaining bytes as UTF-8 text into `buf` and returns the
    /// number of bytes appended. Non-UTF-8 data yields a decode error.
    fn read_to_string(&mut self, buf: &mut String) -> Result<usize> {
        let mut bytes = Vec::new();
        let read = self.read_to_end(&mut bytes)?;

        match String::from_utf8(bytes) {
            Ok(text) => {
                buf.push_str(&text);
                Ok(read)
            }
            Err(_) => decode_error("source bytes are not valid utf-8"),
        }
    }

    /// Writes all remaining bytes to `sink` and returns the number of bytes
    /// written.
    fn write_to<W: io::Write>(&mut self, sink: &mut W) -> Result<u64> {
        let mut written = 0u64;

        loop {
            if self.window().is_empty() && (self.is_exhausted() || self.fill()? == 0) {
                return Ok(written);
            }

            sink.write_all(self.window())?;

            let len = self.window().len();
            self.consume(len);
            written += len as u64;
        }
    }
}

impl<S: BufferedSource + ?Sized> BufferedSourceExt for S {}

/// `ByteStream` is the external stream interface consumed by
/// [`StreamSource`]: reading via [`std::io::Read`], plus seeking via
/// [`std::io::Seek`] as a runtime-queried capability.
///
/// Every implementor carries the `Seek` bound, but a stream is free to
/// report itself unseekable and reject seek calls; [`StreamSource`] probes
/// before relying on either.
pub trait ByteStream: io::Read + io::Seek {
    /// Returns if seeking actually works on this stream. Possibly costly to
    /// answer.
    fn is_seekable(&self) -> bool;

    /// Returns the total length in bytes, when the stream knows it. Possibly
    /// costly to answer.
    fn byte_len(&self) -> Option<u64>;
}

impl ByteStream for std::fs::File {
    /// Returns if the file is seekable, which costs a metadata lookup on the
    /// file descriptor each call. Callers polling this repeatedly should hold
    /// on to the answer.
    fn is_seekable(&self) -> bool {
        // Only regular files seek reliably; FIFOs and the like do not. When
        // the metadata lookup fails, assume the worst. metadata() follows
        // symlinks.
        match self.metadata() {
            Ok(metadata) => metadata.is_file(),
            _ => false,
        }
    }

    /// Returns the file length, which costs a metadata lookup on the file
    /// descriptor each call. Callers polling this repeatedly should hold on
    /// to the answer.
    fn byte_len(&self) -> Option<u64> {
        match self.metadata() {
            Ok(metadata) => Some(metadata.len()),
            _ => None,
        }
    }
}

impl<T: AsRef<[u8]>> ByteStream for io::Cursor<T> {
    /// In-memory cursors can always seek.
    fn is_seekable(&self) -> bool {
        true
    }

    /// The length of the bytes the cursor ranges over.
    fn byte_len(&self) -> Option<u64> {
        Some(self.get_ref().as_ref().len() as u64)
    }
}

/// `ReadOnlyStream` lifts a plain [`std::io::Read`]er into a [`ByteStream`]
/// that reports no seek capability and fails every seek attempt.
pub struct ReadOnlyStream<R: io::Read> {
    inner: R,
}

impl<R: io::Read> ReadOnlyStream<R> {
    /// Instantiates a new `ReadOnlyStream` taking ownership of `inner`.
    pub fn new(inner: R) -> Self {
        ReadOnlyStream { inner }
    }

    /// Returns a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns a mutable reference to the wrapped reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consumes the `ReadOnlyStream` and hands back the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> io::Read for ReadOnlyStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: io::Read> io::Seek for ReadOnlyStream<R> {
    fn seek(&mut self, _: io::SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "stream does not support seeking"))
    }
}

impl<R: io::Read> ByteStream for ReadOnlyStream<R> {
    fn is_seekable(&self) -> bool {
        false
    }

    fn byte_len(&self) -> Option<u64> {
        None
    }
}
