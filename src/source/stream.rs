// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;
use std::io;
use std::io::{Read, Seek};

use log::debug;

use crate::errors::Result;

use super::{BufferedSource, ByteStream};

/// A `StreamSource` adapts an external byte stream to the buffered source
/// contract. By using type erasure and dynamic dispatch, `StreamSource` wraps
/// and hides the inner stream from the consumer, allowing any typical
/// `Read`er to be used in a generic way, selectable at runtime.
///
/// Each fill shifts the surviving window to the front of the buffer and
/// issues a single read into the reclaimed capacity. Skipping far ahead uses
/// the stream's seek capability when it reports one; a stream that turns out
/// not to honour it at runtime is quietly demoted to the sequential read
/// path.
pub struct StreamSource {
    /// The source stream.
    inner: Box<dyn ByteStream>,
    /// The read buffer.
    buf: Box<[u8]>,
    /// Index of the first valid window byte.
    offset: usize,
    /// Number of valid window bytes.
    count: usize,
    /// Sticky end-of-stream flag, set once a read returns no bytes or a seek
    /// runs off the end.
    ended: bool,
}

impl StreamSource {
    /// Instantiates a new `StreamSource` over `inner` with an internal buffer
    /// of `buf_len` bytes. `buf_len` must be at least 1.
    pub fn new(inner: Box<dyn ByteStream>, buf_len: usize) -> Self {
        assert!(buf_len >= 1, "stream source buffer must hold at least one byte");

        StreamSource {
            inner,
            buf: vec![0u8; buf_len].into_boxed_slice(),
            offset: 0,
            count: 0,
            ended: false,
        }
    }

    /// Shifts the window to the front of the buffer to maximize the
    /// contiguous free region behind it.
    fn defragment(&mut self) {
        if self.offset > 0 {
            self.buf.copy_within(self.offset..self.offset + self.count, 0);
            self.offset = 0;
        }
    }

    /// Reads once from the stream into the buffer starting at `start`,
    /// retrying on interruption.
    fn read_some(&mut self, start: usize) -> Result<usize> {
        loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(len) => return Ok(len),
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Advances a seekable stream by up to `count` bytes, bounded by the
    /// stream's remaining length, and returns the distance moved.
    fn seek_ahead(&mut self, count: u64) -> io::Result<u64> {
        let len = match self.inner.byte_len() {
            Some(len) => len,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "stream length unavailable",
                ))
            }
        };

        let pos = self.inner.stream_position()?;
        let remaining = len.saturating_sub(pos);

        let advance = cmp::min(count, remaining);
        self.inner.seek(io::SeekFrom::Start(pos + advance))?;

        if advance == remaining {
            // The stream is now positioned at its end.
            self.ended = true;
        }

        Ok(advance)
    }
}

impl BufferedSource for StreamSource {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    fn window(&self) -> &[u8] {
        &self.buf[self.offset..self.offset + self.count]
    }

    #[inline(always)]
    fn is_exhausted(&self) -> bool {
        self.ended
    }

    fn fill(&mut self) -> Result<usize> {
        // A full window leaves nothing to read into; a zero-length read must
        // not be mistaken for end-of-stream.
        if self.ended || self.count == self.buf.len() {
            return Ok(self.count);
        }

        self.defragment();

        let len = self.read_some(self.count)?;

        if len == 0 {
            self.ended = true;
        }
        else {
            self.count += len;
        }

        Ok(self.count)
    }

    fn consume(&mut self, size: usize) {
        assert!(size <= self.count, "consumed size exceeds the window");
        self.offset += size;
        self.count -= size;
    }

    fn skip_bytes(&mut self, count: u64) -> Result<u64> {
        // Cover the request from the window alone when possible.
        if count <= self.count as u64 {
            self.consume(count as usize);
            return Ok(count);
        }

        // Discard the entire window, then cover the remainder upstream.
        let mut skipped = self.count as u64;
        let mut wanted = count - skipped;

        self.offset = 0;
        self.count = 0;

        if self.ended {
            return Ok(skipped);
        }

        if self.inner.is_seekable() {
            match self.seek_ahead(wanted) {
                Ok(advanced) => return Ok(skipped + advanced),
                Err(err) => {
                    // The capability probe was wrong; cover the remainder with
                    // plain reads instead.
                    debug!("seek-ahead failed ({}), falling back to reads", err);
                }
            }
        }

        while wanted > 0 {
            let len = self.read_some(0)?;

            if len == 0 {
                self.ended = true;
                break;
            }

            if (len as u64) > wanted {
                // The tail of this read becomes the new window.
                self.offset = wanted as usize;
                self.count = len - wanted as usize;
                skipped += wanted;
                wanted = 0;
            }
            else {
                skipped += len as u64;
                wanted -= len as u64;
            }
        }

        Ok(skipped)
    }
}
