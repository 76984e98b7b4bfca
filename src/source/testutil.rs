// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic fixtures shared by the source tests.

use std::cmp;
use std::io;

use super::ByteStream;

/// Deterministic byte pattern keyed by absolute stream position.
pub fn filler(pos: u64) -> u8 {
    0xAA ^ (pos & 0xFF) as u8
}

/// A stream producing `filler` bytes, with configurable length and seek
/// capability.
pub struct FillerStream {
    pos: u64,
    len: u64,
    /// The capability the stream advertises.
    claims_seek: bool,
    /// Whether seeking actually works.
    honors_seek: bool,
}

impl FillerStream {
    /// A bounded, seekable stream.
    pub fn new(len: u64) -> Self {
        FillerStream { pos: 0, len, claims_seek: true, honors_seek: true }
    }

    /// A practically endless seekable stream.
    pub fn endless() -> Self {
        FillerStream { pos: 0, len: u64::MAX, claims_seek: true, honors_seek: true }
    }

    /// A bounded stream that neither claims nor supports seeking.
    pub fn sequential(len: u64) -> Self {
        FillerStream { pos: 0, len, claims_seek: false, honors_seek: false }
    }

    /// A bounded stream that claims to be seekable but faults at runtime.
    pub fn miscapable(len: u64) -> Self {
        FillerStream { pos: 0, len, claims_seek: true, honors_seek: false }
    }
}

impl io::Read for FillerStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        let len = cmp::min(buf.len() as u64, remaining) as usize;

        for (i, byte) in buf[..len].iter_mut().enumerate() {
            *byte = filler(self.pos + i as u64);
        }

        self.pos += len as u64;
        Ok(len)
    }
}

impl io::Seek for FillerStream {
    fn seek(&mut self, from: io::SeekFrom) -> io::Result<u64> {
        if !self.honors_seek {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "seek not supported"));
        }

        let pos = match from {
            io::SeekFrom::Start(pos) => pos as i128,
            io::SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
            io::SeekFrom::End(delta) => self.len as i128 + delta as i128,
        };

        if pos < 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "seek before start"));
        }

        self.pos = pos as u64;
        Ok(self.pos)
    }
}

impl ByteStream for FillerStream {
    fn is_seekable(&self) -> bool {
        self.claims_seek
    }

    fn byte_len(&self) -> Option<u64> {
        if self.claims_seek {
            Some(self.len)
        }
        else {
            None
        }
    }
}
