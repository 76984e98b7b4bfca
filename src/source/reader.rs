// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;
use std::io;

use crate::errors::Result;

use super::BufferedSource;

/// A `SourceReader` adapts any [`BufferedSource`] into a read-only byte
/// stream implementing [`std::io::Read`] and [`std::io::BufRead`].
///
/// The view is strictly sequential: writing and seeking are unavailable by
/// construction.
pub struct SourceReader<S: BufferedSource> {
    source: S,
}

impl<S: BufferedSource> SourceReader<S> {
    /// Instantiates a new `SourceReader` over `source`.
    pub fn new(source: S) -> Self {
        SourceReader { source }
    }

    /// Returns an immutable reference to the inner source.
    pub fn inner(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the inner source.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Convert the `SourceReader` to the inner source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Reads a single byte, or `None` once the source is exhausted.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.source.window().is_empty() {
            if self.source.is_exhausted() || self.source.fill()? == 0 {
                return Ok(None);
            }
        }

        let byte = self.source.window()[0];
        self.source.consume(1);

        Ok(Some(byte))
    }
}

impl<S: BufferedSource> io::Read for SourceReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.source.window().is_empty() {
            if self.source.is_exhausted() {
                return Ok(0);
            }
            if self.source.fill().map_err(io::Error::from)? == 0 {
                return Ok(0);
            }
        }

        let len = cmp::min(buf.len(), self.source.window().len());
        buf[..len].copy_from_slice(&self.source.window()[..len]);
        self.source.consume(len);

        Ok(len)
    }
}

impl<S: BufferedSource> io::BufRead for SourceReader<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.source.window().is_empty() && !self.source.is_exhausted() {
            self.source.fill().map_err(io::Error::from)?;
        }

        Ok(self.source.window())
    }

    fn consume(&mut self, amt: usize) {
        self.source.consume(amt);
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, Read};

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::super::testutil::{filler, FillerStream};
    use super::super::StreamSource;
    use super::SourceReader;

    #[test]
    fn verify_read_all_across_chunkings() {
        // Any chunking of reads returns exactly the stream's bytes.
        let mut rng = SmallRng::seed_from_u64(0x5eed);

        for _ in 0..8 {
            let source = StreamSource::new(Box::new(FillerStream::new(4096)), 61);
            let mut reader = SourceReader::new(source);

            let mut out = Vec::new();
            let mut chunk = vec![0u8; 97];

            loop {
                let len = rng.random_range(1..=chunk.len());
                let read = reader.read(&mut chunk[..len]).unwrap();
                if read == 0 {
                    break;
                }
                out.extend_from_slice(&chunk[..read]);
            }

            assert_eq!(out.len(), 4096);
            for (i, &byte) in out.iter().enumerate() {
                assert_eq!(byte, filler(i as u64));
            }
        }
    }

    #[test]
    fn verify_read_byte_at_end() {
        let source = StreamSource::new(Box::new(FillerStream::new(2)), 8);
        let mut reader = SourceReader::new(source);

        assert_eq!(reader.read_byte().unwrap(), Some(filler(0)));
        assert_eq!(reader.read_byte().unwrap(), Some(filler(1)));
        assert_eq!(reader.read_byte().unwrap(), None);
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[test]
    fn verify_buf_read() {
        let source = StreamSource::new(Box::new(FillerStream::new(300)), 64);
        let mut reader = SourceReader::new(source);

        let mut total = 0usize;
        loop {
            let available = reader.fill_buf().unwrap().len();
            if available == 0 {
                break;
            }
            reader.consume(available);
            total += available;
        }

        assert_eq!(total, 300);
    }

    #[test]
    fn verify_std_read_to_end() {
        let source = StreamSource::new(Box::new(FillerStream::new(1000)), 16);
        let mut reader = SourceReader::new(source);

        let mut out = Vec::new();
        assert_eq!(reader.read_to_end(&mut out).unwrap(), 1000);
        assert_eq!(out[999], filler(999));
    }
}
