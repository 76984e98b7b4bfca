// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::errors::Result;

use super::BufferedSource;

/// An `ArraySource` adapts an already-populated byte slice to the buffered
/// source contract.
///
/// The window starts out covering the whole slice and the source is exhausted
/// from birth, so filling is a no-op and skipping is pure arithmetic.
pub struct ArraySource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ArraySource<'a> {
    /// Instantiate a new `ArraySource` over the given byte slice.
    pub fn new(buf: &'a [u8]) -> Self {
        ArraySource { buf, pos: 0 }
    }
}

impl BufferedSource for ArraySource<'_> {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    fn window(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    #[inline(always)]
    fn is_exhausted(&self) -> bool {
        true
    }

    fn fill(&mut self) -> Result<usize> {
        Ok(self.buf.len() - self.pos)
    }

    fn consume(&mut self, size: usize) {
        assert!(size <= self.buf.len() - self.pos, "consumed size exceeds the window");
        self.pos += size;
    }
}

#[cfg(test)]
mod tests {
    use super::super::BufferedSource;
    use super::ArraySource;
    use crate::errors::Error;

    #[test]
    fn verify_window_arithmetic() {
        let data = [10u8, 20, 30, 40, 50];
        let mut source = ArraySource::new(&data);

        assert_eq!(source.capacity(), 5);
        assert_eq!(source.window(), &data);
        assert!(source.is_exhausted());

        source.consume(2);
        assert_eq!(source.window(), &data[2..]);

        // Filling never grows the window.
        assert_eq!(source.fill().unwrap(), 3);
        assert_eq!(source.window(), &data[2..]);

        source.consume(3);
        assert_eq!(source.window().len(), 0);
        assert_eq!(source.fill().unwrap(), 0);
    }

    #[test]
    fn verify_skip_bytes() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut source = ArraySource::new(&data);

        assert_eq!(source.skip_bytes(4).unwrap(), 4);
        assert_eq!(source.window(), &data[4..]);

        // Skipping past the end reports the shortfall.
        assert_eq!(source.skip_bytes(1000).unwrap(), 2);
        assert_eq!(source.skip_bytes(1000).unwrap(), 0);
        assert!(source.is_exhausted());
    }

    #[test]
    fn verify_ensure() {
        let data = [7u8, 8, 9];
        let mut source = ArraySource::new(&data);

        source.ensure(3).unwrap();
        source.consume(1);

        match source.ensure(3) {
            Err(Error::InsufficientData(_)) => (),
            _ => panic!("expected insufficient data"),
        }
    }

    #[test]
    #[should_panic(expected = "requested size exceeds the buffer capacity")]
    fn verify_ensure_rejects_oversize() {
        let data = [0u8; 4];
        let mut source = ArraySource::new(&data);
        let _ = source.ensure(5);
    }

    #[test]
    #[should_panic(expected = "consumed size exceeds the window")]
    fn verify_consume_rejects_oversize() {
        let data = [0u8; 4];
        let mut source = ArraySource::new(&data);
        source.consume(5);
    }
}
