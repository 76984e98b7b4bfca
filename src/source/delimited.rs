// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::errors::Result;

use super::BufferedSource;

/// A `DelimitedSource` exposes the bytes of an inner source up to, but not
/// including, the next occurrence of a fixed byte template.
///
/// The window covers the current *part*. Once the template is located the
/// source reports exhausted; [`skip_part`](DelimitedSource::skip_part)
/// advances the inner source past the template and begins the next part.
///
/// The scanner tracks a candidate match as a window-relative anchor plus the
/// number of template prefix bytes verified there. Bytes in front of the
/// anchor have been ruled out and are never re-scanned. A template is
/// findable only if it fits in the inner buffer together with some context.
pub struct DelimitedSource<S: BufferedSource> {
    inner: S,
    template: Box<[u8]>,
    /// Window-relative position where a candidate template match begins.
    found_at: usize,
    /// Number of template prefix bytes verified at `found_at`. Equal to the
    /// template length once a full match is located, and sticky until
    /// `skip_part` consumes the match.
    matched: usize,
}

impl<S: BufferedSource> DelimitedSource<S> {
    /// Instantiates a new `DelimitedSource` splitting `inner` at `template`.
    ///
    /// The template must be non-empty and no longer than the inner source's
    /// buffer.
    pub fn new(inner: S, template: &[u8]) -> Self {
        assert!(!template.is_empty(), "delimiter template must be non-empty");
        assert!(
            template.len() <= inner.capacity(),
            "delimiter template exceeds the inner buffer"
        );

        let mut source =
            DelimitedSource { inner, template: template.into(), found_at: 0, matched: 0 };
        source.scan();
        source
    }

    /// Returns the template this source splits at.
    pub fn template(&self) -> &[u8] {
        &self.template
    }

    /// Returns an immutable reference to the inner source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner source.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Convert the `DelimitedSource` to the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Extends the scan over bytes that arrived since the last call.
    ///
    /// The cursor `found_at + matched` only ever moves forward; a full match
    /// is sticky. When the inner source exhausts without a match the anchor
    /// jumps to the end of the window, turning the remainder into plain part
    /// content.
    fn scan(&mut self) {
        if self.matched == self.template.len() {
            return;
        }

        let window = self.inner.window();
        let mut at = self.found_at;
        let mut matched = self.matched;

        while at + matched < window.len() && matched < self.template.len() {
            if window[at + matched] == self.template[matched] {
                matched += 1;
            }
            else {
                at += 1;
                matched = 0;
            }
        }

        if matched < self.template.len() && self.inner.is_exhausted() {
            // No match can ever complete.
            at = window.len();
            matched = 0;
        }

        self.found_at = at;
        self.matched = matched;
    }

    /// Advances the inner source past the next template occurrence and begins
    /// the next part.
    ///
    /// Returns `false` if the inner source ran out before a template was
    /// found; the remaining bytes of the unterminated trailing part are
    /// drained.
    pub fn skip_part(&mut self) -> Result<bool> {
        loop {
            self.scan();

            if self.matched == self.template.len() {
                break;
            }

            if self.inner.is_exhausted() {
                let rest = self.inner.window().len();
                self.inner.consume(rest);
                self.found_at = 0;
                self.matched = 0;
                return Ok(false);
            }

            // Discard the part bytes in front of the anchor to free buffer
            // space, then pull more data for the scanner.
            self.inner.consume(self.found_at);
            self.found_at = 0;
            self.inner.fill()?;
        }

        self.inner.consume(self.found_at + self.template.len());
        self.found_at = 0;
        self.matched = 0;
        self.scan();

        Ok(true)
    }
}

impl<S: BufferedSource> BufferedSource for DelimitedSource<S> {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline(always)]
    fn window(&self) -> &[u8] {
        &self.inner.window()[..self.found_at]
    }

    #[inline(always)]
    fn is_exhausted(&self) -> bool {
        self.matched == self.template.len() || self.inner.is_exhausted()
    }

    fn fill(&mut self) -> Result<usize> {
        // Keep pulling until at least one part byte is visible; a partial
        // template match pinned at the window head hides everything behind it
        // until it is confirmed or ruled out.
        while !self.is_exhausted() {
            self.inner.fill()?;
            self.scan();

            if self.found_at > 0 {
                break;
            }
        }

        Ok(self.found_at)
    }

    fn consume(&mut self, size: usize) {
        assert!(size <= self.found_at, "consumed size exceeds the window");
        self.inner.consume(size);
        self.found_at -= size;
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{filler, FillerStream};
    use super::super::{ArraySource, BufferedSource, BufferedSourceExt, StreamSource};
    use super::DelimitedSource;

    fn template(start: u64, len: usize) -> Vec<u8> {
        (0..len as u64).map(|i| filler(start + i)).collect()
    }

    #[test]
    fn verify_three_parts() {
        // The filler pattern repeats every 256 bytes, so a template anchored
        // at 253 recurs at 509 and 765. Three parts of 253 bytes each.
        let stream = StreamSource::new(Box::new(FillerStream::new(768)), 64);
        let mut source = DelimitedSource::new(stream, &template(253, 3));

        for part in 0..3u64 {
            let mut bytes = Vec::new();
            source.read_to_end(&mut bytes).unwrap();

            assert_eq!(bytes.len(), 253);
            for (i, &byte) in bytes.iter().enumerate() {
                assert_eq!(byte, filler(part * 256 + i as u64));
            }

            assert!(source.skip_part().unwrap());
        }

        // The third template ends flush with the stream: one empty part
        // remains and there is nothing further to skip to.
        assert_eq!(source.fill().unwrap(), 0);
        assert!(source.is_exhausted());
        assert!(!source.skip_part().unwrap());
    }

    #[test]
    fn verify_unterminated_part_drained() {
        let data: Vec<u8> = (0..40).map(|p| filler(p)).collect();
        let mut source = DelimitedSource::new(ArraySource::new(&data), b"\x00\x01");

        // No template in the data: the whole slice is one part.
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, data);

        assert!(!source.skip_part().unwrap());
        assert!(source.inner().window().is_empty());
    }

    #[test]
    fn verify_template_at_start() {
        let data = b"--boundary--payload";
        let mut source = DelimitedSource::new(ArraySource::new(&data[..]), b"--");

        // The first part is empty.
        assert_eq!(source.fill().unwrap(), 0);
        assert!(source.is_exhausted());

        assert!(source.skip_part().unwrap());

        let mut part = Vec::new();
        source.read_to_end(&mut part).unwrap();
        assert_eq!(part, b"boundary");
    }

    #[test]
    fn verify_partial_match_not_exposed() {
        // A template prefix at the head of the window must stay hidden until
        // enough data arrives to confirm or refute it.
        let data = b"abXYcd";
        let mut source = DelimitedSource::new(
            StreamSource::new(
                Box::new(super::super::ReadOnlyStream::new(std::io::Cursor::new(data.to_vec()))),
                16,
            ),
            b"XYZ",
        );

        let mut part = Vec::new();
        source.read_to_end(&mut part).unwrap();

        // "XY" is a refuted partial match, so it belongs to the part.
        assert_eq!(part, b"abXYcd");
        assert!(!source.skip_part().unwrap());
    }

    #[test]
    fn verify_part_after_giant_skip() {
        // Skip 2^32 - 3 bytes in, then split on a five byte template found at
        // filler positions 162..167 of each 256 byte period.
        let skip_before: u64 = (1 << 32) - 3;

        let mut stream = StreamSource::new(Box::new(FillerStream::endless()), 1024);
        assert_eq!(stream.skip_bytes(skip_before).unwrap(), skip_before);

        let mut source = DelimitedSource::new(stream, &template(162, 5));

        // The first template occurrence is at (skip_before | 0xFF) + 1 + 162,
        // so the first part spans the distance from skip_before to there.
        let first_template_pos = (skip_before | 0xFF) + 1 + 162;
        let first_width = first_template_pos - skip_before;
        assert_eq!(first_width, (256 - (skip_before % 256)) + 162);

        let mut part = Vec::new();
        source.read_to_end(&mut part).unwrap();
        assert_eq!(part.len() as u64, first_width);
        for (i, &byte) in part.iter().enumerate() {
            assert_eq!(byte, filler(skip_before + i as u64));
        }

        assert!(source.skip_part().unwrap());

        let second_part_pos = first_template_pos + 5;
        source.ensure(3).unwrap();
        for i in 0..3 {
            assert_eq!(source.window()[i as usize], filler(second_part_pos + i));
        }
    }

    #[test]
    fn verify_repeated_prefix_data() {
        // Data made of repeated template prefixes exercises the anchor
        // restart path.
        let mut data = Vec::new();
        for _ in 0..10 {
            data.extend_from_slice(b"aaab");
        }
        data.extend_from_slice(b"aaaa");
        data.extend_from_slice(b"rest");

        let stream = StreamSource::new(
            Box::new(super::super::ReadOnlyStream::new(std::io::Cursor::new(data))),
            8,
        );
        let mut source = DelimitedSource::new(stream, b"aaaa");

        let mut part = Vec::new();
        source.read_to_end(&mut part).unwrap();
        assert_eq!(part.len(), 40);

        assert!(source.skip_part().unwrap());

        let mut rest = Vec::new();
        source.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"rest");
    }
}
