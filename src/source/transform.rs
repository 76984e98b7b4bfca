// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;

use log::trace;

use crate::errors::{invariant_error, Result};

use super::BufferedSource;

/// A `BlockTransform` converts fixed-size input blocks into fixed-size output
/// blocks, such as a block cipher, a decoder, or a recoding with differing
/// input and output widths.
pub trait BlockTransform {
    /// Gets the size in bytes of one input block. Always greater than zero.
    fn input_block_size(&self) -> usize;

    /// Gets the size in bytes of one output block. Always greater than zero.
    fn output_block_size(&self) -> usize;

    /// Returns if `transform_block` accepts more than one block per call.
    fn can_transform_multiple_blocks(&self) -> bool;

    /// Transforms whole input blocks into `output` and returns the number of
    /// bytes produced.
    ///
    /// `input.len()` is a positive multiple of the input block size, and
    /// exactly one block when multiple blocks are not supported. `output` has
    /// room for the corresponding number of output blocks. A transform may
    /// legitimately produce fewer bytes than that, including none.
    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Transforms the trailing partial block and returns the final output,
    /// including any padding.
    ///
    /// `input.len()` is less than one input block, possibly zero. Called at
    /// most once per stream.
    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>>;
}

/// A `TransformSource` exposes the result of applying a block transform to
/// the bytes of an inner source.
///
/// The source owns a private output buffer and feeds the transform
/// block-aligned input sized to the free output space, so small consumer
/// reads do not stall the transform and large ones do not over-read the
/// inner source. When less than one output block of space is free, a block
/// is transformed into scratch storage and the part that does not fit is
/// carried forward in a one-block overflow cache.
pub struct TransformSource<S: BufferedSource, T: BlockTransform> {
    inner: S,
    transform: T,
    /// The output buffer.
    buf: Box<[u8]>,
    /// Index of the first valid window byte.
    offset: usize,
    /// Number of valid window bytes.
    count: usize,
    /// Overflow storage holding at most one transformed block or final block.
    cache: Box<[u8]>,
    /// Start of the valid cached range.
    cache_start: usize,
    /// End of the valid cached range.
    cache_end: usize,
    /// Largest number of whole input blocks the inner buffer can hold.
    input_max_blocks: usize,
    /// The final block has been submitted to the transform.
    source_ended: bool,
    /// `source_ended` and the cache is drained.
    exhausted: bool,
}

impl<S: BufferedSource, T: BlockTransform> TransformSource<S, T> {
    /// Instantiates a new `TransformSource` applying `transform` to the bytes
    /// of `inner`, with an output buffer of `buf_len` bytes.
    ///
    /// `buf_len` must be at least the size of one output block.
    pub fn new(inner: S, transform: T, buf_len: usize) -> Self {
        let in_block = transform.input_block_size();
        let out_block = transform.output_block_size();

        assert!(in_block > 0, "transform input block size must be non-zero");
        assert!(out_block > 0, "transform output block size must be non-zero");
        assert!(buf_len >= out_block, "buffer must hold at least one output block");

        let input_max_blocks = inner.capacity() / in_block;

        TransformSource {
            inner,
            transform,
            buf: vec![0u8; buf_len].into_boxed_slice(),
            offset: 0,
            count: 0,
            cache: vec![0u8; out_block].into_boxed_slice(),
            cache_start: 0,
            cache_end: 0,
            input_max_blocks,
            source_ended: false,
            exhausted: false,
        }
    }

    /// Returns an immutable reference to the inner source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner source.
    ///
    /// Consuming bytes through this reference desynchronizes the block
    /// alignment of any transformation in progress.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Convert the `TransformSource` to the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// The amount of block-aligned input needed to fill `out_free` bytes of
    /// output space, bounded by what the inner buffer can hold.
    fn input_size_for(&self, out_free: usize) -> usize {
        let in_block = self.transform.input_block_size();
        let out_block = self.transform.output_block_size();

        if self.input_max_blocks < 1 {
            // The inner buffer cannot hold even one block.
            return self.inner.capacity();
        }

        cmp::max(1, cmp::min(out_free / out_block, self.input_max_blocks)) * in_block
    }

    /// Moves cached overflow bytes into the free region of the buffer and
    /// returns the number of bytes moved.
    fn load_from_cache(&mut self, out_free: usize) -> usize {
        let cached = self.cache_end - self.cache_start;

        if cached == 0 {
            return 0;
        }

        let len = cmp::min(out_free, cached);
        let at = self.offset + self.count;

        self.buf[at..at + len].copy_from_slice(&self.cache[self.cache_start..self.cache_start + len]);
        self.cache_start += len;

        if self.cache_start == self.cache_end && self.source_ended {
            self.exhausted = true;
        }

        len
    }

    /// Feeds the transform from the inner source and returns the number of
    /// bytes placed into the buffer's free region of `out_free` bytes.
    fn load_from_transform(&mut self, out_free: usize) -> Result<usize> {
        let in_block = self.transform.input_block_size();
        let out_block = self.transform.output_block_size();
        let multiple = self.transform.can_transform_multiple_blocks();

        // Top up the inner source when it holds less than one transformation's
        // worth of input.
        let wanted = if multiple { self.input_size_for(out_free) } else { in_block };

        if wanted > self.inner.window().len() && !self.inner.is_exhausted() {
            let len = self.inner.fill()?;

            if len < in_block && !self.inner.is_exhausted() {
                return invariant_error("inner source buffer too small to hold one transform block");
            }
        }

        let available = self.inner.window().len();

        if available >= in_block {
            let out_blocks = out_free / out_block;

            if out_blocks >= 1 {
                // Transform straight into the buffer.
                let blocks = if multiple { cmp::min(available / in_block, out_blocks) } else { 1 };
                let in_len = blocks * in_block;
                let at = self.offset + self.count;

                let produced = self
                    .transform
                    .transform_block(&self.inner.window()[..in_len], &mut self.buf[at..])?;

                self.inner.consume(in_len);

                Ok(produced)
            }
            else {
                // Less than one output block of space is free: transform one
                // block into scratch and carry the spill in the cache.
                let produced = self
                    .transform
                    .transform_block(&self.inner.window()[..in_block], &mut self.cache[..])?;

                self.inner.consume(in_block);

                let len = cmp::min(out_free, produced);
                let at = self.offset + self.count;

                self.buf[at..at + len].copy_from_slice(&self.cache[..len]);

                if produced > len {
                    trace!("caching {} overflow bytes from transform", produced - len);
                    self.cache_start = len;
                    self.cache_end = produced;
                }

                Ok(len)
            }
        }
        else {
            // Less than one block remains, which is only legitimate once the
            // inner source is exhausted.
            if !self.inner.is_exhausted() {
                return invariant_error("inner source buffer too small to hold one transform block");
            }

            self.source_ended = true;

            let final_block = self.transform.transform_final_block(self.inner.window())?;
            self.inner.consume(available);

            trace!("final transform block produced {} bytes", final_block.len());

            let len = cmp::min(out_free, final_block.len());
            let at = self.offset + self.count;

            self.buf[at..at + len].copy_from_slice(&final_block[..len]);

            if final_block.len() > len {
                // Park the spill in the cache slot; block scratch is no
                // longer needed.
                self.cache_start = len;
                self.cache_end = final_block.len();
                self.cache = final_block.into_boxed_slice();
            }
            else {
                self.exhausted = true;
            }

            Ok(len)
        }
    }
}

impl<S: BufferedSource, T: BlockTransform> BufferedSource for TransformSource<S, T> {
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
        self.exhausted
    }

    fn fill(&mut self) -> Result<usize> {
        if self.exhausted || self.count == self.buf.len() {
            return Ok(self.count);
        }

        if self.offset > 0 {
            self.buf.copy_within(self.offset..self.offset + self.count, 0);
            self.offset = 0;
        }

        loop {
            let out_free = self.buf.len() - self.count;

            let mut produced = self.load_from_cache(out_free);

            if produced == 0 {
                produced = self.load_from_transform(out_free)?;
            }

            self.count += produced;

            // A transform may produce nothing for a given input block; keep
            // feeding it until output appears or the stream ends.
            if produced > 0 || self.exhausted {
                return Ok(self.count);
            }
        }
    }

    fn consume(&mut self, size: usize) {
        assert!(size <= self.count, "consumed size exceeds the window");
        self.offset += size;
        self.count -= size;
    }
}
