// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::errors::{buffer_too_small_error, Result};

use super::BufferedSource;

/// The outcome of one [`PartEvaluator::validate`] pass.
#[derive(Clone, Copy, Debug)]
pub struct PartScan {
    /// Total bytes at the head of the inspected buffer classified as part
    /// interior. Never less than the length passed in.
    pub validated: usize,
    /// When the end of the part was located, the length of the epilogue that
    /// follows the validated bytes and is discarded when advancing to the
    /// next part.
    pub end_of_part: Option<usize>,
}

/// A `PartEvaluator` classifies buffered bytes as part interior or part
/// boundary on behalf of a [`PartitionedSource`].
pub trait PartEvaluator {
    /// Inspects `buf` beyond the already `validated` prefix and returns the
    /// extended classification.
    ///
    /// `at_end` is set when no byte beyond `buf` will ever arrive, so a
    /// boundary run touching the end of `buf` is decidable. The returned
    /// validated length must not shrink, and a declared epilogue must lie
    /// entirely within `buf`. An evaluator may defer a decision (returning
    /// the same validated length and no boundary) only while `at_end` is
    /// false and more context could change the answer.
    fn validate(&mut self, buf: &[u8], validated: usize, at_end: bool) -> PartScan;
}

/// A `PartitionedSource` splits an inner source into parts at boundaries
/// located by a consumer-supplied [`PartEvaluator`].
///
/// The window covers the validated prefix of the current part. Once the
/// evaluator declares the end of the part the source reports exhausted;
/// [`skip_part`](PartitionedSource::skip_part) discards the part and its
/// epilogue and begins the next one.
pub struct PartitionedSource<S: BufferedSource, E: PartEvaluator> {
    inner: S,
    evaluator: E,
    /// Bytes at the head of the inner window already classified as part
    /// interior.
    validated: usize,
    /// The end of the current part has been located.
    end_found: bool,
    /// Length of the epilogue to discard when advancing, valid when
    /// `end_found` is set.
    epilogue: usize,
}

impl<S: BufferedSource, E: PartEvaluator> PartitionedSource<S, E> {
    /// Instantiates a new `PartitionedSource` over `inner` splitting at
    /// boundaries located by `evaluator`.
    pub fn new(inner: S, evaluator: E) -> Self {
        PartitionedSource { inner, evaluator, validated: 0, end_found: false, epilogue: 0 }
    }

    /// Returns an immutable reference to the inner source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner source.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Convert the `PartitionedSource` to the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Returns a reference to the evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Returns if the end of the current part has been located.
    pub fn end_of_part_found(&self) -> bool {
        self.end_found
    }

    /// Returns the length of the current part's epilogue. Meaningful only
    /// when [`end_of_part_found`](PartitionedSource::end_of_part_found)
    /// reports `true`.
    pub fn part_epilogue_len(&self) -> usize {
        self.epilogue
    }

    /// Runs the evaluator over the unverified tail of the inner window.
    fn revalidate(&mut self) {
        if self.end_found {
            return;
        }

        let scan =
            self.evaluator.validate(self.inner.window(), self.validated, self.inner.is_exhausted());

        debug_assert!(scan.validated >= self.validated);
        debug_assert!(scan.validated <= self.inner.window().len());

        self.validated = scan.validated;

        if let Some(epilogue) = scan.end_of_part {
            debug_assert!(self.validated + epilogue <= self.inner.window().len());
            self.end_found = true;
            self.epilogue = epilogue;
        }
    }

    /// Advances the inner source past the current part and its epilogue, and
    /// begins the next part.
    ///
    /// Returns `false` once the inner source is exhausted and drained. Fails
    /// with a buffer too small error when a full buffer of context does not
    /// let the evaluator locate the end of the part.
    pub fn skip_part(&mut self) -> Result<bool> {
        loop {
            self.revalidate();

            if self.end_found {
                self.inner.consume(self.validated + self.epilogue);
                self.validated = 0;
                self.end_found = false;
                self.epilogue = 0;
                self.revalidate();
                return Ok(true);
            }

            if self.inner.is_exhausted() && self.inner.window().is_empty() {
                return Ok(false);
            }

            // Discard the validated prefix to free buffer space, then pull
            // more context for the evaluator.
            self.inner.consume(self.validated);
            self.validated = 0;

            let had = self.inner.window().len();
            self.inner.fill()?;
            self.revalidate();

            if !self.end_found && self.validated == 0 && self.inner.window().len() == had {
                if self.inner.window().is_empty() {
                    // Exhausted and fully drained.
                    return Ok(false);
                }
                return buffer_too_small_error("buffer insufficient for detecting end of part");
            }
        }
    }
}

impl<S: BufferedSource, E: PartEvaluator> BufferedSource for PartitionedSource<S, E> {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline(always)]
    fn window(&self) -> &[u8] {
        &self.inner.window()[..self.validated]
    }

    fn is_exhausted(&self) -> bool {
        self.end_found
            || (self.inner.is_exhausted() && self.validated == self.inner.window().len())
    }

    fn fill(&mut self) -> Result<usize> {
        if self.end_found {
            return Ok(self.validated);
        }

        loop {
            let had = self.inner.window().len();
            self.inner.fill()?;
            self.revalidate();

            if self.validated > 0 || self.is_exhausted() {
                break;
            }

            if self.inner.window().len() == had {
                // The evaluator needs more context than the buffer can hold.
                break;
            }
        }

        Ok(self.validated)
    }

    fn consume(&mut self, size: usize) {
        assert!(size <= self.validated, "consumed size exceeds the window");
        self.inner.consume(size);
        self.validated -= size;
    }
}
