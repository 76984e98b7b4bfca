// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::errors::Result;

use super::BufferedSource;

/// A `ScopedSource` restricts the number of bytes read from an inner source
/// to a specified limit.
///
/// The limit is split between the bytes currently visible at the head of the
/// inner window and a reservoir of bytes still owed from upstream. The source
/// is exhausted once the reservoir drains or the inner source exhausts,
/// whichever comes first.
pub struct ScopedSource<S: BufferedSource> {
    inner: S,
    /// The total number of bytes this source may expose.
    limit: u64,
    /// Visible bytes at the head of the inner window.
    in_window: usize,
    /// Bytes still owed beyond the window.
    reservoir: u64,
}

impl<S: BufferedSource> ScopedSource<S> {
    /// Instantiates a new `ScopedSource` exposing at most `limit` bytes of
    /// `inner`.
    pub fn new(inner: S, limit: u64) -> Self {
        let mut source = ScopedSource { inner, limit, in_window: 0, reservoir: 0 };
        source.update_limits(limit);
        source
    }

    /// Returns an immutable reference to the inner source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner source.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Convert the `ScopedSource` to the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Returns the limit this source was created with.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the number of bytes still available, buffered or upstream.
    pub fn bytes_remaining(&self) -> u64 {
        self.in_window as u64 + self.reservoir
    }

    /// Splits `total` remaining bytes into the visible window portion and the
    /// upstream reservoir.
    fn update_limits(&mut self, total: u64) {
        let available = self.inner.window().len() as u64;

        if total > available {
            self.in_window = self.inner.window().len();
            self.reservoir = total - available;
        }
        else {
            self.in_window = total as usize;
            self.reservoir = 0;
        }
    }
}

impl<S: BufferedSource> BufferedSource for ScopedSource<S> {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline(always)]
    fn window(&self) -> &[u8] {
        &self.inner.window()[..self.in_window]
    }

    #[inline(always)]
    fn is_exhausted(&self) -> bool {
        self.reservoir == 0 || self.inner.is_exhausted()
    }

    fn fill(&mut self) -> Result<usize> {
        let total = self.bytes_remaining();

        if self.reservoir > 0 && !self.inner.is_exhausted() {
            self.inner.fill()?;
        }

        self.update_limits(total);

        Ok(self.in_window)
    }

    fn consume(&mut self, size: usize) {
        assert!(size <= self.in_window, "consumed size exceeds the window");
        self.inner.consume(size);
        self.in_window -= size;
    }

    fn skip_bytes(&mut self, count: u64) -> Result<u64> {
        let total = self.bytes_remaining();

        if count < total {
            // Lean on the inner source's own fast path, then recompute the
            // window and reservoir split from what it reports.
            let skipped = self.inner.skip_bytes(count)?;
            self.update_limits(total - skipped);
            Ok(skipped)
        }
        else {
            // The caller asked for everything this source may still expose.
            let skipped = self.inner.skip_bytes(total)?;
            self.in_window = 0;
            self.reservoir = 0;
            Ok(skipped)
        }
    }
}
