// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Unbounded position tracking on top of a wrapping quadrature counter.
//!
//! The timer counts `0..M` and wraps in both directions. Each [`EncoderTracker::read`] takes the
//! signed difference from the previous sample and folds it back into `(-M/2, M/2)`, so the
//! accumulated position stays continuous across wraps.
//!
//! The correction is only valid while the shaft moves less than `M/2` counts between two reads.
//! Past that the delta aliases and the position silently drifts, so the sample period has to be
//! chosen against the fastest expected encoder speed.

/// Counter modulus of the encoder timers (`ARR = 16000`).
pub const COUNTER_MODULUS: u32 = 16_001;

/// A hardware counter in quadrature decode mode.
pub trait QuadratureCounter {
    /// Current raw count, in `0..modulus()`.
    fn count(&self) -> u32;

    /// Number of distinct counter values before the counter wraps.
    fn modulus(&self) -> u32 {
        COUNTER_MODULUS
    }
}

impl<C: QuadratureCounter + ?Sized> QuadratureCounter for &C {
    fn count(&self) -> u32 {
        (**self).count()
    }

    fn modulus(&self) -> u32 {
        (**self).modulus()
    }
}

/// Converts a wrapping counter into a signed, unbounded position in encoder counts.
pub struct EncoderTracker<C> {
    counter: C,
    modulus: i32,
    raw: i32,
    previous_raw: i32,
    delta: i32,
    position: i64,
}

impl<C: QuadratureCounter> EncoderTracker<C> {
    /// Wrap a counter. The current count becomes the reference for the first delta.
    pub fn new(counter: C) -> Self {
        let modulus = counter.modulus() as i32;
        let raw = counter.count() as i32;
        Self {
            counter,
            modulus,
            raw,
            previous_raw: raw,
            delta: 0,
            position: 0,
        }
    }

    /// Sample the counter and accumulate the corrected delta. Returns the new position.
    pub fn read(&mut self) -> i64 {
        self.raw = self.counter.count() as i32;
        self.delta = self.corrected(self.raw - self.previous_raw);
        self.position += i64::from(self.delta);
        self.previous_raw = self.raw;
        self.position
    }

    /// Reset position and delta to zero.
    ///
    /// The hardware counter keeps running, so the reference is re-latched from its live value
    /// rather than set to zero.
    pub fn zero(&mut self) {
        self.raw = self.counter.count() as i32;
        self.previous_raw = self.raw;
        self.delta = 0;
        self.position = 0;
    }

    #[inline]
    fn corrected(&self, delta: i32) -> i32 {
        let half = (self.modulus + 1) / 2;
        if delta <= -half {
            delta + self.modulus
        } else if delta >= half {
            delta - self.modulus
        } else {
            delta
        }
    }

    /// Accumulated position in encoder counts.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Corrected delta of the last read.
    #[inline]
    pub fn delta(&self) -> i32 {
        self.delta
    }

    /// Raw counter value of the last sample.
    #[inline]
    pub fn raw(&self) -> u32 {
        self.raw as u32
    }

    #[inline]
    pub fn modulus(&self) -> u32 {
        self.modulus as u32
    }

    /// Consume the tracker and return the underlying counter.
    pub fn free(self) -> C {
        self.counter
    }
}
