// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Proportional position controller.
//!
//! Works in `no_std` and does not allocate memory.

/// P-only controller: `output = gain * (setpoint - measured)`.
///
/// There is no integral or derivative term and no output clamping. The output is a duty-cycle
/// percentage that can be larger than 100 for large errors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Proportional {
    /// Target position in encoder counts
    setpoint: i64,
    /// Proportional gain, percent of full drive per count of error
    gain: f32,

    /// Last computed output
    output: f32,
}

impl Proportional {
    pub fn new(setpoint: i64, gain: f32) -> Self {
        Self {
            setpoint,
            gain,
            output: 0.0,
        }
    }

    /// Compute the actuation level for a measured position.
    pub fn run(&mut self, measured: i64) -> f32 {
        let error = self.setpoint.saturating_sub(measured) as f32;
        self.output = self.gain * error;
        self.output
    }

    /// Replace the setpoint. Takes effect on the next [`run`](Self::run).
    #[inline]
    pub fn set_setpoint(&mut self, setpoint: i64) {
        self.setpoint = setpoint;
    }

    /// Replace the gain. Takes effect on the next [`run`](Self::run).
    #[inline]
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    #[inline]
    pub fn setpoint(&self) -> i64 {
        self.setpoint
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Output of the last [`run`](Self::run), `0.0` before the first call.
    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }
}
