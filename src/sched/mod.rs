// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Cooperative Scheduling
//!
//! Single-threaded, non-preemptive scheduling of step-based tasks.
//!
//! A task is any type implementing [`Task`]. The [`Scheduler`] calls [`Task::step`] whenever the
//! task's period has elapsed, one task per [`Scheduler::poll`], highest priority first. A step does
//! one bounded unit of work and returns; returning is the yield point.
//!
//! ## Modules
//!
//! - [`scheduler`] - Priority/period scheduler with per-task profiling.
//! - [`share`] - Inter-task [`Share`] and [`Queue`] with a type-level protection policy.

use core::fmt;
use core::ops::ControlFlow;

pub mod scheduler;
pub mod share;

pub use scheduler::Scheduler;
pub use share::{Overflow, Protected, Queue, QueueFull, Share, Unprotected};

/// What a task sees while it runs one step.
pub struct Context<'a> {
    /// Scheduler time in milliseconds (wrapping).
    pub now_ms: u32,
    /// Console / telemetry stream.
    pub out: &'a mut dyn fmt::Write,
}

/// A cooperatively scheduled task.
pub trait Task {
    /// Run one unit of work.
    ///
    /// `Continue` yields back to the scheduler. `Break` asks the scheduler to stop.
    fn step(&mut self, cx: &mut Context<'_>) -> ControlFlow<()>;
}

/// Errors returned by [`Scheduler::add`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedError {
    /// The task table is full.
    Full,
    /// A period of zero milliseconds was requested.
    ZeroPeriod,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::Full => f.write_str("task table full"),
            SchedError::ZeroPeriod => f.write_str("task period must be nonzero"),
        }
    }
}
