// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Priority scheduler for step-based tasks.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! let mut sched: Scheduler<4> = Scheduler::new();
//! sched.add("motor1", 2, 10, &mut motor1)?;
//! sched.add("motor2", 1, 15, &mut motor2)?;
//!
//! while sched.poll(now_ms(), &mut console).is_continue() {}
//! ```
//!
//! Rules:
//! - a larger `priority` value runs first;
//! - a task is ready once its period has elapsed, and on the very first poll;
//! - one ready task runs per [`poll`](Scheduler::poll), ties rotate round-robin;
//! - a task that falls a whole period behind is counted late and rescheduled from `now`.

use core::fmt;
use core::ops::ControlFlow;
use core::slice;

use heapless::Vec;

use super::{Context, SchedError, Task};

struct Entry<'a> {
    name: &'static str,
    priority: u8,
    period_ms: u32,
    next_run_ms: u32,
    started: bool,
    runs: u32,
    late: u32,
    task: &'a mut dyn Task,
}

impl Entry<'_> {
    #[inline]
    fn ready(&self, now_ms: u32) -> bool {
        !self.started || reached(now_ms, self.next_run_ms)
    }

    fn advance(&mut self, now_ms: u32) {
        if !self.started {
            self.started = true;
            self.next_run_ms = now_ms;
        }
        self.next_run_ms = self.next_run_ms.wrapping_add(self.period_ms);
        if reached(now_ms, self.next_run_ms) {
            self.late += 1;
            self.next_run_ms = now_ms.wrapping_add(self.period_ms);
        }
        self.runs += 1;
    }

    fn stats(&self) -> TaskStats {
        TaskStats {
            name: self.name,
            priority: self.priority,
            period_ms: self.period_ms,
            runs: self.runs,
            late: self.late,
        }
    }
}

/// `now` is at or past `deadline` on a wrapping millisecond clock.
#[inline]
fn reached(now_ms: u32, deadline_ms: u32) -> bool {
    (now_ms.wrapping_sub(deadline_ms) as i32) >= 0
}

/// Profiling counters for one registered task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TaskStats {
    pub name: &'static str,
    pub priority: u8,
    pub period_ms: u32,
    pub runs: u32,
    pub late: u32,
}

/// Iterator returned by [`Scheduler::stats`].
pub struct Stats<'s, 'a> {
    entries: slice::Iter<'s, Entry<'a>>,
}

impl Iterator for Stats<'_, '_> {
    type Item = TaskStats;

    fn next(&mut self) -> Option<TaskStats> {
        self.entries.next().map(Entry::stats)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Stats<'_, '_> {}

/// Cooperative scheduler holding up to `N` tasks.
pub struct Scheduler<'a, const N: usize> {
    entries: Vec<Entry<'a>, N>,
    rotation: usize,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            rotation: 0,
        }
    }

    /// Register a task with its name, priority and period.
    pub fn add(
        &mut self,
        name: &'static str,
        priority: u8,
        period_ms: u32,
        task: &'a mut dyn Task,
    ) -> Result<(), SchedError> {
        if period_ms == 0 {
            return Err(SchedError::ZeroPeriod);
        }
        self.entries
            .push(Entry {
                name,
                priority,
                period_ms,
                next_run_ms: 0,
                started: false,
                runs: 0,
                late: 0,
                task,
            })
            .map_err(|_| SchedError::Full)
    }

    /// Run the highest-priority ready task, if any.
    ///
    /// Returns `Break` only when the task that ran asked the scheduler to stop.
    pub fn poll(&mut self, now_ms: u32, out: &mut dyn fmt::Write) -> ControlFlow<()> {
        let Some(idx) = self.pick(now_ms) else {
            return ControlFlow::Continue(());
        };
        self.rotation = idx + 1;

        let entry = &mut self.entries[idx];
        entry.advance(now_ms);

        let mut cx = Context { now_ms, out };
        entry.task.step(&mut cx)
    }

    fn pick(&self, now_ms: u32) -> Option<usize> {
        let len = self.entries.len();
        let mut best: Option<usize> = None;

        for k in 0..len {
            let idx = (self.rotation + k) % len;
            let entry = &self.entries[idx];
            if !entry.ready(now_ms) {
                continue;
            }
            match best {
                Some(b) if self.entries[b].priority >= entry.priority => {}
                _ => best = Some(idx),
            }
        }
        best
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Profiling counters, in registration order.
    pub fn stats(&self) -> Stats<'_, 'a> {
        Stats {
            entries: self.entries.iter(),
        }
    }
}

impl<const N: usize> Default for Scheduler<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Display for Scheduler<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16}{:>5}{:>8}{:>10}{:>7}\r\n", "TASK", "PRI", "PERIOD", "RUNS", "LATE")?;
        for s in self.stats() {
            write!(
                f,
                "{:<16}{:>5}{:>8}{:>10}{:>7}\r\n",
                s.name, s.priority, s.period_ms, s.runs, s.late
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::string::String;
    use std::vec::Vec as StdVec;

    struct Recorder<'a> {
        name: &'static str,
        log: &'a RefCell<StdVec<&'static str>>,
        stop_after: Option<u32>,
        steps: u32,
    }

    impl<'a> Recorder<'a> {
        fn new(name: &'static str, log: &'a RefCell<StdVec<&'static str>>) -> Self {
            Self {
                name,
                log,
                stop_after: None,
                steps: 0,
            }
        }
    }

    impl Task for Recorder<'_> {
        fn step(&mut self, _cx: &mut Context<'_>) -> ControlFlow<()> {
            self.log.borrow_mut().push(self.name);
            self.steps += 1;
            match self.stop_after {
                Some(n) if self.steps >= n => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        }
    }

    #[test]
    fn higher_priority_runs_first() {
        let log = RefCell::new(StdVec::new());
        let mut low = Recorder::new("low", &log);
        let mut high = Recorder::new("high", &log);
        let mut out = String::new();

        let mut sched: Scheduler<4> = Scheduler::new();
        sched.add("low", 1, 15, &mut low).unwrap();
        sched.add("high", 2, 10, &mut high).unwrap();

        assert!(sched.poll(0, &mut out).is_continue());
        assert!(sched.poll(0, &mut out).is_continue());
        assert!(sched.poll(0, &mut out).is_continue());
        drop(sched);

        assert_eq!(*log.borrow(), ["high", "low"]);
    }

    #[test]
    fn tasks_run_once_per_period() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut b = Recorder::new("b", &log);
        let mut out = String::new();

        let mut sched: Scheduler<2> = Scheduler::new();
        sched.add("a", 2, 10, &mut a).unwrap();
        sched.add("b", 1, 15, &mut b).unwrap();

        for now in 0..=30 {
            // Drain everything that is due at this tick.
            for _ in 0..3 {
                let _ = sched.poll(now, &mut out);
            }
        }

        let runs: StdVec<u32> = sched.stats().map(|s| s.runs).collect();
        assert_eq!(runs, [4, 3]); // a: 0,10,20,30  b: 0,15,30
        assert!(sched.stats().all(|s| s.late == 0));
    }

    #[test]
    fn equal_priorities_rotate() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut b = Recorder::new("b", &log);
        let mut out = String::new();

        let mut sched: Scheduler<2> = Scheduler::new();
        sched.add("a", 1, 1, &mut a).unwrap();
        sched.add("b", 1, 1, &mut b).unwrap();

        for now in 0..3 {
            let _ = sched.poll(now, &mut out);
            let _ = sched.poll(now, &mut out);
        }
        drop(sched);

        assert_eq!(*log.borrow(), ["a", "b", "a", "b", "a", "b"]);
    }

    #[test]
    fn late_task_is_rescheduled_from_now() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut out = String::new();

        let mut sched: Scheduler<1> = Scheduler::new();
        sched.add("a", 1, 10, &mut a).unwrap();

        let _ = sched.poll(0, &mut out);
        let _ = sched.poll(35, &mut out);
        let _ = sched.poll(40, &mut out);
        let _ = sched.poll(45, &mut out);

        let s = sched.stats().next().unwrap();
        assert_eq!(s.runs, 3);
        assert_eq!(s.late, 1);
    }

    #[test]
    fn ready_check_survives_clock_wrap() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut out = String::new();

        let mut sched: Scheduler<1> = Scheduler::new();
        sched.add("a", 1, 10, &mut a).unwrap();

        let start = u32::MAX - 4;
        let _ = sched.poll(start, &mut out);
        let _ = sched.poll(start.wrapping_add(9), &mut out);
        let _ = sched.poll(start.wrapping_add(10), &mut out);

        assert_eq!(sched.stats().next().unwrap().runs, 2);
    }

    #[test]
    fn break_from_task_stops_polling() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        a.stop_after = Some(2);
        let mut out = String::new();

        let mut sched: Scheduler<1> = Scheduler::new();
        sched.add("a", 1, 1, &mut a).unwrap();

        assert!(sched.poll(0, &mut out).is_continue());
        assert!(sched.poll(1, &mut out).is_break());
    }

    #[test]
    fn add_rejects_full_table_and_zero_period() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut b = Recorder::new("b", &log);
        let mut c = Recorder::new("c", &log);

        let mut sched: Scheduler<1> = Scheduler::new();
        assert_eq!(sched.add("c", 1, 0, &mut c), Err(SchedError::ZeroPeriod));
        sched.add("a", 1, 10, &mut a).unwrap();
        assert_eq!(sched.add("b", 1, 10, &mut b), Err(SchedError::Full));
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn stats_follow_registration_order() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut b = Recorder::new("b", &log);
        let mut out = String::new();

        let mut sched: Scheduler<2> = Scheduler::new();
        sched.add("low", 1, 10, &mut a).unwrap();
        sched.add("high", 2, 10, &mut b).unwrap();
        let _ = sched.poll(0, &mut out);

        let stats = sched.stats();
        assert_eq!(stats.len(), 2);
        let names: StdVec<(&str, u32)> = stats.map(|s| (s.name, s.runs)).collect();
        assert_eq!(names, [("low", 0), ("high", 1)]);
    }

    #[test]
    fn display_lists_every_task() {
        let log = RefCell::new(StdVec::new());
        let mut a = Recorder::new("a", &log);
        let mut out = String::new();

        let mut sched: Scheduler<1> = Scheduler::new();
        sched.add("Motor_1", 2, 10, &mut a).unwrap();
        let _ = sched.poll(0, &mut out);

        let table = std::format!("{sched}");
        assert!(table.starts_with("TASK"));
        assert!(table.contains("Motor_1"));
        assert_eq!(table.lines().count(), 2);
    }
}
