// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Inter-task data sharing.
//!
//! - [`Share`] holds a single value that one task writes and others read.
//! - [`Queue`] is a bounded FIFO with a configurable [`Overflow`] policy.
//!
//! Both take a raw mutex as their protection policy:
//!
//! - [`Unprotected`] (`NoopRawMutex`) does no locking. The container is `!Sync`, so the compiler
//!   only lets it be used from the one execution context that owns it, which is the cooperative
//!   scheduler.
//! - [`Protected`] (`CriticalSectionRawMutex`) wraps every access in a critical section, and the
//!   container is `Sync`, so it can be placed in a `static` and touched from interrupt handlers.

use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

pub use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex as Protected;
pub use embassy_sync::blocking_mutex::raw::NoopRawMutex as Unprotected;

// ── Share ─────────────────────────────────────────────────────────────────────

/// A single shared value.
pub struct Share<T, M: RawMutex = Unprotected> {
    name: &'static str,
    value: Mutex<M, RefCell<T>>,
}

impl<T: Copy, M: RawMutex> Share<T, M> {
    pub const fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            value: Mutex::new(RefCell::new(initial)),
        }
    }

    /// Overwrite the shared value.
    pub fn put(&self, value: T) {
        self.value.lock(|v| *v.borrow_mut() = value);
    }

    /// Read the shared value.
    pub fn get(&self) -> T {
        self.value.lock(|v| *v.borrow())
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Copy + fmt::Display, M: RawMutex> fmt::Display for Share<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16} share  {}", self.name, self.get())
    }
}

// ── Queue ─────────────────────────────────────────────────────────────────────

/// What [`Queue::put`] does when the queue is full.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Overflow {
    /// Refuse the new item and hand it back.
    Reject,
    /// Drop the oldest item to make room.
    Overwrite,
}

/// Returned by [`Queue::put`] when the queue is full under [`Overflow::Reject`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("queue full")
    }
}

/// Bounded FIFO of up to `N` items.
pub struct Queue<T, const N: usize, M: RawMutex = Unprotected> {
    name: &'static str,
    overflow: Overflow,
    items: Mutex<M, RefCell<Deque<T, N>>>,
}

impl<T, const N: usize, M: RawMutex> Queue<T, N, M> {
    pub const fn new(name: &'static str, overflow: Overflow) -> Self {
        Self {
            name,
            overflow,
            items: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    #[inline]
    fn with<R>(&self, f: impl FnOnce(&mut Deque<T, N>) -> R) -> R {
        self.items.lock(|q| f(&mut *q.borrow_mut()))
    }

    /// Append an item.
    ///
    /// Under [`Overflow::Overwrite`] the evicted item is dropped after the queue is released, so
    /// its destructor may use the queue again.
    pub fn put(&self, item: T) -> Result<(), QueueFull<T>> {
        let overflow = self.overflow;
        let (result, evicted) = self.with(|q| {
            let evicted = if q.is_full() && overflow == Overflow::Overwrite {
                q.pop_front()
            } else {
                None
            };
            (q.push_back(item).map_err(QueueFull), evicted)
        });
        drop(evicted);
        result
    }

    /// Remove the oldest item.
    pub fn get(&self) -> Option<T> {
        self.with(|q| q.pop_front())
    }

    pub fn len(&self) -> usize {
        self.with(|q| q.len())
    }

    pub fn is_empty(&self) -> bool {
        self.with(|q| q.is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.with(|q| q.is_full())
    }

    /// Remove every item. The items are dropped after the queue is released.
    pub fn clear(&self) {
        let drained = self.with(core::mem::take);
        drop(drained);
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T, const N: usize, M: RawMutex> fmt::Display for Queue<T, N, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16} queue  {}/{}", self.name, self.len(), N)
    }
}
