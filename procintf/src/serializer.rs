//! Access serializer: the single lock in front of the store.
//!
//! Acquisition takes the caller into account. An uncontended lock is taken
//! immediately; a contended one is waited for in short slices, and the
//! caller's [`Interrupt`] is checked between slices. A raised interrupt ends
//! the wait with `LockInterrupted` before the protected value is touched.
//!
//! The guard is the only path to the protected value and releases the lock
//! when dropped, so every early return releases it too.

use nix::unistd::{getgid, getpid, gettid, getuid};
use parking_lot::{Mutex, MutexGuard};
use procintf_common::error::{IntfError, IntfResult};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Interval between interrupt checks while waiting for the lock.
pub const WAIT_SLICE: Duration = Duration::from_millis(2);

/// Pending-interrupt flag of a calling context.
///
/// Clones share the flag, so a signal handler or another thread can
/// interrupt a caller blocked in [`AccessSerializer::lock_interruptible`].
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// New, not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an interrupt as pending.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Drop any pending interrupt.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// True while an interrupt is pending.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consume a pending interrupt.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Identity of the context calling into an endpoint.
#[derive(Debug, Clone)]
pub struct Caller {
    /// Process id
    pub pid: i32,
    /// Thread id
    pub tid: i32,
    /// Real uid
    pub uid: u32,
    /// Real gid
    pub gid: u32,
    /// Command name
    pub comm: String,
    interrupt: Interrupt,
}

impl Caller {
    /// Caller with explicit credentials, sharing this process' pid/tid.
    pub fn new(uid: u32, gid: u32) -> Self {
        Self {
            pid: getpid().as_raw(),
            tid: gettid().as_raw(),
            uid,
            gid,
            comm: current_comm(),
            interrupt: Interrupt::new(),
        }
    }

    /// The calling thread with its real credentials.
    pub fn current() -> Self {
        Self::new(getuid().as_raw(), getgid().as_raw())
    }

    /// Root caller.
    pub fn root() -> Self {
        Self::new(0, 0)
    }

    /// Same identity, delivering interrupts through `interrupt`.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Interrupt handle of this caller.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }
}

fn current_comm() -> String {
    std::fs::read_to_string("/proc/self/comm")
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string())
}

/// Lock accounting.
#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicU64,
    released: AtomicU64,
    contended: AtomicU64,
    interrupted: AtomicU64,
}

/// Copy of the lock counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerStats {
    /// Successful acquisitions
    pub acquired: u64,
    /// Guards dropped
    pub released: u64,
    /// Acquisitions that had to wait
    pub contended: u64,
    /// Waits ended by an interrupt
    pub interrupted: u64,
}

/// Mutual exclusion around a value with interruptible acquisition.
#[derive(Debug)]
pub struct AccessSerializer<T> {
    inner: Mutex<T>,
    counters: Counters,
}

impl<T> AccessSerializer<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
            counters: Counters::default(),
        }
    }

    /// Acquire, giving up with `LockInterrupted` if `caller` is interrupted
    /// while waiting.
    pub fn lock_interruptible(&self, caller: &Caller) -> IntfResult<SerializerGuard<'_, T>> {
        if let Some(guard) = self.inner.try_lock() {
            return Ok(self.wrap(guard));
        }
        self.counters.contended.fetch_add(1, Ordering::Relaxed);
        loop {
            if caller.interrupt().take() {
                self.counters.interrupted.fetch_add(1, Ordering::Relaxed);
                debug!(pid = caller.pid, tid = caller.tid, "lock wait interrupted");
                return Err(IntfError::LockInterrupted);
            }
            if let Some(guard) = self.inner.try_lock_for(WAIT_SLICE) {
                return Ok(self.wrap(guard));
            }
        }
    }

    /// Acquire without honouring interrupts; used on teardown.
    pub fn lock(&self) -> SerializerGuard<'_, T> {
        let guard = self.inner.lock();
        self.wrap(guard)
    }

    /// Lock counters so far.
    pub fn stats(&self) -> SerializerStats {
        SerializerStats {
            acquired: self.counters.acquired.load(Ordering::Relaxed),
            released: self.counters.released.load(Ordering::Relaxed),
            contended: self.counters.contended.load(Ordering::Relaxed),
            interrupted: self.counters.interrupted.load(Ordering::Relaxed),
        }
    }

    fn wrap<'a>(&'a self, guard: MutexGuard<'a, T>) -> SerializerGuard<'a, T> {
        self.counters.acquired.fetch_add(1, Ordering::Relaxed);
        SerializerGuard {
            guard,
            released: &self.counters.released,
        }
    }
}

/// Proof that the serializer is held.
pub struct SerializerGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    released: &'a AtomicU64,
}

impl<T> Deref for SerializerGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for SerializerGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for SerializerGuard<'_, T> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn uncontended_lock_ignores_pending_interrupt() {
        let s = AccessSerializer::new(0u32);
        let caller = Caller::root();
        caller.interrupt().raise();
        let g = s.lock_interruptible(&caller).unwrap();
        assert_eq!(*g, 0);
        drop(g);
        assert!(caller.interrupt().is_raised());
    }

    #[test]
    fn interrupted_waiter_gets_lock_interrupted() {
        let s = Arc::new(AccessSerializer::new(0u32));
        let holder = s.lock();

        let caller = Caller::root();
        let interrupt = caller.interrupt().clone();
        let s2 = Arc::clone(&s);
        let waiter = thread::spawn(move || s2.lock_interruptible(&caller).map(|_| ()));

        thread::sleep(Duration::from_millis(20));
        interrupt.raise();
        let result = waiter.join().unwrap();
        assert_eq!(result, Err(IntfError::LockInterrupted));
        // The interrupt was consumed by the failed wait.
        assert!(!interrupt.is_raised());

        drop(holder);
        let stats = s.stats();
        assert_eq!(stats.interrupted, 1);
        assert_eq!(stats.acquired, stats.released);
    }

    #[test]
    fn waiter_proceeds_after_release() {
        let s = Arc::new(AccessSerializer::new(0u32));
        let barrier = Arc::new(Barrier::new(2));
        let s2 = Arc::clone(&s);
        let b2 = Arc::clone(&barrier);
        let holder = thread::spawn(move || {
            let mut g = s2.lock();
            b2.wait();
            thread::sleep(Duration::from_millis(10));
            *g += 1;
        });
        barrier.wait();
        let mut g = s.lock_interruptible(&Caller::root()).unwrap();
        *g += 1;
        drop(g);
        holder.join().unwrap();

        assert_eq!(*s.lock(), 2);
    }

    #[test]
    fn guards_are_counted() {
        let s = AccessSerializer::new(());
        for _ in 0..5 {
            let _g = s.lock_interruptible(&Caller::root()).unwrap();
        }
        let stats = s.stats();
        assert_eq!(stats.acquired, 5);
        assert_eq!(stats.released, 5);
        assert_eq!(stats.contended, 0);
    }
}
