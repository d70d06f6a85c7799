//! Reader/writer lock around a `Buffer`, independent of `std::sync::RwLock`
//! so the state machine can expose `reduce_writing_to_reading` and
//! `increase_reading_to_writing` - upgrade/downgrade operations the
//! standard library's `RwLock` has no way to express.
//!
//! `active_state` packs the whole lock state into one integer: `0` means
//! unlocked, `1` means a writer holds it, and any value `>= 2` is `N`
//! readers (`READER_0 = 2`, so `active_state - READER_0` readers are
//! active). A `Mutex` + `Condvar` protect transitions between states;
//! nothing about the byte layout is load-bearing the way it is in the
//! original, but the three-way state keeps a single word of bookkeeping
//! instead of a separate writer flag and reader count that could
//! disagree.

use crate::buffer::Buffer;
use std::cell::UnsafeCell;
use std::sync::{Arc, Condvar, Mutex, Weak};

const UNLOCKED: u32 = 0;
const LOCKED_WRITING: u32 = 1;
const READER_0: u32 = 2;

struct State {
    waiters_count: u32,
    active_state: u32,
}

pub struct BufferHandle {
    state: Mutex<State>,
    condvar: Condvar,
    buffer: UnsafeCell<Buffer>,
}

// SAFETY: all access to `buffer` is mediated by the `active_state` state
// machine in `state`, which enforces the same exclusion a `RwLock` would.
unsafe impl Sync for BufferHandle {}
unsafe impl Send for BufferHandle {}

#[cfg(debug_assertions)]
thread_local! {
    static HELD_WRITE_LOCKS: std::cell::RefCell<Vec<usize>> = std::cell::RefCell::new(Vec::new());
}

fn handle_key(handle: &BufferHandle) -> usize {
    handle as *const BufferHandle as usize
}

impl BufferHandle {
    pub fn new(buffer: Buffer) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State { waiters_count: 0, active_state: UNLOCKED }),
            condvar: Condvar::new(),
            buffer: UnsafeCell::new(buffer),
        })
    }

    /// Locks for exclusive read+write access, blocking until no reader or
    /// writer holds the lock.
    pub fn lock_writing(self: &Arc<Self>) -> WriteGuard {
        #[cfg(debug_assertions)]
        self.debug_assert_not_reentrant();

        let mut guard = self.state.lock().unwrap();
        guard.waiters_count += 1;
        while guard.active_state != UNLOCKED {
            guard = self.condvar.wait(guard).unwrap();
        }
        guard.waiters_count -= 1;
        guard.active_state = LOCKED_WRITING;
        drop(guard);

        #[cfg(debug_assertions)]
        self.debug_push_write_lock();

        WriteGuard { handle: self.clone() }
    }

    /// Locks for shared read access, blocking until no writer holds the
    /// lock. Unlike `try_lock_reading`, does not defer to pending writers:
    /// once a reader is admitted, every other `lock_reading` call piles on
    /// rather than waiting its turn.
    pub fn lock_reading(self: &Arc<Self>) -> ReadGuard {
        let mut guard = self.state.lock().unwrap();
        guard.waiters_count += 1;
        while guard.active_state == LOCKED_WRITING {
            guard = self.condvar.wait(guard).unwrap();
        }
        guard.waiters_count -= 1;

        if guard.active_state == UNLOCKED {
            guard.active_state = READER_0;
            self.condvar.notify_all();
        } else {
            guard.active_state += 1;
        }
        drop(guard);

        ReadGuard { handle: self.clone() }
    }

    /// Locks for shared read access without blocking: fails if a writer
    /// holds the lock, or if a writer is waiting (so a flood of readers
    /// via `try_lock_reading` can't starve a pending writer indefinitely).
    pub fn try_lock_reading(self: &Arc<Self>) -> Option<ReadGuard> {
        let mut guard = self.state.lock().unwrap();

        if guard.active_state == LOCKED_WRITING {
            return None;
        }
        if guard.waiters_count > 0 {
            self.condvar.notify_one();
            return None;
        }

        if guard.active_state == UNLOCKED {
            guard.active_state = READER_0;
        } else {
            guard.active_state += 1;
        }
        drop(guard);

        Some(ReadGuard { handle: self.clone() })
    }

    fn unlock(&self) {
        let mut guard = self.state.lock().unwrap();
        debug_assert_ne!(guard.active_state, UNLOCKED);
        if guard.active_state <= READER_0 {
            guard.active_state = UNLOCKED;
            self.condvar.notify_one();
        } else {
            guard.active_state -= 1;
        }
    }

    /// Panics if this thread already holds any write lock: on this same
    /// handle (which would deadlock against itself) or on a different one
    /// (which would violate the single-writer-at-a-time ordering the
    /// concurrency model relies on to rule out lock-order deadlocks across
    /// buffers).
    #[cfg(debug_assertions)]
    fn debug_assert_not_reentrant(&self) {
        HELD_WRITE_LOCKS.with(|locks| {
            let locks = locks.borrow();
            if locks.contains(&handle_key(self)) {
                panic!("BufferHandle::lock_writing: this thread already holds this buffer's lock, which would deadlock");
            }
            if !locks.is_empty() {
                panic!("BufferHandle::lock_writing: this thread already holds a write lock on another buffer");
            }
        });
    }

    #[cfg(debug_assertions)]
    fn debug_push_write_lock(&self) {
        HELD_WRITE_LOCKS.with(|locks| locks.borrow_mut().push(handle_key(self)));
    }

    #[cfg(debug_assertions)]
    fn debug_pop_write_lock(&self) {
        HELD_WRITE_LOCKS.with(|locks| {
            let mut locks = locks.borrow_mut();
            if let Some(pos) = locks.iter().rposition(|&k| k == handle_key(self)) {
                locks.remove(pos);
            }
        });
    }
}

/// An exclusive handle on the underlying `Buffer`.
pub struct WriteGuard {
    handle: Arc<BufferHandle>,
}

impl std::ops::Deref for WriteGuard {
    type Target = Buffer;
    fn deref(&self) -> &Buffer {
        unsafe { &*self.handle.buffer.get() }
    }
}

impl std::ops::DerefMut for WriteGuard {
    fn deref_mut(&mut self) -> &mut Buffer {
        unsafe { &mut *self.handle.buffer.get() }
    }
}

impl WriteGuard {
    pub fn downgrade(self) -> ReadGuard {
        let mut guard = self.handle.state.lock().unwrap();
        debug_assert_eq!(guard.active_state, LOCKED_WRITING);
        guard.active_state = READER_0;
        self.handle.condvar.notify_all();
        drop(guard);

        #[cfg(debug_assertions)]
        self.handle.debug_pop_write_lock();

        let handle = self.handle.clone();
        std::mem::forget(self);
        ReadGuard { handle }
    }

    pub fn downgrade_handle(&self) -> Weak<BufferHandle> {
        Arc::downgrade(&self.handle)
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.handle.debug_pop_write_lock();
        self.handle.unlock();
    }
}

/// A shared, read-only handle on the underlying `Buffer`. Other readers may
/// hold the same lock concurrently.
pub struct ReadGuard {
    handle: Arc<BufferHandle>,
}

impl std::ops::Deref for ReadGuard {
    type Target = Buffer;
    fn deref(&self) -> &Buffer {
        unsafe { &*self.handle.buffer.get() }
    }
}

impl ReadGuard {
    /// Upgrades to a write lock. If other readers are present, releases
    /// this read lock and waits in line for exclusive access like
    /// `lock_writing`, so another writer may run in between - callers must
    /// treat the buffer as possibly changed out from under them, the same
    /// way a compare-and-swap loop would.
    pub fn upgrade(self) -> WriteGuard {
        let handle = self.handle.clone();
        std::mem::forget(self);

        let mut guard = handle.state.lock().unwrap();
        debug_assert!(guard.active_state >= READER_0);

        if guard.active_state == READER_0 {
            guard.active_state = LOCKED_WRITING;
        } else {
            guard.active_state -= 1;

            guard.waiters_count += 1;
            while guard.active_state != UNLOCKED {
                guard = handle.condvar.wait(guard).unwrap();
            }
            guard.waiters_count -= 1;
            guard.active_state = LOCKED_WRITING;
        }
        drop(guard);

        #[cfg(debug_assertions)]
        handle.debug_push_write_lock();

        WriteGuard { handle }
    }

    pub fn downgrade_handle(&self) -> Weak<BufferHandle> {
        Arc::downgrade(&self.handle)
    }
}

impl Drop for ReadGuard {
    fn drop(&mut self) {
        self.handle.unlock();
    }
}

#[cfg(test)]
#[path = "buffer_handle_tests.rs"]
mod tests;
