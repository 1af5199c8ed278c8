//! A module which decides which synchronization primitives to use throughout the rest of the crate
//! depending on features and configuration options

use std::sync::{LockResult, PoisonError};

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use loom::sync::{Arc, Condvar, Mutex, MutexGuard};
        pub(crate) use loom::thread_local;
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use shuttle::sync::{Arc, Condvar, Mutex, MutexGuard};
        pub(crate) use shuttle::thread_local;
    } else {
        pub(crate) use std::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use std::sync::{Arc, Condvar, Mutex, MutexGuard};
        pub(crate) use std::thread_local;
    }
}

/// Recover the guard from a poisoned lock result.
///
/// No caller code ever runs while one of this crate's locks is held, so a poisoned lock can only
/// come from a panic inside the crate's own critical sections, all of which leave the protected
/// state consistent before they can panic.
fn recover<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    recover(mutex.lock())
}

/// Block on `condvar`, atomically releasing `guard` for the duration of the block.
///
/// This may return on a spurious wake-up; callers must re-check their predicate.
pub(crate) fn wait<'a, T>(condvar: &Condvar, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    recover(condvar.wait(guard))
}
