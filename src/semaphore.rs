use crate::sync::{lock, wait, Condvar, Mutex, MutexGuard};
use tracing::trace;

/// A counting semaphore: [Semaphore::post] adds a unit, [Semaphore::wait] blocks until a unit is
/// available and takes it.
#[derive(Debug)]
pub(crate) struct Semaphore {
    count: Mutex<usize>,
    posted: Condvar,
}

impl Semaphore {
    /// Create a semaphore with a count of zero, so the first [Semaphore::wait] blocks until a post.
    pub(crate) fn new() -> Self {
        Self {
            count: Mutex::new(0),
            posted: Condvar::new(),
        }
    }

    pub(crate) fn post(&self) {
        let mut count: MutexGuard<usize> = lock(&self.count);
        *count += 1;
        self.posted.notify_one();
    }

    /// Block until the count is positive, then decrement it.
    ///
    /// Spurious wake-ups are absorbed here and never surface to the caller.
    pub(crate) fn wait(&self) {
        let mut count: MutexGuard<usize> = lock(&self.count);
        while *count == 0 {
            count = wait(&self.posted, count);
            if *count == 0 {
                trace!("woke with a zero count, blocking again");
            }
        }
        *count -= 1;
    }

    pub(crate) fn value(&self) -> usize {
        *lock(&self.count)
    }
}
