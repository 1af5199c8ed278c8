use crate::cancel::DeferCancellation;
use crate::sync::{lock, wait, Condvar, Mutex, MutexGuard};
use crate::types::{Capacity, CycleCount, Generation};
use tracing::trace;

#[derive(Debug)]
struct GenerationState {
    /// The number of participants which have not yet arrived in the current cycle.
    remaining: Capacity,

    /// Stamps the current cycle. Advanced exactly once per completed cycle, by its last arrival.
    generation: Generation,

    cycles_completed: CycleCount,
}

/// A single lock and condvar shared by every cycle, with each cycle tagged by a [Generation].
///
/// A waiter remembers the generation it arrived in and keeps blocking until the stamp moves on, so
/// a spurious wake-up or a broadcast meant for some other cycle can never release it.
#[derive(Debug)]
pub(crate) struct GenerationBarrier {
    capacity: Capacity,
    state: Mutex<GenerationState>,
    released: Condvar,
}

impl GenerationBarrier {
    pub(crate) fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            state: Mutex::new(GenerationState {
                remaining: capacity,
                generation: 0,
                cycles_completed: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Returns whether this call was the last arrival of its cycle.
    pub(crate) fn wait(&self) -> bool {
        let mut state: MutexGuard<GenerationState> = lock(&self.state);
        debug_assert!(state.remaining >= 1 && state.remaining <= self.capacity);

        if state.remaining == 1 {
            state.generation = state.generation.wrapping_add(1);
            state.remaining = self.capacity;
            state.cycles_completed += 1;
            trace!("last arrival, advanced to generation {}", state.generation);

            self.released.notify_all();
            return true;
        }

        let arrival_generation: Generation = state.generation;
        state.remaining -= 1;
        trace!(
            "generation {arrival_generation}: {} participants remaining",
            state.remaining
        );

        let _deferred: DeferCancellation = DeferCancellation::enter();
        while state.generation == arrival_generation {
            state = wait(&self.released, state);
        }
        trace!("generation {arrival_generation}: released");
        false
    }

    pub(crate) fn remaining(&self) -> Capacity {
        lock(&self.state).remaining
    }

    pub(crate) fn cycles_completed(&self) -> CycleCount {
        lock(&self.state).cycles_completed
    }

    pub(crate) fn generation(&self) -> Generation {
        lock(&self.state).generation
    }

    pub(crate) fn is_at_cycle_boundary(&self) -> bool {
        lock(&self.state).remaining == self.capacity
    }

    /// A barrier which is partway through its first cycle, as if `capacity - remaining`
    /// participants were blocked in it.
    #[cfg(all(test, not(any(loom, feature = "shuttle"))))]
    pub(crate) fn mid_cycle(capacity: Capacity, remaining: Capacity) -> Self {
        let barrier: Self = Self::new(capacity);
        barrier.state.lock().unwrap().remaining = remaining;
        barrier
    }
}
