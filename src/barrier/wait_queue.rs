use crate::cancel::DeferCancellation;
use crate::err::{Error, Resource};
use crate::semaphore::Semaphore;
use crate::sync::{lock, Mutex, MutexGuard};
use crate::types::{other_slot, Capacity, CycleCount, SlotIndex, Ticket};
use tracing::trace;

/// Wait handles for every waiter a cycle can have, in two arenas used on alternate cycles.
///
/// A waiter of cycle `N` may still be waking up from its post while cycle `N + 1` registers, so the
/// two cycles must not share handles. The arena of cycle `N` is only reused by cycle `N + 2`, which
/// cannot begin before every waiter of cycle `N` has taken its post and arrived again.
#[derive(Debug)]
struct WaitQueue {
    arenas: [Vec<Semaphore>; 2],
}

impl WaitQueue {
    fn with_capacity(num_waiters: usize) -> Result<Self, Error> {
        Ok(Self {
            arenas: [Self::arena(num_waiters)?, Self::arena(num_waiters)?],
        })
    }

    fn arena(num_waiters: usize) -> Result<Vec<Semaphore>, Error> {
        let mut handles: Vec<Semaphore> = Vec::new();
        handles
            .try_reserve_exact(num_waiters)
            .map_err(|_| Resource::WaitQueue)?;
        handles.extend((0..num_waiters).map(|_| Semaphore::new()));
        Ok(handles)
    }

    fn handle(&self, arena: SlotIndex, ticket: Ticket) -> &Semaphore {
        &self.arenas[arena][ticket]
    }

    /// Post the first `num_registered` handles of `arena`, in registration order.
    fn release(&self, arena: SlotIndex, num_registered: usize) {
        for (ticket, handle) in self.arenas[arena][..num_registered].iter().enumerate() {
            trace!("arena {arena}: posting waiter {ticket}");
            handle.post();
        }
    }
}

#[derive(Debug)]
struct QueueState {
    /// The number of participants which have not yet arrived in the current cycle.
    remaining: Capacity,

    /// The number of waiters registered in the current cycle. Always `capacity - remaining`.
    registered: usize,

    /// The arena the current cycle registers its waiters in.
    arena: SlotIndex,

    cycles_completed: CycleCount,
}

/// Every waiter blocks on its own semaphore, and the last arrival posts each one individually.
///
/// Released waiters never need the shared lock again, so there is no thundering herd on it when a
/// cycle completes.
#[derive(Debug)]
pub(crate) struct SemaphoreQueueBarrier {
    capacity: Capacity,
    state: Mutex<QueueState>,
    queue: WaitQueue,
}

impl SemaphoreQueueBarrier {
    pub(crate) fn new(capacity: Capacity) -> Result<Self, Error> {
        let queue: WaitQueue = WaitQueue::with_capacity(capacity - 1)?;
        Ok(Self {
            capacity,
            state: Mutex::new(QueueState {
                remaining: capacity,
                registered: 0,
                arena: 0,
                cycles_completed: 0,
            }),
            queue,
        })
    }

    /// Returns whether this call was the last arrival of its cycle.
    pub(crate) fn wait(&self) -> bool {
        let mut state: MutexGuard<QueueState> = lock(&self.state);
        debug_assert!(state.remaining >= 1 && state.remaining <= self.capacity);
        debug_assert_eq!(state.registered, self.capacity - state.remaining);

        let arena: SlotIndex = state.arena;
        if state.remaining == 1 {
            trace!("last arrival, releasing {} waiters", state.registered);
            self.queue.release(arena, state.registered);
            state.registered = 0;
            state.arena = other_slot(arena);
            state.remaining = self.capacity;
            state.cycles_completed += 1;
            return true;
        }

        let ticket: Ticket = state.registered;
        let handle: &Semaphore = self.queue.handle(arena, ticket);
        assert_eq!(
            handle.value(),
            0,
            "wait handle {ticket} of arena {arena} still holds a post from an earlier cycle"
        );
        state.registered += 1;
        state.remaining -= 1;
        trace!("waiter {ticket}: {} participants remaining", state.remaining);
        drop(state);

        let _deferred: DeferCancellation = DeferCancellation::enter();
        handle.wait();
        trace!("waiter {ticket}: released");
        false
    }

    pub(crate) fn remaining(&self) -> Capacity {
        lock(&self.state).remaining
    }

    pub(crate) fn cycles_completed(&self) -> CycleCount {
        lock(&self.state).cycles_completed
    }

    pub(crate) fn queued_waiters(&self) -> usize {
        lock(&self.state).registered
    }

    pub(crate) fn is_at_cycle_boundary(&self) -> bool {
        let state: MutexGuard<QueueState> = lock(&self.state);
        state.remaining == self.capacity && state.registered == 0
    }
}
