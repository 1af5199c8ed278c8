use crate::cancel::DeferCancellation;
use crate::sync::{lock, wait, AtomicUsize, Condvar, Mutex, MutexGuard, Ordering};
use crate::types::{other_slot, Capacity, CycleCount, SlotIndex};
use tracing::trace;

/// One half of a [DoubleSubBarrier]. Waiters of a cycle block on the condvar of the slot which was
/// active when they arrived.
#[derive(Debug)]
struct Slot {
    state: Mutex<SlotState>,
    released: Condvar,
}

#[derive(Debug)]
struct SlotState {
    /// The number of participants which have not yet arrived at this slot in its current cycle.
    remaining: Capacity,

    /// The number of cycles completed on this slot.
    cycles_completed: CycleCount,
}

impl Slot {
    fn new(capacity: Capacity) -> Self {
        Self {
            state: Mutex::new(SlotState {
                remaining: capacity,
                cycles_completed: 0,
            }),
            released: Condvar::new(),
        }
    }
}

/// Two sub-barriers used alternately, one cycle each.
///
/// The last arrival of a cycle points new arrivals at the other slot before it wakes the waiters of
/// its own slot. A thread released from this cycle can therefore only re-enter through the other
/// slot, and its arrival can never be mistaken for the reset which released the stragglers still
/// waking up here.
#[derive(Debug)]
pub(crate) struct DoubleSubBarrier {
    capacity: Capacity,
    slots: [Slot; 2],

    /// The [SlotIndex] new arrivals should use. Only changed by a last arrival while it holds the
    /// lock of the slot being retired.
    active_slot: AtomicUsize,
}

impl DoubleSubBarrier {
    pub(crate) fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            slots: [Slot::new(capacity), Slot::new(capacity)],
            active_slot: AtomicUsize::new(0),
        }
    }

    /// Returns whether this call was the last arrival of its cycle.
    pub(crate) fn wait(&self) -> bool {
        let slot_index: SlotIndex = self.active_slot.load(Ordering::Acquire);
        let slot: &Slot = &self.slots[slot_index];
        let mut state: MutexGuard<SlotState> = lock(&slot.state);
        debug_assert!(state.remaining >= 1 && state.remaining <= self.capacity);

        if state.remaining == 1 {
            // reset this slot for the cycle after next and send everyone else to the other slot
            state.remaining = self.capacity;
            state.cycles_completed += 1;
            self.active_slot.store(other_slot(slot_index), Ordering::Release);
            trace!("slot {slot_index}: last arrival, switching to slot {}", other_slot(slot_index));

            slot.released.notify_all();
            return true;
        }

        state.remaining -= 1;
        trace!("slot {slot_index}: {} participants remaining", state.remaining);

        let _deferred: DeferCancellation = DeferCancellation::enter();
        while state.remaining != self.capacity {
            state = wait(&slot.released, state);
        }
        trace!("slot {slot_index}: released");
        false
    }

    pub(crate) fn remaining(&self) -> Capacity {
        let slot_index: SlotIndex = self.active_slot.load(Ordering::Acquire);
        lock(&self.slots[slot_index].state).remaining
    }

    pub(crate) fn cycles_completed(&self) -> CycleCount {
        self.slots
            .iter()
            .map(|slot| lock(&slot.state).cycles_completed)
            .sum()
    }

    /// Whether both slots are waiting for a full complement of arrivals.
    pub(crate) fn is_at_cycle_boundary(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| lock(&slot.state).remaining == self.capacity)
    }
}

#[cfg(test)]
#[cfg(not(any(loom, feature = "shuttle")))]
mod tests {
    use super::{DoubleSubBarrier, Slot};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::thread;
    use test_log::test;

    #[test]
    fn single_participant_swaps_slots_every_cycle() {
        let barrier: DoubleSubBarrier = DoubleSubBarrier::new(1);
        for cycle in 1..=5u64 {
            assert!(barrier.wait());
            assert_eq!(barrier.cycles_completed(), cycle);
            let active_slot: usize = barrier.active_slot.load(Ordering::Acquire);
            assert_eq!(active_slot, (cycle % 2) as usize);
        }
        assert!(barrier.is_at_cycle_boundary());
    }

    #[test]
    fn cycles_alternate_between_slots() {
        let barrier: Arc<DoubleSubBarrier> = Arc::new(DoubleSubBarrier::new(2));
        let other: Arc<DoubleSubBarrier> = barrier.clone();
        let handle: thread::JoinHandle<usize> =
            thread::spawn(move || (0..10).filter(|_| other.wait()).count());

        let last_arrivals: usize = (0..10).filter(|_| barrier.wait()).count();
        let other_last_arrivals: usize = handle.join().unwrap();

        assert_eq!(last_arrivals + other_last_arrivals, 10);
        assert_eq!(barrier.cycles_completed(), 10);
        let per_slot: Vec<u64> = barrier
            .slots
            .iter()
            .map(|slot| slot.state.lock().unwrap().cycles_completed)
            .collect();
        assert_eq!(per_slot, vec![5, 5]);
        assert!(barrier.is_at_cycle_boundary());
    }

    #[test]
    fn waiter_counts_down_its_slot() {
        let barrier: Arc<DoubleSubBarrier> = Arc::new(DoubleSubBarrier::new(3));
        let waiters: Vec<thread::JoinHandle<bool>> = (0..2)
            .map(|_| {
                let barrier: Arc<DoubleSubBarrier> = barrier.clone();
                thread::spawn(move || barrier.wait())
            })
            .collect();

        while barrier.remaining() != 1 {
            thread::yield_now();
        }
        assert!(!barrier.is_at_cycle_boundary());
        assert!(barrier.wait());
        for waiter in waiters {
            assert!(!waiter.join().unwrap());
        }
        assert_eq!(barrier.remaining(), 3);
    }

    #[test]
    fn broadcast_on_active_slot_does_not_release_waiter() {
        let barrier: Arc<DoubleSubBarrier> = Arc::new(DoubleSubBarrier::new(2));
        let other: Arc<DoubleSubBarrier> = barrier.clone();
        let waiter: thread::JoinHandle<bool> = thread::spawn(move || other.wait());

        while barrier.remaining() != 1 {
            thread::yield_now();
        }
        let active_slot: &Slot = &barrier.slots[barrier.active_slot.load(Ordering::Acquire)];
        for _ in 0..100 {
            active_slot.released.notify_all();
            thread::yield_now();
        }
        assert!(!waiter.is_finished());
        assert_eq!(barrier.remaining(), 1);
        assert_eq!(barrier.cycles_completed(), 0);

        assert!(barrier.wait());
        assert!(!waiter.join().unwrap());
    }
}
