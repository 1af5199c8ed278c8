/// The number of participants which must arrive at a barrier before any of them are released.
///
/// Always at least 1 for a successfully created barrier.
pub(crate) type Capacity = usize;

/// A monotonically increasing stamp identifying one rendezvous cycle.
///
/// Only equality matters for generations, so the stamp wraps around instead of overflowing.
pub(crate) type Generation = u64;

/// The number of rendezvous cycles a barrier has completed.
pub type CycleCount = u64;

/// Selects one of the two sub-barrier slots of a double-sub-barrier.
pub(crate) type SlotIndex = usize;

/// The position at which a waiter registered in the semaphore wait queue during one cycle.
///
/// Tickets start at 0 for the first arrival of each cycle and determine the order in which
/// waiters are posted.
pub(crate) type Ticket = usize;

/// The other sub-barrier slot.
pub(crate) fn other_slot(slot: SlotIndex) -> SlotIndex {
    slot ^ 1
}
