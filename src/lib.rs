//! A reusable (cyclic) thread barrier.
//!
//! A [Barrier] blocks a fixed number of participating threads until all of them have arrived,
//! releases them together, and resets itself so the same instance serves any number of further
//! rendezvous cycles. The hard part of a cyclic barrier is reuse: a thread released from one cycle
//! may re-enter for the next cycle before a slower thread has finished waking up from the previous
//! one. Three interchangeable [Strategy]s rule that out in different ways:
//!
//! - [Strategy::DoubleSubBarrier] alternates between two sub-barriers, so consecutive cycles never
//!   share a condvar.
//! - [Strategy::Generation] stamps each cycle with a generation number which waiters re-check on
//!   every wake-up.
//! - [Strategy::SemaphoreQueue] gives each waiter its own semaphore, which the last arrival posts
//!   individually, in arrival order.
//!
//! Synchronization primitives come from `std` by default, from `loom` when built with
//! `--cfg loom`, and from `shuttle` with the `shuttle` feature, so the same code can be model
//! checked.

mod barrier;
mod cancel;
mod err;
mod semaphore;
mod sync;
mod types;

pub use crate::barrier::{Barrier, Strategy, WaitOutcome};
pub use crate::cancel::{cancel_state, set_cancel_state, CancelState};
pub use crate::err::{Error, Resource};
pub use crate::types::CycleCount;
