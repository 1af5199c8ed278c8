use crate::barrier::generation::GenerationBarrier;
use crate::barrier::sub_barrier::DoubleSubBarrier;
use crate::barrier::wait_queue::SemaphoreQueueBarrier;
use crate::err::Error;
use crate::types::{Capacity, CycleCount};
use displaydoc::Display;
use tracing::{debug, instrument};

mod generation;
mod sub_barrier;
mod wait_queue;

/// The algorithm a [Barrier] uses to block participants and release them at the end of a cycle.
///
/// Every strategy satisfies the same contract: no participant is released before all `capacity`
/// participants of its cycle have arrived, and no participant of the next cycle is admitted before
/// the current cycle has been reset.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// double sub-barrier
    DoubleSubBarrier,
    /// generation-stamped
    Generation,
    /// semaphore wait queue
    #[default]
    SemaphoreQueue,
}

impl Strategy {
    /// Every available strategy.
    pub const ALL: [Strategy; 3] = [
        Strategy::DoubleSubBarrier,
        Strategy::Generation,
        Strategy::SemaphoreQueue,
    ];
}

/// The state of whichever [Strategy] a [Barrier] was created with.
#[derive(Debug)]
enum StrategyState {
    DoubleSubBarrier(DoubleSubBarrier),
    Generation(GenerationBarrier),
    SemaphoreQueue(SemaphoreQueueBarrier),
}

/// What a successful [Barrier::wait] observed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitOutcome {
    last_arrival: bool,
}

impl WaitOutcome {
    /// Whether this call was the last arrival of its cycle, and so the one which reset the barrier
    /// and released everyone else. Exactly one call per cycle sees `true`.
    pub fn is_last_arrival(&self) -> bool {
        self.last_arrival
    }
}

/// A reusable rendezvous point for a fixed number of threads.
///
/// Each call to [Barrier::wait] blocks until `capacity` calls have been made, then all of them
/// return together and the barrier is immediately ready for the next cycle.
///
/// There is deliberately no timed or interruptible wait: a cycle completes only when exactly
/// `capacity` participants have arrived.
///
/// ```
/// use rendezvous_barrier::{Barrier, Strategy};
/// use std::sync::Arc;
/// use std::thread;
///
/// let barrier = Arc::new(Barrier::create(4, Strategy::Generation).unwrap());
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let barrier = barrier.clone();
///         thread::spawn(move || {
///             for _ in 0..10 {
///                 barrier.wait().unwrap();
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// let barrier = Arc::try_unwrap(barrier).unwrap();
/// assert_eq!(barrier.cycles_completed(), 10);
/// barrier.destroy().unwrap();
/// ```
#[derive(Debug)]
pub struct Barrier {
    capacity: Capacity,
    state: StrategyState,
}

impl Barrier {
    /// Create a barrier for `capacity` participants using the default [Strategy].
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::create(capacity, Strategy::default())
    }

    /// Create a barrier for `capacity` participants which blocks them using `strategy`.
    ///
    /// Fails with [Error::InvalidArgument] if `capacity` is 0, and with
    /// [Error::ResourceExhausted] if the strategy's backing storage cannot be allocated.
    #[instrument(level = "debug")]
    pub fn create(capacity: usize, strategy: Strategy) -> Result<Self, Error> {
        if capacity < 1 {
            return Err(Error::InvalidArgument { capacity });
        }

        let state: StrategyState = match strategy {
            Strategy::DoubleSubBarrier => {
                StrategyState::DoubleSubBarrier(DoubleSubBarrier::new(capacity))
            }
            Strategy::Generation => StrategyState::Generation(GenerationBarrier::new(capacity)),
            Strategy::SemaphoreQueue => {
                StrategyState::SemaphoreQueue(SemaphoreQueueBarrier::new(capacity)?)
            }
        };
        debug!("created {strategy} barrier for {capacity} participants");
        Ok(Self { capacity, state })
    }

    /// Arrive at the barrier and block until every participant of this cycle has arrived.
    ///
    /// The last arrival resets the barrier for the next cycle and returns without blocking. With a
    /// capacity of 1, every call is the last arrival.
    ///
    /// Every strategy allocates all of its wait handles in [Barrier::create], so no current
    /// strategy ever returns an error here.
    #[instrument(level = "trace", skip(self), fields(capacity = self.capacity))]
    pub fn wait(&self) -> Result<WaitOutcome, Error> {
        let last_arrival: bool = match &self.state {
            StrategyState::DoubleSubBarrier(barrier) => barrier.wait(),
            StrategyState::Generation(barrier) => barrier.wait(),
            StrategyState::SemaphoreQueue(barrier) => barrier.wait(),
        };
        Ok(WaitOutcome { last_arrival })
    }

    /// Release the barrier's resources.
    ///
    /// Panics if any participant is still partway through a cycle, since there is no sensible way
    /// to continue from there. Taking the barrier by value already rules out participants blocked
    /// in [Barrier::wait]; a barrier shared through an `Arc` has to be unwrapped first.
    #[instrument(level = "debug", skip(self), fields(strategy = %self.strategy()))]
    pub fn destroy(self) -> Result<(), Error> {
        assert!(
            self.is_at_cycle_boundary(),
            "destroyed a {} barrier with {} of {} participants still to arrive and {} queued waiters",
            self.strategy(),
            self.remaining(),
            self.capacity,
            self.queued_waiters()
        );
        debug!("destroyed {} barrier after {} cycles", self.strategy(), self.cycles_completed());
        Ok(())
    }

    /// The number of participants per cycle.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The [Strategy] this barrier was created with.
    pub fn strategy(&self) -> Strategy {
        match &self.state {
            StrategyState::DoubleSubBarrier(_) => Strategy::DoubleSubBarrier,
            StrategyState::Generation(_) => Strategy::Generation,
            StrategyState::SemaphoreQueue(_) => Strategy::SemaphoreQueue,
        }
    }

    /// The number of participants which have not yet arrived in the current cycle, sampled under
    /// the barrier's lock. Always between 1 and [Barrier::capacity].
    pub fn remaining(&self) -> usize {
        match &self.state {
            StrategyState::DoubleSubBarrier(barrier) => barrier.remaining(),
            StrategyState::Generation(barrier) => barrier.remaining(),
            StrategyState::SemaphoreQueue(barrier) => barrier.remaining(),
        }
    }

    /// The number of cycles which have completed, counted by the reset step of each cycle.
    pub fn cycles_completed(&self) -> CycleCount {
        match &self.state {
            StrategyState::DoubleSubBarrier(barrier) => barrier.cycles_completed(),
            StrategyState::Generation(barrier) => barrier.cycles_completed(),
            StrategyState::SemaphoreQueue(barrier) => barrier.cycles_completed(),
        }
    }

    /// The number of wait handles registered in the current cycle. Always 0 unless the barrier
    /// uses [Strategy::SemaphoreQueue].
    pub fn queued_waiters(&self) -> usize {
        match &self.state {
            StrategyState::SemaphoreQueue(barrier) => barrier.queued_waiters(),
            StrategyState::DoubleSubBarrier(_) | StrategyState::Generation(_) => 0,
        }
    }

    fn is_at_cycle_boundary(&self) -> bool {
        match &self.state {
            StrategyState::DoubleSubBarrier(barrier) => barrier.is_at_cycle_boundary(),
            StrategyState::Generation(barrier) => barrier.is_at_cycle_boundary(),
            StrategyState::SemaphoreQueue(barrier) => barrier.is_at_cycle_boundary(),
        }
    }
}
