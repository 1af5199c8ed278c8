use rendezvous_barrier::{Barrier, Strategy, WaitOutcome};
use tracing::{debug, trace};

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use shuttle::sync::Arc;
        pub(crate) use shuttle::thread;
    } else {
        pub(crate) use std::sync::atomic::{AtomicUsize, Ordering};
        pub(crate) use std::sync::Arc;
        pub(crate) use std::thread;
    }
}

/// Per-cycle bookkeeping shared by every participant of a [cycle_isolation_test].
struct CycleLedger {
    /// How many participants have arrived at each cycle.
    arrivals: Vec<AtomicUsize>,
    /// How many calls in each cycle reported being the last arrival.
    last_arrivals: Vec<AtomicUsize>,
}

impl CycleLedger {
    fn new(num_cycles: usize) -> Self {
        Self {
            arrivals: (0..num_cycles).map(|_| AtomicUsize::new(0)).collect(),
            last_arrivals: (0..num_cycles).map(|_| AtomicUsize::new(0)).collect(),
        }
    }
}

/// Run one participant through `num_cycles` cycles, checking after every release that the whole
/// cycle arrived and that nobody has run more than one cycle ahead.
fn participate(barrier: &Barrier, ledger: &CycleLedger, num_threads: usize, num_cycles: usize) {
    for cycle in 0..num_cycles {
        ledger.arrivals[cycle].fetch_add(1, Ordering::AcqRel);

        let outcome: WaitOutcome = barrier.wait().expect("wait failed");
        trace!("cycle {cycle}: released, last arrival: {}", outcome.is_last_arrival());
        if outcome.is_last_arrival() {
            ledger.last_arrivals[cycle].fetch_add(1, Ordering::AcqRel);
        }

        // nobody may be released before the whole cycle has arrived
        assert_eq!(ledger.arrivals[cycle].load(Ordering::Acquire), num_threads);
        // and nobody can get further ahead than the next cycle
        if cycle + 2 < num_cycles {
            assert_eq!(ledger.arrivals[cycle + 2].load(Ordering::Acquire), 0);
        }

        let remaining: usize = barrier.remaining();
        assert!(remaining >= 1 && remaining <= num_threads);
    }
}

/// `num_threads` participants rendezvous `num_cycles` times at a barrier using `strategy`.
///
/// The calling thread is one of the participants.
pub(crate) fn cycle_isolation_test(strategy: Strategy, num_threads: usize, num_cycles: usize) {
    let barrier: Arc<Barrier> = Arc::new(Barrier::create(num_threads, strategy).unwrap());
    let ledger: Arc<CycleLedger> = Arc::new(CycleLedger::new(num_cycles));

    let join_handles: Vec<thread::JoinHandle<()>> = (1..num_threads)
        .map(|_| {
            let barrier: Arc<Barrier> = barrier.clone();
            let ledger: Arc<CycleLedger> = ledger.clone();
            thread::spawn(move || participate(&barrier, &ledger, num_threads, num_cycles))
        })
        .collect();

    participate(&barrier, &ledger, num_threads, num_cycles);
    join_handles
        .into_iter()
        .for_each(|join_handle| join_handle.join().expect("A thread panicked"));

    for cycle in 0..num_cycles {
        assert_eq!(ledger.last_arrivals[cycle].load(Ordering::Acquire), 1);
    }
    assert_eq!(barrier.cycles_completed(), num_cycles as u64);
    assert_eq!(barrier.remaining(), num_threads);
    assert_eq!(barrier.queued_waiters(), 0);
    debug!("{strategy}: {num_threads} threads completed {num_cycles} cycles");
}
