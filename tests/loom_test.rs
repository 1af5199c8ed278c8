#![cfg(loom)]

mod common;

use rendezvous_barrier::Strategy;

/// Explore schedules with at most `preemption_bound` forced preemptions per execution.
fn bounded_model<F>(preemption_bound: usize, f: F)
where
    F: Fn() + Sync + Send + 'static,
{
    let mut builder = loom::model::Builder::new();
    builder.preemption_bound = Some(preemption_bound);
    builder.check(f);
}

#[test]
fn double_sub_barrier_loom_test() {
    loom::model(|| {
        common::cycle_isolation_test(Strategy::DoubleSubBarrier, 2, 3);
    })
}

#[test]
fn generation_loom_test() {
    loom::model(|| {
        common::cycle_isolation_test(Strategy::Generation, 2, 3);
    })
}

#[test]
fn semaphore_queue_loom_test() {
    bounded_model(2, || {
        common::cycle_isolation_test(Strategy::SemaphoreQueue, 2, 2);
    })
}

#[test]
fn three_thread_generation_loom_test() {
    bounded_model(1, || {
        common::cycle_isolation_test(Strategy::Generation, 3, 2);
    })
}
