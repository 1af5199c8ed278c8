//! Per-thread cancellation state.
//!
//! Rust threads cannot be torn down asynchronously, so cancellation is cooperative: a thread which
//! honors cancel requests consults [cancel_state] before acting on one. While a thread is blocked
//! inside [Barrier::wait](crate::Barrier::wait), its cancellation state is [CancelState::Disabled]
//! so that a participant which has already been counted as arrived is never abandoned mid-cycle.

use core::cell::Cell;
use core::marker::PhantomData;
use displaydoc::Display;
use tracing::trace;

use crate::sync::thread_local;

/// Whether the current thread may act on a cancel request.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CancelState {
    /// enabled
    Enabled,
    /// disabled
    Disabled,
}

thread_local! {
    static CANCEL_STATE: Cell<CancelState> = Cell::new(CancelState::Enabled);
}

/// The current thread's cancellation state.
pub fn cancel_state() -> CancelState {
    CANCEL_STATE.with(|state| state.get())
}

/// Set the current thread's cancellation state, returning the previous one.
pub fn set_cancel_state(new_state: CancelState) -> CancelState {
    CANCEL_STATE.with(|state| state.replace(new_state))
}

/// Disables cancellation for the current thread until dropped, then restores whatever state was in
/// effect before.
///
/// The guard is tied to the thread which created it.
#[derive(Debug)]
pub(crate) struct DeferCancellation {
    previous: CancelState,
    _not_send: PhantomData<*const ()>,
}

impl DeferCancellation {
    pub(crate) fn enter() -> Self {
        let previous: CancelState = set_cancel_state(CancelState::Disabled);
        trace!("cancellation deferred, previous state was {previous}");
        Self {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for DeferCancellation {
    fn drop(&mut self) {
        set_cancel_state(self.previous);
        trace!("cancellation state restored to {}", self.previous);
    }
}
