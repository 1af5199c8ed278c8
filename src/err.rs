use crate::types::Capacity;
use displaydoc::Display;

/// `EINVAL` on every platform this crate targets.
const EINVAL: i32 = 22;

/// `ENOMEM` on every platform this crate targets.
const ENOMEM: i32 = 12;

/// Any error which can be returned by a barrier operation.
///
/// Misuse which has no well-defined outcome, like destroying a barrier while threads are still
/// blocked in it, is not represented here: it panics instead.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Error {
    /// A barrier needs at least 1 participant, but was asked for {capacity}.
    InvalidArgument { capacity: Capacity },
    /// Could not allocate the {0} backing the barrier.
    ResourceExhausted(Resource),
}

impl Error {
    /// The errno-style number a process wrapping the barrier should report for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Error::InvalidArgument { .. } => EINVAL,
            Error::ResourceExhausted(_) => ENOMEM,
        }
    }
}

impl std::error::Error for Error {}

impl From<Resource> for Error {
    fn from(resource: Resource) -> Self {
        Error::ResourceExhausted(resource)
    }
}

/// A backing resource a barrier allocates when it is created.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Resource {
    /// wait queue
    WaitQueue,
}
