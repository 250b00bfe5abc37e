//! Generator results and error kinds.

use thiserror::Error;

/// State of the active trajectory after an `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// A plan is active and being consumed.
    Working,
    /// The plan has been fully consumed; the output extrapolates from the
    /// target state.
    Finished,
}

/// Planning failures. No partial success exists: a plan is either
/// complete and consistent across all axes or the cycle reports one of
/// these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid input for axis {dof}: {reason}")]
    InvalidInput { dof: usize, reason: &'static str },

    #[error("no time-optimal profile exists for axis {dof}")]
    ExecutionTime { dof: usize },

    /// Synchronization failed: either no common duration satisfies every
    /// axis (`t_sync` is `None`) or the named axis has no profile of the
    /// chosen duration.
    #[error("time synchronization failed at duration {t_sync:?}")]
    Synchronization {
        dof: Option<usize>,
        t_sync: Option<f64>,
    },
}
