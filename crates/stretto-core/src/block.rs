//! Feasible total durations of one axis.
//!
//! The time-optimal solver reports, besides the minimum duration, up to two
//! open intervals of durations for which no feasible profile exists. The
//! synchronizer picks the smallest common duration outside every axis'
//! blocked intervals.

use crate::profile::Profile;

/// An open interval of blocked durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub left: f64,
    pub right: f64,
}

/// The set of feasible total durations for one axis: everything from
/// `t_min` upward except the blocked intervals `a` and `b`.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Infimum of feasible durations.
    pub t_min: f64,
    /// The time-optimal profile, of duration `t_min`.
    pub p_min: Profile,

    pub a: Option<Interval>,
    pub b: Option<Interval>,
    /// Time-optimal profile at the right endpoint of `a`.
    pub p_a: Option<Profile>,
    /// Time-optimal profile at the right endpoint of `b`.
    pub p_b: Option<Profile>,
}

impl Block {
    /// Whether no feasible profile of duration `t` exists. Interval
    /// membership is strict, so a candidate exactly at an endpoint is
    /// accepted.
    pub fn is_blocked(&self, t: f64) -> bool {
        t < self.t_min
            || self.a.is_some_and(|i| i.left < t && t < i.right)
            || self.b.is_some_and(|i| i.left < t && t < i.right)
    }
}
