//! Caller-facing parameter structures.
//!
//! All per-axis data is held in fixed-size arrays indexed by the
//! compile-time DOF count, so no allocation happens on the control-loop
//! path. Input equality is exact and element-wise; the generator replans
//! whenever any field changes.

/// Per-cycle input: current state, target state, and limits of every axis.
#[derive(Debug, Clone, PartialEq)]
pub struct InputParameter<const DOFS: usize> {
    pub current_position: [f64; DOFS],
    pub current_velocity: [f64; DOFS],
    pub current_acceleration: [f64; DOFS],

    pub target_position: [f64; DOFS],
    pub target_velocity: [f64; DOFS],
    pub target_acceleration: [f64; DOFS],

    pub max_velocity: [f64; DOFS],
    pub max_acceleration: [f64; DOFS],
    pub max_jerk: [f64; DOFS],

    pub enabled: [bool; DOFS],
    /// Optional floor on the synchronized duration.
    pub minimum_duration: Option<f64>,
}

impl<const DOFS: usize> Default for InputParameter<DOFS> {
    fn default() -> Self {
        Self {
            current_position: [0.0; DOFS],
            current_velocity: [0.0; DOFS],
            current_acceleration: [0.0; DOFS],
            target_position: [0.0; DOFS],
            target_velocity: [0.0; DOFS],
            target_acceleration: [0.0; DOFS],
            max_velocity: [0.0; DOFS],
            max_acceleration: [0.0; DOFS],
            max_jerk: [0.0; DOFS],
            enabled: [true; DOFS],
            minimum_duration: None,
        }
    }
}

/// Per-cycle output: the next state along the synchronized trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputParameter<const DOFS: usize> {
    pub new_position: [f64; DOFS],
    pub new_velocity: [f64; DOFS],
    pub new_acceleration: [f64; DOFS],

    /// Planned synchronized duration of the active trajectory.
    pub duration: f64,
    /// True only on the cycle a plan was (re)computed.
    pub new_calculation: bool,
    /// Wall time of the last `update` call, in microseconds.
    pub calculation_duration: f64,
    /// Per-axis time-optimal durations from the last plan.
    pub independent_min_durations: [f64; DOFS],
}

impl<const DOFS: usize> Default for OutputParameter<DOFS> {
    fn default() -> Self {
        Self {
            new_position: [0.0; DOFS],
            new_velocity: [0.0; DOFS],
            new_acceleration: [0.0; DOFS],
            duration: 0.0,
            new_calculation: false,
            calculation_duration: 0.0,
            independent_min_durations: [0.0; DOFS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_equality_is_exact() {
        let a = InputParameter::<2>::default();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.target_position[1] += 1e-15;
        assert_ne!(a, b);
    }

    #[test]
    fn default_axes_are_enabled() {
        let input = InputParameter::<3>::default();
        assert_eq!(input.enabled, [true; 3]);
        assert!(input.minimum_duration.is_none());
    }
}
