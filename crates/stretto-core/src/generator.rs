//! Per-cycle trajectory generation.
//!
//! The generator owns the active plan. Each `update` advances the internal
//! clock, replans when the input changed, and samples the trajectory at
//! the new time. Planning runs brake, time-optimal, synchronization, and
//! fixed-duration stages; sampling is pure closed-form integration over
//! the stored segments.

use std::time::Instant;

use crate::block::Block;
use crate::brake::brake_trajectory;
use crate::error::{Error, State};
use crate::params::{InputParameter, OutputParameter};
use crate::profile::{integrate, Profile};
use crate::step1::Step1;
use crate::step2::Step2;
use crate::sync::synchronize;

pub struct Generator<const DOFS: usize> {
    /// Cycle period in seconds.
    delta_time: f64,
    /// Time along the active plan.
    t: f64,
    /// Duration of the active plan.
    tf: f64,
    current_input: InputParameter<DOFS>,
    profiles: [Profile; DOFS],
}

impl<const DOFS: usize> Generator<DOFS> {
    pub fn new(delta_time: f64) -> Self {
        assert!(delta_time > 0.0, "cycle time must be positive");
        Self {
            delta_time,
            t: 0.0,
            tf: 0.0,
            current_input: InputParameter::default(),
            profiles: std::array::from_fn(|_| Profile::default()),
        }
    }

    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Advance one control cycle: replan if the input changed, then sample
    /// the trajectory at the new time.
    pub fn update(
        &mut self,
        input: &InputParameter<DOFS>,
        output: &mut OutputParameter<DOFS>,
    ) -> Result<State, Error> {
        let start = Instant::now();

        self.t += self.delta_time;
        output.new_calculation = false;

        if *input != self.current_input {
            self.calculate(input, output)?;
        }

        self.at_time(self.t, output);
        output.calculation_duration = start.elapsed().as_secs_f64() * 1e6;

        if self.t + self.delta_time > self.tf {
            return Ok(State::Finished);
        }

        // Keep the cached input in step with the trajectory so the change
        // check only fires on target or limit changes.
        self.current_input.current_position = output.new_position;
        self.current_input.current_velocity = output.new_velocity;
        self.current_input.current_acceleration = output.new_acceleration;
        Ok(State::Working)
    }

    /// Plan a new trajectory for `input`. On success the internal clock is
    /// reset and the input cached; on error no state survives for
    /// sampling.
    pub fn calculate(
        &mut self,
        input: &InputParameter<DOFS>,
        output: &mut OutputParameter<DOFS>,
    ) -> Result<(), Error> {
        validate_input(input)?;

        let mut blocks: [Option<Block>; DOFS] = std::array::from_fn(|_| None);
        // Starting states of the profiles proper, after any brake prefix.
        let mut p0s = [0.0; DOFS];
        let mut v0s = [0.0; DOFS];
        let mut a0s = [0.0; DOFS];
        for dof in 0..DOFS {
            if !input.enabled[dof] {
                continue;
            }

            let profile = &mut self.profiles[dof];
            *profile = Profile::default();

            // Brake first when the state exceeds the limits; the solvers
            // then start from the post-brake state.
            let brake = brake_trajectory(
                input.current_velocity[dof],
                input.current_acceleration[dof],
                input.max_velocity[dof],
                input.max_acceleration[dof],
                input.max_jerk[dof],
            );
            profile.t_brakes = brake.t;
            profile.j_brakes = brake.j;
            profile.t_brake = (brake.duration() > 0.0).then_some(brake.duration());

            let mut p0 = input.current_position[dof];
            let mut v0 = input.current_velocity[dof];
            let mut a0 = input.current_acceleration[dof];
            if profile.t_brakes[0] > 0.0 {
                profile.p_brakes[0] = p0;
                profile.v_brakes[0] = v0;
                profile.a_brakes[0] = a0;
                (p0, v0, a0) = integrate(profile.t_brakes[0], p0, v0, a0, profile.j_brakes[0]);

                if profile.t_brakes[1] > 0.0 {
                    profile.p_brakes[1] = p0;
                    profile.v_brakes[1] = v0;
                    profile.a_brakes[1] = a0;
                    (p0, v0, a0) = integrate(profile.t_brakes[1], p0, v0, a0, profile.j_brakes[1]);
                }
            }

            p0s[dof] = p0;
            v0s[dof] = v0;
            a0s[dof] = a0;

            let mut step1 = Step1::new(
                p0,
                v0,
                a0,
                input.target_position[dof],
                input.target_velocity[dof],
                input.target_acceleration[dof],
                input.max_velocity[dof],
                input.max_acceleration[dof],
                input.max_jerk[dof],
            );
            let block = step1.block(profile).ok_or_else(|| {
                tracing::error!(dof, "time-optimal solver found no feasible profile");
                Error::ExecutionTime { dof }
            })?;
            output.independent_min_durations[dof] = block.t_min;
            blocks[dof] = Some(block);
        }

        let sync = synchronize(&blocks, input.minimum_duration).ok_or_else(|| {
            tracing::error!("no common duration satisfies every axis");
            Error::Synchronization {
                dof: None,
                t_sync: None,
            }
        })?;
        let t_sync = sync.t_sync;
        if let (Some(dof), Some(profile)) = (sync.limiting_dof, sync.profile) {
            self.profiles[dof] = profile;
        }
        tracing::debug!(t_sync, limiting_dof = ?sync.limiting_dof, "new trajectory");

        if t_sync > 0.0 {
            for dof in 0..DOFS {
                if !input.enabled[dof] || Some(dof) == sync.limiting_dof {
                    continue;
                }

                let template = self.profiles[dof].clone();
                let t_profile = t_sync - template.t_brake.unwrap_or(0.0);
                let step2 = Step2::new(
                    t_profile,
                    p0s[dof],
                    v0s[dof],
                    a0s[dof],
                    input.target_position[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_velocity[dof],
                    input.max_acceleration[dof],
                    input.max_jerk[dof],
                );
                self.profiles[dof] = step2.profile(&template).ok_or_else(|| {
                    tracing::error!(dof, t_sync, "no profile of the synchronized duration");
                    Error::Synchronization {
                        dof: Some(dof),
                        t_sync: Some(t_sync),
                    }
                })?;
            }
        }

        self.t = 0.0;
        self.tf = t_sync;
        self.current_input = input.clone();
        output.duration = t_sync;
        output.new_calculation = true;
        Ok(())
    }

    /// Sample the active plan at `time`.
    pub fn at_time(&self, time: f64, output: &mut OutputParameter<DOFS>) {
        for dof in 0..DOFS {
            if !self.current_input.enabled[dof] {
                // Held: constant acceleration from the cached state.
                let (p, v, a) = integrate(
                    time,
                    self.current_input.current_position[dof],
                    self.current_input.current_velocity[dof],
                    self.current_input.current_acceleration[dof],
                    0.0,
                );
                output.new_position[dof] = p;
                output.new_velocity[dof] = v;
                output.new_acceleration[dof] = a;
                continue;
            }

            if time + self.delta_time > self.tf {
                // Past the end: keep integrating the target state with
                // zero jerk, which preserves a non-zero target
                // acceleration.
                let (p, v, a) = integrate(
                    time - self.tf,
                    self.current_input.target_position[dof],
                    self.current_input.target_velocity[dof],
                    self.current_input.target_acceleration[dof],
                    0.0,
                );
                output.new_position[dof] = p;
                output.new_velocity[dof] = v;
                output.new_acceleration[dof] = a;
                continue;
            }

            let profile = &self.profiles[dof];
            let mut t_diff = time;

            if let Some(t_brake) = profile.t_brake {
                if t_diff < t_brake {
                    let index = if t_diff < profile.t_brakes[0] { 0 } else { 1 };
                    if index > 0 {
                        t_diff -= profile.t_brakes[index - 1];
                    }
                    let (p, v, a) = integrate(
                        t_diff,
                        profile.p_brakes[index],
                        profile.v_brakes[index],
                        profile.a_brakes[index],
                        profile.j_brakes[index],
                    );
                    output.new_position[dof] = p;
                    output.new_velocity[dof] = v;
                    output.new_acceleration[dof] = a;
                    continue;
                }
                t_diff -= t_brake;
            }

            if t_diff >= profile.t_sum[6] {
                output.new_position[dof] = profile.p[7];
                output.new_velocity[dof] = profile.v[7];
                output.new_acceleration[dof] = profile.a[7];
                continue;
            }

            let index = profile.t_sum.partition_point(|&s| s <= t_diff);
            if index > 0 {
                t_diff -= profile.t_sum[index - 1];
            }
            let (p, v, a) = integrate(
                t_diff,
                profile.p[index],
                profile.v[index],
                profile.a[index],
                profile.j[index],
            );
            output.new_position[dof] = p;
            output.new_velocity[dof] = v;
            output.new_acceleration[dof] = a;
        }
    }
}

fn validate_input<const DOFS: usize>(input: &InputParameter<DOFS>) -> Result<(), Error> {
    for dof in 0..DOFS {
        let fail = |reason| {
            tracing::error!(dof, reason, "input rejected");
            Err(Error::InvalidInput { dof, reason })
        };

        if input.max_velocity[dof] <= 0.0 {
            return fail("velocity limit must be positive");
        }
        if input.max_acceleration[dof] <= 0.0 {
            return fail("acceleration limit must be positive");
        }
        if input.max_jerk[dof] <= 0.0 {
            return fail("jerk limit must be positive");
        }
        if input.target_velocity[dof] > input.max_velocity[dof] {
            return fail("target velocity exceeds velocity limit");
        }
        if input.target_acceleration[dof] > input.max_acceleration[dof] {
            return fail("target acceleration exceeds acceleration limit");
        }
        let ceiling = (2.0
            * input.max_jerk[dof]
            * (input.max_velocity[dof] - input.target_velocity[dof].abs()))
        .sqrt();
        if input.target_acceleration[dof].abs() > ceiling {
            return fail("target acceleration exceeds the reachable ceiling");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_axis_input(pf: f64) -> InputParameter<1> {
        InputParameter {
            target_position: [pf],
            max_velocity: [1.0],
            max_acceleration: [1.0],
            max_jerk: [1.0],
            ..InputParameter::default()
        }
    }

    #[test]
    fn rejects_nonpositive_limits() {
        let mut generator = Generator::<1>::new(0.01);
        let mut input = single_axis_input(1.0);
        input.max_velocity[0] = 0.0;
        let mut output = OutputParameter::default();
        assert_eq!(
            generator.update(&input, &mut output),
            Err(Error::InvalidInput {
                dof: 0,
                reason: "velocity limit must be positive"
            })
        );
    }

    #[test]
    fn rejects_unreachable_target_acceleration() {
        let mut generator = Generator::<1>::new(0.01);
        let mut input = single_axis_input(1.0);
        input.target_velocity = [0.9];
        input.target_acceleration = [0.9];
        let mut output = OutputParameter::default();
        // ceiling = sqrt(2*1*(1-0.9)) ~= 0.447
        assert!(matches!(
            generator.update(&input, &mut output),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn plans_once_and_reports_duration() {
        let mut generator = Generator::<1>::new(0.01);
        let input = single_axis_input(1.0);
        let mut output = OutputParameter::default();
        assert_eq!(generator.update(&input, &mut output), Ok(State::Working));
        assert!(output.new_calculation);
        assert!((output.duration - 32.0f64.cbrt()).abs() < 1e-9);
        assert!((output.independent_min_durations[0] - output.duration).abs() < 1e-9);
    }

    #[test]
    fn invalid_input_is_revalidated_every_cycle() {
        let mut generator = Generator::<1>::new(0.01);
        let mut input = single_axis_input(1.0);
        input.max_jerk[0] = -1.0;
        let mut output = OutputParameter::default();
        for _ in 0..3 {
            assert!(generator.update(&input, &mut output).is_err());
        }
    }

    #[test]
    fn runs_to_finished() {
        let mut generator = Generator::<1>::new(0.01);
        let mut input = single_axis_input(1.0);
        let mut output = OutputParameter::default();
        let mut cycles: usize = 0;
        loop {
            let state = generator.update(&input, &mut output).unwrap();
            input.current_position = output.new_position;
            input.current_velocity = output.new_velocity;
            input.current_acceleration = output.new_acceleration;
            cycles += 1;
            assert!(cycles < 1000, "trajectory did not finish");
            if state == State::Finished {
                break;
            }
        }
        let expected_cycles = (32.0f64.cbrt() / 0.01).ceil() as usize;
        assert!(cycles.abs_diff(expected_cycles) <= 2);
        assert!((output.new_position[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unchanged_input_does_not_replan() {
        let mut generator = Generator::<1>::new(0.01);
        let mut input = single_axis_input(1.0);
        let mut output = OutputParameter::default();
        generator.update(&input, &mut output).unwrap();
        assert!(output.new_calculation);
        input.current_position = output.new_position;
        input.current_velocity = output.new_velocity;
        input.current_acceleration = output.new_acceleration;
        generator.update(&input, &mut output).unwrap();
        assert!(!output.new_calculation);
    }

    #[test]
    fn disabled_axis_holds_state() {
        let mut generator = Generator::<2>::new(0.01);
        let input = InputParameter::<2> {
            target_position: [1.0, 5.0],
            max_velocity: [1.0; 2],
            max_acceleration: [1.0; 2],
            max_jerk: [1.0; 2],
            enabled: [true, false],
            ..InputParameter::default()
        };
        let mut output = OutputParameter::default();
        generator.update(&input, &mut output).unwrap();
        assert_eq!(output.new_position[1], 0.0);
        assert_eq!(output.new_velocity[1], 0.0);
    }

    #[test]
    fn finished_extrapolates_target_acceleration() {
        let mut generator = Generator::<1>::new(0.01);
        let input = InputParameter::<1> {
            current_position: [0.0],
            target_position: [0.4],
            target_velocity: [0.5],
            target_acceleration: [0.3],
            max_velocity: [1.0],
            max_acceleration: [1.0],
            max_jerk: [1.0],
            ..InputParameter::default()
        };
        let mut output = OutputParameter::default();
        let mut next = input.clone();
        for _ in 0..10_000 {
            if generator.update(&next, &mut output).unwrap() == State::Finished {
                break;
            }
            next.current_position = output.new_position;
            next.current_velocity = output.new_velocity;
            next.current_acceleration = output.new_acceleration;
        }
        // Past the end the target acceleration keeps integrating; the
        // final sample sits within one cycle of the target state.
        assert!((output.new_acceleration[0] - 0.3).abs() < 1e-9);
        assert!((output.new_velocity[0] - 0.5).abs() < 0.3 * 0.01 + 1e-9);
    }
}
