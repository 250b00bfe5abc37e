use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stretto_core::generator::Generator;
use stretto_core::params::OutputParameter;

use crate::config::JobConfig;

#[derive(Args)]
pub struct CheckArgs {
    /// Job description file (TOML or JSON).
    job: PathBuf,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        let job = JobConfig::from_file(&self.job)?;
        job.validate()?;

        match job.axes.len() {
            1 => check::<1>(&job),
            2 => check::<2>(&job),
            3 => check::<3>(&job),
            4 => check::<4>(&job),
            5 => check::<5>(&job),
            6 => check::<6>(&job),
            7 => check::<7>(&job),
            8 => check::<8>(&job),
            n => anyhow::bail!("unsupported axis count {n}"),
        }
    }
}

fn check<const DOFS: usize>(job: &JobConfig) -> Result<()> {
    let input = job.input::<DOFS>();
    let mut generator = Generator::<DOFS>::new(job.delta_time);
    let mut output = OutputParameter::default();
    generator
        .calculate(&input, &mut output)
        .context("job is not plannable")?;

    println!("synchronized duration: {:.6} s", output.duration);
    for dof in 0..DOFS {
        if input.enabled[dof] {
            println!(
                "axis {dof}: minimum duration {:.6} s",
                output.independent_min_durations[dof]
            );
        } else {
            println!("axis {dof}: disabled");
        }
    }
    Ok(())
}
