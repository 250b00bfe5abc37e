use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stretto_core::error::State;
use stretto_core::generator::Generator;
use stretto_core::params::OutputParameter;

use crate::config::JobConfig;

#[derive(Args)]
pub struct PlanArgs {
    /// Job description file (TOML or JSON).
    job: PathBuf,

    /// Print only the plan summary instead of per-cycle samples.
    #[arg(long)]
    summary: bool,

    /// Write sample rows to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl PlanArgs {
    pub fn run(&self) -> Result<()> {
        let job = JobConfig::from_file(&self.job)?;
        job.validate()?;

        let mut sink: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("failed to create output file {}", path.display())
            })?)),
            None => Box::new(std::io::stdout().lock()),
        };

        match job.axes.len() {
            1 => trace::<1>(&job, self.summary, &mut sink),
            2 => trace::<2>(&job, self.summary, &mut sink),
            3 => trace::<3>(&job, self.summary, &mut sink),
            4 => trace::<4>(&job, self.summary, &mut sink),
            5 => trace::<5>(&job, self.summary, &mut sink),
            6 => trace::<6>(&job, self.summary, &mut sink),
            7 => trace::<7>(&job, self.summary, &mut sink),
            8 => trace::<8>(&job, self.summary, &mut sink),
            n => anyhow::bail!("unsupported axis count {n}"),
        }
    }
}

fn trace<const DOFS: usize>(job: &JobConfig, summary: bool, sink: &mut dyn Write) -> Result<()> {
    let input = job.input::<DOFS>();
    let mut generator = Generator::<DOFS>::new(job.delta_time);
    let mut output = OutputParameter::default();
    let mut next = input.clone();

    if !summary {
        write!(sink, "time")?;
        for dof in 0..DOFS {
            write!(sink, ",position_{dof},velocity_{dof},acceleration_{dof}")?;
        }
        writeln!(sink)?;
    }

    let mut time = 0.0;
    let mut planned = None;
    loop {
        let state = generator
            .update(&next, &mut output)
            .context("planning failed")?;
        if planned.is_none() {
            planned = Some((output.duration, output.independent_min_durations));
        }
        time += job.delta_time;

        if !summary {
            write!(sink, "{time:.6}")?;
            for dof in 0..DOFS {
                write!(
                    sink,
                    ",{:.9},{:.9},{:.9}",
                    output.new_position[dof], output.new_velocity[dof], output.new_acceleration[dof]
                )?;
            }
            writeln!(sink)?;
        }

        if state == State::Finished {
            break;
        }
        next.current_position = output.new_position;
        next.current_velocity = output.new_velocity;
        next.current_acceleration = output.new_acceleration;
    }

    if summary {
        let (duration, min_durations) = planned.unwrap_or((0.0, [0.0; DOFS]));
        writeln!(sink, "duration: {duration:.6} s")?;
        for (dof, t_min) in min_durations.iter().enumerate() {
            writeln!(sink, "axis {dof}: minimum duration {t_min:.6} s")?;
        }
    }
    sink.flush()?;
    Ok(())
}
