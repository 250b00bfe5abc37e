/// Integration test for the job configuration pipeline.
use anyhow::Result;
use std::fs;
use stretto::config::JobConfig;
use stretto_core::generator::Generator;
use stretto_core::params::OutputParameter;

#[test]
fn parse_and_plan_sample_job() -> Result<()> {
    let path = std::env::temp_dir().join("stretto_sample_job.toml");
    fs::write(
        &path,
        r#"
delta_time = 0.01

[[axes]]
target_position = 1.0
max_velocity = 1.0
max_acceleration = 1.0
max_jerk = 1.0

[[axes]]
target_position = 5.0
max_velocity = 1.0
max_acceleration = 1.0
max_jerk = 1.0
"#,
    )?;

    let job = JobConfig::from_file(&path)?;
    job.validate()?;
    assert_eq!(job.axes.len(), 2);

    let input = job.input::<2>();
    let mut generator = Generator::<2>::new(job.delta_time);
    let mut output = OutputParameter::default();
    generator.calculate(&input, &mut output)?;

    // The longer axis limits the pair.
    assert!(output.duration >= output.independent_min_durations[0]);
    assert!((output.duration - output.independent_min_durations[1]).abs() < 1e-9);

    fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn json_job_with_floor() -> Result<()> {
    let job = JobConfig::from_json(
        r#"{
            "delta_time": 0.01,
            "minimum_duration": 10.0,
            "axes": [{
                "target_position": 1.0,
                "max_velocity": 1.0,
                "max_acceleration": 1.0,
                "max_jerk": 1.0
            }]
        }"#,
    )?;
    job.validate()?;

    let input = job.input::<1>();
    let mut generator = Generator::<1>::new(job.delta_time);
    let mut output = OutputParameter::default();
    generator.calculate(&input, &mut output)?;
    assert!(output.duration >= 10.0);
    Ok(())
}
