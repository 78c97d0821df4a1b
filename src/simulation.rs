//! Functionality for running the disease-spread simulation.
use crate::environment::Environment;
use crate::error::SimulationResult;
use crate::input::build_environment;
use crate::model::Model;
use crate::output::DataWriter;
use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

pub mod behaviour;
pub mod health;
use health::update_health;
pub mod movement;
use movement::move_population;
pub mod policy;
use policy::update_environment;
pub mod transition;
pub mod vaccination;
use vaccination::roll_out_vaccinations;

/// Clamp a value onto [0, 1]
pub(crate) fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// A summary of one simulated day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    /// Fraction of the population infected after the health update
    pub infected_fraction: f64,
    /// Whether the environment tightened its social-distance policy
    pub policy_tightened: bool,
    /// Number of individuals vaccinated today
    pub newly_vaccinated: usize,
}

/// Advance the environment by one day.
///
/// The day consists of vaccination rollout, the health update for every individual, the
/// environment's policy response and finally movement. Any error leaves the environment in the
/// partially-updated state it was in when the error occurred.
pub fn advance_one_day(env: &mut Environment, rng: &mut impl Rng) -> SimulationResult<DayOutcome> {
    env.ensure_not_empty()?;

    let newly_vaccinated = roll_out_vaccinations(env, rng);
    if newly_vaccinated > 0 {
        debug!("Vaccinated {newly_vaccinated} individuals");
    }

    update_health(env, rng)?;
    let policy = update_environment(env, rng)?;
    move_population(env, rng);

    Ok(DayOutcome {
        infected_fraction: policy.stats.infected_fraction,
        policy_tightened: policy.tightened,
        newly_vaccinated,
    })
}

/// Run the simulation.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. per-individual state) to file
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    // Seeds are recorded as TOML integers, so must fit in an i64
    let seed = model
        .parameters
        .simulation
        .seed
        .unwrap_or_else(|| rand::random::<u64>() >> 1);
    info!("Random seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut env = build_environment(model, &mut rng)?;
    info!(
        "Population of {} with {} initially infected",
        env.population_size(),
        env.infected_count()
    );

    let mut writer = DataWriter::create(output_path, &model.model_path, seed, debug_model)?;
    writer.write_day(0, &env, None)?;

    for day in 1..=model.num_days() {
        let outcome = advance_one_day(&mut env, &mut rng)
            .with_context(|| format!("Simulation failed on day {day}"))?;
        writer.write_day(day, &env, Some(&outcome))?;

        let counts = env.status_counts();
        debug!(
            "Day {day}: {counts}, infected fraction {:.3}, threshold {:.3}, hygiene {:.3}",
            outcome.infected_fraction, env.social_distance_threshold, env.hygiene_level
        );
    }
    writer.flush()?;

    info!("Final population: {}", env.status_counts());

    Ok(())
}
