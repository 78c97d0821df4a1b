//! Environment-level policy which responds to the state of the population.
//!
//! Once a day the environment tightens or relaxes social distancing according to prevalence and
//! hospital load, runs hygiene campaigns and updates its estimate of vaccination coverage.
use super::clamp01;
use crate::environment::Environment;
use crate::error::{SimulationError, SimulationResult};
use log::debug;
use rand::Rng;

/// Weight given to the new candidate threshold when smoothing
const THRESHOLD_SMOOTHING: f64 = 0.25;

/// Weight given to actual coverage when updating the vaccination-rate estimate
const COVERAGE_SMOOTHING: f64 = 0.3;

/// Infected fraction above which a hygiene campaign runs
const CAMPAIGN_PREVALENCE: f64 = 0.4;

/// Aggregate statistics about the population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Fraction of the population currently infected
    pub infected_fraction: f64,
    /// Number of individuals currently infected
    pub infected: usize,
    /// Number of individuals vaccinated
    pub vaccinated: usize,
    /// Mean personal hygiene level
    pub mean_hygiene: f64,
    /// Mean transmission distance of the diseases individuals refer to
    pub mean_transmission_distance: f64,
    /// Number of individuals, alive or dead
    pub population_size: usize,
}

impl PopulationStats {
    /// Gather statistics from the environment's population
    pub fn from_environment(env: &Environment) -> SimulationResult<Self> {
        env.ensure_not_empty()?;

        let population = env.population();
        let population_size = population.len();
        let infected = env.infected_count();
        let hygiene_total: f64 = population
            .iter()
            .map(|ind| clamp01(ind.hygiene_level))
            .sum();

        let distances: Vec<f64> = population
            .iter()
            .filter_map(|ind| ind.disease.as_ref())
            .map(|disease| disease.transmission_distance)
            .filter(|&distance| distance > 0.0)
            .collect();
        let mean_transmission_distance = if distances.is_empty() {
            1.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };

        Ok(Self {
            infected_fraction: infected as f64 / population_size as f64,
            infected,
            vaccinated: env.vaccinated_count(),
            mean_hygiene: hygiene_total / population_size as f64,
            mean_transmission_distance,
            population_size,
        })
    }
}

/// The result of a policy update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyUpdate {
    /// The statistics the update was based on
    pub stats: PopulationStats,
    /// Whether the unsmoothed candidate threshold was lower than the previous threshold
    pub tightened: bool,
}

/// Multiplier applied to the mean transmission distance to get a candidate threshold
fn threshold_factor(stats: &PopulationStats, medical_capacity: u32) -> f64 {
    let mut factor = match stats.infected_fraction {
        f if f < 0.01 => 2.0,
        f if f < 0.05 => 1.5,
        f if f < 0.10 => 1.0,
        f if f < 0.20 => 0.7,
        _ => 0.4,
    };

    let capacity = medical_capacity as f64;
    let infected = stats.infected as f64;
    if capacity > 0.0 && stats.infected_fraction > 0.0 && infected > capacity {
        let overload_ratio = (infected - capacity) / capacity;
        factor *= 1.0 - clamp01(0.25 * overload_ratio);
    }

    factor
}

/// Update the social-distance threshold, returning whether policy tightened
fn update_threshold(env: &mut Environment, stats: &PopulationStats) -> bool {
    let mean_distance = stats.mean_transmission_distance;
    let candidate = mean_distance * threshold_factor(stats, env.medical_capacity);
    let previous = env.social_distance_threshold;

    let smoothed = if previous <= 0.0 {
        candidate
    } else {
        previous * (1.0 - THRESHOLD_SMOOTHING) + candidate * THRESHOLD_SMOOTHING
    };
    let lower = (0.1 * mean_distance).max(0.1);
    let upper = 4.0 * mean_distance;
    env.social_distance_threshold = smoothed.max(lower).min(upper);

    previous > 0.0 && candidate < previous
}

/// Update environment hygiene from the population and any public campaigns
fn update_hygiene(env: &mut Environment, stats: &PopulationStats, rng: &mut impl Rng) {
    let campaign = if stats.infected_fraction > CAMPAIGN_PREVALENCE {
        clamp01(stats.infected_fraction * 1.5)
    } else {
        0.0
    };

    let threshold = env.social_distance_threshold;
    let reference = if threshold > 0.0 { threshold } else { 1.0 };
    let strictness = clamp01(1.0 - threshold / (4.0 * reference));
    let boost = clamp01(campaign * 0.6 + 0.2 * strictness * 0.4);
    let noise = (rng.random::<f64>() * 2.0 - 1.0) * 0.02;

    env.hygiene_level =
        clamp01(env.hygiene_level * 0.65 + stats.mean_hygiene * 0.35 + boost + noise);
}

/// Move the vaccination-rate estimate towards actual coverage
fn update_vaccination_rate(env: &mut Environment, stats: &PopulationStats) -> SimulationResult<()> {
    if stats.population_size == 0 {
        return Err(SimulationError::InvalidInput(
            "population size must be positive".into(),
        ));
    }

    let coverage = stats.vaccinated as f64 / stats.population_size as f64;
    env.vaccination_rate = clamp01(
        env.vaccination_rate * (1.0 - COVERAGE_SMOOTHING) + coverage * COVERAGE_SMOOTHING,
    );

    Ok(())
}

/// Update the environment's policy in response to the population.
///
/// The social-distance threshold is updated first, so the hygiene campaign responds to the new
/// threshold.
pub fn update_environment(
    env: &mut Environment,
    rng: &mut impl Rng,
) -> SimulationResult<PolicyUpdate> {
    let stats = PopulationStats::from_environment(env)?;
    let tightened = update_threshold(env, &stats);
    update_hygiene(env, &stats, rng);
    update_vaccination_rate(env, &stats)?;

    debug!(
        "Policy: threshold {:.3}{}, hygiene {:.3}, vaccination rate {:.3}",
        env.social_distance_threshold,
        if tightened { " (tightened)" } else { "" },
        env.hygiene_level,
        env.vaccination_rate
    );

    Ok(PolicyUpdate { stats, tightened })
}
