//! Daily transition probabilities between health statuses.
//!
//! Each individual has five candidate probabilities:
//!
//! * `a` - Healthy to Susceptible
//! * `b` - Susceptible to Infected
//! * `c` - Infected to Dead
//! * `d` - Infected to Recovered
//! * `e` - Recovered to Healthy
//!
//! Only the ones relevant to the individual's current status are non-zero.
use super::clamp01;
use crate::environment::Environment;
use crate::error::{SimulationError, SimulationResult};
use crate::individual::{HealthStatus, Individual};
use crate::spatial::Neighbourhood;

/// Days for which a vaccine gives full protection
const FULL_PROTECTION_DAYS: f64 = 30.0;

/// Days over which vaccine protection wanes to zero after the full-protection period
const PROTECTION_WANING_DAYS: f64 = 180.0;

/// Environment hygiene at or above which nobody becomes susceptible
const HYGIENE_SAFE_LEVEL: f64 = 0.5;

/// Multiple of the transmission distance within which infected individuals can pass on disease
const EXPOSURE_RANGE_FACTOR: f64 = 3.0;

/// The transition probabilities for one individual on one day
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransitionProbabilities {
    /// Healthy to Susceptible
    pub a: f64,
    /// Susceptible to Infected
    pub b: f64,
    /// Infected to Dead
    pub c: f64,
    /// Infected to Recovered
    pub d: f64,
    /// Recovered to Healthy
    pub e: f64,
}

impl TransitionProbabilities {
    /// Check that every probability is in [0, 1] and that death and recovery are exclusive.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the individual in the population, for error reporting
    pub fn validate(&self, index: usize) -> SimulationResult<()> {
        let named = [
            ("a", self.a),
            ("b", self.b),
            ("c", self.c),
            ("d", self.d),
            ("e", self.e),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidProbability {
                    index,
                    reason: format!("{name} = {value} is outside [0, 1]"),
                });
            }
        }

        if self.c + self.d > 1.0 {
            return Err(SimulationError::InvalidProbability {
                index,
                reason: format!("c + d = {} exceeds 1", self.c + self.d),
            });
        }

        Ok(())
    }
}

/// Fraction of infection risk removed by vaccination, given days since vaccination
fn vaccine_protection(individual: &Individual) -> f64 {
    if !individual.is_vaccinated() {
        return 0.0;
    }

    let days = individual.days_since_vaccination as f64;
    if days <= FULL_PROTECTION_DAYS {
        1.0
    } else {
        1.0 - clamp01((days - FULL_PROTECTION_DAYS) / PROTECTION_WANING_DAYS)
    }
}

/// The social-distance radius, with fallbacks for a non-positive threshold
fn exposure_radius(env: &Environment, individual: &Individual) -> f64 {
    let mut radius = env.social_distance_threshold;
    if radius <= 0.0 {
        radius = individual
            .disease
            .as_ref()
            .map_or(0.0, |disease| 0.5 * disease.transmission_distance);
    }
    if radius <= 0.0 {
        radius = 1.0;
    }

    radius
}

/// Probability of a healthy individual becoming susceptible
pub fn healthy_to_susceptible(
    env: &Environment,
    neighbourhood: &Neighbourhood,
    index: usize,
) -> f64 {
    let individual = &env.population()[index];
    let radius = exposure_radius(env, individual)
        * (1.0 - 0.6 * clamp01(individual.social_distance_compliance));

    let infected = neighbourhood.infected_within(env.population(), index, radius);
    if infected.is_empty() || env.hygiene_level >= HYGIENE_SAFE_LEVEL {
        return 0.0;
    }

    clamp01(1.0 - vaccine_protection(individual))
}

/// Probability of a susceptible individual becoming infected.
///
/// Each infected neighbour is an independent chance of infection which decays exponentially with
/// distance.
pub fn susceptible_to_infected(
    env: &Environment,
    neighbourhood: &Neighbourhood,
    index: usize,
) -> f64 {
    let individual = &env.population()[index];
    let Some(disease) = &individual.disease else {
        return 0.0;
    };

    let base_distance = if disease.transmission_distance > 0.0 {
        disease.transmission_distance
    } else {
        1.0
    };
    let vaccination_factor = if individual.is_vaccinated() {
        0.5
    } else {
        1.0 - 0.5 * clamp01(env.vaccination_rate)
    };
    let hygiene_factor = 1.0 - 0.4 * clamp01(env.hygiene_level);
    let compliance_factor = 1.0 - 0.4 * clamp01(individual.social_distance_compliance);

    let infected = neighbourhood.infected_within(
        env.population(),
        index,
        EXPOSURE_RANGE_FACTOR * base_distance,
    );
    let escape_all: f64 = infected
        .iter()
        .map(|neighbour| {
            let exposure = disease.transmission_rate
                * (-neighbour.distance / base_distance).exp()
                * vaccination_factor
                * hygiene_factor
                * compliance_factor;
            1.0 - clamp01(exposure)
        })
        .product();

    clamp01(1.0 - escape_all)
}

/// Age multiplier for mortality
fn mortality_age_factor(age: u32) -> f64 {
    match age {
        0..40 => 0.6,
        40..=60 => 1.0,
        _ => 1.6,
    }
}

/// Age multiplier for recovery
fn recovery_age_factor(age: u32) -> f64 {
    match age {
        0..40 => 1.4,
        40..=60 => 1.0,
        _ => 0.7,
    }
}

/// Probability of an infected individual dying.
///
/// # Arguments
///
/// * `env` - The environment
/// * `individual` - The infected individual
/// * `infected_total` - Number of infected individuals, for hospital overload
pub fn infected_to_dead(env: &Environment, individual: &Individual, infected_total: usize) -> f64 {
    let Some(disease) = &individual.disease else {
        return 0.0;
    };

    let capacity = env.medical_capacity as f64;
    let infected_total = infected_total as f64;
    let overload_factor = if capacity > 0.0 && infected_total > capacity {
        1.0 + (infected_total - capacity) / capacity
    } else {
        1.0
    };
    let care_factor = 1.0 - 0.6 * env.medical_care_level;
    let vaccination_factor = if individual.is_vaccinated() { 0.5 } else { 1.0 };

    clamp01(
        disease.mortality_rate
            * mortality_age_factor(individual.age)
            * overload_factor
            * care_factor
            * vaccination_factor,
    )
}

/// Probability of an infected individual recovering
pub fn infected_to_recovered(env: &Environment, individual: &Individual) -> f64 {
    let Some(disease) = &individual.disease else {
        return 0.0;
    };

    let care_factor = 1.0 + 0.5 * env.medical_care_level;
    let time_factor = 1.0 + (individual.days_infected as f64 + 1.0).ln() / 10.0;

    clamp01(disease.recovery_rate * recovery_age_factor(individual.age) * care_factor * time_factor)
}

/// Probability of a recovered individual losing immunity
pub fn recovered_to_healthy(individual: &Individual) -> f64 {
    if individual.disease.is_none() {
        return 0.0;
    }

    let base = 0.01 + (individual.days_since_recovery as f64 + 1.0).ln() / 50.0;
    let vaccination_factor = if individual.is_vaccinated() { 0.5 } else { 1.0 };

    clamp01(base * vaccination_factor)
}

/// Compute the probabilities relevant to an individual's current status.
///
/// # Arguments
///
/// * `env` - The environment, before any of today's transitions
/// * `neighbourhood` - Neighbour lookup for today's positions
/// * `index` - Position of the individual in the population
/// * `infected_total` - Number of infected individuals before any of today's transitions
pub fn compute_probabilities(
    env: &Environment,
    neighbourhood: &Neighbourhood,
    index: usize,
    infected_total: usize,
) -> TransitionProbabilities {
    let individual = &env.population()[index];
    match individual.health_status {
        HealthStatus::Healthy => TransitionProbabilities {
            a: healthy_to_susceptible(env, neighbourhood, index),
            ..Default::default()
        },
        HealthStatus::Susceptible => TransitionProbabilities {
            b: susceptible_to_infected(env, neighbourhood, index),
            ..Default::default()
        },
        HealthStatus::Infected => TransitionProbabilities {
            c: infected_to_dead(env, individual, infected_total),
            d: infected_to_recovered(env, individual),
            ..Default::default()
        },
        HealthStatus::Recovered => TransitionProbabilities {
            e: recovered_to_healthy(individual),
            ..Default::default()
        },
        HealthStatus::Dead => TransitionProbabilities::default(),
    }
}
