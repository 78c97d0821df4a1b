//! Daily vaccination rollout.
use super::clamp01;
use crate::environment::Environment;
use crate::individual::Individual;
use rand::Rng;
use rand::seq::SliceRandom;

/// Largest fraction of the population which can be vaccinated in one day
const DAILY_ROLLOUT_FRACTION: f64 = 0.02;

/// Probability that an individual accepts a vaccine when offered
fn acceptance_probability(individual: &Individual) -> f64 {
    let age_modifier = if individual.age >= 60 {
        0.20
    } else if individual.age >= 40 {
        0.10
    } else {
        0.0
    };
    let health_modifier = if individual.in_hospital {
        0.30
    } else if individual.is_infected() {
        0.10
    } else {
        0.0
    };

    clamp01(
        0.55 + age_modifier
            + 0.15 * individual.social_distance_compliance
            + 0.08 * individual.hygiene_level
            + health_modifier,
    )
}

/// Number of vaccines which can be offered today
fn daily_slots(env: &Environment) -> usize {
    let population_size = env.population_size();
    let desired = (clamp01(env.vaccination_rate) * population_size as f64).round() as usize;
    let available = desired.saturating_sub(env.vaccinated_count());
    let cap = ((DAILY_ROLLOUT_FRACTION * population_size as f64).round() as usize).max(1);

    available.min(cap)
}

/// Offer vaccines to unvaccinated, living individuals in a random order.
///
/// Coverage is driven towards the environment's vaccination rate, with at most 2% of the
/// population (and at least one person) vaccinated per day.
///
/// # Returns
///
/// The number of individuals vaccinated
pub fn roll_out_vaccinations(env: &mut Environment, rng: &mut impl Rng) -> usize {
    let mut slots = daily_slots(env);
    if slots == 0 {
        return 0;
    }

    let mut order: Vec<usize> = (0..env.population_size()).collect();
    order.shuffle(rng);

    let mut vaccinated = 0;
    for index in order {
        let individual = &mut env.population_mut()[index];
        if individual.is_vaccinated() || !individual.is_alive() {
            continue;
        }

        if rng.random::<f64>() < acceptance_probability(individual) {
            individual.vaccinate();
            vaccinated += 1;
            slots -= 1;
            if slots == 0 {
                break;
            }
        }
    }

    vaccinated
}
