//! Daily adaptation of personal hygiene and social-distance compliance.
//!
//! Individuals drift towards the behaviour of those around them and towards current policy. Being
//! ill makes them more careful, while vaccination slowly makes them complacent.
//!
//! Updates read the current values of neighbours, so an individual visited later in the day sees
//! the already-updated behaviour of those visited earlier.
use super::clamp01;
use crate::environment::Environment;
use crate::individual::{Individual, MoveType};
use crate::spatial::Neighbourhood;
use rand::Rng;

/// Radius within which neighbours influence hygiene
const HYGIENE_RADIUS: f64 = 2.0;

/// Radius within which neighbours influence compliance
const COMPLIANCE_RADIUS: f64 = 3.0;

/// Days over which vaccination complacency reaches its maximum
const COMPLACENCY_DAYS: f64 = 180.0;

/// Smallest movement radius compliance can shrink an individual's pattern to
const MIN_MOVE_RADIUS: f64 = 0.01;

/// Mean of `value` over the individuals near `index`, if there are any
fn neighbour_mean<F>(
    env: &Environment,
    neighbourhood: &Neighbourhood,
    index: usize,
    radius: f64,
    value: F,
) -> Option<f64>
where
    F: Fn(&Individual) -> f64,
{
    let population = env.population();
    let neighbours = neighbourhood.all_within(population, index, radius);
    if neighbours.is_empty() {
        return None;
    }

    let total: f64 = neighbours
        .iter()
        .map(|neighbour| value(&population[neighbour.index]))
        .sum();
    Some(total / neighbours.len() as f64)
}

/// Fraction of the complacency effect reached, given days since vaccination
fn complacency(individual: &Individual) -> f64 {
    clamp01(individual.days_since_vaccination as f64 / COMPLACENCY_DAYS)
}

/// Uniform noise in [-amplitude, amplitude)
fn noise(rng: &mut impl Rng, amplitude: f64) -> f64 {
    (rng.random::<f64>() * 2.0 - 1.0) * amplitude
}

/// Raise `value` to at least `current + boost` if the individual is ill
fn apply_illness_floor(
    individual: &Individual,
    value: f64,
    current: f64,
    hospital_boost: f64,
    infected_boost: f64,
) -> f64 {
    if individual.in_hospital {
        value.max(clamp01(current + hospital_boost))
    } else if individual.is_infected() {
        value.max(clamp01(current + infected_boost))
    } else {
        value
    }
}

/// Update the hygiene level of the individual at `index`
pub fn update_hygiene(
    env: &mut Environment,
    neighbourhood: &Neighbourhood,
    index: usize,
    rng: &mut impl Rng,
) {
    let fallback = clamp01(env.hygiene_level);
    let mean = neighbour_mean(env, neighbourhood, index, HYGIENE_RADIUS, |other| {
        other.hygiene_level
    })
    .unwrap_or(fallback);

    let individual = &mut env.population_mut()[index];
    let current = clamp01(individual.hygiene_level);
    let fatigued = current * 0.99;
    let mut hygiene = apply_illness_floor(
        individual,
        fatigued * 0.65 + mean * 0.35,
        current,
        0.30,
        0.20,
    );
    if individual.is_vaccinated() {
        hygiene *= 1.0 - 0.12 * complacency(individual);
    }

    individual.hygiene_level = clamp01(hygiene + noise(rng, 0.03));
}

/// Damp or nudge compliance according to how the individual travels
fn apply_movement_friction(compliance: f64, move_type: MoveType) -> f64 {
    match move_type {
        MoveType::Walk => compliance * 0.98 + 0.02,
        MoveType::Train => compliance * 0.9,
        MoveType::Flight => compliance * 0.8,
    }
}

/// Update the social-distance compliance of the individual at `index`.
///
/// The individual's movement radius shrinks as their compliance grows.
///
/// # Returns
///
/// How likely the individual is to move, in [0.15, 1]. This is informational only.
pub fn update_compliance(
    env: &mut Environment,
    neighbourhood: &Neighbourhood,
    index: usize,
    rng: &mut impl Rng,
) -> f64 {
    let policy = clamp01(env.social_distance_threshold / 10.0);
    let mean = neighbour_mean(env, neighbourhood, index, COMPLIANCE_RADIUS, |other| {
        other.social_distance_compliance
    })
    .unwrap_or(policy);

    let area_size = env.area_size;
    let individual = &mut env.population_mut()[index];
    let current = clamp01(individual.social_distance_compliance);
    let mut compliance = apply_illness_floor(
        individual,
        current * 0.2 + mean * 0.4 + policy * 0.4,
        current,
        0.6,
        0.35,
    );
    if individual.is_vaccinated() {
        compliance *= 1.0 - 0.25 * complacency(individual);
    }
    if let Some(pattern) = &individual.movement_pattern {
        compliance = apply_movement_friction(compliance, pattern.move_type);
    }

    let compliance = clamp01(compliance + noise(rng, 0.04));
    individual.social_distance_compliance = compliance;
    if let Some(pattern) = &mut individual.movement_pattern {
        pattern.move_radius = (pattern.move_type.baseline_radius(area_size)
            * (1.0 - 0.6 * compliance))
            .max(MIN_MOVE_RADIUS);
    }

    0.15 + 0.85 * (1.0 - compliance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::Disease;
    use crate::fixture::{disease, environment_with, individual_at, individual_with_status};
    use crate::individual::{HealthStatus, MovementPattern};
    use float_cmp::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use std::rc::Rc;

    fn assert_within(value: f64, expected: f64, tolerance: f64) {
        assert!(
            (value - expected).abs() <= tolerance + 1e-9,
            "{value} is not within {tolerance} of {expected}"
        );
    }

    #[rstest]
    #[case(false, false, 0.2 * 0.99 * 0.65 + 0.1 * 0.35)]
    #[case(false, true, 0.4)]
    #[case(true, true, 0.5)]
    fn test_update_hygiene_alone(
        disease: Disease,
        #[case] in_hospital: bool,
        #[case] infected: bool,
        #[case] expected: f64,
    ) {
        let status = if infected {
            HealthStatus::Infected
        } else {
            HealthStatus::Healthy
        };
        let mut individual = individual_with_status(5.0, 5.0, status, &Rc::new(disease));
        individual.hygiene_level = 0.2;
        individual.in_hospital = in_hospital;
        let mut env = environment_with(vec![individual]);

        let mut rng = StdRng::seed_from_u64(11);
        update_hygiene(&mut env, &Neighbourhood::BruteForce, 0, &mut rng);
        assert_within(env.population()[0].hygiene_level, expected, 0.03);
    }

    #[test]
    fn test_update_hygiene_uses_neighbours() {
        let mut population = vec![individual_at(5.0, 5.0), individual_at(6.0, 5.0)];
        population[0].hygiene_level = 0.0;
        population[1].hygiene_level = 1.0;
        let mut env = environment_with(population);

        let mut rng = StdRng::seed_from_u64(11);
        update_hygiene(&mut env, &Neighbourhood::BruteForce, 0, &mut rng);
        assert_within(env.population()[0].hygiene_level, 0.35, 0.03);
    }

    #[test]
    fn test_update_hygiene_complacency() {
        let mut individual = individual_at(5.0, 5.0);
        individual.hygiene_level = 0.5;
        individual.vaccinate();
        individual.days_since_vaccination = 360;
        let mut env = environment_with(vec![individual]);

        let mut rng = StdRng::seed_from_u64(5);
        update_hygiene(&mut env, &Neighbourhood::BruteForce, 0, &mut rng);
        let expected = (0.5 * 0.99 * 0.65 + 0.1 * 0.35) * 0.88;
        assert_within(env.population()[0].hygiene_level, expected, 0.03);
    }

    #[rstest]
    #[case(MoveType::Walk, 0.5)]
    #[case(MoveType::Train, 0.1)]
    #[case(MoveType::Flight, 0.0)]
    fn test_apply_movement_friction(#[case] move_type: MoveType, #[case] compliance: f64) {
        let expected = match move_type {
            MoveType::Walk => 0.51,
            MoveType::Train => 0.09,
            MoveType::Flight => 0.0,
        };
        assert_approx_eq!(f64, apply_movement_friction(compliance, move_type), expected);
    }

    #[test]
    fn test_update_compliance() {
        let mut env = environment_with(vec![individual_at(5.0, 5.0)]);
        let mut rng = StdRng::seed_from_u64(3);
        let likelihood = update_compliance(&mut env, &Neighbourhood::BruteForce, 0, &mut rng);

        // Policy signal and fallback mean are both threshold / 10 = 0.2
        let individual = &env.population()[0];
        let compliance = individual.social_distance_compliance;
        assert_within(compliance, (0.1 + 0.08 + 0.08) * 0.98 + 0.02, 0.04);
        assert_approx_eq!(f64, likelihood, 0.15 + 0.85 * (1.0 - compliance));
        assert_approx_eq!(
            f64,
            individual.movement_pattern.unwrap().move_radius,
            0.05 * (1.0 - 0.6 * compliance)
        );
    }

    #[test]
    fn test_update_compliance_hospitalised() {
        let mut individual = individual_at(5.0, 5.0);
        individual.in_hospital = true;
        individual.social_distance_compliance = 0.3;
        individual.movement_pattern = None;
        let mut env = environment_with(vec![individual]);

        let mut rng = StdRng::seed_from_u64(3);
        update_compliance(&mut env, &Neighbourhood::BruteForce, 0, &mut rng);
        assert_within(env.population()[0].social_distance_compliance, 0.9, 0.04);
    }

    #[test]
    fn test_update_compliance_radius_floor() {
        let mut individual = individual_at(1.0, 1.0);
        individual.movement_pattern = Some(MovementPattern::new(MoveType::Walk, 5.0));
        let mut env = environment_with(vec![individual]);
        env.area_size = 5.0;

        let mut rng = StdRng::seed_from_u64(3);
        update_compliance(&mut env, &Neighbourhood::BruteForce, 0, &mut rng);
        assert_approx_eq!(
            f64,
            env.population()[0].movement_pattern.unwrap().move_radius,
            MIN_MOVE_RADIUS
        );
    }
}
