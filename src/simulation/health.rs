//! The daily update of every individual's health status.
//!
//! The update has two phases. First the transition probabilities of the whole population are
//! computed from the state at the start of the day. Then each individual in turn adapts their
//! behaviour and makes one random draw to decide their transition.
use super::behaviour::{update_compliance, update_hygiene};
use super::transition::{TransitionProbabilities, compute_probabilities};
use crate::environment::Environment;
use crate::error::SimulationResult;
use crate::individual::{HealthStatus, Individual};
use crate::spatial::Neighbourhood;
use log::trace;
use rand::Rng;

/// Grid cell size to use for a day's neighbour queries
fn neighbour_cell_size(env: &Environment) -> f64 {
    let transmission_distance = env
        .population()
        .iter()
        .find_map(|ind| ind.disease.as_ref())
        .map_or(1.0, |disease| disease.transmission_distance);

    (3.0 * transmission_distance)
        .max(env.social_distance_threshold)
        .max(3.0)
}

/// Apply one transition given a uniform draw in [0, 1)
fn apply_transition(individual: &mut Individual, probs: &TransitionProbabilities, draw: f64) {
    match individual.health_status {
        HealthStatus::Healthy => {
            if draw < probs.a {
                individual.health_status = HealthStatus::Susceptible;
                individual.days_since_recovery = 0;
            }
        }
        HealthStatus::Susceptible => {
            if draw < probs.b {
                individual.health_status = HealthStatus::Infected;
                individual.days_infected = 0;
                individual.days_since_recovery = 0;
            } else {
                // Exposure without infection does not persist to the next day
                individual.health_status = HealthStatus::Healthy;
            }
        }
        HealthStatus::Infected => {
            if draw < probs.c {
                individual.health_status = HealthStatus::Dead;
            } else if draw < probs.c + probs.d {
                individual.health_status = HealthStatus::Recovered;
                individual.days_infected = 0;
                individual.days_since_recovery = 0;
            } else {
                individual.days_infected += 1;
            }
        }
        HealthStatus::Recovered => {
            if draw < probs.e {
                individual.health_status = HealthStatus::Healthy;
                individual.days_since_recovery = 0;
            } else {
                individual.days_since_recovery += 1;
            }
        }
        HealthStatus::Dead => {}
    }
}

/// Advance the health status of every individual by one day.
///
/// Fails on the first individual whose transition probabilities are invalid. Individuals earlier
/// in the population keep the changes already made to them.
pub fn update_health(env: &mut Environment, rng: &mut impl Rng) -> SimulationResult<()> {
    let neighbourhood = Neighbourhood::build(
        env.neighbour_search,
        env.population(),
        neighbour_cell_size(env),
    );
    let infected_total = env.infected_count();
    let probabilities: Vec<_> = (0..env.population_size())
        .map(|index| compute_probabilities(env, &neighbourhood, index, infected_total))
        .collect();

    for (index, probs) in probabilities.iter().enumerate() {
        probs.validate(index)?;
        if !env.population()[index].is_alive() {
            continue;
        }

        update_hygiene(env, &neighbourhood, index, rng);
        update_compliance(env, &neighbourhood, index, rng);

        let draw = rng.random::<f64>();
        let individual = &mut env.population_mut()[index];
        let before = individual.health_status;
        apply_transition(individual, probs, draw);
        if individual.health_status != before {
            trace!(
                "Individual {index}: {before:?} -> {:?}",
                individual.health_status
            );
        }

        if individual.is_vaccinated() {
            individual.days_since_vaccination += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::Disease;
    use crate::error::SimulationError;
    use crate::fixture::{
        disease, environment_with, individual, individual_at, individual_with_status,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use std::rc::Rc;

    fn probs(a: f64, b: f64, c: f64, d: f64, e: f64) -> TransitionProbabilities {
        TransitionProbabilities { a, b, c, d, e }
    }

    #[rstest]
    #[case(HealthStatus::Healthy, probs(0.5, 0.0, 0.0, 0.0, 0.0), 0.4, HealthStatus::Susceptible)]
    #[case(HealthStatus::Healthy, probs(0.5, 0.0, 0.0, 0.0, 0.0), 0.5, HealthStatus::Healthy)]
    #[case(HealthStatus::Susceptible, probs(0.0, 0.5, 0.0, 0.0, 0.0), 0.1, HealthStatus::Infected)]
    #[case(HealthStatus::Infected, probs(0.0, 0.0, 0.2, 0.3, 0.0), 0.1, HealthStatus::Dead)]
    #[case(HealthStatus::Infected, probs(0.0, 0.0, 0.2, 0.3, 0.0), 0.4, HealthStatus::Recovered)]
    #[case(HealthStatus::Infected, probs(0.0, 0.0, 0.2, 0.3, 0.0), 0.6, HealthStatus::Infected)]
    #[case(HealthStatus::Recovered, probs(0.0, 0.0, 0.0, 0.0, 0.3), 0.2, HealthStatus::Healthy)]
    #[case(HealthStatus::Recovered, probs(0.0, 0.0, 0.0, 0.0, 0.3), 0.3, HealthStatus::Recovered)]
    #[case(HealthStatus::Dead, probs(1.0, 1.0, 0.0, 1.0, 1.0), 0.0, HealthStatus::Dead)]
    fn test_apply_transition(
        mut individual: Individual,
        #[case] status: HealthStatus,
        #[case] probs: TransitionProbabilities,
        #[case] draw: f64,
        #[case] expected: HealthStatus,
    ) {
        individual.health_status = status;
        apply_transition(&mut individual, &probs, draw);
        assert_eq!(individual.health_status, expected);
    }

    /// Exposed individuals who escape infection go back to being healthy rather than staying
    /// susceptible
    #[rstest]
    fn test_apply_transition_susceptible_reverts_to_healthy(mut individual: Individual) {
        individual.health_status = HealthStatus::Susceptible;
        apply_transition(&mut individual, &probs(0.0, 0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(individual.health_status, HealthStatus::Healthy);
    }

    #[rstest]
    fn test_apply_transition_counters(mut individual: Individual) {
        individual.health_status = HealthStatus::Infected;
        individual.days_infected = 4;
        apply_transition(&mut individual, &probs(0.0, 0.0, 0.0, 0.0, 0.0), 0.5);
        assert_eq!(individual.days_infected, 5);

        apply_transition(&mut individual, &probs(0.0, 0.0, 0.0, 1.0, 0.0), 0.5);
        assert_eq!(individual.health_status, HealthStatus::Recovered);
        assert_eq!(individual.days_infected, 0);
        assert_eq!(individual.days_since_recovery, 0);

        apply_transition(&mut individual, &probs(0.0, 0.0, 0.0, 0.0, 0.0), 0.5);
        assert_eq!(individual.days_since_recovery, 1);
    }

    #[rstest]
    fn test_update_health_dead_unchanged(disease: Disease) {
        let disease = Rc::new(disease);
        let mut dead = individual_with_status(1.0, 1.0, HealthStatus::Dead, &disease);
        dead.vaccinate();
        let population = vec![
            dead,
            individual_with_status(1.5, 1.0, HealthStatus::Infected, &disease),
        ];
        let mut env = environment_with(population);
        let before = env.population()[0].clone();

        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..10 {
            update_health(&mut env, &mut rng).unwrap();
        }
        assert_eq!(env.population()[0], before);
    }

    #[rstest]
    fn test_update_health_vaccination_counter(mut individual: Individual) {
        individual.vaccinate();
        let mut env = environment_with(vec![individual]);

        let mut rng = StdRng::seed_from_u64(2);
        for day in 1..=5 {
            update_health(&mut env, &mut rng).unwrap();
            assert_eq!(env.population()[0].days_since_vaccination, day);
        }
    }

    /// An individual who dies earlier in the day still infects neighbours visited later
    #[test]
    fn test_update_health_uses_start_of_day_statuses() {
        let lethal = Rc::new(Disease {
            transmission_rate: 1.0,
            mortality_rate: 1.0,
            recovery_rate: 0.0,
            ..Disease::default()
        });
        let mut infected = individual_with_status(10.0, 10.0, HealthStatus::Infected, &lethal);
        infected.age = 70;
        let susceptible = individual_with_status(10.5, 10.0, HealthStatus::Susceptible, &lethal);

        let mut newly_infected = 0;
        for seed in 0..50 {
            let mut env = environment_with(vec![infected.clone(), susceptible.clone()]);
            env.medical_care_level = 0.0;

            let mut rng = StdRng::seed_from_u64(seed);
            update_health(&mut env, &mut rng).unwrap();
            assert_eq!(env.population()[0].health_status, HealthStatus::Dead);
            if env.population()[1].health_status == HealthStatus::Infected {
                newly_infected += 1;
            }
        }
        assert!(newly_infected > 0);
    }

    /// Behaviour updates see the values already updated earlier in the day
    #[rstest]
    fn test_update_health_behaviour_reads_updated_neighbours(disease: Disease) {
        let mild = Rc::new(Disease {
            mortality_rate: 0.0,
            recovery_rate: 0.0,
            ..disease
        });
        let mut patient = individual_with_status(10.0, 10.0, HealthStatus::Infected, &mild);
        patient.hygiene_level = 0.0;
        patient.in_hospital = true;
        let mut neighbour = individual_at(11.0, 10.0);
        neighbour.hygiene_level = 0.0;
        let mut env = environment_with(vec![patient, neighbour]);

        let mut rng = StdRng::seed_from_u64(9);
        update_health(&mut env, &mut rng).unwrap();

        // The patient's hygiene rises to about 0.3 and the neighbour's mean term picks that up
        let patient_hygiene = env.population()[0].hygiene_level;
        let neighbour_hygiene = env.population()[1].hygiene_level;
        assert!((0.27..=0.33).contains(&patient_hygiene));
        assert!((neighbour_hygiene - 0.35 * patient_hygiene).abs() <= 0.03 + 1e-9);
        assert!(neighbour_hygiene > 0.03);
    }

    #[test]
    fn test_update_health_invalid_probability_fails_fast() {
        let lethal = Rc::new(Disease {
            mortality_rate: 1.0,
            recovery_rate: 1.0,
            ..Disease::default()
        });
        let mut env = environment_with(vec![
            individual_with_status(40.0, 40.0, HealthStatus::Recovered, &lethal),
            individual_with_status(1.0, 1.0, HealthStatus::Infected, &lethal),
            individual_with_status(20.0, 20.0, HealthStatus::Recovered, &lethal),
        ]);

        let before = env.population().to_vec();
        let mut rng = StdRng::seed_from_u64(2);
        assert!(matches!(
            update_health(&mut env, &mut rng),
            Err(SimulationError::InvalidProbability { index: 1, .. })
        ));

        // The first individual was updated, the rest were not
        assert_ne!(env.population()[0], before[0]);
        assert_eq!(env.population()[1..], before[1..]);
    }
}
