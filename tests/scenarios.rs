//! End-to-end tests of whole simulated days through the public API.
use episim::disease::Disease;
use episim::environment::{Environment, initialise_environment};
use episim::individual::HealthStatus;
use episim::model::parameters::EnvironmentParameters;
use episim::simulation::advance_one_day;
use episim::spatial::NeighbourSearch;
use float_cmp::assert_approx_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::rc::Rc;

/// Create a random environment with the given number of initial infections
fn environment(
    size: usize,
    initial_infected: usize,
    disease: Disease,
    params: &EnvironmentParameters,
    rng: &mut StdRng,
) -> Environment {
    initialise_environment(
        size,
        params.area_size,
        &Rc::new(disease),
        params,
        initial_infected,
        false,
        rng,
    )
    .unwrap()
}

fn area_50() -> EnvironmentParameters {
    EnvironmentParameters {
        area_size: 50.0,
        ..EnvironmentParameters::default()
    }
}

#[test]
fn disease_free_population_stays_disease_free() {
    let mut rng = StdRng::seed_from_u64(100);
    let mut env = environment(100, 0, Disease::default(), &area_50(), &mut rng);

    for _ in 0..10 {
        let outcome = advance_one_day(&mut env, &mut rng).unwrap();
        assert_approx_eq!(f64, outcome.infected_fraction, 0.0);
        assert_eq!(env.infected_count(), 0);
        assert!(env.population().iter().all(|ind| ind.is_alive()));
    }
}

#[test]
fn certain_death_without_recovery() {
    let disease = Disease {
        mortality_rate: 1.0,
        recovery_rate: 0.0,
        ..Disease::default()
    };
    let params = EnvironmentParameters {
        medical_capacity: 200,
        ..area_50()
    };
    let mut rng = StdRng::seed_from_u64(7);
    let mut env = environment(200, 20, disease, &params, &mut rng);
    assert_eq!(env.medical_capacity, 200);

    let originally_infected: Vec<usize> = env
        .population()
        .iter()
        .enumerate()
        .filter(|(_, ind)| ind.is_infected())
        .map(|(index, _)| index)
        .collect();
    assert_eq!(originally_infected.len(), 20);

    advance_one_day(&mut env, &mut rng).unwrap();

    for index in originally_infected {
        let individual = &env.population()[index];
        match individual.health_status {
            HealthStatus::Dead => {}
            HealthStatus::Infected => assert_eq!(individual.days_infected, 1),
            status => panic!("Individual {index} is {status:?}"),
        }
    }
}

#[test]
fn invariants_hold_over_an_outbreak() {
    let params = EnvironmentParameters {
        area_size: 30.0,
        vaccination_rate: 0.6,
        ..EnvironmentParameters::default()
    };
    let disease = Disease {
        mortality_rate: 0.05,
        ..Disease::default()
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let mut env = environment(400, 40, disease, &params, &mut rng);

    for _ in 0..40 {
        let before = env.population().to_vec();
        let outcome = advance_one_day(&mut env, &mut rng).unwrap();

        let mut newly_vaccinated = 0;
        for (old, new) in before.iter().zip(env.population()) {
            // Dead is absorbing
            if !old.is_alive() {
                assert_eq!(new.health_status, HealthStatus::Dead);
            }

            // Vaccination only ever flips on, and the counter advances daily for the living
            assert!(!old.is_vaccinated() || new.is_vaccinated());
            if !old.is_vaccinated() && new.is_vaccinated() {
                newly_vaccinated += 1;
                assert_eq!(new.days_since_vaccination, 1);
            } else if old.is_vaccinated() && old.is_alive() {
                assert_eq!(new.days_since_vaccination, old.days_since_vaccination + 1);
            } else if old.is_vaccinated() {
                assert_eq!(new.days_since_vaccination, old.days_since_vaccination);
            }

            // Everyone stays inside the area
            assert!((0.0..30.0).contains(&new.position.x));
            assert!((0.0..30.0).contains(&new.position.y));
        }
        assert_eq!(newly_vaccinated, outcome.newly_vaccinated);
        assert!((0.0..=1.0).contains(&outcome.infected_fraction));
        assert!(env.social_distance_threshold > 0.0);
        assert!((0.0..=1.0).contains(&env.hygiene_level));
        assert!((0.0..=1.0).contains(&env.vaccination_rate));
    }
}

#[test]
fn same_seed_same_outcome() {
    let run = || {
        let mut rng = StdRng::seed_from_u64(5);
        let mut env = environment(150, 10, Disease::default(), &area_50(), &mut rng);
        for _ in 0..15 {
            advance_one_day(&mut env, &mut rng).unwrap();
        }
        env.population().to_vec()
    };

    assert_eq!(run(), run());
}

#[test]
fn grid_search_matches_brute_force() {
    let run = |neighbour_search| {
        let params = EnvironmentParameters {
            area_size: 30.0,
            neighbour_search,
            ..EnvironmentParameters::default()
        };
        let mut rng = StdRng::seed_from_u64(31);
        let mut env = environment(400, 40, Disease::default(), &params, &mut rng);
        let mut outcomes = Vec::new();
        for _ in 0..30 {
            outcomes.push(advance_one_day(&mut env, &mut rng).unwrap());
        }
        (env.population().to_vec(), outcomes)
    };

    let (grid_population, grid_outcomes) = run(NeighbourSearch::Grid);
    let (brute_population, brute_outcomes) = run(NeighbourSearch::BruteForce);
    assert_eq!(grid_population, brute_population);
    assert_eq!(grid_outcomes, brute_outcomes);
}
