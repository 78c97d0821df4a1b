//! Daily movement of individuals around the (toroidal) area.
use crate::environment::Environment;
use crate::individual::{Individual, MoveType, MovementPattern, Position};
use rand::Rng;
use std::f64::consts::TAU;

/// Wrap a coordinate onto `[0, area_size)`
fn wrap(coord: f64, area_size: f64) -> f64 {
    let wrapped = coord.rem_euclid(area_size);

    // rem_euclid can round up to exactly area_size for tiny negative inputs
    if wrapped >= area_size { 0.0 } else { wrapped }
}

/// Move one individual a random distance in a random direction, then pick tomorrow's pattern.
///
/// Infected individuals only walk. Dead individuals and those without a movement pattern stay
/// where they are.
pub fn move_individual(individual: &mut Individual, area_size: f64, rng: &mut impl Rng) {
    if !individual.is_alive() {
        return;
    }
    let infected = individual.is_infected();
    let Some(pattern) = &mut individual.movement_pattern else {
        return;
    };

    if infected {
        *pattern = MovementPattern::new(MoveType::Walk, area_size);
    }
    if pattern.move_radius <= 0.0 {
        pattern.move_radius = pattern.move_type.baseline_radius(area_size);
    }

    // Square root gives a uniform density over the disc
    let distance = rng.random::<f64>().sqrt() * pattern.move_radius;
    let angle = rng.random::<f64>() * TAU;
    let position = &mut individual.position;
    *position = Position::new(
        wrap(position.x + distance * angle.cos(), area_size),
        wrap(position.y + distance * angle.sin(), area_size),
    );

    *pattern = MovementPattern::sample(rng, area_size);
}

/// Move every individual in population order
pub fn move_population(env: &mut Environment, rng: &mut impl Rng) {
    let area_size = env.area_size;
    for individual in env.population_mut() {
        move_individual(individual, area_size, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{environment_with, individual, individual_at};
    use crate::individual::HealthStatus;
    use float_cmp::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case(5.0, 5.0)]
    #[case(-1.0, 9.0)]
    #[case(10.0, 0.0)]
    #[case(12.5, 2.5)]
    #[case(-10.0, 0.0)]
    #[case(-1e-20, 0.0)]
    fn test_wrap(#[case] coord: f64, #[case] expected: f64) {
        assert_approx_eq!(f64, wrap(coord, 10.0), expected);
    }

    #[rstest]
    fn test_move_individual_dead(mut individual: Individual) {
        individual.health_status = HealthStatus::Dead;
        let before = individual.clone();
        move_individual(&mut individual, 50.0, &mut StdRng::seed_from_u64(1));
        assert_eq!(individual, before);
    }

    #[rstest]
    fn test_move_individual_no_pattern(mut individual: Individual) {
        individual.movement_pattern = None;
        let before = individual.clone();
        move_individual(&mut individual, 50.0, &mut StdRng::seed_from_u64(1));
        assert_eq!(individual, before);
    }

    #[rstest]
    fn test_move_individual_infected_walks(mut individual: Individual) {
        individual.health_status = HealthStatus::Infected;
        individual.position = Position::new(25.0, 25.0);
        individual.movement_pattern = Some(MovementPattern::new(MoveType::Flight, 50.0));

        let mut rng = StdRng::seed_from_u64(9);
        move_individual(&mut individual, 50.0, &mut rng);
        let moved = individual.position.distance_to(&Position::new(25.0, 25.0));
        assert!(moved <= MoveType::Walk.baseline_radius(50.0) + 1e-12);
    }

    #[test]
    fn test_move_population_stays_in_area() {
        let mut population: Vec<_> = (0..200)
            .map(|i| {
                let mut individual = individual_at(i as f64 * 0.25, 49.99);
                individual.movement_pattern = Some(MovementPattern::new(MoveType::Flight, 50.0));
                individual
            })
            .collect();
        population[0].position = Position::new(0.0, 0.0);
        let mut env = environment_with(population);

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            move_population(&mut env, &mut rng);
            for individual in env.population() {
                assert!((0.0..50.0).contains(&individual.position.x));
                assert!((0.0..50.0).contains(&individual.position.y));
                assert!(individual.movement_pattern.unwrap().move_radius > 0.0);
            }
        }
    }
}
