//! Spatial proximity queries over the population.
//!
//! Two strategies are provided. [`NeighbourSearch::BruteForce`] compares the origin against every
//! other individual. [`NeighbourSearch::Grid`] buckets positions into a uniform grid once per day
//! and only inspects the cells overlapping the query circle. Both return the same neighbours, in
//! population order, for the same radius.
use crate::individual::{Individual, Position};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::collections::HashMap;

/// How neighbour queries are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, DeserializeLabeledStringEnum)]
pub enum NeighbourSearch {
    /// Linear scan of the whole population for each query
    #[default]
    #[string = "brute_force"]
    BruteForce,
    /// Uniform grid index, rebuilt each day
    #[string = "grid"]
    Grid,
}

/// Another individual found near the origin of a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    /// Position of the neighbour in the population
    pub index: usize,
    /// Euclidean distance from the origin
    pub distance: f64,
}

/// Find every individual other than `origin` within `radius` which satisfies `filter`.
///
/// Results are returned in population order.
pub fn neighbours<F>(
    population: &[Individual],
    origin: usize,
    radius: f64,
    filter: F,
) -> Vec<Neighbour>
where
    F: Fn(&Individual) -> bool,
{
    let centre = population[origin].position;
    population
        .iter()
        .enumerate()
        .filter_map(|(index, other)| {
            check_neighbour(index, other, origin, &centre, radius, &filter)
        })
        .collect()
}

/// Return a [`Neighbour`] if `other` is a match for the query
fn check_neighbour<F>(
    index: usize,
    other: &Individual,
    origin: usize,
    centre: &Position,
    radius: f64,
    filter: &F,
) -> Option<Neighbour>
where
    F: Fn(&Individual) -> bool,
{
    if index == origin || !filter(other) {
        return None;
    }

    let distance = centre.distance_to(&other.position);
    (distance <= radius).then_some(Neighbour { index, distance })
}

/// Key for a grid cell
type CellKey = (i64, i64);

/// A uniform grid of population indices keyed by position
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket the current positions of the population
    pub fn build(population: &[Individual], cell_size: f64) -> Self {
        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
        };
        for (index, individual) in population.iter().enumerate() {
            let cell = grid.cell_of(&individual.position);
            grid.cells.entry(cell).or_default().push(index);
        }

        grid
    }

    fn cell_of(&self, position: &Position) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.y / self.cell_size).floor() as i64,
        )
    }

    /// Indices of individuals in cells overlapping the square around `centre`
    fn candidates(&self, centre: &Position, radius: f64) -> Vec<usize> {
        let (min_x, min_y) = self.cell_of(&Position::new(centre.x - radius, centre.y - radius));
        let (max_x, max_y) = self.cell_of(&Position::new(centre.x + radius, centre.y + radius));

        let span = (max_x - min_x + 1).saturating_mul(max_y - min_y + 1);
        let mut found = Vec::new();
        if span > self.cells.len() as i64 {
            // Cheaper to walk the occupied cells than the empty ones in range
            for (&(x, y), indices) in &self.cells {
                if (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y) {
                    found.extend_from_slice(indices);
                }
            }
        } else {
            for x in min_x..=max_x {
                for y in min_y..=max_y {
                    if let Some(indices) = self.cells.get(&(x, y)) {
                        found.extend_from_slice(indices);
                    }
                }
            }
        }

        found
    }

    /// Same as [`neighbours`], but only examining nearby cells.
    ///
    /// The population must not have moved since the grid was built.
    pub fn neighbours<F>(
        &self,
        population: &[Individual],
        origin: usize,
        radius: f64,
        filter: F,
    ) -> Vec<Neighbour>
    where
        F: Fn(&Individual) -> bool,
    {
        if radius < 0.0 {
            return Vec::new();
        }

        let centre = population[origin].position;
        let mut candidates = self.candidates(&centre, radius);
        candidates.sort_unstable();
        candidates
            .into_iter()
            .filter_map(|index| {
                check_neighbour(index, &population[index], origin, &centre, radius, &filter)
            })
            .collect()
    }
}

/// Answers neighbour queries for one simulated day
#[derive(Debug, Clone)]
pub enum Neighbourhood {
    /// Scan the population for every query
    BruteForce,
    /// Look up candidates in a grid built from the day's positions
    Grid(SpatialGrid),
}

impl Neighbourhood {
    /// Prepare to answer queries about the population's current positions
    pub fn build(strategy: NeighbourSearch, population: &[Individual], cell_size: f64) -> Self {
        match strategy {
            NeighbourSearch::BruteForce => Neighbourhood::BruteForce,
            NeighbourSearch::Grid => Neighbourhood::Grid(SpatialGrid::build(population, cell_size)),
        }
    }

    /// Find every individual other than `origin` within `radius` which satisfies `filter`
    pub fn neighbours<F>(
        &self,
        population: &[Individual],
        origin: usize,
        radius: f64,
        filter: F,
    ) -> Vec<Neighbour>
    where
        F: Fn(&Individual) -> bool,
    {
        match self {
            Neighbourhood::BruteForce => neighbours(population, origin, radius, filter),
            Neighbourhood::Grid(grid) => grid.neighbours(population, origin, radius, filter),
        }
    }

    /// All individuals other than `origin` within `radius`
    pub fn all_within(
        &self,
        population: &[Individual],
        origin: usize,
        radius: f64,
    ) -> Vec<Neighbour> {
        self.neighbours(population, origin, radius, |_| true)
    }

    /// Infected individuals other than `origin` within `radius`
    pub fn infected_within(
        &self,
        population: &[Individual],
        origin: usize,
        radius: f64,
    ) -> Vec<Neighbour> {
        self.neighbours(population, origin, radius, Individual::is_infected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::individual_at;
    use crate::individual::HealthStatus;
    use float_cmp::assert_approx_eq;
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    fn line_population() -> Vec<Individual> {
        [0.0, 1.0, 2.0, 3.5, 10.0]
            .into_iter()
            .map(|x| individual_at(x, 0.0))
            .collect()
    }

    #[test]
    fn test_neighbours_brute_force() {
        let population = line_population();
        let found = neighbours(&population, 0, 2.0, |_| true);
        assert_eq!(found.iter().map(|n| n.index).collect_vec(), [1, 2]);
        assert_approx_eq!(f64, found[1].distance, 2.0);
    }

    #[test]
    fn test_neighbours_excludes_origin_at_same_position() {
        let population = vec![individual_at(1.0, 1.0), individual_at(1.0, 1.0)];
        let found = neighbours(&population, 0, 0.0, |_| true);
        assert_eq!(found.iter().map(|n| n.index).collect_vec(), [1]);
    }

    #[test]
    fn test_neighbours_filter() {
        let mut population = line_population();
        population[2].health_status = HealthStatus::Infected;
        let found = Neighbourhood::BruteForce.infected_within(&population, 0, 5.0);
        assert_eq!(found.iter().map(|n| n.index).collect_vec(), [2]);
    }

    #[rstest]
    #[case(0.5)]
    #[case(2.0)]
    #[case(3.0)]
    #[case(7.5)]
    #[case(150.0)]
    fn test_grid_matches_brute_force(#[case] radius: f64) {
        let mut rng = StdRng::seed_from_u64(3);
        let population = (0..300)
            .map(|_| individual_at(rng.random::<f64>() * 50.0, rng.random::<f64>() * 50.0))
            .collect_vec();

        let grid = Neighbourhood::build(NeighbourSearch::Grid, &population, 3.0);
        for origin in 0..population.len() {
            let expected = neighbours(&population, origin, radius, |_| true);
            let actual = grid.all_within(&population, origin, radius);
            assert_eq!(actual, expected);
        }
    }
}
