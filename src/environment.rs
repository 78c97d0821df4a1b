//! The shared simulation context: the area, the population and the environment-level policy.
use crate::disease::Disease;
use crate::error::{SimulationError, SimulationResult};
use crate::individual::{HealthStatus, Individual};
use crate::model::parameters::EnvironmentParameters;
use crate::spatial::NeighbourSearch;
use derive_more::Display;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::rc::Rc;

/// Fraction of the population used as hospital capacity when none is configured
const DEFAULT_MEDICAL_CAPACITY_FRACTION: f64 = 0.1;

/// The simulated world.
///
/// The environment exclusively owns the population. The order of individuals is stable and is
/// the order in which they are visited by every update.
#[derive(Debug, Clone)]
pub struct Environment {
    population: Vec<Individual>,
    /// Side length of the (square) area
    pub area_size: f64,
    /// Distance individuals are asked to keep from one another
    pub social_distance_threshold: f64,
    /// Environment-level hygiene in [0, 1]
    pub hygiene_level: f64,
    /// General mobility of the population (reported only)
    pub mobility_rate: f64,
    /// Smoothed estimate of vaccination coverage in [0, 1]
    pub vaccination_rate: f64,
    /// Quality of medical care in [0, 1]
    pub medical_care_level: f64,
    /// Number of hospital beds. Zero disables overload effects.
    pub medical_capacity: u32,
    /// How neighbour queries are answered
    pub neighbour_search: NeighbourSearch,
}

/// Counts of individuals in each health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[display(
    "{healthy} healthy, {susceptible} susceptible, {infected} infected, {recovered} recovered, \
    {dead} dead"
)]
pub struct StatusCounts {
    /// Number of healthy individuals
    pub healthy: usize,
    /// Number of susceptible individuals
    pub susceptible: usize,
    /// Number of infected individuals
    pub infected: usize,
    /// Number of recovered individuals
    pub recovered: usize,
    /// Number of dead individuals
    pub dead: usize,
}

impl StatusCounts {
    /// Count the statuses of the given individuals
    pub fn from_population(population: &[Individual]) -> Self {
        let mut counts = Self::default();
        for individual in population {
            match individual.health_status {
                HealthStatus::Healthy => counts.healthy += 1,
                HealthStatus::Susceptible => counts.susceptible += 1,
                HealthStatus::Infected => counts.infected += 1,
                HealthStatus::Recovered => counts.recovered += 1,
                HealthStatus::Dead => counts.dead += 1,
            }
        }

        counts
    }

    /// Total number of individuals counted
    pub fn total(&self) -> usize {
        self.healthy + self.susceptible + self.infected + self.recovered + self.dead
    }
}

/// Resolve the configured medical capacity, where zero means "10% of the population"
pub fn resolve_medical_capacity(configured: u32, population_size: usize) -> u32 {
    if configured > 0 {
        configured
    } else {
        (DEFAULT_MEDICAL_CAPACITY_FRACTION * population_size as f64) as u32
    }
}

impl Environment {
    /// Create an environment around an existing population.
    ///
    /// The medical capacity is resolved against the population size if it is zero.
    pub fn new(population: Vec<Individual>, params: &EnvironmentParameters) -> Self {
        let medical_capacity = resolve_medical_capacity(params.medical_capacity, population.len());
        Self {
            population,
            area_size: params.area_size,
            social_distance_threshold: params.social_distance_threshold,
            hygiene_level: params.hygiene_level,
            mobility_rate: params.mobility_rate,
            vaccination_rate: params.vaccination_rate,
            medical_care_level: params.medical_care_level,
            medical_capacity,
            neighbour_search: params.neighbour_search,
        }
    }

    /// The population, in iteration order
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Mutable access to the population
    pub fn population_mut(&mut self) -> &mut [Individual] {
        &mut self.population
    }

    /// Number of individuals (alive or dead)
    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    /// Number of individuals currently infected
    pub fn infected_count(&self) -> usize {
        self.population.iter().filter(|ind| ind.is_infected()).count()
    }

    /// Number of individuals who have been vaccinated
    pub fn vaccinated_count(&self) -> usize {
        self.population
            .iter()
            .filter(|ind| ind.is_vaccinated())
            .count()
    }

    /// Counts of individuals in each health status
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_population(&self.population)
    }

    /// Check that there is a population to simulate
    pub fn ensure_not_empty(&self) -> SimulationResult<()> {
        if self.population.is_empty() {
            return Err(SimulationError::InvalidInput(
                "empty environment or population".into(),
            ));
        }

        Ok(())
    }

    /// Give every individual a reference to the disease
    pub fn attach_disease(&mut self, disease: &Rc<Disease>) {
        for individual in &mut self.population {
            individual.disease = Some(Rc::clone(disease));
        }
    }

    /// Infect up to `count` distinct individuals chosen at random.
    ///
    /// If `count` is larger than the population, everyone is infected.
    pub fn seed_infections(
        &mut self,
        count: usize,
        hospitalise: bool,
        rng: &mut impl Rng,
    ) -> usize {
        let count = count.min(self.population.len());
        let mut indices: Vec<usize> = (0..self.population.len()).collect();
        indices.shuffle(rng);

        for &idx in &indices[..count] {
            let individual = &mut self.population[idx];
            individual.infect();
            individual.in_hospital = hospitalise;
        }

        count
    }
}

/// Create an environment with a randomly generated population.
///
/// # Arguments
///
/// * `population_size` - Number of individuals to create
/// * `area_size` - Side length of the square area
/// * `disease` - The disease, attached to every individual
/// * `params` - Environment-level parameters
/// * `initial_infected` - Number of individuals to infect at the start
/// * `hospitalise_initial_infected` - Whether the initially infected are in hospital
/// * `rng` - Source of randomness
pub fn initialise_environment(
    population_size: usize,
    area_size: f64,
    disease: &Rc<Disease>,
    params: &EnvironmentParameters,
    initial_infected: usize,
    hospitalise_initial_infected: bool,
    rng: &mut impl Rng,
) -> SimulationResult<Environment> {
    if population_size == 0 {
        return Err(SimulationError::InvalidInput(
            "population size must be positive".into(),
        ));
    }
    if !(area_size.is_finite() && area_size > 0.0) {
        return Err(SimulationError::InvalidInput(format!(
            "area size must be positive, got {area_size}"
        )));
    }

    let population = (0..population_size)
        .map(|_| Individual::random(rng, area_size))
        .collect();
    let params = EnvironmentParameters {
        area_size,
        ..params.clone()
    };
    let mut env = Environment::new(population, &params);
    env.attach_disease(disease);
    let infected = env.seed_infections(initial_infected, hospitalise_initial_infected, rng);
    debug!(
        "Created population of {population_size} with {infected} initial infections; \
        medical capacity is {}",
        env.medical_capacity
    );

    Ok(env)
}
