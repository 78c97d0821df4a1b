//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::disease::Disease;
use crate::input::{input_err_msg, read_toml};
use crate::spatial::NeighbourSearch;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Largest population which can be simulated
const MAX_POPULATION_SIZE: usize = 1_000_000;

/// Largest number of days which can be simulated
const MAX_NUM_DAYS: u32 = 10_000;

define_param_default!(default_num_days, u32, 200);
define_param_default!(default_population_size, usize, 1000);
define_param_default!(default_initial_infected, usize, 10);
define_param_default!(default_area_size, f64, 100.0);
define_param_default!(default_social_distance_threshold, f64, 2.0);
define_param_default!(default_hygiene_level, f64, 0.1);
define_param_default!(default_mobility_rate, f64, 1.0);
define_param_default!(default_vaccination_rate, f64, 0.2);
define_param_default!(default_medical_care_level, f64, 0.7);

/// Represents the contents of the entire model file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// How long to simulate for and with which random seed
    #[serde(default)]
    pub simulation: SimulationParameters,
    /// The initial population
    #[serde(default)]
    pub population: PopulationParameters,
    /// The disease being simulated
    #[serde(default)]
    pub disease: Disease,
    /// Environment-level settings
    #[serde(default)]
    pub environment: EnvironmentParameters,
}

/// The `[simulation]` section of the model file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationParameters {
    /// Number of days to simulate
    #[serde(default = "default_num_days")]
    pub num_days: u32,
    /// Seed for the random number generator. If absent, a seed is drawn from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            num_days: default_num_days(),
            seed: None,
        }
    }
}

/// The `[population]` section of the model file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PopulationParameters {
    /// Number of individuals to generate
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of individuals infected on day zero
    #[serde(default = "default_initial_infected")]
    pub initial_infected: usize,
    /// Whether the individuals infected on day zero start in hospital
    #[serde(default)]
    pub hospitalise_initial_infected: bool,
}

impl Default for PopulationParameters {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            initial_infected: default_initial_infected(),
            hospitalise_initial_infected: false,
        }
    }
}

/// The `[environment]` section of the model file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EnvironmentParameters {
    /// Side length of the square area
    #[serde(default = "default_area_size")]
    pub area_size: f64,
    /// Initial social distancing threshold
    #[serde(default = "default_social_distance_threshold")]
    pub social_distance_threshold: f64,
    /// Initial environment-level hygiene
    #[serde(default = "default_hygiene_level")]
    pub hygiene_level: f64,
    /// General mobility. Reported but not used by the model.
    #[serde(default = "default_mobility_rate")]
    pub mobility_rate: f64,
    /// Initial vaccination coverage target
    #[serde(default = "default_vaccination_rate")]
    pub vaccination_rate: f64,
    /// Quality of medical care
    #[serde(default = "default_medical_care_level")]
    pub medical_care_level: f64,
    /// Hospital beds. Zero means 10% of the population.
    #[serde(default)]
    pub medical_capacity: u32,
    /// How to look for nearby individuals
    #[serde(default)]
    pub neighbour_search: NeighbourSearch,
}

impl Default for EnvironmentParameters {
    fn default() -> Self {
        Self {
            area_size: default_area_size(),
            social_distance_threshold: default_social_distance_threshold(),
            hygiene_level: default_hygiene_level(),
            mobility_rate: default_mobility_rate(),
            vaccination_rate: default_vaccination_rate(),
            medical_care_level: default_medical_care_level(),
            medical_capacity: 0,
            neighbour_search: NeighbourSearch::default(),
        }
    }
}

/// Check that a value is a valid proportion
fn check_proportion(name: &str, value: f64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "{name} must be between 0 and 1 (inclusive), got {value}"
    );

    Ok(())
}

/// Check that the `num_days` parameter is valid
fn check_num_days(value: u32) -> Result<()> {
    ensure!(
        (1..=MAX_NUM_DAYS).contains(&value),
        "num_days must be between 1 and {MAX_NUM_DAYS}"
    );

    Ok(())
}

/// Check that the `[population]` section is valid
fn check_population(population: &PopulationParameters) -> Result<()> {
    ensure!(
        (1..=MAX_POPULATION_SIZE).contains(&population.size),
        "population size must be between 1 and {MAX_POPULATION_SIZE}"
    );
    ensure!(
        population.initial_infected <= population.size,
        "initial_infected ({}) cannot exceed the population size ({})",
        population.initial_infected,
        population.size
    );

    Ok(())
}

impl EnvironmentParameters {
    /// Check that the environment parameters are within their permitted ranges
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.area_size > 0.0 && self.area_size < 10_000.0,
            "area_size must be between 0 and 10000 (exclusive), got {}",
            self.area_size
        );
        ensure!(
            (0.0..=100.0).contains(&self.social_distance_threshold),
            "social_distance_threshold must be between 0 and 100, got {}",
            self.social_distance_threshold
        );
        ensure!(
            self.social_distance_threshold <= self.area_size,
            "social_distance_threshold cannot exceed area_size"
        );
        ensure!(
            (0.0..=10.0).contains(&self.mobility_rate),
            "mobility_rate must be between 0 and 10, got {}",
            self.mobility_rate
        );
        check_proportion("hygiene_level", self.hygiene_level)?;
        check_proportion("vaccination_rate", self.vaccination_rate)?;
        check_proportion("medical_care_level", self.medical_care_level)?;

        Ok(())
    }
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_num_days(self.simulation.num_days)?;
        check_population(&self.population)?;
        self.disease.validate().context("Invalid disease parameters")?;
        self.environment
            .validate()
            .context("Invalid environment parameters")?;

        // Checks spanning more than one section
        ensure!(
            self.disease.transmission_distance <= self.environment.area_size,
            "transmission_distance cannot exceed area_size"
        );
        ensure!(
            self.environment.medical_capacity as usize <= self.population.size,
            "medical_capacity ({}) cannot exceed the population size ({})",
            self.environment.medical_capacity,
            self.population.size
        );

        Ok(())
    }
}
