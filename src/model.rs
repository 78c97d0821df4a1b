//! The model represents the static input data provided by the user.
use crate::individual::Individual;
use std::path::PathBuf;

pub mod parameters;
use parameters::ModelParameters;

/// Model definition
#[derive(Debug, Clone)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Initial population from `population.csv`, if the model provides one
    pub population: Option<Vec<Individual>>,
}

impl Model {
    /// The name of the model, taken from its folder
    pub fn name(&self) -> String {
        self.model_path
            .file_name()
            .map_or_else(|| "model".into(), |name| name.to_string_lossy().into_owned())
    }

    /// Number of days to simulate
    pub fn num_days(&self) -> u32 {
        self.parameters.simulation.num_days
    }
}
