//! Common routines for handling input data.
use crate::environment::{Environment, initialise_environment};
use crate::model::Model;
use crate::model::parameters::ModelParameters;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::warn;
use rand::Rng;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::rc::Rc;

pub mod population;
use population::read_population;

/// Read a series of type Ts from a CSV file into a Vec<T>.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_internal(file_path).with_context(|| input_err_msg(file_path))?;
    ensure!(
        !vec.is_empty(),
        "{}: CSV file cannot be empty",
        file_path.display()
    );

    Ok(vec)
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;

    Ok(reader.deserialize().try_collect()?)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;

    Ok(toml_data)
}

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let population = read_population(model_dir, parameters.environment.area_size)?;

    let size = parameters.population.size;
    if let Some(len) = population.as_ref().map(Vec::len).filter(|&len| len != size) {
        warn!(
            "Population file contains {len} individuals, but population size is {size}; \
            using the population file"
        );
    }

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        population,
    })
}

/// Build the starting environment for a model.
///
/// If the model supplies its own population, it is used as is (apart from the disease, which is
/// attached to every individual). Otherwise a random population is generated.
pub fn build_environment(model: &Model, rng: &mut impl Rng) -> Result<Environment> {
    let params = &model.parameters;
    let disease = Rc::new(params.disease.clone());

    let env = match &model.population {
        Some(population) => {
            let mut env = Environment::new(population.clone(), &params.environment);
            env.attach_disease(&disease);
            env
        }
        None => initialise_environment(
            params.population.size,
            params.environment.area_size,
            &disease,
            &params.environment,
            params.population.initial_infected,
            params.population.hospitalise_initial_infected,
            rng,
        )?,
    };

    Ok(env)
}
