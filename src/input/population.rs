//! Code for reading an initial population from a CSV file.
use super::*;
use crate::individual::{Gender, HealthStatus, Individual, MoveType, MovementPattern, Position};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

const POPULATION_FILE_NAME: &str = "population.csv";

/// A row of the population CSV file
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct IndividualRaw {
    age: u32,
    gender: Gender,
    health_status: String,
    x: f64,
    y: f64,
    vaccinated: bool,
    hygiene_level: f64,
    social_distance_compliance: f64,
    move_type: MoveType,
    in_hospital: bool,
}

impl IndividualRaw {
    /// Check the record and convert it into an [`Individual`]
    fn into_individual(self, area_size: f64) -> Result<Individual> {
        let health_status: HealthStatus = self.health_status.parse()?;
        for (name, coord) in [("x", self.x), ("y", self.y)] {
            ensure!(
                (0.0..area_size).contains(&coord),
                "{name} must be at least 0 and less than the area size ({area_size}), got {coord}"
            );
        }
        for (name, value) in [
            ("hygiene_level", self.hygiene_level),
            ("social_distance_compliance", self.social_distance_compliance),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "{name} must be between 0 and 1 (inclusive), got {value}"
            );
        }

        let mut individual = Individual::new(
            self.gender,
            self.age,
            Position::new(self.x, self.y),
            self.hygiene_level,
            self.social_distance_compliance,
            Some(MovementPattern::new(self.move_type, area_size)),
        );
        individual.health_status = health_status;
        individual.in_hospital = self.in_hospital;
        if self.vaccinated {
            individual.vaccinate();
        }

        Ok(individual)
    }
}

/// Read the initial population from the model directory, if there is one.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `area_size` - Side length of the area, which every position must lie within
///
/// # Returns
///
/// `None` if the model has no population file, otherwise the individuals in file order
pub fn read_population(model_dir: &Path, area_size: f64) -> Result<Option<Vec<Individual>>> {
    let file_path = model_dir.join(POPULATION_FILE_NAME);
    if !file_path.is_file() {
        return Ok(None);
    }

    let records: Vec<IndividualRaw> = read_csv(&file_path)?;
    let population = read_population_from_iter(records.into_iter(), area_size)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(Some(population))
}

fn read_population_from_iter<I>(iter: I, area_size: f64) -> Result<Vec<Individual>>
where
    I: Iterator<Item = IndividualRaw>,
{
    iter.enumerate()
        .map(|(row, raw)| {
            raw.into_individual(area_size)
                .with_context(|| format!("Invalid individual on row {}", row + 1))
        })
        .collect()
}
