//! The module responsible for writing output data to disk.
use crate::environment::Environment;
use crate::individual::{HealthStatus, MoveType};
use crate::simulation::DayOutcome;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "episim_results";

/// The output file name for daily statistics
const DAILY_STATS_FILE_NAME: &str = "daily_stats.csv";

/// The output file name for per-individual debug data
const DEBUG_AGENTS_FILE_NAME: &str = "debug_agents.csv";

/// Get the default output directory for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // "." has no file name until canonicalised
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data.
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// `true` if the output dir contained existing data that was deleted, `false` if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the daily statistics CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DailyStatsRow {
    day: u32,
    healthy: usize,
    susceptible: usize,
    infected: usize,
    recovered: usize,
    dead: usize,
    infected_fraction: f64,
    vaccinated: usize,
    environment_hygiene: f64,
    environment_vaccination_rate: f64,
    social_distance_threshold: f64,
    policy_tightened: bool,
}

impl DailyStatsRow {
    /// Summarise the environment at the end of `day`
    fn new(day: u32, env: &Environment, outcome: Option<&DayOutcome>) -> Self {
        let counts = env.status_counts();
        let infected_fraction = outcome.map_or_else(
            || counts.infected as f64 / counts.total().max(1) as f64,
            |outcome| outcome.infected_fraction,
        );

        Self {
            day,
            healthy: counts.healthy,
            susceptible: counts.susceptible,
            infected: counts.infected,
            recovered: counts.recovered,
            dead: counts.dead,
            infected_fraction,
            vaccinated: env.vaccinated_count(),
            environment_hygiene: env.hygiene_level,
            environment_vaccination_rate: env.vaccination_rate,
            social_distance_threshold: env.social_distance_threshold,
            policy_tightened: outcome.is_some_and(|outcome| outcome.policy_tightened),
        }
    }
}

/// Represents a row in the per-individual debug CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DebugAgentRow {
    day: u32,
    index: usize,
    health_status: HealthStatus,
    x: f64,
    y: f64,
    hygiene_level: f64,
    social_distance_compliance: f64,
    vaccinated: bool,
    days_since_vaccination: u32,
    move_type: Option<MoveType>,
}

/// An object for writing simulation results to file
pub struct DataWriter {
    stats_writer: csv::Writer<File>,
    debug_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Open CSV files to write output data to and write the run metadata
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model_path` - Path to the model being run
    /// * `seed` - The random seed for the run
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(
        output_path: &Path,
        model_path: &Path,
        seed: u64,
        save_debug_info: bool,
    ) -> Result<Self> {
        write_metadata(output_path, model_path, seed).context("Failed to save metadata")?;

        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV file
            Some(new_writer(DEBUG_AGENTS_FILE_NAME)?)
        } else {
            None
        };

        Ok(Self {
            stats_writer: new_writer(DAILY_STATS_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write the state of the environment at the end of `day`.
    ///
    /// `outcome` is `None` for the initial state.
    pub fn write_day(
        &mut self,
        day: u32,
        env: &Environment,
        outcome: Option<&DayOutcome>,
    ) -> Result<()> {
        self.stats_writer
            .serialize(DailyStatsRow::new(day, env, outcome))?;

        if let Some(wtr) = &mut self.debug_writer {
            for (index, individual) in env.population().iter().enumerate() {
                wtr.serialize(DebugAgentRow {
                    day,
                    index,
                    health_status: individual.health_status,
                    x: individual.position.x,
                    y: individual.position.y,
                    hygiene_level: individual.hygiene_level,
                    social_distance_compliance: individual.social_distance_compliance,
                    vaccinated: individual.is_vaccinated(),
                    days_since_vaccination: individual.days_since_vaccination,
                    move_type: individual
                        .movement_pattern
                        .map(|pattern| pattern.move_type),
                })?;
            }
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.stats_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
