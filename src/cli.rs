//! The `episim` command line.
use crate::input::load_model;
use crate::log;
use crate::output::{create_output_directory, get_output_dir};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// An agent-based simulation of infectious disease spread.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Print the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options shared by `run` and `example run`
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Delete the output directory's contents if it is not empty
    #[arg(long)]
    pub overwrite: bool,
    /// Also write every individual's state on every day to debug_agents.csv
    #[arg(long)]
    pub debug_model: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a model and write its daily statistics.
    Run {
        /// Directory containing model.toml and, optionally, population.csv.
        model_dir: PathBuf,
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Work with the bundled demo models.
    Example {
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Check that a model loads without running it.
    Validate {
        /// Directory containing model.toml.
        model_dir: PathBuf,
    },
    /// Manage program settings.
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse the command line and run the chosen command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    match cli.command {
        Some(command) => command.execute(),
        None => {
            println!("{}", Cli::command().render_long_help());
            Ok(())
        }
    }
}

/// Use the given settings, or load them from the user's settings file
fn settings_or_load(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Handle the `run` command.
///
/// Log files go into the output folder, which is created first so that they have somewhere to
/// go. Command-line flags can only switch settings on.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let mut settings = settings_or_load(settings)?;
    settings.debug_model |= opts.debug_model;
    settings.overwrite |= opts.overwrite;

    let output_path = match &opts.output_dir {
        Some(path) => path.clone(),
        None => get_output_dir(model_path)?,
    };
    let overwritten = create_output_directory(&output_path, settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(Some(settings.log_level.as_str()), Some(output_path.as_path()))
        .context("Failed to initialise logging.")?;
    if overwritten {
        warn!("Existing output in {} was deleted", output_path.display());
    }

    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    crate::simulation::run(&model, &output_path, settings.debug_model)?;
    info!("Simulation complete!");

    Ok(())
}

/// Handle the `validate` command. No log files are written.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = settings_or_load(settings)?;
    log::init(Some(settings.log_level.as_str()), None)
        .context("Failed to initialise logging.")?;

    let model = load_model(model_path).context("Failed to validate model.")?;
    info!(
        "Model validation successful! {} will run for {} days.",
        model.name(),
        model.num_days()
    );

    Ok(())
}
