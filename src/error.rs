//! Errors raised by the simulation engine.
//!
//! The engine reports failures with [`SimulationError`] so that callers can tell the kinds apart.
//! The outer layers of the program (CLI, input and output) wrap these in [`anyhow::Error`].
use derive_more::Display;

/// An error raised while initialising or advancing the simulation
#[derive(Debug, Clone, PartialEq, Display)]
pub enum SimulationError {
    /// The environment, population or an initialisation argument is unusable
    #[display("Invalid input: {_0}")]
    InvalidInput(String),
    /// A set of transition probabilities violated `0 <= p <= 1` or `c + d <= 1`
    #[display("Invalid transition probabilities for individual {index}: {reason}")]
    InvalidProbability {
        /// Position of the offending individual in the population
        index: usize,
        /// Which constraint was violated
        reason: String,
    },
    /// A health status label did not match any known status
    #[display("Unknown health status: {_0}")]
    UnknownState(String),
}

impl std::error::Error for SimulationError {}

/// A [`Result`] whose error type is [`SimulationError`]
pub type SimulationResult<T> = Result<T, SimulationError>;
