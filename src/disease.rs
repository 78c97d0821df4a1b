//! The disease being simulated.
use anyhow::{Result, ensure};
use serde::Deserialize;

/// Maximum length of a disease name
const MAX_NAME_LENGTH: usize = 100;

define_param_default!(default_name, String, "DemoDisease".into());
define_param_default!(default_transmission_rate, f64, 0.8);
define_param_default!(default_transmission_distance, f64, 2.0);
define_param_default!(default_recovery_rate, f64, 0.05);
define_param_default!(default_mortality_rate, f64, 0.01);
define_param_default!(default_latent_period, u32, 3);
define_param_default!(default_infectious_period, u32, 10);
define_param_default!(default_immunity_duration, u32, 90);

/// An infectious disease.
///
/// A disease is created once when the simulation starts and is shared (via [`std::rc::Rc`])
/// between all the individuals which refer to it. It is never modified afterwards.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Disease {
    /// A human-readable name
    #[serde(default = "default_name")]
    pub name: String,
    /// Per-exposure probability of transmission at zero distance
    #[serde(default = "default_transmission_rate")]
    pub transmission_rate: f64,
    /// Characteristic exposure radius used for distance decay
    #[serde(default = "default_transmission_distance")]
    pub transmission_distance: f64,
    /// Baseline daily probability of recovery
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f64,
    /// Baseline daily probability of death while infected
    #[serde(default = "default_mortality_rate")]
    pub mortality_rate: f64,
    /// Days between exposure and becoming infectious
    #[serde(default = "default_latent_period")]
    pub latent_period: u32,
    /// Days an individual remains infectious
    #[serde(default = "default_infectious_period")]
    pub infectious_period: u32,
    /// Days of immunity following recovery
    #[serde(default = "default_immunity_duration")]
    pub immunity_duration: u32,
}

impl Default for Disease {
    fn default() -> Self {
        Self {
            name: default_name(),
            transmission_rate: default_transmission_rate(),
            transmission_distance: default_transmission_distance(),
            recovery_rate: default_recovery_rate(),
            mortality_rate: default_mortality_rate(),
            latent_period: default_latent_period(),
            infectious_period: default_infectious_period(),
            immunity_duration: default_immunity_duration(),
        }
    }
}

/// Check that a value is a valid probability
fn check_proportion(name: &str, value: f64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "{name} must be between 0 and 1 (inclusive), got {value}"
    );

    Ok(())
}

impl Disease {
    /// Check that the disease parameters are within their permitted ranges
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.name.is_empty(), "disease name cannot be empty");
        ensure!(
            self.name.chars().count() <= MAX_NAME_LENGTH,
            "disease name must be at most {MAX_NAME_LENGTH} characters"
        );

        check_proportion("transmission_rate", self.transmission_rate)?;
        check_proportion("recovery_rate", self.recovery_rate)?;
        check_proportion("mortality_rate", self.mortality_rate)?;

        ensure!(
            self.transmission_distance > 0.0 && self.transmission_distance < 100.0,
            "transmission_distance must be between 0 and 100 (exclusive), got {}",
            self.transmission_distance
        );
        ensure!(
            self.latent_period <= 365,
            "latent_period must be at most 365 days"
        );
        ensure!(
            (1..=365).contains(&self.infectious_period),
            "infectious_period must be between 1 and 365 days"
        );
        ensure!(
            self.immunity_duration <= 3650,
            "immunity_duration must be at most 3650 days"
        );

        Ok(())
    }
}
