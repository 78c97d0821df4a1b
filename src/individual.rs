//! Individuals (agents) and the data they carry.
use crate::disease::Disease;
use crate::error::SimulationError;
use rand::Rng;
use serde::{Deserialize, Deserializer};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::rc::Rc;
use std::str::FromStr;

/// The health status of an individual.
///
/// [`HealthStatus::Dead`] is absorbing. Labels are parsed with [`FromStr`], so an unrecognised
/// label is reported as [`SimulationError::UnknownState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeLabeledStringEnum)]
pub enum HealthStatus {
    /// Not infected and not currently exposed
    #[string = "healthy"]
    Healthy,
    /// Exposed to an infected neighbour during the previous day
    #[string = "susceptible"]
    Susceptible,
    /// Carrying the disease
    #[string = "infected"]
    Infected,
    /// Recovered and (temporarily) immune
    #[string = "recovered"]
    Recovered,
    /// Dead
    #[string = "dead"]
    Dead,
}

impl HealthStatus {
    /// Whether the individual is still alive
    pub fn is_alive(self) -> bool {
        self != HealthStatus::Dead
    }
}

impl FromStr for HealthStatus {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "susceptible" => Ok(HealthStatus::Susceptible),
            "infected" => Ok(HealthStatus::Infected),
            "recovered" => Ok(HealthStatus::Recovered),
            "dead" => Ok(HealthStatus::Dead),
            _ => Err(SimulationError::UnknownState(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// The gender of an individual
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum Gender {
    /// Male
    #[string = "male"]
    Male,
    /// Female
    #[string = "female"]
    Female,
}

impl Gender {
    /// Pick a gender with equal probability
    pub fn sample(rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

/// A point in the simulated area
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate in `[0, area_size)`
    pub x: f64,
    /// Vertical coordinate in `[0, area_size)`
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// How an individual travels on a given day
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum MoveType {
    /// Short local trips
    #[string = "walk"]
    Walk,
    /// Regional travel
    #[string = "train"]
    Train,
    /// Travel anywhere in the area
    #[string = "flight"]
    Flight,
}

/// Probability of picking [`MoveType::Flight`] for the next day
const FLIGHT_PROBABILITY: f64 = 0.01;

/// Cumulative probability of picking either [`MoveType::Flight`] or [`MoveType::Train`]
const FLIGHT_OR_TRAIN_PROBABILITY: f64 = 0.05;

impl MoveType {
    /// The fraction of the area's side length which can be covered in one day
    pub fn area_fraction(self) -> f64 {
        match self {
            MoveType::Walk => 0.001,
            MoveType::Train => 0.1,
            MoveType::Flight => 1.0,
        }
    }

    /// The baseline movement radius for this type in an area of the given size
    pub fn baseline_radius(self, area_size: f64) -> f64 {
        area_size * self.area_fraction()
    }

    /// Draw a movement type: 1% flight, 4% train, 95% walk
    pub fn sample(rng: &mut impl Rng) -> Self {
        let value: f64 = rng.random();
        if value < FLIGHT_PROBABILITY {
            MoveType::Flight
        } else if value < FLIGHT_OR_TRAIN_PROBABILITY {
            MoveType::Train
        } else {
            MoveType::Walk
        }
    }
}

/// How far and by what means an individual moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementPattern {
    /// Means of travel
    pub move_type: MoveType,
    /// Largest distance travelled in one day
    pub move_radius: f64,
}

impl MovementPattern {
    /// A pattern for the given type with its baseline radius
    pub fn new(move_type: MoveType, area_size: f64) -> Self {
        Self {
            move_type,
            move_radius: move_type.baseline_radius(area_size),
        }
    }

    /// A freshly sampled pattern
    pub fn sample(rng: &mut impl Rng, area_size: f64) -> Self {
        Self::new(MoveType::sample(rng), area_size)
    }
}

/// A simulated person
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Gender
    pub gender: Gender,
    /// Age in years
    pub age: u32,
    /// Current health status
    pub health_status: HealthStatus,
    /// The disease this individual is exposed to, shared with the rest of the population
    pub disease: Option<Rc<Disease>>,
    /// Days spent infected so far
    pub days_infected: u32,
    /// Days since last recovering
    pub days_since_recovery: u32,
    /// Days since being vaccinated. Meaningless for unvaccinated individuals.
    pub days_since_vaccination: u32,
    vaccinated: bool,
    /// Personal hygiene in [0, 1]
    pub hygiene_level: f64,
    /// Willingness to keep socially distanced, in [0, 1]
    pub social_distance_compliance: f64,
    /// Current location
    pub position: Position,
    /// How the individual will move next. Individuals without a pattern stay put.
    pub movement_pattern: Option<MovementPattern>,
    /// Whether the individual is being treated in hospital
    pub in_hospital: bool,
}

impl Individual {
    /// Create a healthy, unvaccinated individual
    pub fn new(
        gender: Gender,
        age: u32,
        position: Position,
        hygiene_level: f64,
        social_distance_compliance: f64,
        movement_pattern: Option<MovementPattern>,
    ) -> Self {
        Self {
            gender,
            age,
            health_status: HealthStatus::Healthy,
            disease: None,
            days_infected: 0,
            days_since_recovery: 0,
            days_since_vaccination: 0,
            vaccinated: false,
            hygiene_level,
            social_distance_compliance,
            position,
            movement_pattern,
            in_hospital: false,
        }
    }

    /// Create an individual with randomised attributes somewhere in the area
    pub fn random(rng: &mut impl Rng, area_size: f64) -> Self {
        let position = Position::new(
            rng.random::<f64>() * area_size,
            rng.random::<f64>() * area_size,
        );
        let age = rng.random_range(0..=90);
        let hygiene_level = rng.random();
        let social_distance_compliance = rng.random();
        let movement_pattern = MovementPattern::sample(rng, area_size);

        Self::new(
            Gender::sample(rng),
            age,
            position,
            hygiene_level,
            social_distance_compliance,
            Some(movement_pattern),
        )
    }

    /// Whether this individual has been vaccinated
    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    /// Vaccinate this individual, starting the vaccination-age counter from zero.
    ///
    /// Vaccination happens at most once, so this returns `false` (and does nothing) if the
    /// individual was already vaccinated.
    pub fn vaccinate(&mut self) -> bool {
        if self.vaccinated {
            return false;
        }

        self.vaccinated = true;
        self.days_since_vaccination = 0;
        true
    }

    /// Put this individual into the infected state
    pub fn infect(&mut self) {
        self.health_status = HealthStatus::Infected;
        self.days_infected = 0;
    }

    /// Whether the individual is still alive
    pub fn is_alive(&self) -> bool {
        self.health_status.is_alive()
    }

    /// Whether the individual is currently infected
    pub fn is_infected(&self) -> bool {
        self.health_status == HealthStatus::Infected
    }
}
