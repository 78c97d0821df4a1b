//! Fixtures for tests
use crate::disease::Disease;
use crate::environment::Environment;
use crate::individual::{Gender, HealthStatus, Individual, MoveType, MovementPattern, Position};
use crate::model::parameters::EnvironmentParameters;
use rstest::fixture;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn disease() -> Disease {
    Disease::default()
}

#[fixture]
pub fn environment_parameters() -> EnvironmentParameters {
    EnvironmentParameters {
        area_size: 50.0,
        ..EnvironmentParameters::default()
    }
}

#[fixture]
pub fn individual() -> Individual {
    individual_at(0.0, 0.0)
}

/// A healthy, unvaccinated 30-year-old walker at the given position
pub fn individual_at(x: f64, y: f64) -> Individual {
    Individual::new(
        Gender::Female,
        30,
        Position::new(x, y),
        0.5,
        0.5,
        Some(MovementPattern::new(MoveType::Walk, 50.0)),
    )
}

/// An individual at the given position with the given status, referring to `disease`
pub fn individual_with_status(
    x: f64,
    y: f64,
    status: HealthStatus,
    disease: &Rc<Disease>,
) -> Individual {
    let mut individual = individual_at(x, y);
    individual.health_status = status;
    individual.disease = Some(Rc::clone(disease));
    individual
}

/// An environment containing exactly the given individuals
pub fn environment_with(population: Vec<Individual>) -> Environment {
    Environment::new(population, &environment_parameters())
}
