//! Checking a submitted vector against a riddle stage.

use mashar_models::games::{Riddle, STAGES_PER_TEAM};
use mashar_models::Team;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VectorError {
    /// Size or angle missing or not a number; nothing is recorded.
    #[error("vector size and angle are required")]
    EmptyForm,
    #[error("unknown team `{0}`")]
    UnknownTeam(String),
    #[error("stage {0} does not exist")]
    UnknownStage(i32),
    #[error("no active game `{0}`")]
    NoSuchGame(String),
    #[error("store failure: {0}")]
    Store(String),
}

/// A parsed submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Submission {
    pub size: f64,
    pub angle: f64,
}

impl Submission {
    /// Both values must be present and finite numbers.
    pub fn parse(size: Option<&str>, angle: Option<&str>) -> Result<Self, VectorError> {
        let parse = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or(VectorError::EmptyForm)
        };

        Ok(Self {
            size: parse(size)?,
            angle: parse(angle)?,
        })
    }
}

pub fn parse_team(team: &str) -> Result<Team, VectorError> {
    team.parse()
        .map_err(|_| VectorError::UnknownTeam(team.to_string()))
}

pub fn parse_stage(index: &str) -> Result<i32, VectorError> {
    index
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|i| (1..=STAGES_PER_TEAM).contains(i))
        .ok_or_else(|| VectorError::UnknownStage(index.trim().parse().unwrap_or(0)))
}

/// Angle folded into `[0, 360)`.
fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

fn angles_match(a: f64, b: f64) -> bool {
    normalize_angle(a) == normalize_angle(b)
}

/// Accepted `(size, angle)` pairs of a stage.
///
/// Sizes and angles are paired by position; when one list is shorter its
/// last value is reused for the remaining entries.
pub fn accepted_pairs(riddle: &Riddle) -> Vec<(f64, f64)> {
    let (sizes, angles) = (&riddle.vec_size, &riddle.vec_angle);
    let (Some(&last_size), Some(&last_angle)) = (sizes.last(), angles.last()) else {
        return Vec::new();
    };

    (0..sizes.len().max(angles.len()))
        .map(|i| {
            (
                sizes.get(i).copied().unwrap_or(last_size),
                angles.get(i).copied().unwrap_or(last_angle),
            )
        })
        .collect()
}

/// True when the submission matches any accepted alternative of the stage.
pub fn check_vector(riddle: &Riddle, submission: Submission) -> bool {
    accepted_pairs(riddle).into_iter().any(|(size, angle)| {
        size == submission.size && angles_match(angle, submission.angle)
    })
}
