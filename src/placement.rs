//! Placement of zones and target poses on the tabletop.
//!
//! Candidate poses come from the environment's random sampler. A candidate
//! is accepted once a validator finds it free of conflicts; the search is
//! bounded by a fixed number of attempts and fails loudly when exhausted,
//! since a task with unplaced zones is meaningless.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::{contains, footprints_overlap};
use crate::model::{ObjectId, Zone};
use crate::sim::{Environment, PoseSampler, SimError, Simulator};
use crate::types::{BoundingBox, Pose, Vec3};

/// Errors raised while placing zones and targets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("could not find a valid pose for '{label}' after {attempts} attempts")]
    Exhausted { label: String, attempts: usize },
    #[error("no free space for '{label}'")]
    NoFreeSpace { label: String },
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// How a candidate zone is tested against zones that are already placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoneOverlapMode {
    /// Reject only when the candidate's center falls inside another zone.
    ///
    /// Zones that interpenetrate without covering each other's centers pass.
    #[default]
    CenterPoint,
    /// Additionally reject any positive overlap of the XY footprints.
    Footprint,
}

impl ZoneOverlapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneOverlapMode::CenterPoint => "center",
            ZoneOverlapMode::Footprint => "footprint",
        }
    }
}

impl FromStr for ZoneOverlapMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "center" | "center_point" | "centre" => Ok(ZoneOverlapMode::CenterPoint),
            "footprint" | "box" => Ok(ZoneOverlapMode::Footprint),
            other => Err(format!("unknown zone overlap mode '{}'", other)),
        }
    }
}

/// Configuration for the pose placer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Candidates drawn before giving up on one placement.
    pub max_attempts: usize,
    /// Zone-versus-zone conflict test.
    pub overlap_mode: ZoneOverlapMode,
}

impl PlacementConfig {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> PlacementConfigBuilder {
        PlacementConfigBuilder::default()
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            overlap_mode: ZoneOverlapMode::default(),
        }
    }
}

/// Builder for [`PlacementConfig`].
#[derive(Clone, Debug, Default)]
pub struct PlacementConfigBuilder {
    config: PlacementConfig,
}

impl PlacementConfigBuilder {
    /// Sets the attempt budget. Zero is raised to one.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.config.max_attempts = attempts.max(1);
        self
    }

    /// Sets the zone overlap test.
    pub fn overlap_mode(mut self, mode: ZoneOverlapMode) -> Self {
        self.config.overlap_mode = mode;
        self
    }

    pub fn build(self) -> PlacementConfig {
        self.config
    }
}

/// A pose accepted by the placer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub pose: Pose,
    /// 1-based attempt on which the pose was accepted.
    pub attempts: usize,
}

/// Checks whether a zone of `size` at `candidate` is free of conflicts.
///
/// Any existing object whose current position lies inside the candidate's
/// box makes it invalid, as does a candidate center that lies inside an
/// existing zone (or, in [`ZoneOverlapMode::Footprint`], any footprint
/// overlap with one).
pub fn is_valid_zone_pose<S: Simulator + ?Sized>(
    env: &S,
    candidate: &Pose,
    size: Vec3,
    zones: &[Zone],
    objects: &[ObjectId],
    mode: ZoneOverlapMode,
) -> Result<bool, SimError> {
    let bounds = BoundingBox::from_center_and_size(candidate.position, size);

    for &id in objects {
        let position = env.object_position(id)?;
        if contains(position, &bounds) {
            return Ok(false);
        }
    }

    for zone in zones {
        let other = zone.bounds();
        let blocked = match mode {
            ZoneOverlapMode::CenterPoint => contains(candidate.position, &other),
            ZoneOverlapMode::Footprint => {
                contains(candidate.position, &other) || footprints_overlap(&bounds, &other)
            }
        };
        if blocked {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Checks that `candidate` keeps clear of the given objects.
///
/// An object is too close when the distance between its position and the
/// candidate is below the length of the candidate's size diagonal.
pub fn is_clear_of_objects<S: Simulator + ?Sized>(
    env: &S,
    candidate: &Pose,
    size: Vec3,
    objects: &[ObjectId],
) -> Result<bool, SimError> {
    let clearance = size.norm();
    for &id in objects {
        let position = env.object_position(id)?;
        if candidate.position.distance_to(&position) < clearance {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Draws candidates until `accept` approves one or the budget runs out.
///
/// A draw for which the sampler finds no free space counts as a failed
/// attempt.
pub fn place<E, F>(
    env: &mut E,
    label: &str,
    size: Vec3,
    max_attempts: usize,
    mut accept: F,
) -> Result<Placement, PlacementError>
where
    E: PoseSampler + ?Sized,
    F: FnMut(&E, &Pose) -> Result<bool, SimError>,
{
    for attempt in 1..=max_attempts {
        let Some(candidate) = env.sample_pose(size) else {
            debug!(label, attempt, "sampler found no free space");
            continue;
        };
        if accept(env, &candidate)? {
            debug!(label, attempt, "accepted candidate pose");
            return Ok(Placement {
                pose: candidate,
                attempts: attempt,
            });
        }
    }

    warn!(label, max_attempts, "placement attempts exhausted");
    Err(PlacementError::Exhausted {
        label: label.to_string(),
        attempts: max_attempts,
    })
}

/// Places a zone that neither covers a spawned object nor sits on one of
/// `zones`.
pub fn place_zone<E: Environment + ?Sized>(
    env: &mut E,
    label: &str,
    size: Vec3,
    zones: &[Zone],
    config: &PlacementConfig,
) -> Result<Placement, PlacementError> {
    let objects = env.object_ids();
    place(env, label, size, config.max_attempts, |env, candidate| {
        is_valid_zone_pose(env, candidate, size, zones, &objects, config.overlap_mode)
    })
}

/// Single unvalidated draw from the sampler.
pub fn sample_pose<E: PoseSampler + ?Sized>(
    env: &mut E,
    label: &str,
    size: Vec3,
) -> Result<Pose, PlacementError> {
    env.sample_pose(size)
        .ok_or_else(|| PlacementError::NoFreeSpace {
            label: label.to_string(),
        })
}
