//! Contracts of the simulator the tasks run against.
//!
//! Task code never talks to a physics engine directly. It spawns assets,
//! queries poses and draws random free poses through these traits, which
//! the benchmark's simulator bindings implement. [`crate::tabletop::Tabletop`]
//! is the in-memory implementation used for previews and tests.

use thiserror::Error;

use crate::model::{AssetRef, Category, ObjectId, Rgba};
use crate::types::{Pose, Vec3};

/// Errors reported by a simulator backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),
    #[error("asset rejected: {0}")]
    InvalidAsset(String),
}

/// Result type for simulator calls.
pub type SimResult<T> = Result<T, SimError>;

/// A chain of deformable rope segments together with the poses each
/// segment should reach.
#[derive(Clone, Debug, PartialEq)]
pub struct Rope {
    pub parts: Vec<ObjectId>,
    pub targets: Vec<Pose>,
}

/// Scene mutation and inspection.
pub trait Simulator {
    /// Spawns an asset and returns its handle.
    fn add_object(&mut self, asset: &AssetRef, pose: Pose, category: Category)
    -> SimResult<ObjectId>;

    /// Current pose of a spawned object.
    fn object_pose(&self, id: ObjectId) -> SimResult<Pose>;

    /// Current position of a spawned object.
    fn object_position(&self, id: ObjectId) -> SimResult<Vec3> {
        self.object_pose(id).map(|pose| pose.position)
    }

    /// Handles of every object currently in the scene, in spawn order.
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Tints a spawned object.
    fn set_color(&mut self, id: ObjectId, color: Rgba) -> SimResult<()>;

    /// Spawns a rope of `n_parts` segments whose targets run from
    /// `corners.0` to `corners.1`.
    fn add_rope(&mut self, corners: (Vec3, Vec3), n_parts: usize, radius: f64) -> SimResult<Rope>;

    /// Advances the simulation so freshly spawned bodies settle.
    fn step_simulation(&mut self, steps: u32);
}

/// Source of random collision-free poses.
pub trait PoseSampler {
    /// Draws a random pose with room for an object of `size`, or `None`
    /// when the workspace has no free space for it.
    fn sample_pose(&mut self, size: Vec3) -> Option<Pose>;
}

/// Everything a task reset needs from its backend.
pub trait Environment: Simulator + PoseSampler {}

impl<T: Simulator + PoseSampler + ?Sized> Environment for T {}
