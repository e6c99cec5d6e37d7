//! Task framework: static task parameters, the reset context handed to
//! each task's reset function, and the common reset sequence.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::goal::{Goal, GoalBook, GoalError, GoalSpec, render_template};
use crate::model::{
    AssetRef, Category, ObjectId, PlacedObject, ROPE_SEGMENT_URDF, Rgba, ValidationError,
    ZONE_URDF, Zone,
};
use crate::placement::{self, PlacementConfig, PlacementError};
use crate::sim::{Environment, Rope, SimError};
use crate::types::{Pose, Vec3};

/// Errors that abort a task reset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl TaskError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::Placement(PlacementError::Exhausted { .. }) => "placement_exhausted",
            TaskError::Placement(PlacementError::NoFreeSpace { .. }) => "no_free_space",
            TaskError::Placement(PlacementError::Sim(_)) | TaskError::Sim(_) => "simulator",
            TaskError::Goal(_) => "invalid_goal",
            TaskError::Validation(_) => "invalid_scene",
        }
    }
}

/// Static parameters of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TaskSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Step budget of an episode.
    pub max_steps: u32,
    /// Language goal template with `{name}` placeholders.
    pub lang_template: &'static str,
    /// Message shown once the task is solved.
    pub completed_desc: &'static str,
}

/// Reset function of a task.
pub type ResetFn = fn(&mut ResetContext<'_>) -> Result<(), TaskError>;

/// A task: its parameters plus the function that populates a scene.
#[derive(Clone, Copy, Debug)]
pub struct TaskDefinition {
    pub spec: TaskSpec,
    pub reset: ResetFn,
}

/// Events emitted while a task resets.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ResetEvent {
    /// The reset began.
    Started { task: String, seed: u64 },
    /// An object was spawned.
    ObjectAdded { object: PlacedObject },
    /// A zone was spawned. `attempts` is zero for zones at fixed poses.
    ZonePlaced {
        zone: Zone,
        object: ObjectId,
        attempts: usize,
    },
    /// A goal was registered.
    GoalAdded { index: usize, goal: Goal },
    /// The reset completed.
    Finished {
        objects: usize,
        zones: usize,
        goals: usize,
        total_reward: f64,
    },
}

/// Scene and goals produced by one reset.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TaskEpisode {
    pub task: String,
    pub seed: u64,
    pub max_steps: u32,
    pub completed_desc: String,
    pub objects: Vec<PlacedObject>,
    pub zones: Vec<Zone>,
    pub goals: Vec<Goal>,
    /// Sum of the goals' step rewards.
    pub total_reward: f64,
    /// Whether `total_reward` is one within tolerance.
    pub reward_normalized: bool,
}

/// Mutable state of a reset in progress.
pub struct ResetContext<'a> {
    env: &'a mut dyn Environment,
    spec: &'a TaskSpec,
    config: PlacementConfig,
    rng: StdRng,
    objects: Vec<PlacedObject>,
    zones: Vec<Zone>,
    goals: GoalBook,
    on_event: &'a mut dyn FnMut(&ResetEvent),
}

impl<'a> ResetContext<'a> {
    pub fn new(
        env: &'a mut dyn Environment,
        spec: &'a TaskSpec,
        config: PlacementConfig,
        seed: u64,
        on_event: &'a mut dyn FnMut(&ResetEvent),
    ) -> Self {
        Self {
            env,
            spec,
            config,
            rng: StdRng::seed_from_u64(seed),
            objects: Vec::new(),
            zones: Vec::new(),
            goals: GoalBook::new(),
            on_event,
        }
    }

    pub fn spec(&self) -> &TaskSpec {
        self.spec
    }

    /// Task-level randomness (shuffles, random yaw, variant choice).
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn goals(&self) -> &GoalBook {
        &self.goals
    }

    /// Spawns an asset and records it.
    pub fn add_object(
        &mut self,
        asset: AssetRef,
        pose: Pose,
        category: Category,
    ) -> Result<ObjectId, TaskError> {
        let id = self.env.add_object(&asset, pose, category)?;
        self.record(PlacedObject {
            id,
            asset,
            pose,
            category,
            color: None,
        });
        Ok(id)
    }

    /// Spawns a rigid object from a plain asset path.
    pub fn add_rigid(&mut self, path: &str, pose: Pose) -> Result<ObjectId, TaskError> {
        self.add_object(AssetRef::urdf(path), pose, Category::Rigid)
    }

    fn record(&mut self, object: PlacedObject) {
        (self.on_event)(&ResetEvent::ObjectAdded {
            object: object.clone(),
        });
        self.objects.push(object);
    }

    /// Tints a spawned object.
    pub fn set_color(&mut self, id: ObjectId, color: Rgba) -> Result<(), TaskError> {
        self.env.set_color(id, color)?;
        if let Some(object) = self.objects.iter_mut().find(|object| object.id == id) {
            object.color = Some(color);
        }
        Ok(())
    }

    /// Current pose of a spawned object.
    pub fn object_pose(&self, id: ObjectId) -> Result<Pose, TaskError> {
        Ok(self.env.object_pose(id)?)
    }

    /// Spawns a zone at a known pose.
    pub fn add_zone(
        &mut self,
        label: &str,
        pose: Pose,
        size: Vec3,
    ) -> Result<(ObjectId, Zone), TaskError> {
        let zone = Zone::new(label, pose, size)?;
        let id = self.spawn_zone(zone.clone(), 0)?;
        Ok((id, zone))
    }

    /// Spawns a zone at a random pose without checking for conflicts.
    pub fn add_random_zone(
        &mut self,
        label: &str,
        size: Vec3,
    ) -> Result<(ObjectId, Zone), TaskError> {
        let pose = placement::sample_pose(&mut *self.env, label, size)?;
        let zone = Zone::new(label, pose, size)?;
        let id = self.spawn_zone(zone.clone(), 1)?;
        Ok((id, zone))
    }

    /// Places one conflict-free zone per label, then spawns them.
    ///
    /// Each zone is validated against every object already in the scene,
    /// against zones spawned earlier in the reset and against the zones
    /// placed before it in this batch.
    pub fn place_zones(&mut self, labels: &[&str], size: Vec3) -> Result<Vec<Zone>, TaskError> {
        let mut existing = self.zones.clone();
        let mut placed = Vec::with_capacity(labels.len());

        for &label in labels {
            let placement =
                placement::place_zone(&mut *self.env, label, size, &existing, &self.config)?;
            let zone = Zone::new(label, placement.pose, size)?;
            existing.push(zone.clone());
            placed.push((zone, placement.attempts));
        }

        let mut zones = Vec::with_capacity(placed.len());
        for (zone, attempts) in placed {
            self.spawn_zone(zone.clone(), attempts)?;
            zones.push(zone);
        }
        Ok(zones)
    }

    fn spawn_zone(&mut self, zone: Zone, attempts: usize) -> Result<ObjectId, TaskError> {
        let id = self.add_object(AssetRef::urdf(ZONE_URDF), zone.pose, Category::Fixed)?;
        debug!(label = %zone.label, attempts, "zone placed");
        (self.on_event)(&ResetEvent::ZonePlaced {
            zone: zone.clone(),
            object: id,
            attempts,
        });
        self.zones.push(zone);
        Ok(id)
    }

    /// Single unvalidated random pose.
    pub fn sample_pose(&mut self, label: &str, size: Vec3) -> Result<Pose, TaskError> {
        Ok(placement::sample_pose(&mut *self.env, label, size)?)
    }

    /// Random pose at least `size.norm()` away from every object in `avoid`.
    pub fn place_clear_of(
        &mut self,
        label: &str,
        size: Vec3,
        avoid: &[ObjectId],
    ) -> Result<Pose, TaskError> {
        let placement = placement::place(
            &mut *self.env,
            label,
            size,
            self.config.max_attempts,
            |env, candidate| placement::is_clear_of_objects(env, candidate, size, avoid),
        )?;
        Ok(placement.pose)
    }

    /// Spawns a rope and records its segments.
    pub fn add_rope(
        &mut self,
        corners: (Vec3, Vec3),
        n_parts: usize,
        radius: f64,
    ) -> Result<Rope, TaskError> {
        let rope = self.env.add_rope(corners, n_parts, radius)?;
        for &id in &rope.parts {
            let pose = self.env.object_pose(id)?;
            self.record(PlacedObject {
                id,
                asset: AssetRef::urdf(ROPE_SEGMENT_URDF),
                pose,
                category: Category::Deformable,
                color: None,
            });
        }
        Ok(rope)
    }

    /// Lets the scene settle.
    pub fn settle(&mut self, steps: u32) {
        self.env.step_simulation(steps);
    }

    /// Registers a goal and returns its index.
    pub fn add_goal(&mut self, spec: GoalSpec) -> Result<usize, TaskError> {
        let index = self.goals.add_goal(spec)?;
        if let Some(goal) = self.goals.goals().get(index) {
            (self.on_event)(&ResetEvent::GoalAdded {
                index,
                goal: goal.clone(),
            });
        }
        Ok(index)
    }

    /// Fills the task's language template.
    pub fn lang(&self, args: &[(&str, &str)]) -> Result<String, TaskError> {
        Ok(render_template(self.spec.lang_template, args)?)
    }
}

/// Resets a task on `env` and returns the resulting episode.
pub fn reset_task(
    task: &TaskDefinition,
    env: &mut dyn Environment,
    config: PlacementConfig,
    seed: u64,
) -> Result<TaskEpisode, TaskError> {
    reset_task_with_progress(task, env, config, seed, |_| {})
}

/// Resets a task and reports every spawned object, zone and goal.
///
/// Nothing is returned on failure; the environment may hold a partial
/// scene and should be discarded.
#[instrument(skip_all, fields(task = task.spec.name, seed = seed))]
pub fn reset_task_with_progress(
    task: &TaskDefinition,
    env: &mut dyn Environment,
    config: PlacementConfig,
    seed: u64,
    mut on_event: impl FnMut(&ResetEvent),
) -> Result<TaskEpisode, TaskError> {
    on_event(&ResetEvent::Started {
        task: task.spec.name.to_string(),
        seed,
    });

    let mut ctx = ResetContext::new(env, &task.spec, config, seed, &mut on_event);
    (task.reset)(&mut ctx)?;

    let total_reward = ctx.goals.check_reward_total(task.spec.name);
    let reward_normalized = ctx.goals.reward_total_is_normalized();
    let objects = std::mem::take(&mut ctx.objects);
    let zones = std::mem::take(&mut ctx.zones);
    let goals = std::mem::take(&mut ctx.goals).into_goals();
    drop(ctx);

    on_event(&ResetEvent::Finished {
        objects: objects.len(),
        zones: zones.len(),
        goals: goals.len(),
        total_reward,
    });
    info!(
        objects = objects.len(),
        zones = zones.len(),
        goals = goals.len(),
        total_reward,
        "task reset complete"
    );

    Ok(TaskEpisode {
        task: task.spec.name.to_string(),
        seed,
        max_steps: task.spec.max_steps,
        completed_desc: task.spec.completed_desc.to_string(),
        objects,
        zones,
        goals,
        total_reward,
        reward_normalized,
    })
}
