//! In-memory tabletop backend.
//!
//! Records spawned objects and draws random poses inside the robot's
//! workspace. There is no physics: poses stay where they were put and
//! stepping the simulation only counts steps.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::{AssetRef, Category, ObjectId, PlacedObject, ROPE_SEGMENT_URDF, Rgba};
use crate::sim::{PoseSampler, Rope, SimError, SimResult, Simulator};
use crate::types::{BoundingBox, Pose, Quat, Vec3};

/// Reachable area of the table in world coordinates.
pub const DEFAULT_WORKSPACE: BoundingBox =
    BoundingBox::new(Vec3::new(0.25, -0.5, 0.0), Vec3::new(0.75, 0.5, 0.3));

/// Seedable bookkeeping simulator.
#[derive(Debug)]
pub struct Tabletop {
    workspace: BoundingBox,
    objects: BTreeMap<ObjectId, PlacedObject>,
    next_id: u32,
    steps: u64,
    rng: StdRng,
}

impl Tabletop {
    /// Creates an empty table over [`DEFAULT_WORKSPACE`].
    pub fn new(seed: u64) -> Self {
        Self::with_workspace(DEFAULT_WORKSPACE, seed)
    }

    /// Creates an empty table over a custom workspace.
    pub fn with_workspace(workspace: BoundingBox, seed: u64) -> Self {
        Self {
            workspace,
            objects: BTreeMap::new(),
            next_id: 1,
            steps: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Workspace the sampler draws from.
    pub fn workspace(&self) -> &BoundingBox {
        &self.workspace
    }

    /// Spawned objects in spawn order.
    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.values()
    }

    /// Looks up a spawned object.
    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    /// Number of simulation steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn insert(&mut self, asset: AssetRef, pose: Pose, category: Category) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            PlacedObject {
                id,
                asset,
                pose,
                category,
                color: None,
            },
        );
        id
    }
}

impl Simulator for Tabletop {
    fn add_object(
        &mut self,
        asset: &AssetRef,
        pose: Pose,
        category: Category,
    ) -> SimResult<ObjectId> {
        asset
            .validate()
            .map_err(|err| SimError::InvalidAsset(err.to_string()))?;
        let id = self.insert(asset.clone(), pose, category);
        debug!(object = %id, asset = asset.path(), ?category, "spawned object");
        Ok(id)
    }

    fn object_pose(&self, id: ObjectId) -> SimResult<Pose> {
        self.objects
            .get(&id)
            .map(|object| object.pose)
            .ok_or(SimError::UnknownObject(id))
    }

    fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    fn set_color(&mut self, id: ObjectId, color: Rgba) -> SimResult<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(SimError::UnknownObject(id))?;
        object.color = Some(color);
        Ok(())
    }

    fn add_rope(&mut self, corners: (Vec3, Vec3), n_parts: usize, radius: f64) -> SimResult<Rope> {
        if n_parts == 0 {
            return Err(SimError::InvalidAsset(
                "rope needs at least one segment".to_string(),
            ));
        }

        let (start, end) = corners;
        let increment = (end - start) * (1.0 / n_parts as f64);
        // Segments start as a vertical stack above the midpoint and fall onto the table.
        let drop_point = (start + end) * 0.5;
        let asset = AssetRef::urdf(ROPE_SEGMENT_URDF);

        let mut parts = Vec::with_capacity(n_parts);
        let mut targets = Vec::with_capacity(n_parts);
        for i in 0..n_parts {
            let spawn = Vec3::new(
                drop_point.x,
                drop_point.y,
                radius * (2.0 * i as f64 + 1.0),
            );
            parts.push(self.insert(asset.clone(), Pose::at(spawn), Category::Deformable));

            targets.push(Pose::at(start + increment * (i as f64 + 0.5)));
        }

        debug!(segments = n_parts, "spawned rope");
        Ok(Rope { parts, targets })
    }

    fn step_simulation(&mut self, steps: u32) {
        self.steps += u64::from(steps);
    }
}

impl PoseSampler for Tabletop {
    fn sample_pose(&mut self, size: Vec3) -> Option<Pose> {
        // Any yaw must keep the footprint inside the workspace.
        let margin = size.x.abs().max(size.y.abs()) / 2.0;
        let (x_min, x_max) = (self.workspace.min.x + margin, self.workspace.max.x - margin);
        let (y_min, y_max) = (self.workspace.min.y + margin, self.workspace.max.y - margin);
        if x_min > x_max || y_min > y_max {
            return None;
        }

        let x = self.rng.random_range(x_min..=x_max);
        let y = self.rng.random_range(y_min..=y_max);
        let yaw = self.rng.random_range(0.0..TAU);
        let z = size.z.abs() / 2.0;

        Some(Pose::new(Vec3::new(x, y, z), Quat::from_yaw(yaw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_objects_get_sequential_ids() {
        let mut table = Tabletop::new(7);
        let a = table
            .add_object(&AssetRef::urdf("HOPE/Corn.urdf"), Pose::at(Vec3::zero()), Category::Rigid)
            .unwrap();
        let yogurt = AssetRef::urdf("HOPE/Yogurt.urdf");
        let b = table
            .add_object(&yogurt, Pose::at(Vec3::zero()), Category::Rigid)
            .unwrap();

        assert_eq!(a, ObjectId(1));
        assert_eq!(b, ObjectId(2));
        assert_eq!(table.object_ids(), vec![a, b]);
    }

    #[test]
    fn unknown_object_is_reported() {
        let table = Tabletop::new(7);
        assert_eq!(
            table.object_position(ObjectId(42)),
            Err(SimError::UnknownObject(ObjectId(42)))
        );
    }

    #[test]
    fn empty_asset_is_rejected() {
        let mut table = Tabletop::new(7);
        let result = table.add_object(&AssetRef::urdf(""), Pose::at(Vec3::zero()), Category::Fixed);
        assert!(matches!(result, Err(SimError::InvalidAsset(_))));
        assert!(table.object_ids().is_empty());
    }

    #[test]
    fn set_color_tints_object() {
        let mut table = Tabletop::new(7);
        let id = table
            .add_object(&AssetRef::urdf("zone/zone.urdf"), Pose::at(Vec3::zero()), Category::Fixed)
            .unwrap();
        let color = Rgba::new(0.0, 1.0, 0.0, 0.5);
        table.set_color(id, color).unwrap();
        assert_eq!(table.get(id).and_then(|o| o.color), Some(color));
    }

    #[test]
    fn sampled_poses_stay_inside_workspace() {
        let mut table = Tabletop::new(3);
        let size = Vec3::new(0.2, 0.1, 0.04);
        for _ in 0..200 {
            let pose = table.sample_pose(size).expect("workspace has room");
            let p = pose.position;
            assert!(p.x >= 0.35 - 1e-9 && p.x <= 0.65 + 1e-9, "x out of range: {}", p.x);
            assert!(p.y >= -0.4 - 1e-9 && p.y <= 0.4 + 1e-9, "y out of range: {}", p.y);
            assert!((p.z - 0.02).abs() < 1e-12);
        }
    }

    #[test]
    fn sampler_reports_no_room_for_oversized_objects() {
        let mut table = Tabletop::new(3);
        assert!(table.sample_pose(Vec3::new(0.8, 0.8, 0.1)).is_none());
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let size = Vec3::new(0.1, 0.1, 0.0);
        let mut a = Tabletop::new(11);
        let mut b = Tabletop::new(11);
        for _ in 0..10 {
            assert_eq!(a.sample_pose(size), b.sample_pose(size));
        }
    }

    #[test]
    fn rope_targets_span_corners() {
        let mut table = Tabletop::new(1);
        let rope = table
            .add_rope((Vec3::new(0.4, 0.0, 0.0), Vec3::new(0.6, 0.0, 0.0)), 4, 0.005)
            .unwrap();

        assert_eq!(rope.parts.len(), 4);
        assert_eq!(rope.targets.len(), 4);
        assert!((rope.targets[0].position.x - 0.425).abs() < 1e-12);
        assert!((rope.targets[3].position.x - 0.575).abs() < 1e-12);
        for id in &rope.parts {
            assert_eq!(table.get(*id).map(|o| o.category), Some(Category::Deformable));
        }
    }

    #[test]
    fn rope_targets_keep_corner_height() {
        let mut table = Tabletop::new(1);
        let rope = table
            .add_rope((Vec3::new(0.4, 0.1, 0.001), Vec3::new(0.4, -0.1, 0.001)), 5, 0.005)
            .unwrap();

        assert!(rope.targets.iter().all(|t| (t.position.z - 0.001).abs() < 1e-12));
    }

    #[test]
    fn stepping_counts_steps() {
        let mut table = Tabletop::new(1);
        table.step_simulation(480);
        assert_eq!(table.steps(), 480);
    }
}
