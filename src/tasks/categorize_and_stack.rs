use crate::goal::{GoalSpec, MatchMatrix, Metric};
use crate::model::ObjectId;
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::{Pose, Vec3};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "categorize-and-stack",
        description: "Pick up and categorize the objects based on their type (e.g., cookies, mustard, raisins) and stack them into separate piles.",
        max_steps: 20,
        lang_template: "categorize and stack the {obj} in their designated areas",
        completed_desc: "done categorizing and stacking.",
    },
    reset,
};

struct StackItem {
    asset: &'static str,
    category: &'static str,
    /// Spawn position, one corner of the recorded bounding box.
    corner: [f64; 3],
}

static ITEMS: [StackItem; 5] = [
    StackItem {
        asset: "HOPE/Cookies.urdf",
        category: "cookie",
        corner: [0.56807585, -0.41929029, 0.0419795],
    },
    StackItem {
        asset: "HOPE/Mustard.urdf",
        category: "mustard",
        corner: [0.51985904, 0.0109054, 0.02402921],
    },
    StackItem {
        asset: "HOPE/Raisins.urdf",
        category: "raisin",
        corner: [0.63189748, -0.35931477, -0.0063346],
    },
    StackItem {
        asset: "HOPE/MacaroniAndCheese.urdf",
        category: "macaroni",
        corner: [0.40073031, 0.09382602, 0.02779107],
    },
    StackItem {
        asset: "HOPE/OrangeJuice.urdf",
        category: "juice",
        corner: [0.58768185, 0.18736881, -0.0091569],
    },
];

static PILES: [(&str, [f64; 3]); 5] = [
    ("cookie", [0.3, -0.3, 0.15]),
    ("mustard", [0.4, -0.3, 0.15]),
    ("raisin", [0.5, -0.3, 0.15]),
    ("macaroni", [0.3, 0.3, 0.15]),
    ("juice", [0.4, 0.3, 0.15]),
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let mut spawned: Vec<(ObjectId, &str)> = Vec::with_capacity(ITEMS.len());
    for item in &ITEMS {
        let pose = Pose::at(Vec3::from_array(item.corner));
        spawned.push((ctx.add_rigid(item.asset, pose)?, item.category));
    }

    let reward = 1.0 / PILES.len() as f64;
    for &(category, position) in &PILES {
        let objects: Vec<ObjectId> = spawned
            .iter()
            .filter(|(_, item_category)| *item_category == category)
            .map(|(id, _)| *id)
            .collect();
        let n = objects.len();
        let language_goal = ctx.lang(&[("obj", category)])?;
        ctx.add_goal(GoalSpec {
            objects,
            matches: MatchMatrix::ones(n, n),
            target_poses: vec![Pose::at(Vec3::from_array(position)); n],
            replace: false,
            allow_rotation: true,
            metric: Metric::Pose,
            symmetries: Vec::new(),
            step_max_reward: reward,
            language_goal,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementConfig;
    use crate::tabletop::Tabletop;
    use crate::task::reset_task;

    #[test]
    fn items_spawn_at_their_recorded_corner() {
        let mut table = Tabletop::new(5);
        let episode = reset_task(&TASK, &mut table, PlacementConfig::default(), 5).unwrap();

        assert_eq!(episode.objects.len(), ITEMS.len());
        for (object, item) in episode.objects.iter().zip(&ITEMS) {
            assert_eq!(object.pose.position, Vec3::from_array(item.corner));
        }
        assert_eq!(episode.goals.len(), PILES.len());
    }
}
