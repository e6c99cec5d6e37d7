use crate::goal::{GoalSpec, Metric};
use crate::model::{Rgba, Zone};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::{Pose, Vec3};

use super::{Corners, center_pose};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "sort-items-by-category",
        description: "Pick up and sort the items into categories: place all food items on the left side of the table and non-food items on the right side.",
        max_steps: 20,
        lang_template: "place the {item} on the {side} side of the table",
        completed_desc: "done sorting items by category.",
    },
    reset,
};

const SIDE_ZONE_SIZE: Vec3 = Vec3::new(0.25, 0.5, 0.0);

struct Side {
    side: &'static str,
    item: &'static str,
    pose: Pose,
    color: Rgba,
}

static FOOD_SIDE: Side = Side {
    side: "left",
    item: "food item",
    pose: Pose::at(Vec3::new(0.25, 0.0, 0.01)),
    color: Rgba::new(0.0, 1.0, 0.0, 0.5),
};

static NON_FOOD_SIDE: Side = Side {
    side: "right",
    item: "non-food item",
    pose: Pose::at(Vec3::new(0.75, 0.0, 0.01)),
    color: Rgba::new(1.0, 0.0, 0.0, 0.5),
};

static ITEMS: [(&str, bool, Corners); 6] = [
    (
        "HOPE/GranolaBars.urdf",
        true,
        [[0.48315348, 0.23598798, 0.00255921], [0.21079647, 0.51363411, 0.14675479]],
    ),
    (
        "HOPE/Raisins.urdf",
        true,
        [[0.51827382, -0.29651294, -0.01768806], [0.40659092, -0.17211218, 0.016381]],
    ),
    (
        "HOPE/Corn.urdf",
        true,
        [[0.65875019, 0.05674204, -0.00578587], [0.58252898, 0.13331217, 0.06450037]],
    ),
    (
        "HOPE/Cherries.urdf",
        true,
        [[0.4722811, -0.43671704, -0.01075628], [0.36322675, -0.36328296, 0.05253737]],
    ),
    (
        "block/block.urdf",
        false,
        [[0.61892649, -0.08313771, -0.01618664], [0.54376944, -0.02154077, 0.03185457]],
    ),
    (
        "HOPE/Mustard.urdf",
        false,
        [[0.63181469, 0.16379597, -0.02225223], [0.53549881, 0.33232726, 0.02886849]],
    ),
];

fn add_side_zone(ctx: &mut ResetContext<'_>, side: &Side) -> Result<Zone, TaskError> {
    let (id, zone) = ctx.add_zone(side.side, side.pose, SIDE_ZONE_SIZE)?;
    ctx.set_color(id, side.color)?;
    Ok(zone)
}

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let food_zone = add_side_zone(ctx, &FOOD_SIDE)?;
    let non_food_zone = add_side_zone(ctx, &NON_FOOD_SIDE)?;

    let mut food = Vec::new();
    let mut non_food = Vec::new();
    for (asset, is_food, corners) in &ITEMS {
        let id = ctx.add_rigid(asset, center_pose(corners))?;
        if *is_food {
            food.push(id);
        } else {
            non_food.push(id);
        }
    }

    let reward = 1.0 / (food.len() + non_food.len()) as f64;
    for (side, zone, ids) in [
        (&FOOD_SIDE, &food_zone, food),
        (&NON_FOOD_SIDE, &non_food_zone, non_food),
    ] {
        for id in ids {
            let language_goal = ctx.lang(&[("item", side.item), ("side", side.side)])?;
            ctx.add_goal(
                GoalSpec::single(id, zone.pose, Metric::zone(zone.pose, SIDE_ZONE_SIZE))
                    .reward(reward)
                    .rotations(false)
                    .language(language_goal),
            )?;
        }
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
    fn food_goes_left_and_the_rest_right() {
        let mut table = Tabletop::new(0);
        let episode = reset_task(&TASK, &mut table, PlacementConfig::default(), 0).unwrap();

        assert_eq!(episode.zones.len(), 2);
        assert_eq!(episode.objects[0].color, Some(Rgba::new(0.0, 1.0, 0.0, 0.5)));

        let left: Vec<_> = episode
            .goals
            .iter()
            .filter(|goal| goal.language_goal.ends_with("left side of the table"))
            .collect();
        assert_eq!(left.len(), 4);
        assert!(left.iter().all(|goal| goal.target_poses[0] == FOOD_SIDE.pose));
        assert!(episode.goals.iter().all(|goal| !goal.allow_rotation));
        assert_eq!(
            episode.goals[5].language_goal,
            "place the non-food item on the right side of the table"
        );
    }
}
