use crate::goal::{GoalSpec, MatchMatrix, Metric};
use crate::model::{ObjectId, Zone};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::Vec3;

use super::{Corners, center_pose};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "organize-food-items",
        description: "Pick up and organize all food items into two groups: beverages and snacks, placing them in separate designated zones on the tabletop.",
        max_steps: 15,
        lang_template: "organize the food items, placing the {item} in the designated zone",
        completed_desc: "done organizing food items.",
    },
    reset,
};

const ZONE_SIZE: Vec3 = Vec3::new(0.2, 0.2, 0.02);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Group {
    Beverages,
    Snacks,
}

static FOOD: [(&str, Group, Corners); 7] = [
    (
        "HOPE/OrangeJuice.urdf",
        Group::Beverages,
        [[0.65492414, 0.13401552, 0.0513954], [0.55016065, 0.23688004, 0.2422972]],
    ),
    (
        "HOPE/Raisins.urdf",
        Group::Snacks,
        [[0.66399987, -0.01034437, -0.01545314], [0.5775241, 0.11696885, 0.01710281]],
    ),
    (
        "HOPE/GranolaBars.urdf",
        Group::Snacks,
        [[0.73598009, -0.14210519, -0.00297771], [0.6159859, 0.02429303, 0.02234672]],
    ),
    (
        "HOPE/MacaroniAndCheese.urdf",
        Group::Snacks,
        [[0.4579401, -0.22509836, 0.04633672], [0.38609859, -0.10397936, 0.2163609]],
    ),
    (
        "HOPE/Popcorn.urdf",
        Group::Snacks,
        [[0.53157808, 0.10186218, -0.00858464], [0.3878202, 0.19365352, 0.08246814]],
    ),
    (
        "HOPE/Spaghetti.urdf",
        Group::Snacks,
        [[0.63206954, -0.52529668, 0.00845122], [0.58993728, -0.27470332, 0.06104281]],
    ),
    (
        "HOPE/Cookies.urdf",
        Group::Snacks,
        [[0.49245556, 0.0787601, 0.01987186], [0.21251635, 0.32635625, 0.20559445]],
    ),
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let (_, beverage_zone) = ctx.add_random_zone("beverages", ZONE_SIZE)?;
    let (_, snack_zone) = ctx.add_random_zone("snacks", ZONE_SIZE)?;

    let mut items = Vec::with_capacity(FOOD.len());
    for (asset, group, corners) in &FOOD {
        items.push((ctx.add_rigid(asset, center_pose(corners))?, *group));
    }

    add_group_goal(ctx, &items, Group::Beverages, &beverage_zone)?;
    add_group_goal(ctx, &items, Group::Snacks, &snack_zone)?;
    Ok(())
}

/// One goal for a whole group, worth one item's share of that group.
fn add_group_goal(
    ctx: &mut ResetContext<'_>,
    items: &[(ObjectId, Group)],
    group: Group,
    zone: &Zone,
) -> Result<usize, TaskError> {
    let objects: Vec<ObjectId> = items
        .iter()
        .filter(|(_, item_group)| *item_group == group)
        .map(|(id, _)| *id)
        .collect();
    let n = objects.len();
    let language_goal = ctx.lang(&[("item", zone.label.as_str())])?;

    ctx.add_goal(GoalSpec {
        objects,
        matches: MatchMatrix::ones(n, 1),
        target_poses: vec![zone.pose],
        replace: false,
        allow_rotation: true,
        metric: Metric::zone(zone.pose, ZONE_SIZE),
        symmetries: Vec::new(),
        step_max_reward: 1.0 / n as f64,
        language_goal,
    })
}
