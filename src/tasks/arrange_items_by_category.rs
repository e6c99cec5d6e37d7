use crate::goal::{GoalSpec, MatchMatrix, Metric};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::{Pose, Vec3};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "arrange-items-by-category",
        description: "Pick up and group the items into three categories: cookies, mustard, and macaroni and cheese, placing each category in a distinct zone on the tabletop.",
        max_steps: 10,
        lang_template: "place the {category} items in the designated zone",
        completed_desc: "done arranging items by category.",
    },
    reset,
};

const ZONE_SIZE: Vec3 = Vec3::new(0.15, 0.15, 0.02);

struct CategoryItems {
    category: &'static str,
    asset: &'static str,
    positions: &'static [[f64; 3]],
}

static CATEGORIES: [CategoryItems; 3] = [
    CategoryItems {
        category: "cookies",
        asset: "HOPE/Cookies.urdf",
        positions: &[
            [0.57902823, -0.26069492, 0.04158284],
            [0.61822031, -0.44144987, 0.0419795],
        ],
    },
    CategoryItems {
        category: "mustard",
        asset: "HOPE/Mustard.urdf",
        positions: &[
            [0.55752073, 0.053471, 0.02402921],
            [0.76313807, -0.06292647, -0.01316195],
        ],
    },
    CategoryItems {
        category: "macaroni and cheese",
        asset: "HOPE/MacaroniAndCheese.urdf",
        positions: &[
            [0.39771075, 0.15703643, 0.02779107],
            [0.52239229, 0.27329719, 0.00526045],
        ],
    },
];

const ITEMS_PER_CATEGORY: usize = 2;

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let labels: Vec<&str> = CATEGORIES.iter().map(|items| items.category).collect();
    let zones = ctx.place_zones(&labels, ZONE_SIZE)?;
    let reward = 1.0 / CATEGORIES.len() as f64;

    for (items, zone) in CATEGORIES.iter().zip(&zones) {
        let mut objects = Vec::with_capacity(ITEMS_PER_CATEGORY);
        for position in items.positions.iter().take(ITEMS_PER_CATEGORY) {
            objects.push(ctx.add_rigid(items.asset, Pose::at(Vec3::from_array(*position)))?);
        }

        let language_goal = ctx.lang(&[("category", items.category)])?;
        let n = objects.len();
        ctx.add_goal(GoalSpec {
            objects,
            matches: MatchMatrix::identity(n),
            target_poses: vec![zone.pose; n],
            replace: false,
            allow_rotation: true,
            metric: Metric::zone(zone.pose, ZONE_SIZE),
            symmetries: Vec::new(),
            step_max_reward: reward,
            language_goal,
        })?;
    }

    Ok(())
}
