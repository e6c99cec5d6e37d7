use crate::goal::{GoalSpec, Metric};
use crate::model::{AssetRef, Category, Rgba, asset_stem};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::{Pose, Vec3};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "stack-cans-on-blocks",
        description: "Pick up the scattered cans and stack each one on top of a block of matching height.",
        max_steps: 10,
        lang_template: "stack the {can} on top of the {block}",
        completed_desc: "done stacking cans on blocks.",
    },
    reset,
};

const BLOCK_URDF: &str = "block/block.urdf";
const BLOCK_HEIGHT: f64 = 0.04;
const CAN_HEIGHT: f64 = 0.1;

/// Block colors and centers; blocks rest on the table.
static BLOCKS: [(&str, [f64; 3]); 6] = [
    ("red", [(0.6899593 + 0.63709411) / 2.0, (0.04932231 + -0.00730875) / 2.0, 0.04696857 / 2.0]),
    ("green", [(0.41495827 + 0.34571097) / 2.0, (0.26286784 + 0.34013691) / 2.0, 0.03010734 / 2.0]),
    ("blue", [(0.52125684 + 0.43918107) / 2.0, (0.30908895 + 0.38713542) / 2.0, 0.03025877 / 2.0]),
    (
        "yellow",
        [(0.70430812 + 0.65980438) / 2.0, (-0.23231308 + -0.17999047) / 2.0, 0.05874907 / 2.0],
    ),
    ("purple", [(0.60029041 + 0.53093714) / 2.0, (0.267829 + 0.34830929) / 2.0, 0.03652433 / 2.0]),
    ("orange", [(0.34947348 + 0.2523094) / 2.0, (0.05951131 + 0.13256332) / 2.0, 0.02898239 / 2.0]),
];

static CANS: [(&str, [f64; 3]); 5] = [
    (
        "HOPE/AlphabetSoup.urdf",
        [(0.42359892 + 0.35004971) / 2.0, (0.12288328 + 0.22160096) / 2.0, 0.05028934 / 2.0],
    ),
    (
        "HOPE/Tuna.urdf",
        [(0.52154596 + 0.45653369) / 2.0, (0.11828353 + 0.19151019) / 2.0, 0.05628396 / 2.0],
    ),
    (
        "HOPE/Yogurt.urdf",
        [(0.56525667 + 0.48928761) / 2.0, (-0.34408256 + -0.27805748) / 2.0, 0.05465149 / 2.0],
    ),
    (
        "HOPE/Peaches.urdf",
        [(0.48019342 + 0.39529506) / 2.0, (-0.18347392 + -0.11947069) / 2.0, 0.05885765 / 2.0],
    ),
    (
        "HOPE/PeasAndCarrots.urdf",
        [(0.48735866 + 0.39408506) / 2.0, (-0.31742158 + -0.23030524) / 2.0, 0.06749361 / 2.0],
    ),
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let mut blocks = Vec::with_capacity(BLOCKS.len());
    for (color, position) in &BLOCKS {
        let id = ctx.add_object(
            AssetRef::urdf(BLOCK_URDF),
            Pose::at(Vec3::from_array(*position)),
            Category::Fixed,
        )?;
        ctx.set_color(id, Rgba::palette(color)?)?;
        blocks.push((id, *color));
    }

    let mut cans = Vec::with_capacity(CANS.len());
    for (asset, position) in &CANS {
        cans.push((ctx.add_rigid(asset, Pose::at(Vec3::from_array(*position)))?, *asset));
    }

    let reward = 1.0 / cans.len() as f64;
    for ((can, asset), (block, color)) in cans.into_iter().zip(blocks) {
        let block_pose = ctx.object_pose(block)?;
        let target = Pose::new(
            block_pose.position + Vec3::new(0.0, 0.0, BLOCK_HEIGHT / 2.0 + CAN_HEIGHT / 2.0),
            block_pose.orientation,
        );
        let language_goal = ctx.lang(&[("can", asset_stem(asset)), ("block", color)])?;
        ctx.add_goal(
            GoalSpec::single(can, target, Metric::Pose)
                .reward(reward)
                .language(language_goal),
        )?;
    }

    Ok(())
}
