use std::f64::consts::FRAC_PI_2;

use rand::seq::SliceRandom;

use crate::goal::{GoalSpec, Metric};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};

use super::{Corners, center_pose};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "stack-cans-on-boxes",
        description: "Pick up the cans and stack them on top of the boxes, ensuring each can is stably placed and balanced on a box.",
        max_steps: 10,
        lang_template: "stack the can on the box",
        completed_desc: "done stacking cans on boxes.",
    },
    reset,
};

static BOXES: [(&str, Corners); 6] = [
    (
        "HOPE/Parmesan.urdf",
        [[0.69099942, 0.17097755, 0.01479784], [0.6171984, 0.24002672, 0.11919077]],
    ),
    (
        "HOPE/MacaroniAndCheese.urdf",
        [[0.61115702, 0.26103279, 0.04268818], [0.51969916, 0.42019802, 0.20365712]],
    ),
    (
        "HOPE/OrangeJuice.urdf",
        [[0.4492064, 0.11460785, 0.03436354], [0.1507936, 0.25149942, 0.23876241]],
    ),
    (
        "HOPE/Popcorn.urdf",
        [[0.48499567, -0.28140883, 0.00665536], [0.42399983, -0.15768522, 0.09590175]],
    ),
    (
        "HOPE/Cookies.urdf",
        [[0.4789468, 0.16703579, 0.03808662], [0.35348398, 0.34532648, 0.21379816]],
    ),
    (
        "HOPE/GranolaBars.urdf",
        [[0.57858155, -0.44137577, 0.03478694], [0.5101155, -0.26961813, 0.16232731]],
    ),
];

static CANS: [(&str, Corners); 3] = [
    (
        "HOPE/Corn.urdf",
        [[0.68833851, 0.06031371, -0.0069891], [0.61407353, 0.13275965, 0.05410966]],
    ),
    (
        "HOPE/AlphabetSoup.urdf",
        [[0.68559606, -0.10276901, 0.00729417], [0.59562848, -0.03835454, 0.08906239]],
    ),
    (
        "HOPE/TomatoSauce.urdf",
        [[0.47571047, -0.06853948, -0.00194045], [0.38792848, -0.00402699, 0.07872978]],
    ),
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let mut boxes: Vec<&(&str, Corners)> = BOXES.iter().collect();
    let mut cans: Vec<&(&str, Corners)> = CANS.iter().collect();
    boxes.shuffle(ctx.rng());
    cans.shuffle(ctx.rng());

    let mut box_poses = Vec::with_capacity(boxes.len());
    for (asset, corners) in boxes {
        let pose = center_pose(corners);
        ctx.add_rigid(asset, pose)?;
        box_poses.push(pose);
    }

    let mut can_ids = Vec::with_capacity(cans.len());
    for (asset, corners) in cans {
        can_ids.push(ctx.add_rigid(asset, center_pose(corners))?);
    }

    let reward = 1.0 / can_ids.len() as f64;
    let language_goal = ctx.lang(&[])?;
    // The first boxes in the shuffled order receive the cans.
    for (id, target) in can_ids.into_iter().zip(box_poses) {
        ctx.add_goal(
            GoalSpec::single(id, target, Metric::Pose)
                .reward(reward)
                .symmetries(vec![FRAC_PI_2])
                .language(language_goal.clone()),
        )?;
    }

    Ok(())
}
