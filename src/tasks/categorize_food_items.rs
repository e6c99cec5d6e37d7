use crate::goal::{GoalSpec, Metric};
use crate::model::asset_stem;
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::Vec3;

use super::{Corners, center_pose};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "categorize-food-items",
        description: "Pick up each food item and place it into one of two specific zones on the table: one for boxed items and one for canned items.",
        max_steps: 16,
        lang_template: "place the {item} in the {zone} zone",
        completed_desc: "done categorizing food items.",
    },
    reset,
};

const ZONE_SIZE: Vec3 = Vec3::new(0.2, 0.2, 0.02);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Packaging {
    Boxed,
    Canned,
}

static ITEMS: [(&str, Packaging, Corners); 8] = [
    (
        "HOPE/Parmesan.urdf",
        Packaging::Boxed,
        [[0.67525025, 0.21736709, 0.01479784], [0.60144924, 0.28641626, 0.11919077]],
    ),
    (
        "HOPE/MacaroniAndCheese.urdf",
        Packaging::Boxed,
        [[0.59935164, 0.31777381, 0.04268818], [0.50789378, 0.47693904, 0.20365712]],
    ),
    (
        "HOPE/OrangeJuice.urdf",
        Packaging::Boxed,
        [[0.4492064, 0.15927754, 0.03436354], [0.1507936, 0.2961691, 0.23876241]],
    ),
    (
        "HOPE/Popcorn.urdf",
        Packaging::Boxed,
        [[0.47812411, -0.26758373, 0.00665536], [0.41712827, -0.14386012, 0.09590175]],
    ),
    (
        "HOPE/GranolaBars.urdf",
        Packaging::Boxed,
        [[0.56771373, -0.43796624, 0.03478694], [0.49924767, -0.2662086, 0.16232731]],
    ),
    (
        "HOPE/Corn.urdf",
        Packaging::Canned,
        [[0.67271801, 0.09835504, -0.0069891], [0.59845303, 0.17080098, 0.05410966]],
    ),
    (
        "HOPE/AlphabetSoup.urdf",
        Packaging::Canned,
        [[0.67044673, -0.07752964, 0.00729417], [0.58047916, -0.01311518, 0.08906239]],
    ),
    (
        "HOPE/TomatoSauce.urdf",
        Packaging::Canned,
        [[0.46984756, -0.04067392, -0.00194045], [0.38206558, 0.02383856, 0.07872978]],
    ),
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let (_, boxed_zone) = ctx.add_random_zone("boxed items", ZONE_SIZE)?;
    let (_, canned_zone) = ctx.add_random_zone("canned items", ZONE_SIZE)?;

    let mut objects = Vec::with_capacity(ITEMS.len());
    for (asset, packaging, corners) in &ITEMS {
        objects.push((ctx.add_rigid(asset, center_pose(corners))?, *asset, *packaging));
    }

    let reward = 1.0 / objects.len() as f64;
    for (id, asset, packaging) in objects {
        let zone = match packaging {
            Packaging::Boxed => &boxed_zone,
            Packaging::Canned => &canned_zone,
        };
        let language_goal =
            ctx.lang(&[("item", asset_stem(asset)), ("zone", zone.label.as_str())])?;
        ctx.add_goal(
            GoalSpec::single(id, zone.pose, Metric::zone(zone.pose, ZONE_SIZE))
                .reward(reward)
                .language(language_goal),
        )?;
    }

    Ok(())
}
