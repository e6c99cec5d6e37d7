use crate::goal::{GoalSpec, Metric};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::Vec3;

use super::{Corners, center_pose};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "group-items-by-category",
        description: "Pick up the boxes and group them by category (snacks, beverages, pasta) on the tabletop.",
        max_steps: 9,
        lang_template: "group the {category} items together",
        completed_desc: "done grouping items by category.",
    },
    reset,
};

const ZONE_SIZE: Vec3 = Vec3::new(0.1, 0.1, 0.0);

static GROUPS: [(&str, &[(&str, Corners)]); 3] = [
    (
        "snacks",
        &[
            (
                "HOPE/Raisins.urdf",
                [[0.68920594, -0.01223175, -0.01545314], [0.60273017, 0.11508146, 0.01710281]],
            ),
            (
                "HOPE/GranolaBars.urdf",
                [[0.75999709, -0.14352535, -0.00297771], [0.64000291, 0.02287287, 0.02234672]],
            ),
            (
                "HOPE/Cookies.urdf",
                [[0.52343836, 0.07625133, 0.01987186], [0.24349915, 0.32384748, 0.20559445]],
            ),
            (
                "HOPE/Popcorn.urdf",
                [[0.56025228, 0.09958157, -0.00858464], [0.4164944, 0.19137291, 0.08246814]],
            ),
        ],
    ),
    (
        "beverages",
        &[
            (
                "HOPE/OrangeJuice.urdf",
                [[0.68052253, 0.13157798, 0.0513954], [0.57575903, 0.2344425, 0.2422972]],
            ),
        ],
    ),
    (
        "pasta",
        &[
            (
                "HOPE/MacaroniAndCheese.urdf",
                [[0.48742566, -0.22607871, 0.04633672], [0.41558414, -0.10495971, 0.2163609]],
            ),
            (
                "HOPE/Spaghetti.urdf",
                [[0.65748574, -0.52529668, 0.00845122], [0.61535348, -0.27470332, 0.06104281]],
            ),
        ],
    ),
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let mut zones = Vec::with_capacity(GROUPS.len());
    for &(category, _) in &GROUPS {
        let (_, zone) = ctx.add_random_zone(category, ZONE_SIZE)?;
        zones.push(zone);
    }

    for (&(category, items), zone) in GROUPS.iter().zip(&zones) {
        // Each group is worth a full reward, so totals exceed one.
        let reward = 1.0 / items.len() as f64;
        for (asset, corners) in items {
            let id = ctx.add_rigid(asset, center_pose(corners))?;
            let language_goal = ctx.lang(&[("category", category)])?;
            ctx.add_goal(
                GoalSpec::single(id, zone.pose, Metric::zone(zone.pose, ZONE_SIZE))
                    .reward(reward)
                    .language(language_goal),
            )?;
        }
    }

    Ok(())
}
