use std::f64::consts::FRAC_PI_2;

use crate::goal::{GoalSpec, Metric};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};

use super::{Corners, center_pose, corners_size};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "grouping-boxes-by-category",
        description: "Group the boxes of macaroni and cheese, popcorn, granola bars, and raisins into separate clusters on the table.",
        max_steps: 20,
        lang_template: "group the {item} boxes together",
        completed_desc: "done grouping boxes by category.",
    },
    reset,
};

struct BoxCategory {
    item: &'static str,
    asset: &'static str,
    boxes: &'static [Corners],
}

static CATEGORIES: [BoxCategory; 4] = [
    BoxCategory {
        item: "macaroni and cheese",
        asset: "HOPE/MacaroniAndCheese.urdf",
        boxes: &[
            [[0.46462215, 0.03829987, 0.01004018], [0.13537785, 0.17639925, 0.16149769]],
            [[0.71833591, -0.30722991, 0.04664086], [0.59652155, -0.16074623, 0.17377439]],
        ],
    },
    BoxCategory {
        item: "popcorn",
        asset: "HOPE/Popcorn.urdf",
        boxes: &[
            [[0.4672179, 0.0724802, 0.00643336], [0.3733687, 0.19056419, 0.09874854]],
            [[0.59575359, -0.12626017, 0.01511059], [0.4851995, -0.0269933, 0.10398766]],
        ],
    },
    BoxCategory {
        item: "granola bars",
        asset: "HOPE/GranolaBars.urdf",
        boxes: &[[[0.57950273, -0.44073914, 0.04259629], [0.39418153, -0.35926086, 0.1678189]]],
    },
    BoxCategory {
        item: "raisins",
        asset: "HOPE/Raisins.urdf",
        boxes: &[
            [[0.64181176, 0.09783743, 0.01725039], [0.56594454, 0.21008304, 0.10618795]],
            [[0.52334808, 0.25449768, 0.00622667], [0.4588142, 0.38106795, 0.09930298]],
        ],
    },
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    // One category's worth per box, so the total exceeds one.
    let reward = 1.0 / CATEGORIES.len() as f64;
    let mut spawned = Vec::new();

    for category in &CATEGORIES {
        for corners in category.boxes {
            let id = ctx.add_rigid(category.asset, center_pose(corners))?;
            spawned.push(id);

            let size = corners_size(corners);
            let target = ctx.place_clear_of(category.item, size, &spawned)?;
            let language_goal = ctx.lang(&[("item", category.item)])?;
            ctx.add_goal(
                GoalSpec::single(id, target, Metric::Pose)
                    .reward(reward)
                    .symmetries(vec![FRAC_PI_2])
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
    fn targets_keep_clear_of_boxes_spawned_before_them() {
        let mut table = Tabletop::new(8);
        let episode = reset_task(&TASK, &mut table, PlacementConfig::default(), 8).unwrap();
        assert_eq!(episode.goals.len(), 7);

        let sizes: Vec<_> = CATEGORIES
            .iter()
            .flat_map(|category| category.boxes.iter().map(corners_size))
            .collect();
        for (i, goal) in episode.goals.iter().enumerate() {
            let target = goal.target_poses[0].position;
            for earlier in &episode.objects[..=i] {
                assert!(target.distance_to(&earlier.pose.position) >= sizes[i].norm());
            }
            assert_eq!(goal.symmetries, vec![FRAC_PI_2]);
        }
    }
}
