use std::f64::consts::TAU;

use rand::Rng;

use crate::goal::{GoalSpec, Metric};
use crate::model::Rgba;
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::{Pose, Quat, Vec3};

use super::{Corners, center_pose};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "sort-cans-by-type",
        description: "Pick up the cans and sort them into groups based on their type.",
        max_steps: 15,
        lang_template: "sort the {type} cans into the {color} zone",
        completed_desc: "done sorting cans.",
    },
    reset,
};

const ZONE_SIZE: Vec3 = Vec3::new(0.12, 0.12, 0.001);

struct CanType {
    kind: &'static str,
    asset: &'static str,
    corners: Corners,
    color_name: &'static str,
    color: Rgba,
}

/// One entry per can type and zone. Language goals name the zone by its
/// `color_name`, not by the can type, so "sort the soup cans into the red
/// zone" rather than "... into the soup zone".
static CAN_TYPES: [CanType; 7] = [
    CanType {
        kind: "soup",
        asset: "HOPE/AlphabetSoup.urdf",
        corners: [[0.56462766, -0.13425138, 0.00282482], [0.48782656, -0.07136663, 0.08508737]],
        color_name: "red",
        color: Rgba::new(1.0, 0.0, 0.0, 1.0),
    },
    CanType {
        kind: "vegetables",
        asset: "HOPE/PeasAndCarrots.urdf",
        corners: [[0.70739611, -0.22923575, 0.00099086], [0.63098337, -0.16512773, 0.0558798]],
        color_name: "green",
        color: Rgba::new(0.0, 1.0, 0.0, 1.0),
    },
    CanType {
        kind: "tomato sauce",
        asset: "HOPE/TomatoSauce.urdf",
        corners: [[0.41437349, -0.20947873, 0.00281065], [0.30770377, -0.1406497, 0.09852502]],
        color_name: "blue",
        color: Rgba::new(0.0, 0.0, 1.0, 1.0),
    },
    CanType {
        kind: "parmesan",
        asset: "HOPE/Parmesan.urdf",
        corners: [[0.50209746, -0.04205837, 0.00437512], [0.32939386, 0.04772601, 0.11185423]],
        color_name: "yellow",
        color: Rgba::new(1.0, 1.0, 0.0, 1.0),
    },
    CanType {
        kind: "yogurt",
        asset: "HOPE/Yogurt.urdf",
        corners: [[0.73733665, -0.13262174, -0.00331223], [0.66266335, -0.06884041, 0.04882852]],
        color_name: "magenta",
        color: Rgba::new(1.0, 0.0, 1.0, 1.0),
    },
    CanType {
        kind: "corn",
        asset: "HOPE/Corn.urdf",
        corners: [[0.51681334, -0.29184396, -0.00544687], [0.43276236, -0.21779869, 0.06054364]],
        color_name: "cyan",
        color: Rgba::new(0.0, 1.0, 1.0, 1.0),
    },
    CanType {
        kind: "granola bars",
        asset: "HOPE/GranolaBars.urdf",
        corners: [[0.63596572, 0.26615694, 0.00760562], [0.46387101, 0.33705992, 0.13629785]],
        color_name: "orange",
        color: Rgba::new(1.0, 0.5, 0.0, 1.0),
    },
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let mut cans = Vec::with_capacity(CAN_TYPES.len());
    for can in &CAN_TYPES {
        let yaw = ctx.rng().random_range(0.0..TAU);
        let pose = Pose::new(center_pose(&can.corners).position, Quat::from_yaw(yaw));
        cans.push(ctx.add_rigid(can.asset, pose)?);
    }

    let mut zones = Vec::with_capacity(CAN_TYPES.len());
    for can in &CAN_TYPES {
        let (id, zone) = ctx.add_random_zone(can.kind, ZONE_SIZE)?;
        ctx.set_color(id, can.color)?;
        zones.push(zone);
    }

    let reward = 1.0 / cans.len() as f64;
    for ((can, id), zone) in CAN_TYPES.iter().zip(cans).zip(&zones) {
        let language_goal = ctx.lang(&[("type", can.kind), ("color", can.color_name)])?;
        ctx.add_goal(
            GoalSpec::single(id, zone.pose, Metric::zone(zone.pose, ZONE_SIZE))
                .reward(reward)
                .language(language_goal),
        )?;
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
    fn cans_get_random_yaw_and_colored_zones() {
        let mut table = Tabletop::new(17);
        let episode = reset_task(&TASK, &mut table, PlacementConfig::default(), 17).unwrap();

        let first_can = &episode.objects[0];
        assert_ne!(first_can.pose.orientation, Quat::identity());
        assert!((first_can.pose.position.x - 0.52622711).abs() < 1e-9);

        assert_eq!(episode.goals[0].language_goal, "sort the soup cans into the red zone");
        let zone_objects: Vec<_> = episode.objects.iter().filter(|o| o.color.is_some()).collect();
        assert_eq!(zone_objects.len(), 7);
        assert_eq!(zone_objects[4].color, Some(Rgba::new(1.0, 0.0, 1.0, 1.0)));
    }
}
