use crate::goal::{GoalSpec, Metric};
use crate::model::{AssetRef, Category, TemplateParam};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::{Pose, Vec3};

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "pack-groceries",
        description: "Pick up all grocery items and neatly place them into the container.",
        max_steps: 10,
        lang_template: "pack the {item} into the container",
        completed_desc: "done packing groceries.",
    },
    reset,
};

const CONTAINER_TEMPLATE: &str = "container/container-template.urdf";
const CONTAINER_SIZE: Vec3 = Vec3::new(0.2, 0.2, 0.1);
const CONTAINER_POSE: Pose = Pose::at(Vec3::new(0.55, -0.12, 0.07));

struct Grocery {
    name: &'static str,
    asset: &'static str,
    position: [f64; 3],
}

static GROCERIES: [Grocery; 6] = [
    Grocery {
        name: "Granola Bars",
        asset: "HOPE/GranolaBars.urdf",
        position: [0.7, 0.1, 0.02],
    },
    Grocery {
        name: "Macaroni And Cheese",
        asset: "HOPE/MacaroniAndCheese.urdf",
        position: [0.35, 0.4, 0.12],
    },
    Grocery {
        name: "Orange Juice",
        asset: "HOPE/OrangeJuice.urdf",
        position: [0.48, 0.08, 0.15],
    },
    Grocery {
        name: "Raisins",
        asset: "HOPE/Raisins.urdf",
        position: [0.38, -0.07, 0.08],
    },
    Grocery {
        name: "Mustard",
        asset: "HOPE/Mustard.urdf",
        position: [0.55, 0.26, 0.01],
    },
    Grocery {
        name: "Cookies",
        asset: "HOPE/Cookies.urdf",
        position: [0.55, -0.37, 0.15],
    },
];

fn container_asset() -> AssetRef {
    let (dim, half) = (CONTAINER_SIZE, CONTAINER_SIZE * 0.5);
    AssetRef::template(
        CONTAINER_TEMPLATE,
        vec![
            TemplateParam::new("DIM", vec![dim.x, dim.y, dim.z]),
            TemplateParam::new("HALF", vec![half.x, half.y, half.z]),
        ],
    )
}

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    ctx.add_object(container_asset(), CONTAINER_POSE, Category::Fixed)?;

    let mut spawned = Vec::with_capacity(GROCERIES.len());
    for grocery in &GROCERIES {
        let id = ctx.add_rigid(grocery.asset, Pose::at(Vec3::from_array(grocery.position)))?;
        spawned.push((id, grocery.name));
    }

    let reward = 1.0 / spawned.len() as f64;
    for (id, name) in spawned {
        let language_goal = ctx.lang(&[("item", name)])?;
        ctx.add_goal(
            GoalSpec::single(id, CONTAINER_POSE, Metric::zone(CONTAINER_POSE, CONTAINER_SIZE))
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
    fn container_is_a_fixed_template() {
        let mut table = Tabletop::new(0);
        let episode = reset_task(&TASK, &mut table, PlacementConfig::default(), 0).unwrap();

        let container = &episode.objects[0];
        assert_eq!(container.category, Category::Fixed);
        assert_eq!(container.asset, container_asset());
        assert_eq!(episode.goals[0].language_goal, "pack the Granola Bars into the container");
        assert!(episode.goals.iter().all(|goal| goal.target_poses[0] == CONTAINER_POSE));
    }
}
