use std::f64::consts::SQRT_2;

use rand::Rng;

use crate::goal::{GoalSpec, MatchMatrix, Metric};
use crate::model::{AssetRef, Category, TemplateParam};
use crate::task::{ResetContext, TaskDefinition, TaskError, TaskSpec};
use crate::types::Vec3;

pub static TASK: TaskDefinition = TaskDefinition {
    spec: TaskSpec {
        name: "align-rope",
        description: "Manipulate a deformable rope to connect its end-points between two corners of a 3-sided square.",
        max_steps: 20,
        lang_template: "align the rope from {direction}",
        completed_desc: "done aligning the rope.",
    },
    reset,
};

const N_PARTS: usize = 20;
const RADIUS: f64 = 0.005;
const SETTLE_STEPS: u32 = 480;
const SQUARE_TEMPLATE: &str = "square/square-template.urdf";

/// Corner pair the rope must span, by index into the square's corners.
struct Alignment {
    from: usize,
    to: usize,
    direction: &'static str,
}

static ALIGNMENTS: [Alignment; 4] = [
    Alignment {
        from: 0,
        to: 1,
        direction: "front left tip to front right tip",
    },
    Alignment {
        from: 0,
        to: 2,
        direction: "front right tip to back right corner",
    },
    Alignment {
        from: 1,
        to: 3,
        direction: "front left tip to back left corner",
    },
    Alignment {
        from: 3,
        to: 2,
        direction: "back right corner to back left corner",
    },
];

fn reset(ctx: &mut ResetContext<'_>) -> Result<(), TaskError> {
    let length = 2.0 * RADIUS * N_PARTS as f64 * SQRT_2;
    let half = length / 2.0;

    let square_size = Vec3::new(length, length, 0.0);
    let square_pose = ctx.sample_pose("square", square_size)?;
    let square = AssetRef::template(
        SQUARE_TEMPLATE,
        vec![
            TemplateParam::new("DIM", vec![length]),
            TemplateParam::new("HALF", vec![half - 0.005]),
        ],
    );
    ctx.add_object(square, square_pose, Category::Fixed)?;

    let corners = [(half, half), (-half, half), (half, -half), (-half, -half)]
        .map(|(x, y)| square_pose.apply(Vec3::new(x, y, 0.001)));

    let alignment = &ALIGNMENTS[ctx.rng().random_range(0..ALIGNMENTS.len())];
    let rope = ctx.add_rope(
        (corners[alignment.from], corners[alignment.to]),
        N_PARTS,
        RADIUS,
    )?;

    let language_goal = ctx.lang(&[("direction", alignment.direction)])?;
    let n = rope.parts.len();
    ctx.add_goal(GoalSpec {
        objects: rope.parts,
        matches: MatchMatrix::reversible(n),
        target_poses: rope.targets,
        replace: false,
        allow_rotation: false,
        metric: Metric::Pose,
        symmetries: Vec::new(),
        step_max_reward: 1.0,
        language_goal,
    })?;

    ctx.settle(SETTLE_STEPS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementConfig;
    use crate::tabletop::Tabletop;
    use crate::task::reset_task;

    #[test]
    fn rope_goal_spans_chosen_corners() {
        let mut table = Tabletop::new(21);
        let episode = reset_task(&TASK, &mut table, PlacementConfig::default(), 21).unwrap();

        // square + rope segments
        assert_eq!(episode.objects.len(), 1 + N_PARTS);
        assert_eq!(table.steps(), u64::from(SETTLE_STEPS));

        let goal = &episode.goals[0];
        assert_eq!(goal.objects.len(), N_PARTS);
        assert!(goal.matches.cell(0, N_PARTS - 1));
        assert!(!goal.allow_rotation);
        assert!(goal.language_goal.starts_with("align the rope from "));

        // Every alignment spans one side of the square.
        let length = 2.0 * RADIUS * N_PARTS as f64 * SQRT_2;
        let spacing = goal.target_poses[0]
            .position
            .distance_to(&goal.target_poses[1].position);
        assert!(
            (spacing - length / N_PARTS as f64).abs() < 1e-9,
            "unexpected spacing {}",
            spacing
        );
    }
}
