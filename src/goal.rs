//! Goal bookkeeping for task resets.
//!
//! A goal maps a set of objects onto target poses and tells the scoring
//! runner how to judge the match (exact pose or inside a zone) and how much
//! of the episode reward it is worth.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use crate::model::ObjectId;
use crate::types::{Pose, Vec3};

/// Tolerance when checking that goal rewards add up to one.
pub const REWARD_TOTAL_TOLERANCE: f64 = 1e-6;

/// Errors raised while registering goals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GoalError {
    #[error("goal has no objects")]
    EmptyObjects,
    #[error("match matrix is {rows}x{cols} but goal has {objects} objects and {targets} targets")]
    MatchShape {
        rows: usize,
        cols: usize,
        objects: usize,
        targets: usize,
    },
    #[error("step reward must be in (0, 1], got {0}")]
    InvalidReward(f64),
    #[error("language template has no value for placeholder '{{{0}}}'")]
    MissingPlaceholder(String),
    #[error("language template has an unclosed placeholder: '{0}'")]
    UnclosedPlaceholder(String),
}

/// Boolean assignment matrix: `cell(i, j)` is true when object `i` may
/// satisfy target `j`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl MatchMatrix {
    /// Every object may go to every target.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![true; rows * cols],
        }
    }

    /// Object `i` must reach target `i`.
    pub fn identity(n: usize) -> Self {
        let mut matrix = Self {
            rows: n,
            cols: n,
            cells: vec![false; n * n],
        };
        for i in 0..n {
            matrix.cells[i * n + i] = true;
        }
        matrix
    }

    /// Identity plus its mirror image, for chains that may be laid out
    /// from either end.
    pub fn reversible(n: usize) -> Self {
        let mut matrix = Self::identity(n);
        for i in 0..n {
            matrix.cells[i * n + (n - 1 - i)] = true;
        }
        matrix
    }

    /// The 1x1 matrix for a single object and a single target.
    pub fn single() -> Self {
        Self::ones(1, 1)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }
}

/// Target region of a zone goal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ZoneTarget {
    pub pose: Pose,
    pub size: Vec3,
}

/// How the scoring runner judges a goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// Objects must reach their target poses.
    Pose,
    /// Objects must end up inside one of the zones.
    Zone { zones: Vec<ZoneTarget> },
}

impl Metric {
    /// Zone metric over a single region.
    pub fn zone(pose: Pose, size: Vec3) -> Self {
        Metric::Zone {
            zones: vec![ZoneTarget { pose, size }],
        }
    }
}

/// Arguments of one goal registration.
#[derive(Clone, Debug)]
pub struct GoalSpec {
    pub objects: Vec<ObjectId>,
    pub matches: MatchMatrix,
    pub target_poses: Vec<Pose>,
    /// Whether an object may satisfy more than one target.
    pub replace: bool,
    pub allow_rotation: bool,
    pub metric: Metric,
    /// Rotational symmetries of the objects in radians.
    pub symmetries: Vec<f64>,
    pub step_max_reward: f64,
    pub language_goal: String,
}

impl GoalSpec {
    /// One object, one target, the most common goal shape in the catalog.
    pub fn single(object: ObjectId, target: Pose, metric: Metric) -> Self {
        Self {
            objects: vec![object],
            matches: MatchMatrix::single(),
            target_poses: vec![target],
            replace: false,
            allow_rotation: true,
            metric,
            symmetries: Vec::new(),
            step_max_reward: 1.0,
            language_goal: String::new(),
        }
    }

    pub fn reward(mut self, step_max_reward: f64) -> Self {
        self.step_max_reward = step_max_reward;
        self
    }

    pub fn language(mut self, language_goal: impl Into<String>) -> Self {
        self.language_goal = language_goal.into();
        self
    }

    pub fn rotations(mut self, allow_rotation: bool) -> Self {
        self.allow_rotation = allow_rotation;
        self
    }

    pub fn symmetries(mut self, symmetries: Vec<f64>) -> Self {
        self.symmetries = symmetries;
        self
    }
}

/// A registered scoring criterion. Never mutated once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Goal {
    pub objects: Vec<ObjectId>,
    pub matches: MatchMatrix,
    pub target_poses: Vec<Pose>,
    pub replace: bool,
    pub allow_rotation: bool,
    pub metric: Metric,
    pub symmetries: Vec<f64>,
    pub step_max_reward: f64,
    pub language_goal: String,
}

impl TryFrom<GoalSpec> for Goal {
    type Error = GoalError;

    fn try_from(spec: GoalSpec) -> Result<Self, Self::Error> {
        if spec.objects.is_empty() {
            return Err(GoalError::EmptyObjects);
        }
        if spec.matches.rows() != spec.objects.len()
            || spec.matches.cols() != spec.target_poses.len()
        {
            return Err(GoalError::MatchShape {
                rows: spec.matches.rows(),
                cols: spec.matches.cols(),
                objects: spec.objects.len(),
                targets: spec.target_poses.len(),
            });
        }
        let reward = spec.step_max_reward;
        if !reward.is_finite() || reward <= 0.0 || reward > 1.0 + REWARD_TOTAL_TOLERANCE {
            return Err(GoalError::InvalidReward(reward));
        }

        Ok(Self {
            objects: spec.objects,
            matches: spec.matches,
            target_poses: spec.target_poses,
            replace: spec.replace,
            allow_rotation: spec.allow_rotation,
            metric: spec.metric,
            symmetries: spec.symmetries,
            step_max_reward: reward,
            language_goal: spec.language_goal,
        })
    }
}

/// Append-only list of goals accumulated during one reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GoalBook {
    goals: Vec<Goal>,
}

impl GoalBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a goal, returning its index.
    pub fn add_goal(&mut self, spec: GoalSpec) -> Result<usize, GoalError> {
        let goal = Goal::try_from(spec)?;
        self.goals.push(goal);
        Ok(self.goals.len() - 1)
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Sum of `step_max_reward` over all goals.
    pub fn total_reward(&self) -> f64 {
        self.goals.iter().map(|goal| goal.step_max_reward).sum()
    }

    /// Whether the rewards follow the sum-to-one convention.
    pub fn reward_total_is_normalized(&self) -> bool {
        (self.total_reward() - 1.0).abs() <= REWARD_TOTAL_TOLERANCE
    }

    /// Logs a warning when the rewards do not add up to one. Returns the total.
    pub fn check_reward_total(&self, task: &str) -> f64 {
        let total = self.total_reward();
        if !self.reward_total_is_normalized() {
            warn!(task, total, goals = self.goals.len(), "goal rewards do not sum to 1");
        }
        total
    }

    pub fn into_goals(self) -> Vec<Goal> {
        self.goals
    }
}

/// Fills `{name}` placeholders of a language template.
///
/// # Examples
/// ```
/// use tabletop_tasks::goal::render_template;
///
/// let template = "pack the {item} into the container";
/// let text = render_template(template, &[("item", "Raisins")]).unwrap();
/// assert_eq!(text, "pack the Raisins into the container");
/// ```
pub fn render_template(template: &str, args: &[(&str, &str)]) -> Result<String, GoalError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| GoalError::UnclosedPlaceholder(template.to_string()))?;
        let key = &after[..close];
        let value = args
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
            .ok_or_else(|| GoalError::MissingPlaceholder(key.to_string()))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Pose {
        Pose::at(Vec3::new(0.5, 0.0, 0.0))
    }

    #[test]
    fn identity_and_reversible_matrices() {
        let eye = MatchMatrix::identity(3);
        assert!(eye.cell(0, 0) && eye.cell(2, 2));
        assert!(!eye.cell(0, 2));

        let rev = MatchMatrix::reversible(3);
        assert!(rev.cell(0, 0) && rev.cell(0, 2) && rev.cell(2, 0));
        assert!(rev.cell(1, 1));
        assert!(!rev.cell(0, 1));
    }

    #[test]
    fn cell_outside_matrix_is_false() {
        assert!(!MatchMatrix::single().cell(1, 0));
    }

    #[test]
    fn add_goal_appends_in_order() {
        let mut book = GoalBook::new();
        let first = book
            .add_goal(GoalSpec::single(ObjectId(1), target(), Metric::Pose).reward(0.5))
            .unwrap();
        let second = book
            .add_goal(GoalSpec::single(ObjectId(2), target(), Metric::Pose).reward(0.5))
            .unwrap();

        assert_eq!((first, second), (0, 1));
        assert_eq!(book.goals()[1].objects, vec![ObjectId(2)]);
        assert!(book.reward_total_is_normalized());
    }

    #[test]
    fn match_shape_must_fit_objects_and_targets() {
        let mut spec = GoalSpec::single(ObjectId(1), target(), Metric::Pose);
        spec.objects.push(ObjectId(2));

        let err = GoalBook::new().add_goal(spec).unwrap_err();
        assert_eq!(
            err,
            GoalError::MatchShape {
                rows: 1,
                cols: 1,
                objects: 2,
                targets: 1
            }
        );
    }

    #[test]
    fn many_objects_may_share_one_target() {
        let metric = Metric::zone(target(), Vec3::new(0.2, 0.2, 0.0));
        let mut spec = GoalSpec::single(ObjectId(1), target(), metric);
        spec.objects = vec![ObjectId(1), ObjectId(2), ObjectId(3)];
        spec.matches = MatchMatrix::ones(3, 1);

        assert!(GoalBook::new().add_goal(spec).is_ok());
    }

    #[test]
    fn empty_goal_is_rejected() {
        let mut spec = GoalSpec::single(ObjectId(1), target(), Metric::Pose);
        spec.objects.clear();
        spec.matches = MatchMatrix::ones(0, 1);
        assert_eq!(GoalBook::new().add_goal(spec), Err(GoalError::EmptyObjects));
    }

    #[test]
    fn reward_must_be_positive_and_at_most_one() {
        let mut book = GoalBook::new();
        for reward in [0.0, -0.5, 1.5, f64::NAN] {
            let spec = GoalSpec::single(ObjectId(1), target(), Metric::Pose).reward(reward);
            let result = book.add_goal(spec);
            assert!(matches!(result, Err(GoalError::InvalidReward(_))));
        }
        assert!(book.is_empty());
    }

    #[test]
    fn unnormalized_rewards_are_reported_not_rejected() {
        let mut book = GoalBook::new();
        book.add_goal(GoalSpec::single(ObjectId(1), target(), Metric::Pose).reward(1.0))
            .unwrap();
        book.add_goal(GoalSpec::single(ObjectId(2), target(), Metric::Pose).reward(0.5))
            .unwrap();

        assert!(!book.reward_total_is_normalized());
        assert!((book.check_reward_total("test") - 1.5).abs() < 1e-12);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn template_fills_multiple_placeholders() {
        let text = render_template(
            "place the {item} on the {side} side of the table",
            &[("side", "left"), ("item", "food item")],
        )
        .unwrap();
        assert_eq!(text, "place the food item on the left side of the table");
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        assert_eq!(
            render_template("stack the can on the box", &[]).unwrap(),
            "stack the can on the box"
        );
    }

    #[test]
    fn template_reports_missing_and_unclosed_placeholders() {
        assert_eq!(
            render_template("group the {item} boxes", &[]),
            Err(GoalError::MissingPlaceholder("item".to_string()))
        );
        assert!(matches!(
            render_template("group the {item boxes", &[("item", "x")]),
            Err(GoalError::UnclosedPlaceholder(_))
        ));
    }

    #[test]
    fn zone_metric_serializes_with_kind_tag() {
        let json = serde_json::to_value(Metric::zone(target(), Vec3::new(0.1, 0.1, 0.0))).unwrap();
        assert_eq!(json["kind"], "zone");
        assert_eq!(json["zones"].as_array().map(Vec::len), Some(1));
    }
}
