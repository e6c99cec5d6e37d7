//! Catalog of tabletop tasks.
//!
//! Every task is a [`TaskDefinition`]: static parameters plus a reset
//! function over immutable asset tables. Object poses in the tables come
//! from recorded bounding boxes, given as two opposite corners.

use crate::geometry::{centroid, extent};
use crate::task::TaskDefinition;
use crate::types::{Pose, Vec3};

mod align_rope;
mod arrange_items_by_category;
mod categorize_and_stack;
mod categorize_food_items;
mod group_items_by_category;
mod grouping_boxes_by_category;
mod organize_food_items;
mod pack_groceries;
mod sort_cans_by_type;
mod sort_items_by_category;
mod stack_cans_on_blocks;
mod stack_cans_on_boxes;

/// Every available task.
pub static CATALOG: [&TaskDefinition; 12] = [
    &align_rope::TASK,
    &arrange_items_by_category::TASK,
    &categorize_and_stack::TASK,
    &categorize_food_items::TASK,
    &group_items_by_category::TASK,
    &grouping_boxes_by_category::TASK,
    &organize_food_items::TASK,
    &pack_groceries::TASK,
    &sort_cans_by_type::TASK,
    &sort_items_by_category::TASK,
    &stack_cans_on_blocks::TASK,
    &stack_cans_on_boxes::TASK,
];

/// Looks up a task by name.
pub fn find(name: &str) -> Option<&'static TaskDefinition> {
    CATALOG.iter().copied().find(|task| task.spec.name == name)
}

/// Two opposite corners of a recorded bounding box.
pub(crate) type Corners = [[f64; 3]; 2];

/// Upright pose at the center of a recorded bounding box.
pub(crate) fn center_pose(corners: &Corners) -> Pose {
    Pose::at(centroid(
        Vec3::from_array(corners[0]),
        Vec3::from_array(corners[1]),
    ))
}

/// Edge lengths of a recorded bounding box.
pub(crate) fn corners_size(corners: &Corners) -> Vec3 {
    extent(Vec3::from_array(corners[0]), Vec3::from_array(corners[1]))
}
