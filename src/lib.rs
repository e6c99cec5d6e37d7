//! Task definitions for a robot tabletop-manipulation benchmark.
//!
//! Each task spawns objects and zones through a simulator backend and
//! registers the goals a scoring runner checks. Zones are placed by a
//! bounded retrying placer that rejects poses colliding with objects or
//! other zones.

pub mod api;
pub mod config;
pub mod geometry;
pub mod goal;
pub mod model;
pub mod placement;
pub mod sim;
pub mod tabletop;
pub mod task;
pub mod tasks;
pub mod types;
