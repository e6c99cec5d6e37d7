//! Data models for tabletop scenes.
//!
//! This module defines the entities a task reset produces:
//! - `AssetRef`: an opaque asset description handed to the simulator
//! - `PlacedObject`: a spawned asset bound to a pose and a category
//! - `Zone`: a flat target region with a fixed footprint

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{BoundingBox, Pose, Vec3};

/// Asset path of the flat target zone.
pub const ZONE_URDF: &str = "zone/zone.urdf";

/// Asset path of one rope segment.
pub const ROPE_SEGMENT_URDF: &str = "rope/segment.urdf";

/// Validation error for scene data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid size: {0}")]
    InvalidSize(String),
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),
    #[error("Unknown color: {0}")]
    UnknownColor(String),
}

fn validate_size(size: Vec3, name: &str) -> Result<(), ValidationError> {
    if !size.is_valid_size() {
        return Err(ValidationError::InvalidSize(format!(
            "{} must be finite and non-negative, got: {:?}",
            name,
            size.as_tuple()
        )));
    }
    Ok(())
}

/// Opaque handle to an object spawned in the simulator.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the simulator treats a spawned body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Static scenery such as zones, containers and support blocks.
    Fixed,
    /// Graspable rigid bodies.
    #[default]
    Rigid,
    /// Soft bodies such as rope segments.
    Deformable,
}

/// One named replacement value for a templated asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemplateParam {
    pub key: String,
    pub values: Vec<f64>,
}

impl TemplateParam {
    pub fn new(key: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        Self {
            key: key.into(),
            values: values.into(),
        }
    }
}

/// Reference to an asset description.
///
/// Paths are passed through to the simulator unchanged; templated assets
/// additionally carry the replacement values the simulator fills in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetRef {
    Urdf {
        path: String,
    },
    Template {
        path: String,
        replacements: Vec<TemplateParam>,
    },
}

impl AssetRef {
    /// Plain asset file reference.
    pub fn urdf(path: impl Into<String>) -> Self {
        AssetRef::Urdf { path: path.into() }
    }

    /// Template asset with `DIM`/`HALF` style replacements.
    pub fn template(path: impl Into<String>, replacements: Vec<TemplateParam>) -> Self {
        AssetRef::Template {
            path: path.into(),
            replacements,
        }
    }

    /// Asset path regardless of variant.
    pub fn path(&self) -> &str {
        match self {
            AssetRef::Urdf { path } | AssetRef::Template { path, .. } => path,
        }
    }

    /// File name without directories and extension, e.g. `Parmesan` for
    /// `HOPE/Parmesan.urdf`.
    pub fn stem(&self) -> &str {
        asset_stem(self.path())
    }

    /// Rejects empty paths.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path().trim().is_empty() {
            return Err(ValidationError::InvalidAsset(
                "asset path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// File name of an asset path without directories and extension.
pub fn asset_stem(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.split_once('.') {
        Some((stem, _)) => stem,
        None => file,
    }
}

/// RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
    }

    /// Looks up one of the benchmark's named palette colors.
    pub fn named(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, color)| *color)
    }

    /// Like [`Rgba::named`], failing on names outside the palette.
    pub fn palette(name: &str) -> Result<Self, ValidationError> {
        Self::named(name).ok_or_else(|| ValidationError::UnknownColor(name.to_string()))
    }
}

const PALETTE: &[(&str, Rgba)] = &[
    ("blue", Rgba::from_rgb8(78, 121, 167)),
    ("red", Rgba::from_rgb8(255, 87, 89)),
    ("green", Rgba::from_rgb8(89, 169, 79)),
    ("orange", Rgba::from_rgb8(242, 142, 43)),
    ("yellow", Rgba::from_rgb8(237, 201, 72)),
    ("purple", Rgba::from_rgb8(176, 122, 161)),
    ("pink", Rgba::from_rgb8(255, 157, 167)),
    ("cyan", Rgba::from_rgb8(118, 183, 178)),
    ("brown", Rgba::from_rgb8(156, 117, 95)),
    ("white", Rgba::from_rgb8(255, 255, 255)),
    ("gray", Rgba::from_rgb8(186, 176, 172)),
];

/// An asset spawned during a reset.
///
/// The simulator owns the body; this is the bookkeeping record of what was
/// requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub asset: AssetRef,
    pub pose: Pose,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
}

/// A flat target region on the tabletop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Zone {
    pub label: String,
    pub pose: Pose,
    pub size: Vec3,
}

impl Zone {
    /// Creates a zone after validating its footprint.
    ///
    /// # Examples
    /// ```
    /// use tabletop_tasks::model::Zone;
    /// use tabletop_tasks::types::{Pose, Vec3};
    ///
    /// let pose = Pose::at(Vec3::new(0.5, 0.0, 0.0));
    /// let zone = Zone::new("snacks", pose, Vec3::new(0.1, 0.1, 0.0));
    /// assert!(zone.is_ok());
    ///
    /// let broken = Zone::new("snacks", Pose::at(Vec3::zero()), Vec3::new(f64::NAN, 0.1, 0.0));
    /// assert!(broken.is_err());
    /// ```
    pub fn new(label: impl Into<String>, pose: Pose, size: Vec3) -> Result<Self, ValidationError> {
        validate_size(size, "Zone size")?;
        Ok(Self {
            label: label.into(),
            pose,
            size,
        })
    }

    /// Axis-aligned bounds centered on the zone pose.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_center_and_size(self.pose.position, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_stem_strips_directory_and_extension() {
        assert_eq!(asset_stem("HOPE/AlphabetSoup.urdf"), "AlphabetSoup");
        assert_eq!(asset_stem("block.urdf"), "block");
        assert_eq!(asset_stem("zone"), "zone");
        assert_eq!(AssetRef::urdf("HOPE/Corn.urdf").stem(), "Corn");
    }

    #[test]
    fn empty_asset_path_is_rejected() {
        assert!(AssetRef::urdf("  ").validate().is_err());
        assert!(AssetRef::urdf(ZONE_URDF).validate().is_ok());
    }

    #[test]
    fn template_asset_keeps_path_and_values() {
        let asset = AssetRef::template(
            "container/container-template.urdf",
            vec![TemplateParam::new("DIM", vec![0.2, 0.2, 0.1])],
        );
        assert_eq!(asset.path(), "container/container-template.urdf");
        match asset {
            AssetRef::Template { replacements, .. } => {
                assert_eq!(replacements[0].key, "DIM");
                assert_eq!(replacements[0].values, vec![0.2, 0.2, 0.1]);
            }
            AssetRef::Urdf { .. } => panic!("expected template asset"),
        }
    }

    #[test]
    fn named_palette_colors_resolve() {
        let red = Rgba::named("red").expect("red is part of the palette");
        assert!((red.r - 1.0).abs() < 1e-12);
        assert!((red.a - 1.0).abs() < 1e-12);
        assert!(Rgba::named("chartreuse").is_none());
        assert_eq!(
            Rgba::palette("chartreuse"),
            Err(ValidationError::UnknownColor("chartreuse".to_string()))
        );
    }

    #[test]
    fn zone_rejects_negative_size() {
        let result = Zone::new("left", Pose::at(Vec3::zero()), Vec3::new(-0.1, 0.1, 0.0));
        assert!(matches!(result, Err(ValidationError::InvalidSize(_))));
    }

    #[test]
    fn zone_bounds_are_centered_on_pose() {
        let zone = Zone::new(
            "left",
            Pose::at(Vec3::new(0.25, 0.0, 0.01)),
            Vec3::new(0.25, 0.5, 0.0),
        )
        .unwrap();
        let bounds = zone.bounds();
        assert!((bounds.min.x - 0.125).abs() < 1e-12);
        assert!((bounds.max.y - 0.25).abs() < 1e-12);
        assert!((bounds.min.z - 0.01).abs() < 1e-12);
    }

    #[test]
    fn category_serializes_in_snake_case() {
        let json = serde_json::to_string(&Category::Fixed).unwrap();
        assert_eq!(json, "\"fixed\"");
    }
}
