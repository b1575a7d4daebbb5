//! 3D scene projection.
//!
//! Ledger entries are mapped onto a vertical wall whose surface is displaced
//! by the normalized depth map. Each detection becomes a [`Marker`] sized to
//! its box, pushed forward by the sampled depth, with a floating label
//! resolved against the labels already placed.

pub mod aframe;
mod anchor;
mod description;
mod labels;
mod project;
mod wall;

pub use anchor::SceneAnchor;
pub use description::{
    Connector, Marker, SceneDescription, Surface, TextureRef, ViewerRig, SCENE_SCHEMA_V1,
};
pub use labels::{stack_labels, LabelPlacement, LabelStackConfig, LabelStacker};
pub use project::project;
pub use wall::{WallFrame, WallGeometry};
