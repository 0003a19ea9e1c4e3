//! Render-facing state
//!
//! The game does not draw. It keeps the camera and the material each entity
//! should be drawn with, for a host renderer to consume.

mod camera;
mod material;

pub use camera::Camera;
pub use material::{Appearance, Material, MaterialSet, MaterialVariant};
