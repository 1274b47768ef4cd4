//! Core types: math re-exports and scene lighting.

pub use glam::{Vec3, vec3};

pub mod lighting;

pub use lighting::{LIGHT_COUNT, Light, LightRig, LightUniforms, attenuation};
