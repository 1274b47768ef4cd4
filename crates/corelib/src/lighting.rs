//! Scene lighting as plain data owned by the frame loop.

use crate::{Vec3, vec3};

/// Lights in a [`LightRig`].
pub const LIGHT_COUNT: usize = 3;

/// Point light fed to the multi-light Phong shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub enabled: bool,
}

impl Light {
    pub const fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            enabled: true,
        }
    }
}

/// Per-light uniform arrays, in rig order.
#[derive(Clone, Debug, PartialEq)]
pub struct LightUniforms {
    pub positions: [[f32; 3]; LIGHT_COUNT],
    pub colors: [[f32; 3]; LIGHT_COUNT],
    pub intensities: [f32; LIGHT_COUNT],
    /// GLSL `bool` arrays are uploaded as ints.
    pub enabled: [i32; LIGHT_COUNT],
}

/// Key, fill and back light around one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightRig {
    pub lights: [Light; LIGHT_COUNT],
}

impl LightRig {
    pub const KEY: usize = 0;
    pub const FILL: usize = 1;
    pub const BACK: usize = 2;

    /// Places the lights at three times the object's largest scale.
    pub fn three_point(object_position: Vec3, object_scale: Vec3) -> Self {
        let d = object_scale.max_element() * 3.0;
        Self {
            lights: [
                Light::new(object_position + vec3(d, d * 1.5, d), vec3(1.0, 0.95, 0.8), 2.0),
                Light::new(object_position + vec3(-d, 0.0, d * 0.5), vec3(0.4, 0.4, 0.8), 1.0),
                Light::new(object_position + vec3(0.0, d * 0.8, -d), vec3(0.8, 0.8, 1.0), 1.5),
            ],
        }
    }

    /// Flips one light on/off and returns its new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let light = self.lights.get_mut(index)?;
        light.enabled = !light.enabled;
        Some(light.enabled)
    }

    pub fn enabled_count(&self) -> usize {
        self.lights.iter().filter(|l| l.enabled).count()
    }

    pub fn uniforms(&self) -> LightUniforms {
        LightUniforms {
            positions: self.lights.map(|l| l.position.to_array()),
            colors: self.lights.map(|l| l.color.to_array()),
            intensities: self.lights.map(|l| l.intensity),
            enabled: self.lights.map(|l| i32::from(l.enabled)),
        }
    }
}

/// Distance falloff matching the fragment shader (1, 0.09, 0.032).
pub fn attenuation(distance: f32) -> f32 {
    1.0 / (1.0 + 0.09 * distance + 0.032 * distance * distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_distance_follows_largest_scale() {
        let rig = LightRig::three_point(Vec3::ZERO, vec3(1.0, 2.0, 0.5));
        let key = rig.lights[LightRig::KEY];
        assert_eq!(key.position, vec3(6.0, 9.0, 6.0));
        assert_eq!(rig.lights[LightRig::FILL].position, vec3(-6.0, 0.0, 3.0));
        assert!(rig.lights[LightRig::BACK].position.abs_diff_eq(vec3(0.0, 4.8, -6.0), 1e-5));
        assert_eq!(rig.enabled_count(), 3);
    }

    #[test]
    fn rig_is_offset_by_object_position() {
        let rig = LightRig::three_point(vec3(1.0, 1.0, 1.0), Vec3::ONE);
        assert_eq!(rig.lights[LightRig::FILL].position, vec3(-2.0, 1.0, 2.5));
    }

    #[test]
    fn toggle_updates_uniforms() {
        let mut rig = LightRig::three_point(Vec3::ZERO, Vec3::ONE);
        assert_eq!(rig.toggle(LightRig::FILL), Some(false));
        assert_eq!(rig.toggle(7), None);
        let u = rig.uniforms();
        assert_eq!(u.enabled, [1, 0, 1]);
        assert_eq!(u.intensities, [2.0, 1.0, 1.5]);
        assert_eq!(rig.enabled_count(), 2);
    }

    #[test]
    fn attenuation_is_one_at_source() {
        assert_eq!(attenuation(0.0), 1.0);
        assert!(attenuation(10.0) < attenuation(1.0));
    }
}
