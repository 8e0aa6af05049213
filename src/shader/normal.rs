//! Normal-vector visualization shader.

use crate::color::Rgb8;
use crate::fixed::bit_shifts;
use crate::vertex::{Vertex16, VERTEX16_UNIT};

use super::{Material, SceneShader};

/// Debug scene shader mapping the world normal onto RGB: R = X, G = Y,
/// B = Z, each biased from `[-UNIT, +UNIT]` onto `[0, 255]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NormalVisualizerShader;

impl NormalVisualizerShader {
    pub fn new() -> Self {
        Self
    }
}

/// Bias, clamp and scale a signed component into an unsigned byte; reaches
/// 255 exactly at `+UNIT`.
fn u8_normal(component: i16) -> u8 {
    const UNIT_BITS: u32 = bit_shifts(VERTEX16_UNIT as u32);
    const BIASED_MAX: i32 = (VERTEX16_UNIT as i32) << 1;

    let biased = (component as i32 + VERTEX16_UNIT as i32).clamp(0, BIASED_MAX);
    ((biased as u32 * u8::MAX as u32 + (1 << UNIT_BITS)) >> (UNIT_BITS + 1)) as u8
}

impl SceneShader for NormalVisualizerShader {
    fn lit_color(
        &self,
        _albedo: Rgb8,
        _material: &Material,
        _position: Vertex16,
        normal: Vertex16,
    ) -> Rgb8 {
        Rgb8::new(
            u8_normal(normal.x),
            u8_normal(normal.y),
            u8_normal(normal.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_normals_map_to_component_extremes() {
        let shader = NormalVisualizerShader::new();
        let material = Material::DIFFUSE;

        let plus_z = shader.lit_color(
            Rgb8::WHITE,
            &material,
            Vertex16::ZERO,
            Vertex16::new(0, 0, VERTEX16_UNIT),
        );
        assert_eq!(plus_z.blue(), 255);
        assert!((plus_z.red() as i16 - 128).abs() <= 1);

        let minus_x = shader.lit_color(
            Rgb8::WHITE,
            &material,
            Vertex16::ZERO,
            Vertex16::new(-VERTEX16_UNIT, 0, 0),
        );
        assert_eq!(minus_x.red(), 0);
    }

    #[test]
    fn albedo_does_not_influence_the_output() {
        let shader = NormalVisualizerShader::new();
        let normal = Vertex16::new(100, -2000, 3000);
        let a = shader.lit_color(Rgb8::RED, &Material::DIFFUSE, Vertex16::ZERO, normal);
        let b = shader.lit_color(Rgb8::BLUE, &Material::DIFFUSE, Vertex16::ZERO, normal);
        assert_eq!(a, b);
    }
}
