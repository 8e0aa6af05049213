//! Shader contracts: scene shaders light primitives, fragment shaders draw
//! them, pixel shaders color individual pixels (see
//! [`PixelShader`](crate::rasterizer::PixelShader)).

pub mod fragment;
pub mod lights;
pub mod normal;
pub mod pixel;

pub use lights::{LightKind, LightSource, LightsShader};
pub use normal::NormalVisualizerShader;

use crate::color::Rgb8;
use crate::fixed::UFraction8;
use crate::rasterizer::WindowRasterizer;
use crate::vertex::Vertex16;

/// Surface response weights of a primitive.
///
/// All components are fractions of full response; `metallic` shifts specular
/// reflections from the light color toward the albedo.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Material {
    pub emissive: UFraction8,
    pub diffuse: UFraction8,
    pub specular: UFraction8,
    pub metallic: UFraction8,
}

impl Material {
    /// Plain matte surface: full diffuse, nothing else.
    pub const DIFFUSE: Self = Self {
        emissive: UFraction8::ZERO,
        diffuse: UFraction8::ONE,
        specular: UFraction8::ZERO,
        metallic: UFraction8::ZERO,
    };

    pub const fn new(
        emissive: UFraction8,
        diffuse: UFraction8,
        specular: UFraction8,
        metallic: UFraction8,
    ) -> Self {
        Self {
            emissive,
            diffuse,
            specular,
            metallic,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DIFFUSE
    }
}

/// Computes the final color of a primitive from its albedo, material and
/// world-space pose under the configured scene lighting.
pub trait SceneShader {
    fn lit_color(
        &self,
        albedo: Rgb8,
        material: &Material,
        position: Vertex16,
        normal: Vertex16,
    ) -> Rgb8;
}

/// Draws one fragment of type `F` through the window rasterizer.
pub trait FragmentShader<F> {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &F);
}
