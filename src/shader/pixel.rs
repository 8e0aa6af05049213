//! Reusable pixel shaders built on the primitive samplers.
//!
//! Each carries its sampler state across a whole primitive: configure with
//! `set_fragment` once, then hand it to a `raster_*` call.

use crate::color::Rgb8;
use crate::fragment::{MeshTriangleFragment, MeshVertexFragment};
use crate::object::sources::TextureSource;
use crate::rasterizer::PixelShader;
use crate::sampler::{
    z_depth8, BarycentricSampler, TriangleAffineSampler, UvInterpolator,
};
use crate::vertex::Vertex16;

/// Interpolates three corner colors across the triangle.
#[derive(Clone, Debug, Default)]
pub struct VertexColorInterpolator<S = TriangleAffineSampler> {
    sampler: S,
    colors: [[u8; 3]; 3],
}

impl<S: BarycentricSampler> VertexColorInterpolator<S> {
    /// Cache the fragment's screen triangle and corner colors. Returns false
    /// for degenerate triangles.
    pub fn set_fragment(&mut self, fragment: &MeshVertexFragment) -> bool {
        if !self
            .sampler
            .set_triangle(fragment.vertex_a, fragment.vertex_b, fragment.vertex_c)
        {
            return false;
        }
        self.colors = [
            [fragment.red_a, fragment.green_a, fragment.blue_a],
            [fragment.red_b, fragment.green_b, fragment.blue_b],
            [fragment.red_c, fragment.green_c, fragment.blue_c],
        ];
        true
    }
}

impl<S: BarycentricSampler> PixelShader for VertexColorInterpolator<S> {
    fn shade(&mut self, color: &mut Rgb8, x: i16, y: i16) -> bool {
        let fractions = self.sampler.fractions(x, y);
        let [a, b, c] = self.colors;

        let mix = |channel: usize| -> u8 {
            (fractions.a.scale_u8(a[channel]) as u16
                + fractions.b.scale_u8(b[channel]) as u16
                + fractions.c.scale_u8(c[channel]) as u16)
                .min(u8::MAX as u16) as u8
        };

        *color = Rgb8::new(mix(0), mix(1), mix(2));
        true
    }
}

/// Shades depth as a grayscale ramp interpolated across the triangle.
#[derive(Clone, Debug, Default)]
pub struct ZInterpolator<S = TriangleAffineSampler> {
    sampler: S,
    z_a: i16,
    z_b: i16,
    z_c: i16,
}

impl<S: BarycentricSampler> ZInterpolator<S> {
    /// Cache the screen triangle and its corner depths. Returns false for
    /// degenerate triangles.
    pub fn set_triangle(&mut self, a: Vertex16, b: Vertex16, c: Vertex16) -> bool {
        if !self.sampler.set_triangle(a, b, c) {
            return false;
        }
        self.z_a = a.z;
        self.z_b = b.z;
        self.z_c = c.z;
        true
    }
}

impl<S: BarycentricSampler> PixelShader for ZInterpolator<S> {
    fn shade(&mut self, color: &mut Rgb8, x: i16, y: i16) -> bool {
        let fractions = self.sampler.fractions(x, y);
        let z = (fractions.a.scale_i16(self.z_a) as i32
            + fractions.b.scale_i16(self.z_b) as i32
            + fractions.c.scale_i16(self.z_c) as i32)
            .clamp(0, i16::MAX as i32) as i16;

        if z <= 0 {
            return false;
        }

        let gray = z_depth8(z);
        *color = Rgb8::new(gray, gray, gray);
        true
    }
}

/// Samples a texture across the triangle, optionally modulated by a flat
/// tint from the lit fragment color.
pub struct TextureSampler<'t, T, S = TriangleAffineSampler> {
    sampler: S,
    uv: UvInterpolator,
    texture: &'t T,
    tint: Option<[u8; 3]>,
}

impl<'t, T: TextureSource, S: BarycentricSampler + Default> TextureSampler<'t, T, S> {
    pub fn new(texture: &'t T) -> Self {
        Self {
            sampler: S::default(),
            uv: UvInterpolator::new(),
            texture,
            tint: None,
        }
    }

    /// Cache an unlit textured fragment. Returns false for degenerate
    /// triangles.
    pub fn set_fragment(&mut self, fragment: &MeshTriangleFragment) -> bool {
        if !self
            .sampler
            .set_triangle(fragment.vertex_a, fragment.vertex_b, fragment.vertex_c)
        {
            return false;
        }
        self.uv.set_uvs(&crate::vertex::TriangleUv {
            a: fragment.uv_a,
            b: fragment.uv_b,
            c: fragment.uv_c,
        });
        self.tint = None;
        true
    }

    /// Cache a lit textured fragment; texels are modulated by the
    /// fragment's pre-shaded color.
    pub fn set_fragment_lit(&mut self, fragment: &MeshTriangleFragment) -> bool {
        if !self.set_fragment(fragment) {
            return false;
        }
        self.tint = Some([fragment.red, fragment.green, fragment.blue]);
        true
    }
}

impl<T: TextureSource, S: BarycentricSampler> PixelShader for TextureSampler<'_, T, S> {
    fn shade(&mut self, color: &mut Rgb8, x: i16, y: i16) -> bool {
        let fractions = self.sampler.fractions(x, y);
        let uv = self.uv.uv(fractions.a, fractions.b, fractions.c);
        let texel = self.texture.texel(uv.x, uv.y);

        *color = match self.tint {
            None => texel,
            Some([red, green, blue]) => Rgb8::with_alpha(
                texel.alpha(),
                ((texel.red() as u16 * red as u16) >> 8) as u8,
                ((texel.green() as u16 * green as u16) >> 8) as u8,
                ((texel.blue() as u16 * blue as u16) >> 8) as u8,
            ),
        };
        true
    }
}
