//! Texture-coordinate interpolation from barycentric fractions.

use crate::fixed::UFraction16;
use crate::vertex::{Coordinate, TriangleUv, Vertex16};

// Nudges each per-vertex UV toward the texel center, compensating for
// fixed-point truncation.
const UV_BIAS: i16 = 1;

/// Affine UV interpolation across a triangle.
#[derive(Clone, Debug, Default)]
pub struct UvInterpolator {
    uv_a: Coordinate,
    uv_b: Coordinate,
    uv_c: Coordinate,
}

impl UvInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_uvs(&mut self, uvs: &TriangleUv) {
        self.uv_a = uvs.a;
        self.uv_b = uvs.b;
        self.uv_c = uvs.c;
    }

    /// Interpolated texel coordinates for the given barycentric fractions,
    /// biased toward texel centers and clamped at zero.
    pub fn uv(&self, a: UFraction16, b: UFraction16, c: UFraction16) -> Coordinate {
        Coordinate {
            x: (a.scale_i16(self.uv_a.x + UV_BIAS)
                + b.scale_i16(self.uv_b.x + UV_BIAS)
                + c.scale_i16(self.uv_c.x + UV_BIAS))
            .max(0),
            y: (a.scale_i16(self.uv_a.y + UV_BIAS)
                + b.scale_i16(self.uv_b.y + UV_BIAS)
                + c.scale_i16(self.uv_c.y + UV_BIAS))
            .max(0),
        }
    }
}

/// Perspective-correct UV interpolation.
///
/// Stores Q16 depth reciprocals per vertex; each query divides the
/// reciprocal-weighted UV sums by the interpolated reciprocal. Falls back to
/// affine interpolation when the denominator vanishes.
#[derive(Clone, Debug, Default)]
pub struct UvInterpolatorPerspective {
    affine: UvInterpolator,
    qa: u32,
    qb: u32,
    qc: u32,
}

impl UvInterpolatorPerspective {
    const Q_BITS: u32 = 16;
    const Q_SCALE: u32 = 1 << Self::Q_BITS;

    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the UVs and the screen-vertex depths (clamped to at least one).
    pub fn set_uvs(&mut self, uvs: &TriangleUv, a: Vertex16, b: Vertex16, c: Vertex16) {
        self.affine.set_uvs(uvs);
        self.qa = Self::Q_SCALE / a.z.max(1) as u32;
        self.qb = Self::Q_SCALE / b.z.max(1) as u32;
        self.qc = Self::Q_SCALE / c.z.max(1) as u32;
    }

    /// Perspective-correct texel coordinates for the given barycentric
    /// fractions.
    pub fn uv(&self, a: UFraction16, b: UFraction16, c: UFraction16) -> Coordinate {
        let denominator = a.0 as u64 * self.qa as u64
            + b.0 as u64 * self.qb as u64
            + c.0 as u64 * self.qc as u64;

        if denominator == 0 {
            return self.affine.uv(a, b, c);
        }

        let numerator_u = a.0 as i64 * (self.affine.uv_a.x as i64 * self.qa as i64)
            + b.0 as i64 * (self.affine.uv_b.x as i64 * self.qb as i64)
            + c.0 as i64 * (self.affine.uv_c.x as i64 * self.qc as i64);
        let numerator_v = a.0 as i64 * (self.affine.uv_a.y as i64 * self.qa as i64)
            + b.0 as i64 * (self.affine.uv_b.y as i64 * self.qb as i64)
            + c.0 as i64 * (self.affine.uv_c.y as i64 * self.qc as i64);

        let half = (denominator >> 1) as i64;
        Coordinate {
            x: ((numerator_u + half) / denominator as i64).max(0) as i16,
            y: ((numerator_v + half) / denominator as i64).max(0) as i16,
        }
    }
}
