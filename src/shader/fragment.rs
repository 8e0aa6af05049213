//! Stock fragment shaders for the shipped render objects.

use crate::color::Rgb8;
use crate::fixed::UFraction16;
use crate::fragment::{
    BillboardFragment, ColorFragment, EdgeLineFragment, EdgeVertexFragment, MeshTriangleFragment,
    MeshVertexFragment, PointCloudFragment,
};
use crate::object::sources::TextureSource;
use crate::rasterizer::WindowRasterizer;
use crate::sampler::{BarycentricSampler, LineSampler, TriangleAffineSampler};
use crate::vertex::Vertex16;

use super::pixel::{TextureSampler, VertexColorInterpolator, ZInterpolator};
use super::FragmentShader;

/// Fills mesh triangles with their pre-shaded flat color.
#[derive(Copy, Clone, Debug, Default)]
pub struct TriangleFillShader;

impl FragmentShader<MeshTriangleFragment> for TriangleFillShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &MeshTriangleFragment) {
        rasterizer.draw_triangle_3d(
            fragment.color(),
            fragment.vertex_a,
            fragment.vertex_b,
            fragment.vertex_c,
        );
    }
}

/// Outlines mesh triangles with their pre-shaded color.
#[derive(Copy, Clone, Debug, Default)]
pub struct TriangleWireframeShader;

impl FragmentShader<MeshTriangleFragment> for TriangleWireframeShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &MeshTriangleFragment) {
        let color = fragment.color();
        rasterizer.draw_line_3d(color, fragment.vertex_a, fragment.vertex_b);
        rasterizer.draw_line_3d(color, fragment.vertex_a, fragment.vertex_c);
        rasterizer.draw_line_3d(color, fragment.vertex_b, fragment.vertex_c);
    }
}

/// Shades mesh triangles as a grayscale depth ramp, interpolated per pixel.
#[derive(Clone, Debug, Default)]
pub struct TriangleDepthShader<S = TriangleAffineSampler> {
    interpolator: ZInterpolator<S>,
}

impl<S: BarycentricSampler> FragmentShader<MeshTriangleFragment> for TriangleDepthShader<S> {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &MeshTriangleFragment) {
        if self
            .interpolator
            .set_triangle(fragment.vertex_a, fragment.vertex_b, fragment.vertex_c)
        {
            rasterizer.raster_triangle_3d(
                fragment.vertex_a,
                fragment.vertex_b,
                fragment.vertex_c,
                &mut self.interpolator,
            );
        }
        // Degenerate triangles are skipped silently.
    }
}

/// Rasterizes vertex-shaded triangles with per-pixel color interpolation.
#[derive(Clone, Debug, Default)]
pub struct VertexColorTriangleShader<S = TriangleAffineSampler> {
    interpolator: VertexColorInterpolator<S>,
}

impl<S: BarycentricSampler> FragmentShader<MeshVertexFragment> for VertexColorTriangleShader<S> {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &MeshVertexFragment) {
        if self.interpolator.set_fragment(fragment) {
            rasterizer.raster_triangle_3d(
                fragment.vertex_a,
                fragment.vertex_b,
                fragment.vertex_c,
                &mut self.interpolator,
            );
        }
    }
}

/// Rasterizes textured triangles, unlit or modulated by the pre-shaded
/// fragment color.
pub struct TexturedTriangleShader<'t, T, S = TriangleAffineSampler> {
    sampler: TextureSampler<'t, T, S>,
    lit: bool,
}

impl<'t, T: TextureSource, S: BarycentricSampler + Default> TexturedTriangleShader<'t, T, S> {
    pub fn new(texture: &'t T) -> Self {
        Self {
            sampler: TextureSampler::new(texture),
            lit: false,
        }
    }

    /// Modulate texels by the fragment's lit color.
    pub fn lit(texture: &'t T) -> Self {
        Self {
            sampler: TextureSampler::new(texture),
            lit: true,
        }
    }
}

impl<T: TextureSource, S: BarycentricSampler + Default> FragmentShader<MeshTriangleFragment>
    for TexturedTriangleShader<'_, T, S>
{
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &MeshTriangleFragment) {
        let configured = if self.lit {
            self.sampler.set_fragment_lit(fragment)
        } else {
            self.sampler.set_fragment(fragment)
        };
        if configured {
            rasterizer.raster_triangle_3d(
                fragment.vertex_a,
                fragment.vertex_b,
                fragment.vertex_c,
                &mut self.sampler,
            );
        }
    }
}

/// Draws edges as flat-colored lines.
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeLineShader;

impl FragmentShader<EdgeLineFragment> for EdgeLineShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &EdgeLineFragment) {
        rasterizer.draw_line_3d(fragment.color(), fragment.vertex_a, fragment.vertex_b);
    }
}

/// Draws vertex-shaded edges with a per-pixel color gradient between the
/// endpoint colors.
#[derive(Clone, Debug, Default)]
pub struct EdgeGradientShader {
    sampler: LineSampler,
}

impl FragmentShader<EdgeVertexFragment> for EdgeGradientShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &EdgeVertexFragment) {
        if !self.sampler.set_line(fragment.vertex_a, fragment.vertex_b) {
            // Zero-length edge: a single pixel of the first endpoint color.
            rasterizer.draw_point_3d(
                Rgb8::new(fragment.red_a, fragment.green_a, fragment.blue_a),
                fragment.vertex_a,
            );
            return;
        }

        let sampler = &self.sampler;
        let start = [fragment.red_a, fragment.green_a, fragment.blue_a];
        let end = [fragment.red_b, fragment.green_b, fragment.blue_b];
        let mut shader = |color: &mut Rgb8, x: i16, y: i16| {
            let fraction = sampler.fraction16(x, y);
            let inverse = UFraction16(UFraction16::ONE.0 - fraction.0);
            *color = Rgb8::new(
                inverse.scale_u8(start[0]) + fraction.scale_u8(end[0]),
                inverse.scale_u8(start[1]) + fraction.scale_u8(end[1]),
                inverse.scale_u8(start[2]) + fraction.scale_u8(end[2]),
            );
            true
        };
        rasterizer.raster_line_3d(fragment.vertex_a, fragment.vertex_b, &mut shader);
    }
}

/// Draws point-cloud fragments as single pixels.
#[derive(Copy, Clone, Debug, Default)]
pub struct PointPixelShader;

impl FragmentShader<PointCloudFragment> for PointPixelShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &PointCloudFragment) {
        rasterizer.draw_point_3d(
            fragment.color(),
            Vertex16::new(fragment.x, fragment.y, fragment.z),
        );
    }
}

/// Fills billboard rectangles with their albedo.
#[derive(Copy, Clone, Debug, Default)]
pub struct BillboardFillShader;

impl FragmentShader<BillboardFragment> for BillboardFillShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &BillboardFragment) {
        rasterizer.draw_rectangle(
            fragment.color(),
            fragment.top_left_x,
            fragment.top_left_y,
            fragment.bottom_right_x,
            fragment.bottom_right_y,
        );
    }
}

/// Draws billboard rectangles as a crossed outline; a placeholder while the
/// real sprite shader is out of reach.
#[derive(Copy, Clone, Debug, Default)]
pub struct BillboardOutlineShader;

impl FragmentShader<BillboardFragment> for BillboardOutlineShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &BillboardFragment) {
        let color = fragment.color();
        let (left, top) = (fragment.top_left_x, fragment.top_left_y);
        let (right, bottom) = (fragment.bottom_right_x, fragment.bottom_right_y);

        rasterizer.draw_line(color, left, top, right, top);
        rasterizer.draw_line(color, right, top, right, bottom);
        rasterizer.draw_line(color, right, bottom, left, bottom);
        rasterizer.draw_line(color, left, bottom, left, top);

        rasterizer.draw_line(color, left, top, right, bottom);
        rasterizer.draw_line(color, right, top, left, bottom);
    }
}

/// Floods the whole window with the background color.
#[derive(Copy, Clone, Debug, Default)]
pub struct BackgroundFillShader;

impl FragmentShader<ColorFragment> for BackgroundFillShader {
    fn shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, fragment: &ColorFragment) {
        rasterizer.fill(fragment.color());
    }
}
