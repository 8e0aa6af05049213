//! Stateless 2D/3D drawing and shader rasterization over an output surface,
//! clipped to the surface window.
//!
//! Two families of entry points exist: the `draw_*` calls forward whole
//! primitives to the surface (which may fill them in hardware), while the
//! `raster_*` calls walk every interior pixel through a [`PixelShader`]. Both
//! clip identically; the `_3d` variants additionally test the projected `z`
//! against the screen plane.

mod clip;
mod draw;
mod raster;

pub use clip::{clip_triangle_to_window, point_in_triangle, Point2d};

use crate::color::Rgb8;
use crate::surface::{OutputSurface, PixelBlendMode};

/// Per-pixel shading callable for the `raster_*` entry points.
///
/// Returning `false` skips the pixel. Any matching closure qualifies;
/// stateful shaders (samplers carrying cached edge coefficients) implement
/// the trait directly.
pub trait PixelShader {
    /// Produce the color for the pixel at `(x, y)`; returns whether to draw.
    fn shade(&mut self, color: &mut Rgb8, x: i16, y: i16) -> bool;
}

impl<F: FnMut(&mut Rgb8, i16, i16) -> bool> PixelShader for F {
    #[inline(always)]
    fn shade(&mut self, color: &mut Rgb8, x: i16, y: i16) -> bool {
        self(color, x, y)
    }
}

/// Drawing window over a borrowed surface.
pub struct WindowRasterizer<'a> {
    surface: &'a mut dyn OutputSurface,
    width: i16,
    height: i16,
}

impl<'a> WindowRasterizer<'a> {
    /// A rasterizer spanning the surface's full dimensions.
    pub fn new(surface: &'a mut dyn OutputSurface) -> Self {
        let dimensions = surface.dimensions();
        Self::with_size(surface, dimensions.width, dimensions.height)
    }

    /// A rasterizer with an explicit window size, for callers that cache the
    /// dimensions across a frame.
    pub fn with_size(surface: &'a mut dyn OutputSurface, width: i16, height: i16) -> Self {
        Self {
            surface,
            width,
            height,
        }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    /// Direct access to the underlying surface.
    pub fn surface(&mut self) -> &mut dyn OutputSurface {
        &mut *self.surface
    }

    #[inline]
    pub fn is_inside_window(&self, x: i16, y: i16) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Fill the whole window with one color.
    pub fn fill(&mut self, color: Rgb8) {
        self.surface
            .rectangle_fill(color, 0, 0, self.width - 1, self.height - 1);
    }

    /// Draw a single pixel if it falls inside the window.
    pub fn draw_pixel(&mut self, color: Rgb8, x: i16, y: i16) {
        if self.is_inside_window(x, y) {
            self.surface.pixel(color, x, y);
        }
    }

    /// Blend a single pixel with the given mode if it falls inside the
    /// window.
    pub fn blend_pixel(&mut self, color: Rgb8, x: i16, y: i16, mode: PixelBlendMode) {
        if !self.is_inside_window(x, y) {
            return;
        }
        match mode {
            PixelBlendMode::Replace => self.surface.pixel(color, x, y),
            PixelBlendMode::Alpha => self.surface.pixel_blend_alpha(color, x, y),
            PixelBlendMode::Add => self.surface.pixel_blend_add(color, x, y),
            PixelBlendMode::Subtract => self.surface.pixel_blend_subtract(color, x, y),
            PixelBlendMode::Multiply => self.surface.pixel_blend_multiply(color, x, y),
            PixelBlendMode::Screen => self.surface.pixel_blend_screen(color, x, y),
        }
    }
}
