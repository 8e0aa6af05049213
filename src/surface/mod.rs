//! The output surface contract and the surfaces shipped with the crate.
//!
//! A surface is the crate's only external drawing boundary: the engine and
//! rasterizer talk to it exclusively through [`OutputSurface`], mirroring how
//! a display driver or a double-buffered framebuffer would be wired up on an
//! embedded target. Colors cross the boundary as packed ARGB; conversion to
//! the native pixel format is the surface's business.

#[cfg(feature = "std")]
mod framebuffer;
#[cfg(feature = "std")]
mod mock;

#[cfg(feature = "std")]
pub use framebuffer::FrameBufferSurface;
#[cfg(feature = "std")]
pub use mock::{MockSurface, SurfaceCall};

use crate::color::Rgb8;

/// Size and color depth of a surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceDimensions {
    pub width: i16,
    pub height: i16,
    pub color_depth: u8,
}

/// Errors surfaces can produce outside the cooperative draw path.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface failed to start")]
    StartFailed,
    #[error("surface dimensions are not drawable")]
    BadDimensions,
    #[cfg(feature = "image")]
    #[error("image encoding failed: {0}")]
    Image(#[from] image_::ImageError),
}

/// Per-pixel blending applied by the surface before the write.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PixelBlendMode {
    /// Replace the existing pixel with the new color.
    #[default]
    Replace,
    /// Alpha-blend the new color over the existing pixel.
    Alpha,
    /// Add the new color to the existing pixel, clamping on overflow.
    Add,
    /// Subtract the new color from the existing pixel, clamping at zero.
    Subtract,
    /// Multiply the new color with the existing pixel.
    Multiply,
    /// Screen-blend the new color with the existing pixel.
    Screen,
}

/// An output framebuffer or display.
///
/// All calls are caller-driven and cooperative: the engine never draws before
/// `is_ready` reports true, and presents finished frames with `flip`. Draw
/// calls arrive pre-clipped to the surface window.
pub trait OutputSurface {
    /// Initialize the surface. Returning false sends the engine to Disabled.
    fn start(&mut self) -> bool;

    /// Tear down the surface.
    fn stop(&mut self) {}

    /// True when the engine may draw. Surfaces that present asynchronously
    /// (DMA, swap chains) report false while a transfer is in flight.
    fn is_ready(&mut self) -> bool;

    /// Present the current frame.
    fn flip(&mut self);

    fn dimensions(&self) -> SurfaceDimensions;

    fn pixel(&mut self, color: Rgb8, x: i16, y: i16);

    fn line(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16);

    #[allow(clippy::too_many_arguments)]
    fn triangle_fill(
        &mut self,
        color: Rgb8,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
    );

    fn rectangle_fill(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16);

    /// Blending variants; surfaces without blending fall back to a plain
    /// write.
    fn pixel_blend_alpha(&mut self, color: Rgb8, x: i16, y: i16) {
        self.pixel(color, x, y);
    }

    fn pixel_blend_add(&mut self, color: Rgb8, x: i16, y: i16) {
        self.pixel(color, x, y);
    }

    fn pixel_blend_subtract(&mut self, color: Rgb8, x: i16, y: i16) {
        self.pixel(color, x, y);
    }

    fn pixel_blend_multiply(&mut self, color: Rgb8, x: i16, y: i16) {
        self.pixel(color, x, y);
    }

    fn pixel_blend_screen(&mut self, color: Rgb8, x: i16, y: i16) {
        self.pixel(color, x, y);
    }
}

/// Random dithering for alpha on surfaces without blending support.
///
/// A xorshift generator decides per pixel whether an alpha value produces a
/// visible pixel.
#[derive(Clone, Debug)]
pub struct AlphaRandomDitherer {
    rng: u16,
}

impl AlphaRandomDitherer {
    pub const fn new() -> Self {
        Self { rng: 42 }
    }

    /// True when the pixel should be drawn for this alpha.
    pub fn dither(&mut self, alpha: u8) -> bool {
        self.rng ^= self.rng << 7;
        self.rng ^= self.rng >> 9;
        self.rng ^= self.rng << 8;

        alpha > self.rng as u8
    }
}

impl Default for AlphaRandomDitherer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ditherer_follows_alpha() {
        let mut ditherer = AlphaRandomDitherer::new();
        let mut opaque = 0;
        let mut transparent = 0;
        for _ in 0..1000 {
            if ditherer.dither(255) {
                opaque += 1;
            }
        }
        for _ in 0..1000 {
            if ditherer.dither(0) {
                transparent += 1;
            }
        }
        assert!(opaque > 990);
        assert_eq!(transparent, 0);
    }

    #[test]
    fn ditherer_half_alpha_is_roughly_half() {
        let mut ditherer = AlphaRandomDitherer::new();
        let drawn = (0..4000).filter(|_| ditherer.dither(128)).count();
        assert!(drawn > 1400 && drawn < 2600, "{drawn}");
    }
}
