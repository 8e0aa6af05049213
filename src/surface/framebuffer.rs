//! An owned ARGB framebuffer surface.
//!
//! Serves as the desktop/test backend: draws into a `Vec<u32>` and, with the
//! `image` feature, snapshots frames to PNG. Implements the full blend set
//! with saturating arithmetic.

use crate::color::Rgb8;

use super::{OutputSurface, SurfaceDimensions, SurfaceError};

/// A memory framebuffer of packed `0xAARRGGBB` pixels.
#[derive(Clone, Debug)]
pub struct FrameBufferSurface {
    width: i16,
    height: i16,
    clear_color: Rgb8,
    buffer: Vec<u32>,
}

impl FrameBufferSurface {
    pub fn new(width: i16, height: i16) -> Result<Self, SurfaceError> {
        if width <= 0 || height <= 0 {
            return Err(SurfaceError::BadDimensions);
        }
        Ok(Self {
            width,
            height,
            clear_color: Rgb8::BLACK,
            buffer: vec![0; width as usize * height as usize],
        })
    }

    /// Color the buffer resets to on every flip.
    pub fn set_clear_color(&mut self, color: Rgb8) {
        self.clear_color = color;
    }

    /// The raw pixel store, row-major.
    pub fn as_argb(&self) -> &[u32] {
        &self.buffer
    }

    pub fn get_pixel(&self, x: i16, y: i16) -> Option<Rgb8> {
        if self.contains(x, y) {
            Some(Rgb8(self.buffer[self.index(x, y)]))
        } else {
            None
        }
    }

    /// Count of pixels that differ from the clear color.
    pub fn touched_pixels(&self) -> usize {
        let clear = self.clear_color.0;
        self.buffer.iter().filter(|&&px| px != clear).count()
    }

    /// Write the buffer as an RGBA PNG.
    #[cfg(feature = "image")]
    pub fn save_png(&self, path: &std::path::Path) -> Result<(), SurfaceError> {
        let mut rgba = Vec::with_capacity(self.buffer.len() * 4);
        for &px in &self.buffer {
            let color = Rgb8(px);
            rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        image_::save_buffer(
            path,
            &rgba,
            self.width as u32,
            self.height as u32,
            image_::ColorType::Rgba8,
        )?;
        Ok(())
    }

    #[inline]
    fn contains(&self, x: i16, y: i16) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    fn index(&self, x: i16, y: i16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn set(&mut self, color: Rgb8, x: i16, y: i16) {
        if self.contains(x, y) {
            let index = self.index(x, y);
            self.buffer[index] = color.0;
        }
    }

    fn blend_with<F: Fn(u8, u8) -> u8>(&mut self, color: Rgb8, x: i16, y: i16, op: F) {
        if !self.contains(x, y) {
            return;
        }
        let index = self.index(x, y);
        let existing = Rgb8(self.buffer[index]);
        self.buffer[index] = Rgb8::with_alpha(
            existing.alpha(),
            op(color.red(), existing.red()),
            op(color.green(), existing.green()),
            op(color.blue(), existing.blue()),
        )
        .0;
    }
}

impl OutputSurface for FrameBufferSurface {
    fn start(&mut self) -> bool {
        self.buffer.fill(self.clear_color.0);
        true
    }

    fn is_ready(&mut self) -> bool {
        true
    }

    fn flip(&mut self) {
        // Single buffered: presenting is a no-op, the next frame starts from
        // the clear color.
    }

    fn dimensions(&self) -> SurfaceDimensions {
        SurfaceDimensions {
            width: self.width,
            height: self.height,
            color_depth: 32,
        }
    }

    fn pixel(&mut self, color: Rgb8, x: i16, y: i16) {
        self.set(color, x, y);
    }

    fn line(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16) {
        // Bresenham; endpoints arrive clipped but stay bounds-checked.
        let dx = (x2 as i32 - x1 as i32).abs();
        let dy = -(y2 as i32 - y1 as i32).abs();
        let sx = if x1 < x2 { 1i32 } else { -1 };
        let sy = if y1 < y2 { 1i32 } else { -1 };
        let mut err = dx + dy;
        let mut x = x1 as i32;
        let mut y = y1 as i32;

        loop {
            self.set(color, x as i16, y as i16);
            if x == x2 as i32 && y == y2 as i32 {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += sx;
            }
            if doubled <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn triangle_fill(
        &mut self,
        color: Rgb8,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
    ) {
        // Edge-function fill over the bounding box, edges inclusive.
        let min_x = x1.min(x2).min(x3).max(0);
        let max_x = x1.max(x2).max(x3).min(self.width - 1);
        let min_y = y1.min(y2).min(y3).max(0);
        let max_y = y1.max(y2).max(y3).min(self.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let d1 = (x as i32 - x2 as i32) * (y1 as i32 - y2 as i32)
                    - (x1 as i32 - x2 as i32) * (y as i32 - y2 as i32);
                let d2 = (x as i32 - x3 as i32) * (y2 as i32 - y3 as i32)
                    - (x2 as i32 - x3 as i32) * (y as i32 - y3 as i32);
                let d3 = (x as i32 - x1 as i32) * (y3 as i32 - y1 as i32)
                    - (x3 as i32 - x1 as i32) * (y as i32 - y1 as i32);

                let has_negative = d1 < 0 || d2 < 0 || d3 < 0;
                let has_positive = d1 > 0 || d2 > 0 || d3 > 0;
                if !(has_negative && has_positive) {
                    self.set(color, x, y);
                }
            }
        }
    }

    fn rectangle_fill(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16) {
        let min_x = x1.min(x2).max(0);
        let max_x = x1.max(x2).min(self.width - 1);
        let min_y = y1.min(y2).max(0);
        let max_y = y1.max(y2).min(self.height - 1);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.set(color, x, y);
            }
        }
    }

    fn pixel_blend_alpha(&mut self, color: Rgb8, x: i16, y: i16) {
        let alpha = color.alpha() as u16;
        let inverse = 255 - alpha;
        self.blend_with(color, x, y, |source, existing| {
            ((source as u16 * alpha + existing as u16 * inverse) / 255) as u8
        });
    }

    fn pixel_blend_add(&mut self, color: Rgb8, x: i16, y: i16) {
        self.blend_with(color, x, y, |source, existing| {
            existing.saturating_add(source)
        });
    }

    fn pixel_blend_subtract(&mut self, color: Rgb8, x: i16, y: i16) {
        self.blend_with(color, x, y, |source, existing| {
            existing.saturating_sub(source)
        });
    }

    fn pixel_blend_multiply(&mut self, color: Rgb8, x: i16, y: i16) {
        self.blend_with(color, x, y, |source, existing| {
            ((source as u16 * existing as u16) / 255) as u8
        });
    }

    fn pixel_blend_screen(&mut self, color: Rgb8, x: i16, y: i16) {
        self.blend_with(color, x, y, |source, existing| {
            255 - (((255 - source as u16) * (255 - existing as u16)) / 255) as u8
        });
    }
}
