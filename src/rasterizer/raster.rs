//! Shader rasterization: window-clipped primitives walked pixel by pixel
//! through a [`PixelShader`].

use crate::color::Rgb8;
use crate::vertex::Vertex16;

use super::clip::{clip_endpoint_to_window, clip_triangle_to_window, compute_outcode, Point2d};
use super::{PixelShader, WindowRasterizer};

/// Subpixel bits used by the triangle edge stepping.
const SUBPIXEL_SCALE: u32 = 8;
const SUBPIXEL_HALF: i32 = 1 << (SUBPIXEL_SCALE - 1);

#[inline]
const fn int_to_fixed(value: i16) -> i32 {
    (value as i32) << SUBPIXEL_SCALE
}

#[inline]
const fn fixed_round_to_int(fixed: i32) -> i16 {
    ((fixed + SUBPIXEL_HALF) >> SUBPIXEL_SCALE) as i16
}

impl WindowRasterizer<'_> {
    /// Rasterize a clipped line through the pixel shader.
    pub fn raster_line<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        shader: &mut S,
    ) {
        let in1 = self.is_inside_window(x1, y1);
        let in2 = self.is_inside_window(x2, y2);

        let (mut x1c, mut y1c, mut x2c, mut y2c) = (x1, y1, x2, y2);

        if !in1 || !in2 {
            if in1 {
                clip_endpoint_to_window(&mut x2c, &mut y2c, x1c, y1c, self.width, self.height);
            } else if in2 {
                clip_endpoint_to_window(&mut x1c, &mut y1c, x2c, y2c, self.width, self.height);
            } else {
                let out1 = compute_outcode(x1, y1, self.width, self.height);
                let out2 = compute_outcode(x2, y2, self.width, self.height);
                if out1 & out2 != 0 {
                    return;
                }

                clip_endpoint_to_window(&mut x1c, &mut y1c, x2, y2, self.width, self.height);
                clip_endpoint_to_window(&mut x2c, &mut y2c, x1, y1, self.width, self.height);
            }

            if !self.is_inside_window(x1c, y1c) || !self.is_inside_window(x2c, y2c) {
                // No visible segment after clipping.
                return;
            }
        }

        let mut color = Rgb8::default();
        if x1c == x2c && y1c == y2c {
            // Degenerate line: a single pixel.
            if shader.shade(&mut color, x1c, y1c) {
                self.surface.pixel(color, x1c, y1c);
            }
        } else if y1c == y2c {
            let step = if x1c <= x2c { 1i16 } else { -1 };
            let mut x = x1c;
            loop {
                if shader.shade(&mut color, x, y1c) {
                    self.surface.pixel(color, x, y1c);
                }
                if x == x2c {
                    break;
                }
                x += step;
            }
        } else if x1c == x2c {
            let step = if y1c <= y2c { 1i16 } else { -1 };
            let mut y = y1c;
            loop {
                if shader.shade(&mut color, x1c, y) {
                    self.surface.pixel(color, x1c, y);
                }
                if y == y2c {
                    break;
                }
                y += step;
            }
        } else {
            self.bresenham_line(x1c, y1c, x2c, y2c, shader);
        }
    }

    /// Rasterize a window-clipped triangle through the pixel shader.
    ///
    /// Same clipping as [`WindowRasterizer::draw_triangle`]: degenerate
    /// polygons collapse to line or point rasterization, larger ones fan out
    /// and fill flat-top/flat-bottom halves with subpixel edge stepping.
    #[allow(clippy::too_many_arguments)]
    pub fn raster_triangle<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
        shader: &mut S,
    ) {
        let (polygon, count) = clip_triangle_to_window(
            [
                Point2d { x: x1, y: y1 },
                Point2d { x: x2, y: y2 },
                Point2d { x: x3, y: y3 },
            ],
            self.width,
            self.height,
        );

        match count {
            0 => {}
            1 => {
                let mut color = Rgb8::default();
                if shader.shade(&mut color, polygon[0].x, polygon[0].y) {
                    self.surface.pixel(color, polygon[0].x, polygon[0].y);
                }
            }
            2 => {
                self.raster_line(
                    polygon[0].x,
                    polygon[0].y,
                    polygon[1].x,
                    polygon[1].y,
                    shader,
                );
            }
            _ => {
                let anchor = polygon[0];
                for i in 1..count - 1 {
                    let b = polygon[i];
                    let c = polygon[i + 1];
                    let area2 = (b.x - anchor.x) as i32 * (c.y - anchor.y) as i32
                        - (c.x - anchor.x) as i32 * (b.y - anchor.y) as i32;
                    if area2 != 0 {
                        self.raster_triangle_dispatch(
                            anchor.x, anchor.y, b.x, b.y, c.x, c.y, shader,
                        );
                    } else {
                        // Sliver collapsed by clipping; keep its pixels.
                        self.raster_line(anchor.x, anchor.y, b.x, b.y, shader);
                        self.raster_line(b.x, b.y, c.x, c.y, shader);
                    }
                }
            }
        }
    }

    /// Rasterize a cropped rectangle through the pixel shader.
    pub fn raster_rectangle<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        shader: &mut S,
    ) {
        let inside = self.is_inside_window(x1, y1)
            || self.is_inside_window(x1, y2)
            || self.is_inside_window(x2, y1)
            || self.is_inside_window(x2, y2);
        if !inside {
            return;
        }

        let x1c = x1.clamp(0, self.width - 1);
        let x2c = x2.clamp(0, self.width - 1);
        let y1c = y1.clamp(0, self.height - 1);
        let y2c = y2.clamp(0, self.height - 1);

        let (x_start, x_end) = if x1c <= x2c { (x1c, x2c) } else { (x2c, x1c) };
        let (y_start, y_end) = if y1c <= y2c { (y1c, y2c) } else { (y2c, y1c) };

        let mut color = Rgb8::default();
        for y in y_start..=y_end {
            for x in x_start..=x_end {
                if shader.shade(&mut color, x, y) {
                    self.surface.pixel(color, x, y);
                }
            }
        }
    }

    /// Rasterize a projected line with screen-plane clipping.
    pub fn raster_line_3d<S: PixelShader>(
        &mut self,
        start: Vertex16,
        end: Vertex16,
        shader: &mut S,
    ) {
        let in1 = start.z >= 0;
        let in2 = end.z >= 0;

        if !in1 && !in2 {
            // Both endpoints behind the screen plane.
            return;
        }

        let (mut s, mut e) = (start, end);
        if !in1 || !in2 {
            // Cut the segment at z = 0 and keep the front part.
            let (front, back) = if in1 { (start, end) } else { (end, start) };
            let dz = (front.z - back.z) as i32;
            if dz == 0 {
                return;
            }

            let ix = front.x + ((back.x - front.x) as i32 * front.z as i32 / dz) as i16;
            let iy = front.y + ((back.y - front.y) as i32 * front.z as i32 / dz) as i16;

            if in1 {
                e = Vertex16::new(ix, iy, 0);
            } else {
                s = Vertex16::new(ix, iy, 0);
            }
        }

        self.raster_line(s.x, s.y, e.x, e.y, shader);
    }

    /// Rasterize a projected triangle against the screen plane.
    ///
    /// As with [`WindowRasterizer::draw_triangle_3d`], triangles straddling
    /// `z = 0` are skipped rather than split.
    pub fn raster_triangle_3d<S: PixelShader>(
        &mut self,
        a: Vertex16,
        b: Vertex16,
        c: Vertex16,
        shader: &mut S,
    ) {
        if a.z == b.z && a.z == c.z {
            if a.z > 0 {
                self.raster_triangle(a.x, a.y, b.x, b.y, c.x, c.y, shader);
            }
            return;
        }

        let in_front = (a.z > 0) as u8 + (b.z > 0) as u8 + (c.z > 0) as u8;
        if in_front == 3 {
            self.raster_triangle(a.x, a.y, b.x, b.y, c.x, c.y, shader);
        }
        // 1 or 2 vertices behind the screen plane: skipped.
    }

    /// Diagonal line rasterization, both endpoints included.
    fn bresenham_line<S: PixelShader>(
        &mut self,
        mut x1: i16,
        mut y1: i16,
        x2: i16,
        y2: i16,
        shader: &mut S,
    ) {
        let dx = (x2 - x1).abs();
        let sx: i16 = if x1 < x2 { 1 } else { -1 };
        let dy = -(y2 - y1).abs();
        let sy: i16 = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut color = Rgb8::default();
        loop {
            if shader.shade(&mut color, x1, y1) {
                self.surface.pixel(color, x1, y1);
            }
            if x1 == x2 && y1 == y2 {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x1 += sx;
            }
            if doubled <= dx {
                err += dx;
                y1 += sy;
            }
        }
    }

    /// Sort the vertices by Y and hand off to the ordered rasterizer.
    #[allow(clippy::too_many_arguments)]
    fn raster_triangle_dispatch<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
        shader: &mut S,
    ) {
        if y1 <= y2 && y1 <= y3 {
            if y2 <= y3 {
                self.raster_triangle_ordered(x1, y1, x2, y2, x3, y3, shader);
            } else {
                self.raster_triangle_ordered(x1, y1, x3, y3, x2, y2, shader);
            }
        } else if y2 <= y1 && y2 <= y3 {
            if y1 <= y3 {
                self.raster_triangle_ordered(x2, y2, x1, y1, x3, y3, shader);
            } else {
                self.raster_triangle_ordered(x2, y2, x3, y3, x1, y1, shader);
            }
        } else if y1 <= y2 {
            self.raster_triangle_ordered(x3, y3, x1, y1, x2, y2, shader);
        } else {
            self.raster_triangle_ordered(x3, y3, x2, y2, x1, y1, shader);
        }
    }

    /// Fill a Y-ordered triangle, splitting general triangles at the middle
    /// vertex's scanline.
    #[allow(clippy::too_many_arguments)]
    fn raster_triangle_ordered<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
        shader: &mut S,
    ) {
        if y1 == y3 {
            // Fully horizontal: one scanline spanning the extremes.
            let x_min = x1.min(x2).min(x3);
            let x_max = x1.max(x2).max(x3);
            let mut color = Rgb8::default();
            for x in x_min..=x_max {
                if shader.shade(&mut color, x, y1) {
                    self.surface.pixel(color, x, y1);
                }
            }
        } else if y2 == y3 {
            self.flat_bottom_fill(x1, y1, x2, y2, x3, y3, shader);
        } else if y1 == y2 {
            self.flat_top_fill(x1, y1, x2, y2, x3, y3, shader);
        } else {
            // Split at the middle vertex's scanline with subpixel precision.
            let dx_total = (x3 - x1) as i32;
            let dy_total = (y3 - y1) as i32;
            let dy_segment = (y2 - y1) as i32;

            let split_x = fixed_round_to_int(
                int_to_fixed(x1) + (int_to_fixed(dx_total as i16) * dy_segment) / dy_total,
            );

            self.flat_bottom_fill(x1, y1, x2, y2, split_x, y2, shader);
            self.flat_top_fill(x2, y2, split_x, y2, x3, y3, shader);
        }
    }

    /// Fill a triangle whose bottom edge is horizontal (`y2 == y3`), apex at
    /// the top.
    #[allow(clippy::too_many_arguments)]
    fn flat_bottom_fill<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
        shader: &mut S,
    ) {
        let slope1 = int_to_fixed(x2 - x1) / (y2 - y1) as i32;
        let slope2 = int_to_fixed(x3 - x1) / (y3 - y1) as i32;
        let mut edge1 = int_to_fixed(x1);
        let mut edge2 = edge1;

        let mut color = Rgb8::default();
        for y in y1..=y2 {
            let mut x_start = fixed_round_to_int(edge1);
            let mut x_end = fixed_round_to_int(edge2);
            if x_start > x_end {
                core::mem::swap(&mut x_start, &mut x_end);
            }

            for x in x_start..=x_end {
                if shader.shade(&mut color, x, y) {
                    self.surface.pixel(color, x, y);
                }
            }

            edge1 += slope1;
            edge2 += slope2;
        }
    }

    /// Fill a triangle whose top edge is horizontal (`y1 == y2`), apex at
    /// the bottom.
    #[allow(clippy::too_many_arguments)]
    fn flat_top_fill<S: PixelShader>(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
        shader: &mut S,
    ) {
        let slope1 = int_to_fixed(x3 - x1) / (y3 - y1) as i32;
        let slope2 = int_to_fixed(x3 - x2) / (y3 - y2) as i32;
        let mut edge1 = int_to_fixed(x3);
        let mut edge2 = edge1;

        let mut color = Rgb8::default();
        let mut y = y3;
        while y >= y1 {
            let mut x_start = fixed_round_to_int(edge1);
            let mut x_end = fixed_round_to_int(edge2);
            if x_start > x_end {
                core::mem::swap(&mut x_start, &mut x_end);
            }

            for x in x_start..=x_end {
                if shader.shade(&mut color, x, y) {
                    self.surface.pixel(color, x, y);
                }
            }

            edge1 -= slope1;
            edge2 -= slope2;
            y -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MockSurface, SurfaceCall};

    fn pixels(surface: &MockSurface) -> Vec<(i16, i16)> {
        surface
            .calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Pixel { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn raster_line_visits_both_endpoints() {
        let mut surface = MockSurface::new(64, 64);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            rasterizer.raster_line(2, 3, 10, 8, &mut |color: &mut Rgb8, _x, _y| {
                *color = Rgb8::WHITE;
                true
            });
        }
        let drawn = pixels(&surface);
        assert!(drawn.contains(&(2, 3)));
        assert!(drawn.contains(&(10, 8)));
        for (x, y) in drawn {
            assert!((0..64).contains(&x) && (0..64).contains(&y));
        }
    }

    #[test]
    fn raster_line_clips_and_never_escapes() {
        let mut surface = MockSurface::new(16, 16);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            rasterizer.raster_line(-10, -5, 30, 25, &mut |color: &mut Rgb8, _x, _y| {
                *color = Rgb8::WHITE;
                true
            });
        }
        let drawn = pixels(&surface);
        assert!(!drawn.is_empty());
        for (x, y) in drawn {
            assert!((0..16).contains(&x) && (0..16).contains(&y));
        }
    }

    #[test]
    fn raster_shader_can_reject_pixels() {
        let mut surface = MockSurface::new(32, 32);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            // Checkerboard rejection.
            rasterizer.raster_rectangle(0, 0, 7, 7, &mut |color: &mut Rgb8, x, y| {
                *color = Rgb8::WHITE;
                (x + y) % 2 == 0
            });
        }
        assert_eq!(surface.draw_call_count(), 32);
    }

    #[test]
    fn raster_triangle_covers_interior() {
        let mut surface = MockSurface::new(32, 32);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            rasterizer.raster_triangle(2, 2, 20, 2, 2, 20, &mut |color: &mut Rgb8, _x, _y| {
                *color = Rgb8::WHITE;
                true
            });
        }
        let drawn = pixels(&surface);
        // Corners and an interior pixel.
        assert!(drawn.contains(&(2, 2)));
        assert!(drawn.contains(&(8, 8)));
        // Nothing far past the hypotenuse.
        assert!(!drawn.contains(&(20, 20)));
        for (x, y) in drawn {
            assert!((0..32).contains(&x) && (0..32).contains(&y));
        }
    }

    #[test]
    fn raster_triangle_fills_between_its_edges() {
        let mut surface = MockSurface::new(64, 64);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            rasterizer.raster_triangle(10, 5, 30, 15, 15, 30, &mut |color: &mut Rgb8, _x, _y| {
                *color = Rgb8::WHITE;
                true
            });
        }
        let drawn = pixels(&surface);
        // Every scanline between the extremes gets at least one pixel.
        for y in 5..=30 {
            assert!(drawn.iter().any(|&(_, py)| py == y), "row {y} empty");
        }
    }

    #[test]
    fn raster_triangle_clipped_stays_inside() {
        let mut surface = MockSurface::new(24, 24);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            rasterizer.raster_triangle(-20, 4, 40, 4, 12, 40, &mut |color: &mut Rgb8, _x, _y| {
                *color = Rgb8::WHITE;
                true
            });
        }
        let drawn = pixels(&surface);
        assert!(!drawn.is_empty());
        for (x, y) in drawn {
            assert!((0..24).contains(&x) && (0..24).contains(&y));
        }
    }

    #[test]
    fn raster_line_3d_cuts_behind_screen() {
        let mut surface = MockSurface::new(64, 64);
        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            rasterizer.raster_line_3d(
                Vertex16::new(0, 10, 8),
                Vertex16::new(40, 10, -8),
                &mut |color: &mut Rgb8, _x, _y| {
                    *color = Rgb8::WHITE;
                    true
                },
            );
        }
        let drawn = pixels(&surface);
        assert!(drawn.contains(&(0, 10)));
        assert!(drawn.contains(&(20, 10)));
        assert!(!drawn.iter().any(|&(x, _)| x > 20));
    }
}
