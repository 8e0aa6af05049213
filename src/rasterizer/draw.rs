//! Direct drawing: whole primitives forwarded to the surface after window
//! clipping.

use crate::color::Rgb8;
use crate::vertex::Vertex16;

use super::clip::{clip_endpoint_to_window, clip_triangle_to_window, compute_outcode, Point2d};
use super::WindowRasterizer;

impl WindowRasterizer<'_> {
    /// Draw a clipped line.
    ///
    /// Trivial-rejects segments whose endpoints share an outcode bit, clips
    /// the out-of-window endpoints, and collapses degenerate results to a
    /// single pixel.
    pub fn draw_line(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16) {
        let in1 = self.is_inside_window(x1, y1);
        let in2 = self.is_inside_window(x2, y2);

        let (mut x1c, mut y1c, mut x2c, mut y2c) = (x1, y1, x2, y2);

        if in1 && in2 {
            // Whole line is inside the window.
        } else if in1 {
            clip_endpoint_to_window(&mut x2c, &mut y2c, x1c, y1c, self.width, self.height);
            if !self.is_inside_window(x2c, y2c) {
                return;
            }
        } else if in2 {
            clip_endpoint_to_window(&mut x1c, &mut y1c, x2c, y2c, self.width, self.height);
            if !self.is_inside_window(x1c, y1c) {
                return;
            }
        } else {
            // Both endpoints outside: reject when both sit past the same
            // window edge, otherwise try clipping each toward the other.
            let out1 = compute_outcode(x1, y1, self.width, self.height);
            let out2 = compute_outcode(x2, y2, self.width, self.height);
            if out1 & out2 != 0 {
                return;
            }

            clip_endpoint_to_window(&mut x1c, &mut y1c, x2, y2, self.width, self.height);
            clip_endpoint_to_window(&mut x2c, &mut y2c, x1, y1, self.width, self.height);

            if !self.is_inside_window(x1c, y1c) || !self.is_inside_window(x2c, y2c) {
                // No visible segment after clipping.
                return;
            }
        }

        if x1c == x2c && y1c == y2c {
            self.surface.pixel(color, x1c, y1c);
        } else {
            self.surface.line(color, x1c, y1c, x2c, y2c);
        }
    }

    /// Draw a filled, window-clipped triangle.
    ///
    /// Clips with Sutherland–Hodgman, collapses degenerate polygons to a
    /// point or line, and fan-triangulates the up-to-six-vertex result.
    pub fn draw_triangle(
        &mut self,
        color: Rgb8,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
    ) {
        // Fast path: fully inside.
        if self.is_inside_window(x1, y1)
            && self.is_inside_window(x2, y2)
            && self.is_inside_window(x3, y3)
        {
            self.surface.triangle_fill(color, x1, y1, x2, y2, x3, y3);
            return;
        }

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
                self.surface.pixel(color, polygon[0].x, polygon[0].y);
            }
            2 => {
                if polygon[0] == polygon[1] {
                    self.surface.pixel(color, polygon[0].x, polygon[0].y);
                } else {
                    self.surface
                        .line(color, polygon[0].x, polygon[0].y, polygon[1].x, polygon[1].y);
                }
            }
            _ => {
                // Convex polygon; fan out from the first vertex, skipping
                // zero-area slivers.
                let anchor = polygon[0];
                for i in 1..count - 1 {
                    let b = polygon[i];
                    let c = polygon[i + 1];
                    let area2 = (b.x - anchor.x) as i32 * (c.y - anchor.y) as i32
                        - (c.x - anchor.x) as i32 * (b.y - anchor.y) as i32;
                    if area2 != 0 {
                        self.surface
                            .triangle_fill(color, anchor.x, anchor.y, b.x, b.y, c.x, c.y);
                    }
                }
            }
        }
    }

    /// Draw a filled rectangle cropped to the window, collapsing degenerate
    /// spans to a line or pixel.
    pub fn draw_rectangle(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16) {
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

        if x1c == x2c {
            if y1c == y2c {
                self.surface.pixel(color, x1c, y1c);
            } else {
                self.surface.line(color, x1c, y1c, x1c, y2c);
            }
        } else if y1c == y2c {
            self.surface.line(color, x1c, y1c, x2c, y1c);
        } else {
            self.surface.rectangle_fill(color, x1c, y1c, x2c, y2c);
        }
    }

    /// Draw a projected point when it lies in front of the screen plane.
    pub fn draw_point_3d(&mut self, color: Rgb8, point: Vertex16) {
        if point.z >= 0 {
            self.draw_pixel(color, point.x, point.y);
        }
    }

    /// Draw a projected line, clipping against the `z = 0` screen plane.
    ///
    /// Fully-behind segments are skipped; fully-in-front segments delegate to
    /// the 2D path; straddling segments are cut at `z = 0` with integer
    /// interpolation and only the front part is drawn.
    pub fn draw_line_3d(&mut self, color: Rgb8, start: Vertex16, end: Vertex16) {
        if start.z == end.z {
            // Screen-plane line; one endpoint decides visibility.
            if start.z >= 0 {
                self.draw_line(color, start.x, start.y, end.x, end.y);
            }
            return;
        }

        let in_front = (start.z >= 0) as u8 + (end.z >= 0) as u8;
        match in_front {
            0 => {}
            2 => self.draw_line(color, start.x, start.y, end.x, end.y),
            _ => {
                // Keep the visible half: cut at the screen plane and draw
                // from the in-front endpoint to the crossing.
                let (front, back) = if start.z >= 0 {
                    (start, end)
                } else {
                    (end, start)
                };

                let dz = (front.z - back.z) as i32;
                if dz != 0 {
                    let ix =
                        front.x + ((back.x - front.x) as i32 * front.z as i32 / dz) as i16;
                    let iy =
                        front.y + ((back.y - front.y) as i32 * front.z as i32 / dz) as i16;
                    self.draw_line(color, front.x, front.y, ix, iy);
                } else {
                    self.draw_pixel(color, front.x, front.y);
                }
            }
        }
    }

    /// Draw a projected triangle against the screen plane.
    ///
    /// Only the all-behind and all-in-front cases are handled; triangles
    /// straddling `z = 0` are skipped for now rather than split along the
    /// plane.
    pub fn draw_triangle_3d(&mut self, color: Rgb8, a: Vertex16, b: Vertex16, c: Vertex16) {
        if a.z == b.z && a.z == c.z {
            // Screen-plane triangle; one vertex decides visibility.
            if a.z > 0 {
                self.draw_triangle(color, a.x, a.y, b.x, b.y, c.x, c.y);
            }
            return;
        }

        let in_front = (a.z > 0) as u8 + (b.z > 0) as u8 + (c.z > 0) as u8;
        if in_front == 3 {
            self.draw_triangle(color, a.x, a.y, b.x, b.y, c.x, c.y);
        }
        // 1 or 2 vertices behind the screen plane: skipped.
    }
}
