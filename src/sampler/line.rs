//! Line-segment fraction sampler.

use crate::fixed::{UFraction16, UFraction8};
use crate::vertex::Vertex16;

/// Projects pixels onto a cached line segment, yielding the normalized
/// position of the closest point along it. Used to interpolate color or
/// depth along rasterized edges.
#[derive(Clone, Debug, Default)]
pub struct LineSampler {
    ax: i16,
    ay: i16,
    dx: i16,
    dy: i16,
    length_squared: i32,
}

impl LineSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the segment. Returns false for zero-length lines, which have no
    /// direction to project onto.
    pub fn set_line(&mut self, a: Vertex16, b: Vertex16) -> bool {
        self.ax = a.x;
        self.ay = a.y;
        self.dx = b.x - a.x;
        self.dy = b.y - a.y;
        self.length_squared = self.dx as i32 * self.dx as i32 + self.dy as i32 * self.dy as i32;

        self.length_squared != 0
    }

    /// Position of `(x, y)` along the segment as an 8-bit fraction, clamped
    /// to the endpoints.
    pub fn fraction8(&self, x: i16, y: i16) -> UFraction8 {
        let projected = self.projection(x, y);
        if projected <= 0 {
            UFraction8::ZERO
        } else if projected >= self.length_squared {
            UFraction8::ONE
        } else {
            UFraction8::scalar(projected as u32, self.length_squared as u32)
        }
    }

    /// Position of `(x, y)` along the segment as a 16-bit fraction, clamped
    /// to the endpoints.
    pub fn fraction16(&self, x: i16, y: i16) -> UFraction16 {
        let projected = self.projection(x, y);
        if projected <= 0 {
            UFraction16::ZERO
        } else if projected >= self.length_squared {
            UFraction16::ONE
        } else {
            UFraction16::scalar(projected as u32, self.length_squared as u32)
        }
    }

    #[inline]
    fn projection(&self, x: i16, y: i16) -> i32 {
        let rx = x as i32 - self.ax as i32;
        let ry = y as i32 - self.ay as i32;
        rx * self.dx as i32 + ry * self.dy as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_zero_and_one() {
        let mut sampler = LineSampler::new();
        assert!(sampler.set_line(Vertex16::new(10, 10, 0), Vertex16::new(50, 10, 0)));
        assert_eq!(sampler.fraction16(10, 10), UFraction16::ZERO);
        assert_eq!(sampler.fraction16(50, 10), UFraction16::ONE);
        assert_eq!(sampler.fraction16(30, 10), UFraction16(16384));
        assert_eq!(sampler.fraction8(30, 10), UFraction8(64));
    }

    #[test]
    fn beyond_endpoints_clamps() {
        let mut sampler = LineSampler::new();
        assert!(sampler.set_line(Vertex16::new(0, 0, 0), Vertex16::new(10, 0, 0)));
        assert_eq!(sampler.fraction16(-5, 0), UFraction16::ZERO);
        assert_eq!(sampler.fraction16(25, 0), UFraction16::ONE);
    }

    #[test]
    fn off_axis_pixels_project_onto_the_line() {
        let mut sampler = LineSampler::new();
        assert!(sampler.set_line(Vertex16::new(0, 0, 0), Vertex16::new(20, 0, 0)));
        // A pixel above the midpoint projects to the midpoint.
        assert_eq!(sampler.fraction16(10, 7), UFraction16(16384));
    }

    #[test]
    fn zero_length_is_rejected() {
        let mut sampler = LineSampler::new();
        assert!(!sampler.set_line(Vertex16::new(3, 3, 0), Vertex16::new(3, 3, 5)));
    }
}
