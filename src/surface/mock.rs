//! A recording surface for tests.

use crate::color::Rgb8;

use super::{OutputSurface, SurfaceDimensions};

/// One recorded surface call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceCall {
    Start,
    Stop,
    Flip,
    Pixel {
        color: Rgb8,
        x: i16,
        y: i16,
    },
    Line {
        color: Rgb8,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    },
    TriangleFill {
        color: Rgb8,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        x3: i16,
        y3: i16,
    },
    RectangleFill {
        color: Rgb8,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    },
}

/// A surface that records every call it receives instead of drawing.
///
/// `ready` and `start_result` can be toggled to exercise the engine's
/// WaitForSurface and Disabled paths.
#[derive(Clone, Debug)]
pub struct MockSurface {
    pub width: i16,
    pub height: i16,
    pub ready: bool,
    pub start_result: bool,
    pub calls: Vec<SurfaceCall>,
}

impl MockSurface {
    pub fn new(width: i16, height: i16) -> Self {
        Self {
            width,
            height,
            ready: true,
            start_result: true,
            calls: Vec::new(),
        }
    }

    /// Recorded draw calls, lifecycle events filtered out.
    pub fn draw_calls(&self) -> impl Iterator<Item = &SurfaceCall> {
        self.calls.iter().filter(|call| {
            !matches!(
                call,
                SurfaceCall::Start | SurfaceCall::Stop | SurfaceCall::Flip
            )
        })
    }

    pub fn draw_call_count(&self) -> usize {
        self.draw_calls().count()
    }

    pub fn flip_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Flip))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl OutputSurface for MockSurface {
    fn start(&mut self) -> bool {
        self.calls.push(SurfaceCall::Start);
        self.start_result
    }

    fn stop(&mut self) {
        self.calls.push(SurfaceCall::Stop);
    }

    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn flip(&mut self) {
        self.calls.push(SurfaceCall::Flip);
    }

    fn dimensions(&self) -> SurfaceDimensions {
        SurfaceDimensions {
            width: self.width,
            height: self.height,
            color_depth: 16,
        }
    }

    fn pixel(&mut self, color: Rgb8, x: i16, y: i16) {
        self.calls.push(SurfaceCall::Pixel { color, x, y });
    }

    fn line(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16) {
        self.calls.push(SurfaceCall::Line {
            color,
            x1,
            y1,
            x2,
            y2,
        });
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
        self.calls.push(SurfaceCall::TriangleFill {
            color,
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
        });
    }

    fn rectangle_fill(&mut self, color: Rgb8, x1: i16, y1: i16, x2: i16, y2: i16) {
        self.calls.push(SurfaceCall::RectangleFill {
            color,
            x1,
            y1,
            x2,
            y2,
        });
    }
}
