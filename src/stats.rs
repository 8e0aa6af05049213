//! Per-frame render statistics.
//!
//! The minimal status tracks just enough to budget a frame; the
//! `performance-debug` build replaces it with per-stage timings and unit
//! counts.

/// Minimal render information for each frame. Durations are microseconds
/// and zero on builds without a time source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStatus {
    pub frame_duration: u32,
    /// Time spent across the preparation and shading stages.
    pub render: u32,
    /// Time spent rasterizing fragments.
    pub rasterize: u32,
    pub fragments_drawn: u16,
    /// Fragments that did not fit the fragment pool this frame.
    pub fragments_dropped: u16,
}

impl RenderStatus {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Full render information for each frame: per-stage microseconds and the
/// number of work units each stage processed.
#[cfg(feature = "performance-debug")]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderDebugStatus {
    pub frame_duration: u32,
    pub frame_preparation: u32,
    pub object_shade: u32,
    pub vertex_shade: u32,
    pub world_transform: u32,
    pub world_shade: u32,
    pub camera_transform: u32,
    pub screen_project: u32,
    pub screen_shade: u32,
    pub fragment_collect: u32,
    pub fragment_sort: u32,
    pub rasterize_wait: u32,
    pub rasterize: u32,

    pub object_shades: u32,
    pub vertex_shades: u32,
    pub world_transforms: u32,
    pub world_shades: u32,
    pub camera_transforms: u32,
    pub screen_projects: u32,
    pub screen_shades: u32,

    pub fragments_drawn: u16,
    pub fragments_dropped: u16,
}

#[cfg(feature = "performance-debug")]
impl RenderDebugStatus {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Total time across the preparation and shading stages.
    pub fn render_duration(&self) -> u32 {
        self.frame_preparation
            + self.object_shade
            + self.vertex_shade
            + self.world_transform
            + self.world_shade
            + self.camera_transform
            + self.screen_project
            + self.screen_shade
            + self.fragment_collect
            + self.fragment_sort
    }

    /// Collapse into the minimal status shape.
    pub fn minimal(&self) -> RenderStatus {
        RenderStatus {
            frame_duration: self.frame_duration,
            render: self.render_duration(),
            rasterize: self.rasterize,
            fragments_drawn: self.fragments_drawn,
            fragments_dropped: self.fragments_dropped,
        }
    }
}

/// Microsecond stopwatch; measures nothing on builds without `std`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Stopwatch {
    #[cfg(feature = "std")]
    start: std::time::Instant,
}

impl Stopwatch {
    #[inline]
    pub(crate) fn start() -> Self {
        Self {
            #[cfg(feature = "std")]
            start: std::time::Instant::now(),
        }
    }

    #[inline]
    pub(crate) fn micros(&self) -> u32 {
        #[cfg(feature = "std")]
        {
            self.start.elapsed().as_micros().min(u32::MAX as u128) as u32
        }
        #[cfg(not(feature = "std"))]
        {
            0
        }
    }
}
