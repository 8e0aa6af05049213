//! The cooperative render pipeline state machine.
//!
//! One `tick` advances the pipeline by a single unit of work - one object
//! preparation, one vertex, one primitive or one fragment - so the engine
//! can share a thread with everything else on the target. State transitions
//! reset the object/item walk; mutations of the object table abort the
//! frame cleanly back to `CycleStart`.

use crate::fixed::UFraction16;
use crate::fragment::FragmentManager;
use crate::frustum::{frustum_from_camera, Frustum};
use crate::object::RenderObject;
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::stats::Stopwatch;
use crate::surface::OutputSurface;
use crate::transform::{CameraState, CameraTransform};

#[cfg(not(feature = "performance-debug"))]
use crate::stats::RenderStatus as EngineStatus;
#[cfg(feature = "performance-debug")]
use crate::stats::RenderDebugStatus as EngineStatus;

use crate::stats::RenderStatus;
#[cfg(feature = "performance-debug")]
use crate::stats::RenderDebugStatus;

/// Pipeline states, advanced one unit of work per tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EngineState {
    Disabled,
    EngineStart,
    CycleStart,
    ObjectShade,
    VertexShade,
    WorldTransform,
    WorldShade,
    CameraTransform,
    ScreenProject,
    ScreenShade,
    FragmentCollect,
    FragmentSort,
    WaitForSurface,
    Rasterize,
}

/// The render engine: owns the surface and the frame pipeline, borrows the
/// scene.
///
/// Render objects are externally owned; the engine keeps `&mut` references
/// for the `'scene` lifetime and walks them through the pipeline verbs each
/// frame. All buffers are sized by the const parameters; rendering performs
/// no allocation.
pub struct EngineRenderTask<
    'scene,
    S: OutputSurface,
    const MAX_OBJECTS: usize,
    const MAX_FRAGMENTS: usize,
> {
    surface: S,

    objects: [Option<&'scene mut dyn RenderObject>; MAX_OBJECTS],
    object_count: u16,

    fragments: FragmentManager<MAX_FRAGMENTS>,
    projector: ViewportProjector,
    camera: CameraState,
    reverse_camera: CameraTransform,
    frustum: Frustum,

    state: EngineState,
    object_index: u16,
    item_index: u16,

    view_width: i16,
    view_height: i16,

    status: EngineStatus,
    status_copy: EngineStatus,
    frame_watch: Stopwatch,
}

impl<'scene, S: OutputSurface, const MAX_OBJECTS: usize, const MAX_FRAGMENTS: usize>
    EngineRenderTask<'scene, S, MAX_OBJECTS, MAX_FRAGMENTS>
{
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            objects: core::array::from_fn(|_| None),
            object_count: 0,
            fragments: FragmentManager::new(),
            projector: ViewportProjector::default(),
            camera: CameraState::default(),
            reverse_camera: CameraTransform::default(),
            frustum: Frustum::default(),
            state: EngineState::Disabled,
            object_index: 0,
            item_index: 0,
            view_width: 0,
            view_height: 0,
            status: EngineStatus::default(),
            status_copy: EngineStatus::default(),
            frame_watch: Stopwatch::start(),
        }
    }

    /// Enable or disable the engine. Disabling stops the surface.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.state = EngineState::EngineStart;
        } else {
            self.surface.stop();
            self.state = EngineState::Disabled;
        }
    }

    pub fn start(&mut self) {
        self.set_enabled(true);
    }

    pub fn stop(&mut self) {
        self.set_enabled(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.state != EngineState::Disabled
    }

    /// Append a render object. Returns false when the table is full. Adding
    /// mid-frame restarts the cycle so no stage sees a half-walked table.
    pub fn add_object(&mut self, object: &'scene mut dyn RenderObject) -> bool {
        if (self.object_count as usize) >= MAX_OBJECTS {
            log::debug!("render object table full ({MAX_OBJECTS})");
            return false;
        }

        self.objects[self.object_count as usize] = Some(object);
        self.object_count += 1;
        self.restart_cycle();
        true
    }

    /// Drop every object; restarts the cycle when mid-frame.
    pub fn clear_objects(&mut self) {
        self.objects = core::array::from_fn(|_| None);
        self.object_count = 0;
        self.restart_cycle();
    }

    pub fn object_count(&self) -> u16 {
        self.object_count
    }

    /// Mutable access to a registered object between ticks, e.g. for
    /// animation hooks that live on the object.
    pub fn object_mut(&mut self, index: u16) -> Option<&mut dyn RenderObject> {
        match self.objects.get_mut(index as usize) {
            Some(Some(object)) => Some(&mut **object),
            _ => None,
        }
    }

    /// Camera pose driven by the caller; read at every cycle start.
    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn set_fov(&mut self, fov_fraction: UFraction16) {
        self.projector.set_fov(fov_fraction);
    }

    /// Stats of the last completed frame.
    pub fn status(&self) -> RenderStatus {
        #[cfg(feature = "performance-debug")]
        {
            self.status_copy.minimal()
        }
        #[cfg(not(feature = "performance-debug"))]
        {
            self.status_copy
        }
    }

    /// Per-stage stats of the last completed frame.
    #[cfg(feature = "performance-debug")]
    pub fn debug_status(&self) -> RenderDebugStatus {
        self.status_copy
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Advance the pipeline by one unit of work. Returns true while the
    /// engine is enabled.
    ///
    /// Never blocks: when the surface is not ready the tick is a cheap poll
    /// and the caller decides when to tick again.
    pub fn tick(&mut self) -> bool {
        match self.state {
            EngineState::Disabled => return false,
            EngineState::EngineStart => {
                if self.surface.start() {
                    self.state = EngineState::CycleStart;
                } else {
                    log::warn!("output surface failed to start; disabling engine");
                    self.state = EngineState::Disabled;
                    return false;
                }
            }
            EngineState::CycleStart => {
                let watch = Stopwatch::start();
                self.frame_watch = Stopwatch::start();

                self.status.clear();
                let dimensions = self.surface.dimensions();
                self.view_width = dimensions.width;
                self.view_height = dimensions.height;
                self.projector
                    .set_dimensions(dimensions.width as u16, dimensions.height as u16);
                self.fragments.clear();
                self.object_index = 0;
                self.item_index = 0;

                if self.object_count > 0 {
                    self.reverse_camera.set_from_camera(&self.camera);
                    self.frustum = frustum_from_camera(
                        &self.camera,
                        &self.projector,
                        dimensions.width as u16,
                        dimensions.height as u16,
                    );
                    self.state = EngineState::ObjectShade;
                } else {
                    self.state = EngineState::WaitForSurface;
                }

                self.accumulate(EngineState::CycleStart, watch.micros());
            }
            EngineState::ObjectShade => {
                let watch = Stopwatch::start();
                if let Some(object) = self.objects[self.object_index as usize].as_mut() {
                    object.object_shade(&self.frustum);
                }
                self.accumulate(EngineState::ObjectShade, watch.micros());

                self.object_index += 1;
                if self.object_index >= self.object_count {
                    self.object_index = 0;
                    self.item_index = 0;
                    self.state = EngineState::VertexShade;
                }
            }
            EngineState::VertexShade => {
                let watch = Stopwatch::start();
                let done = match self.objects[self.object_index as usize].as_mut() {
                    Some(object) => object.vertex_shade(self.item_index),
                    None => true,
                };
                self.accumulate(EngineState::VertexShade, watch.micros());
                self.advance_walk(done, EngineState::WorldTransform);
            }
            EngineState::WorldTransform => {
                let watch = Stopwatch::start();
                let done = match self.objects[self.object_index as usize].as_mut() {
                    Some(object) => object.world_transform(self.item_index),
                    None => true,
                };
                self.accumulate(EngineState::WorldTransform, watch.micros());
                self.advance_walk(done, EngineState::WorldShade);
            }
            EngineState::WorldShade => {
                let watch = Stopwatch::start();
                let done = match self.objects[self.object_index as usize].as_mut() {
                    Some(object) => object.world_shade(&self.frustum, self.item_index),
                    None => true,
                };
                self.accumulate(EngineState::WorldShade, watch.micros());
                self.advance_walk(done, EngineState::CameraTransform);
            }
            EngineState::CameraTransform => {
                let watch = Stopwatch::start();
                let done = match self.objects[self.object_index as usize].as_mut() {
                    Some(object) => object.camera_transform(&self.reverse_camera, self.item_index),
                    None => true,
                };
                self.accumulate(EngineState::CameraTransform, watch.micros());
                self.advance_walk(done, EngineState::ScreenProject);
            }
            EngineState::ScreenProject => {
                let watch = Stopwatch::start();
                let done = match self.objects[self.object_index as usize].as_mut() {
                    Some(object) => object.screen_project(&self.projector, self.item_index),
                    None => true,
                };
                self.accumulate(EngineState::ScreenProject, watch.micros());
                self.advance_walk(done, EngineState::ScreenShade);
            }
            EngineState::ScreenShade => {
                let watch = Stopwatch::start();
                let done = match self.objects[self.object_index as usize].as_mut() {
                    Some(object) => object.screen_shade(self.item_index),
                    None => true,
                };
                self.accumulate(EngineState::ScreenShade, watch.micros());
                self.advance_walk(done, EngineState::FragmentCollect);
            }
            EngineState::FragmentCollect => {
                let watch = Stopwatch::start();
                self.fragments.prepare_for_object(self.object_index);
                if let Some(object) = self.objects[self.object_index as usize].as_mut() {
                    let mut collector = self.fragments.collector();
                    object.fragment_collect(&mut collector);
                }
                self.accumulate(EngineState::FragmentCollect, watch.micros());

                self.object_index += 1;
                if self.object_index >= self.object_count {
                    self.state = EngineState::FragmentSort;
                }
            }
            EngineState::FragmentSort => {
                let watch = Stopwatch::start();
                self.fragments.sort();
                self.set_fragment_counts();
                self.state = EngineState::WaitForSurface;
                self.accumulate(EngineState::FragmentSort, watch.micros());
            }
            EngineState::WaitForSurface => {
                // Poll; progress resumes once the surface can accept draws.
                let watch = Stopwatch::start();
                if self.surface.is_ready() {
                    self.object_index = 0;
                    self.item_index = 0;
                    self.state = EngineState::Rasterize;
                } else {
                    self.accumulate(EngineState::WaitForSurface, watch.micros());
                }
            }
            EngineState::Rasterize => {
                if self.item_index < self.fragments.count() {
                    let watch = Stopwatch::start();
                    let key = self.fragments.get(self.item_index);
                    let (width, height) = (self.view_width, self.view_height);
                    if let Some(object) = self.objects[key.object_index as usize].as_mut() {
                        let mut rasterizer =
                            WindowRasterizer::with_size(&mut self.surface, width, height);
                        object.fragment_shade(&mut rasterizer, key.primitive_index);
                    }
                    self.item_index += 1;
                    self.accumulate(EngineState::Rasterize, watch.micros());
                } else {
                    self.status.frame_duration = self.frame_watch.micros();
                    self.status_copy = self.status;
                    self.surface.flip();
                    self.state = EngineState::CycleStart;
                }
            }
        }

        true
    }

    /// Run `tick` until `frames` surface flips have happened. Test and tool
    /// helper; production hosts drive `tick` from their scheduler.
    pub fn render_frames(&mut self, frames: usize) {
        let mut remaining = frames;
        while remaining > 0 {
            let presenting = self.state == EngineState::Rasterize
                && self.item_index >= self.fragments.count();
            if !self.tick() {
                break;
            }
            if presenting {
                remaining -= 1;
            }
        }
    }

    /// Walk bookkeeping for the per-object, per-item stages.
    fn advance_walk(&mut self, done: bool, next: EngineState) {
        if done {
            self.item_index = 0;
            self.object_index += 1;
            if self.object_index >= self.object_count {
                self.object_index = 0;
                self.state = next;
            }
        } else {
            self.item_index += 1;
        }
    }

    fn restart_cycle(&mut self) {
        if self.state != EngineState::Disabled && self.state != EngineState::EngineStart {
            self.state = EngineState::CycleStart;
        }
    }

    fn set_fragment_counts(&mut self) {
        self.status.fragments_drawn = self.fragments.count();
        self.status.fragments_dropped = self.fragments.dropped();
        if self.fragments.dropped() > 0 {
            log::trace!(
                "fragment pool saturated: {} dropped",
                self.fragments.dropped()
            );
        }
    }

    #[cfg(feature = "performance-debug")]
    fn accumulate(&mut self, stage: EngineState, micros: u32) {
        match stage {
            EngineState::CycleStart => self.status.frame_preparation += micros,
            EngineState::ObjectShade => {
                self.status.object_shade += micros;
                self.status.object_shades += 1;
            }
            EngineState::VertexShade => {
                self.status.vertex_shade += micros;
                self.status.vertex_shades += 1;
            }
            EngineState::WorldTransform => {
                self.status.world_transform += micros;
                self.status.world_transforms += 1;
            }
            EngineState::WorldShade => {
                self.status.world_shade += micros;
                self.status.world_shades += 1;
            }
            EngineState::CameraTransform => {
                self.status.camera_transform += micros;
                self.status.camera_transforms += 1;
            }
            EngineState::ScreenProject => {
                self.status.screen_project += micros;
                self.status.screen_projects += 1;
            }
            EngineState::ScreenShade => {
                self.status.screen_shade += micros;
                self.status.screen_shades += 1;
            }
            EngineState::FragmentCollect => self.status.fragment_collect += micros,
            EngineState::FragmentSort => self.status.fragment_sort += micros,
            EngineState::WaitForSurface => self.status.rasterize_wait += micros,
            EngineState::Rasterize => self.status.rasterize += micros,
            EngineState::Disabled | EngineState::EngineStart => {}
        }
    }

    #[cfg(not(feature = "performance-debug"))]
    fn accumulate(&mut self, stage: EngineState, micros: u32) {
        match stage {
            EngineState::Rasterize => self.status.rasterize += micros,
            EngineState::WaitForSurface => {}
            _ => self.status.render += micros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb8;
    use crate::object::BackgroundFillObject;
    use crate::shader::fragment::BackgroundFillShader;
    use crate::surface::{MockSurface, SurfaceCall};

    type Engine<'scene> = EngineRenderTask<'scene, MockSurface, 4, 16>;

    #[test]
    fn disabled_engine_does_nothing() {
        let mut engine = Engine::new(MockSurface::new(32, 32));
        assert!(!engine.tick());
        assert!(engine.surface().calls.is_empty());
    }

    #[test]
    fn failed_surface_start_disables() {
        let mut surface = MockSurface::new(32, 32);
        surface.start_result = false;
        let mut engine = Engine::new(surface);
        engine.start();
        assert!(!engine.tick());
        assert!(!engine.is_enabled());
    }

    #[test]
    fn empty_scene_flips_frames() {
        let mut engine = Engine::new(MockSurface::new(32, 32));
        engine.start();
        for _ in 0..16 {
            engine.tick();
        }
        assert!(engine.surface().flip_count() >= 1);
        assert_eq!(engine.surface().draw_call_count(), 0);
    }

    #[test]
    fn wait_for_surface_blocks_without_spinning() {
        let mut surface = MockSurface::new(32, 32);
        surface.ready = false;
        let mut engine = Engine::new(surface);
        engine.start();
        for _ in 0..64 {
            assert!(engine.tick());
        }
        assert_eq!(engine.surface().flip_count(), 0);

        engine.surface_mut().ready = true;
        for _ in 0..8 {
            engine.tick();
        }
        assert!(engine.surface().flip_count() >= 1);
    }

    #[test]
    fn background_object_renders_every_frame() {
        let mut shader = BackgroundFillShader;
        let mut background = BackgroundFillObject::new(Rgb8::new(8, 8, 8));
        background.fragment_shader = Some(&mut shader);

        let mut engine = Engine::new(MockSurface::new(32, 32));
        assert!(engine.add_object(&mut background));
        engine.start();
        engine.render_frames(2);

        let fills = engine
            .surface()
            .calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::RectangleFill { .. }))
            .count();
        assert_eq!(fills, 2);
        assert_eq!(engine.status().fragments_drawn, 1);
    }

    #[test]
    fn object_table_is_bounded() {
        let mut backgrounds: Vec<BackgroundFillObject> = (0..5)
            .map(|_| BackgroundFillObject::new(Rgb8::BLACK))
            .collect();

        let mut engine = Engine::new(MockSurface::new(16, 16));
        let mut added = 0;
        for background in backgrounds.iter_mut() {
            if engine.add_object(background) {
                added += 1;
            }
        }
        assert_eq!(added, 4);
        assert_eq!(engine.object_count(), 4);
    }

    #[test]
    fn clear_objects_restarts_the_cycle() {
        let mut shader = BackgroundFillShader;
        let mut background = BackgroundFillObject::new(Rgb8::BLACK);
        background.fragment_shader = Some(&mut shader);

        let mut engine = Engine::new(MockSurface::new(16, 16));
        engine.add_object(&mut background);
        engine.start();
        // Advance partway into a frame, then clear.
        for _ in 0..3 {
            engine.tick();
        }
        engine.clear_objects();
        engine.render_frames(1);
        assert_eq!(engine.object_count(), 0);
        assert_eq!(engine.status().fragments_drawn, 0);
    }

    #[test]
    fn stop_stops_the_surface() {
        let mut engine = Engine::new(MockSurface::new(16, 16));
        engine.start();
        engine.tick();
        engine.stop();
        assert!(engine
            .surface()
            .calls
            .iter()
            .any(|call| matches!(call, SurfaceCall::Stop)));
        assert!(!engine.tick());
    }
}
