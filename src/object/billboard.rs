//! Axis-aligned billboard render object.

use crate::color::Rgb8;
use crate::fragment::{BillboardFragment, FragmentCollector};
use crate::fixed::Scale16;
use crate::frustum::Frustum;
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::shader::FragmentShader;
use crate::transform::CameraTransform;
use crate::vertex::{distance16, Vertex16, VERTEX16_UNIT};

use super::{BillboardScaleMode, RenderObject};

/// Sentinel meaning "no z override".
const NO_Z_OVERRIDE: i16 = -VERTEX16_UNIT;

/// A single rectangle always centered on its world position and upright in
/// screen space.
///
/// In `WorldSpace` mode the pixel height is measured by projecting a second
/// point one (scaled) height above the anchor and taking the screen distance
/// between the two; width follows from the configured proportion. In
/// `ScreenSpace` mode the height is a fixed pixel count.
pub struct BillboardObject<'a> {
    pub translation: Vertex16,
    pub scale_mode: BillboardScaleMode,
    pub resize: Scale16,

    /// Billboard fragment shader. If unset, fragments are not drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<BillboardFragment>>,

    albedo: Rgb8,
    z_override: i16,

    // width : height proportion.
    proportion: Scale16,
    height: u16,

    // Per-frame state; the proportion and scaled height are latched at the
    // object pass so mid-frame setter calls cannot tear a frame.
    world_position: Vertex16,
    screen_position: Vertex16,
    top: Vertex16,
    height_scaled: u16,
    proportion_latched: Scale16,
    primitive_z: i16,

    top_left_x: i16,
    top_left_y: i16,
    bottom_right_x: i16,
    bottom_right_y: i16,
}

impl<'a> BillboardObject<'a> {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            translation: Vertex16::ZERO,
            scale_mode: BillboardScaleMode::default(),
            resize: Scale16::ONE,
            fragment_shader: None,
            albedo: Rgb8::WHITE,
            z_override: NO_Z_OVERRIDE,
            proportion: Scale16::factor(width.max(1), height.max(1)),
            height: height.max(1),
            world_position: Vertex16::ZERO,
            screen_position: Vertex16::ZERO,
            top: Vertex16::ZERO,
            height_scaled: 0,
            proportion_latched: Scale16::ONE,
            primitive_z: -VERTEX16_UNIT,
            top_left_x: 0,
            top_left_y: 0,
            bottom_right_x: 0,
            bottom_right_y: 0,
        }
    }

    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        self.proportion = Scale16::factor(width.max(1), height.max(1));
        self.height = height.max(1);
    }

    pub fn set_albedo(&mut self, albedo: Rgb8) {
        self.albedo = albedo;
    }

    pub fn albedo(&self) -> Rgb8 {
        self.albedo
    }

    /// Force the depth key, e.g. to pin a marker in front of the scene.
    pub fn set_z_override(&mut self, z: i16) {
        self.z_override = z;
    }

    pub fn clear_z_override(&mut self) {
        self.z_override = NO_Z_OVERRIDE;
    }
}

impl RenderObject for BillboardObject<'_> {
    fn object_shade(&mut self, frustum: &Frustum) {
        self.world_position = self.translation;

        self.height_scaled = self.resize.scale_u16(self.height);
        self.proportion_latched = self.proportion;

        // Frustum culling on the center point alone.
        self.primitive_z = if frustum.is_point_inside(self.world_position) {
            0
        } else {
            -VERTEX16_UNIT
        };
    }

    fn camera_transform(&mut self, transform: &CameraTransform, _vertex_index: u16) -> bool {
        if self.primitive_z < 0 {
            return true;
        }

        self.screen_position = self.world_position;
        transform.apply(&mut self.screen_position);

        // A second point one scaled height above the anchor measures the
        // projected height after projection.
        self.top = Vertex16::new(
            self.screen_position.x,
            self.screen_position.y.saturating_add(self.height_scaled as i16),
            self.screen_position.z,
        );

        if self.height_scaled < 1 {
            self.primitive_z = -VERTEX16_UNIT;
        }

        true
    }

    fn screen_project(&mut self, projector: &ViewportProjector, _vertex_index: u16) -> bool {
        if self.primitive_z >= 0 {
            projector.project(&mut self.screen_position);
            projector.project(&mut self.top);
        }
        true
    }

    fn screen_shade(&mut self, _primitive_index: u16) -> bool {
        if self.primitive_z < 0 {
            return true;
        }

        let height = match self.scale_mode {
            BillboardScaleMode::ScreenSpace => self.height_scaled,
            BillboardScaleMode::WorldSpace => distance16(self.top, self.screen_position),
        };
        let width = self.proportion_latched.scale_u16(height);

        let half_width = (width >> 1) as i16;
        let half_height = (height >> 1) as i16;

        if half_width == 0 || half_height == 0 || self.screen_position.z <= 0 {
            self.primitive_z = -VERTEX16_UNIT;
        } else {
            self.top_left_x = self.screen_position.x.saturating_sub(half_width);
            self.bottom_right_x = self.screen_position.x.saturating_add(half_width);
            self.top_left_y = self.screen_position.y.saturating_sub(half_height);
            self.bottom_right_y = self.screen_position.y.saturating_add(half_height);

            self.primitive_z = self.screen_position.z;
        }

        true
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        if self.primitive_z >= 0 {
            if self.z_override == NO_Z_OVERRIDE {
                collector.add_fragment(0, self.primitive_z);
            } else {
                collector.add_fragment(0, self.z_override);
            }
        }
    }

    fn fragment_shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, primitive_index: u16) {
        if primitive_index != 0 {
            return;
        }
        let Some(fragment_shader) = self.fragment_shader.as_mut() else {
            return;
        };

        let fragment = BillboardFragment {
            top_left_x: self.top_left_x,
            top_left_y: self.top_left_y,
            bottom_right_x: self.bottom_right_x,
            bottom_right_y: self.bottom_right_y,
            z: self.primitive_z,
            red: self.albedo.red(),
            green: self.albedo.green(),
            blue: self.albedo.blue(),
        };

        fragment_shader.shade(rasterizer, &fragment);
    }
}
