//! Background fill render object.

use crate::color::Rgb8;
use crate::fragment::{ColorFragment, FragmentCollector};
use crate::rasterizer::WindowRasterizer;
use crate::shader::FragmentShader;
use crate::vertex::VERTEX16_RANGE;

use super::RenderObject;

/// Fills the whole surface at (almost) maximum depth, so everything else
/// paints over it.
///
/// `z_offset` nudges the depth key, letting several backgrounds stack
/// deterministically.
pub struct BackgroundFillObject<'a> {
    pub color: Rgb8,
    pub z_offset: i16,

    /// Background fragment shader. If unset, fragments are not drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<ColorFragment>>,
}

impl<'a> BackgroundFillObject<'a> {
    pub fn new(color: Rgb8) -> Self {
        Self {
            color,
            z_offset: 0,
            fragment_shader: None,
        }
    }

    fn depth_key(&self) -> i16 {
        (VERTEX16_RANGE as i32 + self.z_offset as i32).min(VERTEX16_RANGE as i32) as i16
    }
}

impl RenderObject for BackgroundFillObject<'_> {
    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        if self.fragment_shader.is_some() {
            collector.add_fragment(0, self.depth_key());
        }
    }

    fn fragment_shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, primitive_index: u16) {
        if primitive_index != 0 {
            return;
        }
        let fragment = ColorFragment {
            red: self.color.red(),
            green: self.color.green(),
            blue: self.color.blue(),
            z: self.depth_key(),
        };
        if let Some(fragment_shader) = self.fragment_shader.as_mut() {
            fragment_shader.shade(rasterizer, &fragment);
        }
    }
}
