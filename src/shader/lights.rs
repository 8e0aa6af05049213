//! The light model and the multi-light scene shader.

use crate::color::Rgb8;
use crate::fixed::{UFraction16, UFraction8};
use crate::vertex::{
    dot16, normalize16, Vertex16, VERTEX16_DOT, VERTEX16_RANGE,
};

use super::{Material, SceneShader};

/// Bit count of a unit-vector dot product.
const DOT_SHIFTS: u32 = VERTEX16_DOT.trailing_zeros();

/// Shifts converting a positive unit dot product into a 16-bit fraction.
const DOT_CONVERT_SHIFTS: u32 = DOT_SHIFTS - UFraction16::SHIFT;

/// Squaring passes narrowing the spot cone response.
const CONE_FOCUS_PASSES: u32 = 3;

/// The kinds of light source available to the scene shader.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    /// Parallel rays, no distance attenuation.
    Directional,
    /// Radiates in all directions from a point, range-attenuated.
    Point,
    /// A range-attenuated cone around a direction.
    Spot,
    /// A point light following the camera position.
    Camera,
    /// Disabled table slot.
    #[default]
    None,
}

/// One light source definition.
#[derive(Copy, Clone, Debug, Default)]
pub struct LightSource {
    /// World-space position. Unused by directional lights.
    pub position: Vertex16,
    /// Normalized orientation: travel direction for directional lights, cone
    /// axis for spot lights. Unused by point and camera lights.
    pub direction: Vertex16,
    /// Squared distance below which the light keeps full intensity.
    pub range_squared_min: u32,
    /// Squared distance beyond which the light has no effect.
    pub range_squared_max: u32,
    pub color: Rgb8,
    /// Spot lights: cone focus. Directional lights: flat diffuse fallback
    /// when no normal is available.
    pub parameter: UFraction16,
    pub kind: LightKind,
}

impl LightSource {
    /// A point light radiating from `position` over the given range.
    pub fn point(color: Rgb8, position: Vertex16, range_min: u16, range_max: u16) -> Self {
        let mut light = Self {
            position,
            color,
            kind: LightKind::Point,
            ..Self::default()
        };
        light.set_range(range_min, range_max);
        light
    }

    /// A directional light traveling along `direction`.
    pub fn directional(color: Rgb8, direction: Vertex16) -> Self {
        let mut light = Self {
            color,
            kind: LightKind::Directional,
            ..Self::default()
        };
        light.set_direction(direction);
        light
    }

    /// A spot light at `position` aimed along `direction`, with `focus`
    /// narrowing the cone.
    pub fn spot(
        color: Rgb8,
        position: Vertex16,
        direction: Vertex16,
        range_min: u16,
        range_max: u16,
        focus: UFraction16,
    ) -> Self {
        let mut light = Self {
            position,
            color,
            parameter: focus,
            kind: LightKind::Spot,
            ..Self::default()
        };
        light.set_direction(direction);
        light.set_range(range_min, range_max);
        light
    }

    /// A light that follows the camera position.
    pub fn camera(color: Rgb8, range_min: u16, range_max: u16) -> Self {
        let mut light = Self {
            color,
            kind: LightKind::Camera,
            ..Self::default()
        };
        light.set_range(range_min, range_max);
        light
    }

    /// Set the attenuation window; full intensity inside `range_min`, no
    /// effect beyond `range_max`.
    pub fn set_range(&mut self, range_min: u16, range_max: u16) {
        self.range_squared_min = range_min as u32 * range_min as u32;
        self.range_squared_max =
            (range_max as u32 * range_max as u32).max(self.range_squared_min);
    }

    /// Set and normalize the orientation vector.
    pub fn set_direction(&mut self, direction: Vertex16) {
        self.direction = direction;
        normalize16(&mut self.direction);
    }
}

/// Lambert diffuse fraction from a normal and a normalized illumination
/// vector.
pub fn diffuse_fraction(normal: Vertex16, illumination: Vertex16) -> UFraction16 {
    let dot = dot16(illumination, normal);
    if dot > 0 {
        UFraction16((dot as u32 >> DOT_CONVERT_SHIFTS) as u16)
    } else {
        UFraction16::ZERO
    }
}

/// Blinn-Phong specular fraction from normalized normal and half vectors.
///
/// The highlight narrows by repeated squaring (an x^8 lobe); `focus` blends
/// between the wide and narrowed responses.
pub fn specular_fraction(normal: Vertex16, half_vector: Vertex16, focus: UFraction8) -> UFraction16 {
    let dot = dot16(half_vector, normal);
    if dot <= 0 {
        return UFraction16::ZERO;
    }

    let wide = (dot as u32 >> DOT_CONVERT_SHIFTS).min(UFraction16::ONE.0 as u32);
    let mut narrow = wide;
    narrow = (narrow * narrow) >> UFraction16::SHIFT;
    narrow = (narrow * narrow) >> UFraction16::SHIFT;
    narrow = (narrow * narrow) >> UFraction16::SHIFT;
    narrow = narrow.min(UFraction16::ONE.0 as u32);

    UFraction16(
        focus.scale_u16(narrow as u16) + focus.inverse().scale_u16(wide as u16),
    )
}

/// Spot cone fraction from the normalized illumination vector and cone axis;
/// `focus` blends between wide and narrow cone responses.
pub fn cone_fraction(
    illumination: Vertex16,
    light_direction: Vertex16,
    focus: UFraction16,
) -> UFraction16 {
    // Cone alignment: larger means further inside the cone.
    let cone_dot = -dot16(light_direction, illumination);
    if cone_dot <= 0 {
        return UFraction16::ZERO;
    }

    let wide = (cone_dot as u32 >> DOT_CONVERT_SHIFTS).min(UFraction16::ONE.0 as u32) as u16;
    let mut narrow = wide as u32;
    for _ in 0..CONE_FOCUS_PASSES {
        narrow = (narrow * narrow) >> UFraction16::SHIFT;
    }

    UFraction16(
        focus.narrow().scale_u16(narrow as u16)
            + focus.narrow().inverse().scale_u16(wide),
    )
}

/// Distance attenuation from a squared distance: one inside the minimum
/// range, zero beyond the maximum, a linear falloff between.
pub fn proximity_fraction(light: &LightSource, squared_distance: u32) -> UFraction16 {
    if squared_distance >= light.range_squared_max {
        UFraction16::ZERO
    } else if squared_distance < light.range_squared_min {
        UFraction16::ONE
    } else {
        UFraction16::ONE
            .0
            .checked_sub(
                UFraction16::scalar(
                    squared_distance - light.range_squared_min,
                    light.range_squared_max - light.range_squared_min,
                )
                .0,
            )
            .map(UFraction16)
            .unwrap_or(UFraction16::ZERO)
    }
}

/// Attenuation computed from the unnormalized fragment-to-light vector.
fn proximity_fraction_of(light: &LightSource, vector: Vertex16) -> UFraction16 {
    let squared = (vector.x as i32 * vector.x as i32) as u32
        + (vector.y as i32 * vector.y as i32) as u32
        + (vector.z as i32 * vector.z as i32) as u32;
    proximity_fraction(
        light,
        squared.clamp(light.range_squared_min, light.range_squared_max),
    )
}

/// Saturating RGB accumulator for per-light contributions.
struct ShadeAccumulator {
    red: u8,
    green: u8,
    blue: u8,
}

impl ShadeAccumulator {
    fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    fn add(&mut self, red: u8, green: u8, blue: u8) {
        self.red = self.red.saturating_add(red);
        self.green = self.green.saturating_add(green);
        self.blue = self.blue.saturating_add(blue);
    }

    fn color(&self) -> Rgb8 {
        Rgb8::new(self.red, self.green, self.blue)
    }
}

/// Blend `toward` into `from` by `fraction`.
#[inline]
fn interpolate8(fraction: UFraction8, toward: u8, from: u8) -> u8 {
    fraction.scale_u8(toward) + fraction.inverse().scale_u8(from)
}

/// Scene shader accumulating emissive + ambient, then per-light diffuse and
/// specular terms for every configured light source.
///
/// Specular requires a camera position (for the view vector) and a non-zero
/// normal; without either, the affected terms degrade gracefully.
#[derive(Clone, Debug)]
pub struct LightsShader<'a> {
    lights: &'a [LightSource],

    /// World-space camera position, refreshed by the caller each frame.
    /// Without it, specular highlights and camera lights are skipped.
    pub camera_position: Option<Vertex16>,

    /// Ambient light color.
    pub ambient: Rgb8,

    #[cfg(feature = "lights-shader-debug")]
    pub ambient_enabled: bool,
    #[cfg(feature = "lights-shader-debug")]
    pub emissive_enabled: bool,
    #[cfg(feature = "lights-shader-debug")]
    pub diffuse_enabled: bool,
    #[cfg(feature = "lights-shader-debug")]
    pub specular_enabled: bool,
}

impl Default for LightsShader<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LightsShader<'a> {
    pub fn new() -> Self {
        Self {
            lights: &[],
            camera_position: None,
            ambient: Rgb8::BLACK,
            #[cfg(feature = "lights-shader-debug")]
            ambient_enabled: true,
            #[cfg(feature = "lights-shader-debug")]
            emissive_enabled: true,
            #[cfg(feature = "lights-shader-debug")]
            diffuse_enabled: true,
            #[cfg(feature = "lights-shader-debug")]
            specular_enabled: true,
        }
    }

    /// Borrow the active light table for this shader's lifetime.
    pub fn set_lights(&mut self, lights: &'a [LightSource]) {
        self.lights = lights;
    }

    #[inline]
    fn ambient_on(&self) -> bool {
        #[cfg(feature = "lights-shader-debug")]
        return self.ambient_enabled;
        #[cfg(not(feature = "lights-shader-debug"))]
        {
            true
        }
    }

    #[inline]
    fn emissive_on(&self) -> bool {
        #[cfg(feature = "lights-shader-debug")]
        return self.emissive_enabled;
        #[cfg(not(feature = "lights-shader-debug"))]
        {
            true
        }
    }

    #[inline]
    fn diffuse_on(&self) -> bool {
        #[cfg(feature = "lights-shader-debug")]
        return self.diffuse_enabled;
        #[cfg(not(feature = "lights-shader-debug"))]
        {
            true
        }
    }

    #[inline]
    fn specular_on(&self) -> bool {
        #[cfg(feature = "lights-shader-debug")]
        return self.specular_enabled;
        #[cfg(not(feature = "lights-shader-debug"))]
        {
            true
        }
    }
}

impl SceneShader for LightsShader<'_> {
    fn lit_color(
        &self,
        albedo: Rgb8,
        material: &Material,
        position: Vertex16,
        normal: Vertex16,
    ) -> Rgb8 {
        let albedo_r = albedo.red();
        let albedo_g = albedo.green();
        let albedo_b = albedo.blue();

        // Seed with ambient, modulated by the material's diffuse response.
        let mut shade = if self.ambient_on() {
            ShadeAccumulator::new(
                material.diffuse.scale_u8(self.ambient.red()),
                material.diffuse.scale_u8(self.ambient.green()),
                material.diffuse.scale_u8(self.ambient.blue()),
            )
        } else {
            ShadeAccumulator::new(0, 0, 0)
        };

        // Gloss factor narrows specular highlights on non-metallic surfaces.
        let gloss = material.metallic.inverse();

        if material.emissive > UFraction8::ZERO && self.emissive_on() {
            shade.add(
                material.emissive.scale_u8(albedo_r),
                material.emissive.scale_u8(albedo_g),
                material.emissive.scale_u8(albedo_b),
            );
        }

        let has_normal = normal != Vertex16::ZERO;

        for light in self.lights {
            if light.color.is_black() || light.kind == LightKind::None {
                continue;
            }

            let light_r = light.color.red();
            let light_g = light.color.green();
            let light_b = light.color.blue();

            // Albedo modulated by the light color.
            let lit_r = ((light_r as u16 * albedo_r as u16) >> 8) as u8;
            let lit_g = ((light_g as u16 * albedo_g as u16) >> 8) as u8;
            let lit_b = ((light_b as u16 * albedo_b as u16) >> 8) as u8;

            // Illumination vector L toward the light, plus attenuation.
            let mut proximity = UFraction16::ONE;
            let mut illumination;
            match light.kind {
                LightKind::Point | LightKind::Spot => {
                    illumination = Vertex16::new(
                        light.position.x.saturating_sub(position.x),
                        light.position.y.saturating_sub(position.y),
                        light.position.z.saturating_sub(position.z),
                    );

                    // Distance falloff before normalization.
                    proximity = proximity_fraction_of(light, illumination);
                    if proximity == UFraction16::ZERO {
                        continue;
                    }

                    normalize16(&mut illumination);
                }
                LightKind::Directional => {
                    // Direction is normalized at configuration; L = -dir.
                    illumination = Vertex16::new(
                        -light.direction.x,
                        -light.direction.y,
                        -light.direction.z,
                    );
                }
                LightKind::Camera => {
                    // A point light riding the camera. Needs the camera
                    // position.
                    let Some(camera) = self.camera_position else {
                        continue;
                    };
                    illumination = Vertex16::new(
                        camera.x.saturating_sub(position.x),
                        camera.y.saturating_sub(position.y),
                        camera.z.saturating_sub(position.z),
                    );

                    proximity = proximity_fraction_of(light, illumination);
                    if proximity == UFraction16::ZERO {
                        continue;
                    }

                    normalize16(&mut illumination);
                }
                LightKind::None => continue,
            }

            // Half vector H = normalize(L + V); only needed for specular,
            // which requires a view vector.
            let mut half_vector = Vertex16::ZERO;
            if has_normal && material.specular > UFraction8::ZERO {
                if let Some(camera) = self.camera_position {
                    let mut view = Vertex16::new(
                        camera.x.saturating_sub(position.x),
                        camera.y.saturating_sub(position.y),
                        camera.z.saturating_sub(position.z),
                    );
                    normalize16(&mut view);

                    half_vector = Vertex16::new(
                        ((illumination.x as i32 + view.x as i32) >> 1) as i16,
                        ((illumination.y as i32 + view.y as i32) >> 1) as i16,
                        ((illumination.z as i32 + view.z as i32) >> 1) as i16,
                    );
                    normalize16(&mut half_vector);
                }
            }

            // Diffuse and specular weights per light kind.
            let mut diffuse_weight;
            let mut specular_weight;
            match light.kind {
                LightKind::Point | LightKind::Camera => {
                    if has_normal {
                        diffuse_weight = proximity
                            .scale_fraction(diffuse_fraction(normal, illumination));
                        specular_weight = proximity
                            .scale_fraction(specular_fraction(normal, half_vector, gloss));
                    } else {
                        // No normal: attenuation is the whole response.
                        diffuse_weight = proximity;
                        specular_weight = proximity;
                    }
                }
                LightKind::Spot => {
                    let cone = cone_fraction(illumination, light.direction, light.parameter);
                    if has_normal {
                        diffuse_weight = cone.scale_fraction(
                            proximity.scale_fraction(diffuse_fraction(normal, illumination)),
                        );
                        specular_weight = cone.scale_fraction(
                            proximity
                                .scale_fraction(specular_fraction(normal, half_vector, gloss)),
                        );
                    } else {
                        diffuse_weight = cone;
                        specular_weight = cone;
                    }
                }
                LightKind::Directional => {
                    if has_normal {
                        diffuse_weight = diffuse_fraction(normal, illumination);
                        specular_weight = specular_fraction(normal, half_vector, gloss);
                    } else {
                        // Flat fallback diffuse carried in the parameter.
                        diffuse_weight = light.parameter;
                        specular_weight = UFraction16::ZERO;
                    }
                }
                LightKind::None => continue,
            }

            // Weight by the material response.
            diffuse_weight = UFraction16(material.diffuse.scale_u16(diffuse_weight.0));
            specular_weight = UFraction16(material.specular.scale_u16(specular_weight.0));

            if diffuse_weight > UFraction16::ZERO && self.diffuse_on() {
                shade.add(
                    diffuse_weight.scale_u8(lit_r),
                    diffuse_weight.scale_u8(lit_g),
                    diffuse_weight.scale_u8(lit_b),
                );
            }

            if specular_weight > UFraction16::ZERO && self.specular_on() {
                // Metallic surfaces tint the highlight toward the albedo.
                let glassy = UFraction8(specular_weight.narrow().scale_u8(gloss.0));
                shade.add(
                    specular_weight.scale_u8(interpolate8(glassy, lit_r, light_r)),
                    specular_weight.scale_u8(interpolate8(glassy, lit_g, light_g)),
                    specular_weight.scale_u8(interpolate8(glassy, lit_b, light_b)),
                );
            }
        }

        shade.color()
    }
}

/// Largest useful attenuation range.
pub const LIGHT_RANGE_MAX: u16 = VERTEX16_RANGE as u16;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::VERTEX16_UNIT;

    fn shader<'a>(lights: &'a [LightSource]) -> LightsShader<'a> {
        let mut shader = LightsShader::new();
        shader.set_lights(lights);
        shader
    }

    #[test]
    fn directional_light_full_and_grazing() {
        let lights = [LightSource::directional(
            Rgb8::WHITE,
            Vertex16::new(0, 0, -VERTEX16_UNIT),
        )];
        let shader = shader(&lights);

        // Facing the light: diffuse is full, so the lit color reaches the
        // albedo (within light-color modulation rounding).
        let facing = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::ZERO,
            Vertex16::new(0, 0, VERTEX16_UNIT),
        );
        assert!(facing.red() >= 250, "{facing:?}");
        assert_eq!(facing.red(), facing.green());
        assert_eq!(facing.green(), facing.blue());

        // Perpendicular normal: ambient only (black here).
        let grazing = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::ZERO,
            Vertex16::new(VERTEX16_UNIT, 0, 0),
        );
        assert_eq!(grazing, Rgb8::BLACK);
    }

    #[test]
    fn ambient_is_modulated_by_diffuse() {
        let mut shader = LightsShader::new();
        shader.ambient = Rgb8::new(64, 64, 64);
        let color = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::ZERO,
            Vertex16::new(0, 0, VERTEX16_UNIT),
        );
        assert_eq!(color, Rgb8::new(64, 64, 64));

        let half = Material::new(
            UFraction8::ZERO,
            UFraction8(64),
            UFraction8::ZERO,
            UFraction8::ZERO,
        );
        let color = shader.lit_color(
            Rgb8::WHITE,
            &half,
            Vertex16::ZERO,
            Vertex16::new(0, 0, VERTEX16_UNIT),
        );
        assert_eq!(color, Rgb8::new(32, 32, 32));
    }

    #[test]
    fn point_light_attenuates_with_distance() {
        let lights = [LightSource::point(
            Rgb8::WHITE,
            Vertex16::new(0, 0, 0),
            1024,
            8192,
        )];
        let shader = shader(&lights);
        let normal = Vertex16::new(0, 0, -VERTEX16_UNIT);

        let near = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(0, 0, 512),
            normal,
        );
        let far = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(0, 0, 6144),
            normal,
        );
        let beyond = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(0, 0, 9000),
            normal,
        );

        assert!(near.red() > far.red(), "{near:?} vs {far:?}");
        assert!(far.red() > 0);
        assert_eq!(beyond, Rgb8::BLACK);
    }

    #[test]
    fn emissive_adds_back_the_albedo() {
        let shader = LightsShader::new();
        let glowing = Material::new(
            UFraction8::ONE,
            UFraction8::ZERO,
            UFraction8::ZERO,
            UFraction8::ZERO,
        );
        let color = shader.lit_color(
            Rgb8::new(200, 100, 50),
            &glowing,
            Vertex16::ZERO,
            Vertex16::ZERO,
        );
        assert_eq!(color, Rgb8::new(200, 100, 50));
    }

    #[test]
    fn specular_needs_camera_and_normal() {
        let lights = [LightSource::directional(
            Rgb8::WHITE,
            Vertex16::new(0, 0, -VERTEX16_UNIT),
        )];
        let shiny = Material::new(
            UFraction8::ZERO,
            UFraction8::ZERO,
            UFraction8::ONE,
            UFraction8::ZERO,
        );
        let normal = Vertex16::new(0, 0, VERTEX16_UNIT);

        let mut with_camera = shader(&lights);
        with_camera.camera_position = Some(Vertex16::new(0, 0, 2 * VERTEX16_UNIT));
        let lit = with_camera.lit_color(Rgb8::WHITE, &shiny, Vertex16::ZERO, normal);
        assert!(lit.red() > 100, "{lit:?}");

        let without_camera = shader(&lights);
        let unlit = without_camera.lit_color(Rgb8::WHITE, &shiny, Vertex16::ZERO, normal);
        assert_eq!(unlit, Rgb8::BLACK);
    }

    #[test]
    fn spot_cone_cuts_off_sideways_fragments() {
        let lights = [LightSource::spot(
            Rgb8::WHITE,
            Vertex16::new(0, 0, -2 * VERTEX16_UNIT),
            Vertex16::new(0, 0, VERTEX16_UNIT),
            0,
            LIGHT_RANGE_MAX,
            UFraction16::ONE,
        )];
        let shader = shader(&lights);
        let normal = Vertex16::new(0, 0, -VERTEX16_UNIT);

        let on_axis = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(0, 0, VERTEX16_UNIT),
            normal,
        );
        let off_axis = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(6 * VERTEX16_UNIT, 0, 0),
            Vertex16::new(-VERTEX16_UNIT, 0, 0),
        );
        assert!(on_axis.red() > 200, "{on_axis:?}");
        assert!(off_axis.red() < on_axis.red() / 4, "{off_axis:?}");
    }

    #[test]
    fn camera_light_follows_the_camera() {
        let lights = [LightSource::camera(Rgb8::WHITE, 0, 8192)];
        let mut shader = shader(&lights);
        let normal = Vertex16::new(0, 0, -VERTEX16_UNIT);

        // Without a camera position the light contributes nothing.
        let dark = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(0, 0, VERTEX16_UNIT),
            normal,
        );
        assert_eq!(dark, Rgb8::BLACK);

        shader.camera_position = Some(Vertex16::ZERO);
        let lit = shader.lit_color(
            Rgb8::WHITE,
            &Material::DIFFUSE,
            Vertex16::new(0, 0, VERTEX16_UNIT),
            normal,
        );
        assert!(lit.red() > 100, "{lit:?}");
    }
}
