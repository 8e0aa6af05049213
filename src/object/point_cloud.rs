//! Point cloud render object: one fragment per vertex.

use crate::color::Rgb8;
use crate::fragment::{CompactRgb8List, FragmentCollector, PointCloudFragment};
use crate::frustum::Frustum;
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::shader::{FragmentShader, Material, SceneShader};
use crate::transform::CameraTransform;
use crate::vertex::{normalize16, Vertex16, VERTEX16_UNIT};

use super::sources::{
    AlbedoSource, DiffuseMaterialSource, MaterialSource, NoAlbedoSource, NoNormalSource,
    NormalSource, SingleAlbedoSource, SingleMaterialSource, StaticVertexSource, VertexSource,
};
use super::{FaceCulling, FrustumCulling, ObjectTransform, RenderObject};

/// A cloud of shaded points.
///
/// Every vertex is its own primitive: lit in the world pass (radial normal
/// fallback), culled against the screen plane, and emitted as a single
/// fragment. Face culling compares each point's depth against the object
/// center, which hides the far hemisphere of closed shells.
pub struct PointCloudObject<
    'a,
    VS,
    AS = NoAlbedoSource,
    MS = DiffuseMaterialSource,
    NS = NoNormalSource,
    const VERTEX_COUNT: usize = 0,
> {
    pub transform: ObjectTransform,
    pub frustum_culling: FrustumCulling,
    pub face_culling: FaceCulling,

    /// Point fragment shader. If unset, fragments are not drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<PointCloudFragment>>,
    /// Scene lighting shader. If unset, raw albedo is used.
    pub scene_shader: Option<&'a dyn SceneShader>,

    vertex_source: VS,
    albedo_source: AS,
    material_source: MS,
    normal_source: NS,

    vertices: [Vertex16; VERTEX_COUNT],
    primitives: [i16; VERTEX_COUNT],
    light_buffer: CompactRgb8List<VERTEX_COUNT>,

    screen_position: Vertex16,
    vertex_count: u16,

    fragment: PointCloudFragment,
}

impl<
        'a,
        VS: VertexSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        const VERTEX_COUNT: usize,
    > PointCloudObject<'a, VS, AS, MS, NS, VERTEX_COUNT>
{
    pub fn with_sources(
        vertex_source: VS,
        albedo_source: AS,
        material_source: MS,
        normal_source: NS,
    ) -> Self {
        Self {
            transform: ObjectTransform::default(),
            frustum_culling: FrustumCulling::default(),
            face_culling: FaceCulling::NoCulling,
            fragment_shader: None,
            scene_shader: None,
            vertex_source,
            albedo_source,
            material_source,
            normal_source,
            vertices: [Vertex16::ZERO; VERTEX_COUNT],
            primitives: [0; VERTEX_COUNT],
            light_buffer: CompactRgb8List::default(),
            screen_position: Vertex16::ZERO,
            vertex_count: VERTEX_COUNT as u16,
            fragment: PointCloudFragment::default(),
        }
    }

    pub fn albedo_source_mut(&mut self) -> &mut AS {
        &mut self.albedo_source
    }

    pub fn material_source_mut(&mut self) -> &mut MS {
        &mut self.material_source
    }
}

impl<
        'a,
        VS: VertexSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        const VERTEX_COUNT: usize,
    > RenderObject for PointCloudObject<'a, VS, AS, MS, NS, VERTEX_COUNT>
{
    fn object_shade(&mut self, frustum: &Frustum) {
        self.transform.object_shade();
        self.screen_position = self.transform.world_position();

        let mut z_flag = 0;
        if self.frustum_culling.culls_objects()
            && !frustum.is_point_inside(self.transform.world_position())
        {
            z_flag = -VERTEX16_UNIT;
        }

        for i in 0..self.vertex_count {
            self.vertices[i as usize] = self.vertex_source.vertex(i);
            self.primitives[i as usize] = z_flag;
        }
    }

    fn world_transform(&mut self, vertex_index: u16) -> bool {
        if vertex_index >= self.vertex_count {
            return true;
        }
        self.transform
            .transform()
            .apply(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn world_shade(&mut self, frustum: &Frustum, primitive_index: u16) -> bool {
        if primitive_index >= self.vertex_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let position = self.vertices[primitive_index as usize];

        if self.frustum_culling.culls_primitives() && !frustum.is_point_inside(position) {
            self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
            return false;
        }

        let mut color = if AS::HAS_ALBEDOS {
            self.albedo_source.albedo(primitive_index)
        } else {
            Rgb8::WHITE
        };

        if let Some(scene_shader) = self.scene_shader {
            let material = if MS::HAS_MATERIALS {
                self.material_source.material(primitive_index)
            } else {
                Material::DIFFUSE
            };

            let normal = if NS::HAS_NORMALS {
                let mut normal = self.normal_source.normal(primitive_index);
                self.transform.transform().rotate(&mut normal);
                normal
            } else {
                // Radial direction from the object center.
                let center = self.transform.world_position();
                let mut normal = Vertex16::new(
                    position.x.saturating_sub(center.x),
                    position.y.saturating_sub(center.y),
                    position.z.saturating_sub(center.z),
                );
                normalize16(&mut normal);
                normal
            };

            color = scene_shader.lit_color(color, &material, position, normal);
        }

        self.light_buffer.set_color(color, primitive_index);

        false
    }

    fn camera_transform(&mut self, transform: &CameraTransform, vertex_index: u16) -> bool {
        if vertex_index == 0 {
            transform.apply(&mut self.screen_position);
        }
        if vertex_index >= self.vertex_count {
            return true;
        }
        transform.apply(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_project(&mut self, projector: &ViewportProjector, vertex_index: u16) -> bool {
        if vertex_index == 0 {
            projector.project(&mut self.screen_position);
        }
        if vertex_index >= self.vertex_count {
            return true;
        }
        projector.project(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_shade(&mut self, primitive_index: u16) -> bool {
        if primitive_index >= self.vertex_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let z = self.vertices[primitive_index as usize].z;

        // Points on or behind the screen plane are not drawable.
        if z <= 0 {
            self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
            return false;
        }

        let behind_center = z > self.screen_position.z;
        let culled = match self.face_culling {
            FaceCulling::NoCulling => false,
            FaceCulling::BackfaceCulling => behind_center,
            FaceCulling::FrontfaceCulling => !behind_center && z != self.screen_position.z,
        };

        self.primitives[primitive_index as usize] = if culled { -VERTEX16_UNIT } else { z };

        false
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        for i in 0..self.vertex_count {
            let z = self.primitives[i as usize];
            if z >= 0 {
                collector.add_fragment(i, z);
            }
        }
    }

    fn fragment_shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, primitive_index: u16) {
        let Some(fragment_shader) = self.fragment_shader.as_mut() else {
            return;
        };

        let vertex = self.vertices[primitive_index as usize];
        self.fragment.index = primitive_index;
        self.fragment.x = vertex.x;
        self.fragment.y = vertex.y;
        self.fragment.z = self.primitives[primitive_index as usize];

        let color = self.light_buffer.color(primitive_index);
        self.fragment.red = color.red();
        self.fragment.green = color.green();
        self.fragment.blue = color.blue();

        fragment_shader.shade(rasterizer, &self.fragment);
    }
}

/// Point cloud over a borrowed vertex table with one shared albedo and
/// material.
pub type SimplePointCloudObject<'a, const VERTEX_COUNT: usize> = PointCloudObject<
    'a,
    StaticVertexSource<'a>,
    SingleAlbedoSource,
    SingleMaterialSource,
    NoNormalSource,
    VERTEX_COUNT,
>;

impl<'a, const VERTEX_COUNT: usize> SimplePointCloudObject<'a, VERTEX_COUNT> {
    pub fn with_static_tables(vertices: &'a [Vertex16]) -> Self {
        let mut object = Self::with_sources(
            StaticVertexSource::new(vertices),
            SingleAlbedoSource::default(),
            SingleMaterialSource::default(),
            NoNormalSource,
        );
        object.vertex_count = vertices.len().min(VERTEX_COUNT) as u16;
        object
    }

    pub fn set_albedo(&mut self, albedo: Rgb8) {
        self.albedo_source_mut().albedo = albedo;
    }
}
