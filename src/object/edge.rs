//! Edge render objects: indexed line geometry with per-line or per-vertex
//! lighting.

use crate::color::Rgb8;
use crate::fragment::{CompactRgb8List, EdgeLineFragment, EdgeVertexFragment, FragmentCollector};
use crate::frustum::Frustum;
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::shader::{FragmentShader, Material, SceneShader};
use crate::transform::CameraTransform;
use crate::vertex::{average2, normalize16, Vertex16, VERTEX16_UNIT};

use super::sources::{
    AlbedoSource, DiffuseMaterialSource, EdgeSource, MaterialSource, NoAlbedoSource,
    NoNormalSource, NormalSource, SingleAlbedoSource, SingleMaterialSource, StaticEdgeSource,
    StaticVertexSource, VertexSource,
};
use super::{FaceCulling, FrustumCulling, ObjectTransform, RenderObject};

/// Edge object shaded per line.
///
/// An edge's world position is its midpoint; without a normal table the
/// midpoint direction from the object center stands in for the normal.
/// Face culling compares the projected edge depth against the object
/// center's depth, a cheap behind/in-front test for closed wireframes.
pub struct EdgeLineObject<
    'a,
    VS,
    ES,
    AS = NoAlbedoSource,
    MS = DiffuseMaterialSource,
    NS = NoNormalSource,
    const VERTEX_COUNT: usize = 0,
    const EDGE_COUNT: usize = 0,
> {
    pub transform: ObjectTransform,
    pub frustum_culling: FrustumCulling,
    pub face_culling: FaceCulling,

    /// Edge fragment shader. If unset, fragments are not drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<EdgeLineFragment>>,
    /// Scene lighting shader. If unset, raw albedo is used.
    pub scene_shader: Option<&'a dyn SceneShader>,

    vertex_source: VS,
    edge_source: ES,
    albedo_source: AS,
    material_source: MS,
    normal_source: NS,

    vertices: [Vertex16; VERTEX_COUNT],
    primitives: [i16; EDGE_COUNT],
    light_buffer: CompactRgb8List<EDGE_COUNT>,

    // Object center tracked through the camera/projection passes for the
    // depth-based face culling.
    screen_position: Vertex16,

    vertex_count: u16,
    edge_count: u16,

    fragment: EdgeLineFragment,
}

impl<
        'a,
        VS: VertexSource,
        ES: EdgeSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        const VERTEX_COUNT: usize,
        const EDGE_COUNT: usize,
    > EdgeLineObject<'a, VS, ES, AS, MS, NS, VERTEX_COUNT, EDGE_COUNT>
{
    pub fn with_sources(
        vertex_source: VS,
        edge_source: ES,
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
            edge_source,
            albedo_source,
            material_source,
            normal_source,
            vertices: [Vertex16::ZERO; VERTEX_COUNT],
            primitives: [0; EDGE_COUNT],
            light_buffer: CompactRgb8List::default(),
            screen_position: Vertex16::ZERO,
            vertex_count: VERTEX_COUNT as u16,
            edge_count: EDGE_COUNT as u16,
            fragment: EdgeLineFragment::default(),
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
        ES: EdgeSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        const VERTEX_COUNT: usize,
        const EDGE_COUNT: usize,
    > RenderObject for EdgeLineObject<'a, VS, ES, AS, MS, NS, VERTEX_COUNT, EDGE_COUNT>
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
        for primitive in self.primitives[..self.edge_count as usize].iter_mut() {
            *primitive = z_flag;
        }

        if z_flag >= 0 {
            for i in 0..self.vertex_count {
                self.vertices[i as usize] = self.vertex_source.vertex(i);
            }
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
        if primitive_index >= self.edge_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let edge = self.edge_source.edge(primitive_index);
        let a = self.vertices[edge.a as usize];
        let b = self.vertices[edge.b as usize];

        let world_position = Vertex16::new(
            average2(a.x, b.x),
            average2(a.y, b.y),
            average2(a.z, b.z),
        );

        if self.frustum_culling.culls_primitives()
            && (!frustum.is_point_inside(a) || !frustum.is_point_inside(b))
        {
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
                // Midpoint direction from the object center.
                let center = self.transform.world_position();
                let mut normal = Vertex16::new(
                    world_position.x.saturating_sub(center.x),
                    world_position.y.saturating_sub(center.y),
                    world_position.z.saturating_sub(center.z),
                );
                normalize16(&mut normal);
                normal
            };

            color = scene_shader.lit_color(color, &material, world_position, normal);
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
        if primitive_index >= self.edge_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let edge = self.edge_source.edge(primitive_index);
        let depth_key = average2(
            self.vertices[edge.a as usize].z,
            self.vertices[edge.b as usize].z,
        );
        self.primitives[primitive_index as usize] = depth_key;

        // Behind/in-front test against the projected object center.
        let behind_center = depth_key > self.screen_position.z;
        let culled = match self.face_culling {
            FaceCulling::NoCulling => false,
            FaceCulling::BackfaceCulling => behind_center,
            FaceCulling::FrontfaceCulling => !behind_center && depth_key != self.screen_position.z,
        };
        if culled {
            self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
        }

        false
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        for i in 0..self.edge_count {
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

        let edge = self.edge_source.edge(primitive_index);
        self.fragment.index = primitive_index;
        self.fragment.z = self.primitives[primitive_index as usize];
        self.fragment.vertex_a = self.vertices[edge.a as usize];
        self.fragment.vertex_b = self.vertices[edge.b as usize];

        let color = self.light_buffer.color(primitive_index);
        self.fragment.red = color.red();
        self.fragment.green = color.green();
        self.fragment.blue = color.blue();

        fragment_shader.shade(rasterizer, &self.fragment);
    }
}

/// Line-shaded edge object over borrowed tables with one shared albedo and
/// material.
pub type SimpleEdgeLineObject<'a, const VERTEX_COUNT: usize, const EDGE_COUNT: usize> =
    EdgeLineObject<
        'a,
        StaticVertexSource<'a>,
        StaticEdgeSource<'a>,
        SingleAlbedoSource,
        SingleMaterialSource,
        NoNormalSource,
        VERTEX_COUNT,
        EDGE_COUNT,
    >;

impl<'a, const VERTEX_COUNT: usize, const EDGE_COUNT: usize>
    SimpleEdgeLineObject<'a, VERTEX_COUNT, EDGE_COUNT>
{
    pub fn with_static_tables(
        vertices: &'a [Vertex16],
        edges: &'a [crate::vertex::EdgeLine],
    ) -> Self {
        let mut object = Self::with_sources(
            StaticVertexSource::new(vertices),
            StaticEdgeSource::new(edges),
            SingleAlbedoSource::default(),
            SingleMaterialSource::default(),
            NoNormalSource,
        );
        object.vertex_count = vertices.len().min(VERTEX_COUNT) as u16;
        object.edge_count = edges.len().min(EDGE_COUNT) as u16;
        object
    }

    pub fn set_albedo(&mut self, albedo: Rgb8) {
        self.albedo_source_mut().albedo = albedo;
    }
}

/// Edge object shaded per vertex: each endpoint is lit separately and the
/// fragment carries both colors for interpolation along the line.
pub struct EdgeVertexObject<
    'a,
    VS,
    ES,
    AS = NoAlbedoSource,
    MS = DiffuseMaterialSource,
    NS = NoNormalSource,
    const VERTEX_COUNT: usize = 0,
    const EDGE_COUNT: usize = 0,
> {
    pub transform: ObjectTransform,
    pub frustum_culling: FrustumCulling,
    pub face_culling: FaceCulling,

    /// Vertex-shaded edge fragment shader. If unset, fragments are not
    /// drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<EdgeVertexFragment>>,
    /// Scene lighting shader. If unset, raw albedo is used.
    pub scene_shader: Option<&'a dyn SceneShader>,

    vertex_source: VS,
    edge_source: ES,
    albedo_source: AS,
    material_source: MS,
    normal_source: NS,

    vertices: [Vertex16; VERTEX_COUNT],
    primitives: [i16; EDGE_COUNT],
    light_buffer: CompactRgb8List<VERTEX_COUNT>,

    screen_position: Vertex16,

    vertex_count: u16,
    edge_count: u16,

    fragment: EdgeVertexFragment,
}

impl<
        'a,
        VS: VertexSource,
        ES: EdgeSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        const VERTEX_COUNT: usize,
        const EDGE_COUNT: usize,
    > EdgeVertexObject<'a, VS, ES, AS, MS, NS, VERTEX_COUNT, EDGE_COUNT>
{
    pub fn with_sources(
        vertex_source: VS,
        edge_source: ES,
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
            edge_source,
            albedo_source,
            material_source,
            normal_source,
            vertices: [Vertex16::ZERO; VERTEX_COUNT],
            primitives: [0; EDGE_COUNT],
            light_buffer: CompactRgb8List::default(),
            screen_position: Vertex16::ZERO,
            vertex_count: VERTEX_COUNT as u16,
            edge_count: EDGE_COUNT as u16,
            fragment: EdgeVertexFragment::default(),
        }
    }

    pub fn albedo_source_mut(&mut self) -> &mut AS {
        &mut self.albedo_source
    }

    /// Vertex normal: bound table rotated to world space, or the radial
    /// direction from the object center.
    fn vertex_normal(&self, vertex_index: u16) -> Vertex16 {
        if NS::HAS_NORMALS {
            let mut normal = self.normal_source.normal(vertex_index);
            self.transform.transform().rotate(&mut normal);
            normal
        } else {
            let center = self.transform.world_position();
            let vertex = self.vertices[vertex_index as usize];
            let mut normal = Vertex16::new(
                vertex.x.saturating_sub(center.x),
                vertex.y.saturating_sub(center.y),
                vertex.z.saturating_sub(center.z),
            );
            normalize16(&mut normal);
            normal
        }
    }
}

impl<
        'a,
        VS: VertexSource,
        ES: EdgeSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        const VERTEX_COUNT: usize,
        const EDGE_COUNT: usize,
    > RenderObject for EdgeVertexObject<'a, VS, ES, AS, MS, NS, VERTEX_COUNT, EDGE_COUNT>
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
        for primitive in self.primitives[..self.edge_count as usize].iter_mut() {
            *primitive = z_flag;
        }

        if z_flag >= 0 {
            for i in 0..self.vertex_count {
                self.vertices[i as usize] = self.vertex_source.vertex(i);
            }
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
        // Edge culling while the index covers the primitives, endpoint
        // lighting while it covers the vertices.
        if primitive_index < self.edge_count
            && self.frustum_culling.culls_primitives()
            && self.primitives[primitive_index as usize] >= 0
        {
            let edge = self.edge_source.edge(primitive_index);
            if !frustum.is_point_inside(self.vertices[edge.a as usize])
                || !frustum.is_point_inside(self.vertices[edge.b as usize])
            {
                self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
            }
        }

        if primitive_index < self.vertex_count {
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

                let normal = self.vertex_normal(primitive_index);
                color = scene_shader.lit_color(
                    color,
                    &material,
                    self.vertices[primitive_index as usize],
                    normal,
                );
            }

            self.light_buffer.set_color(color, primitive_index);
        }

        primitive_index + 1 >= self.edge_count.max(self.vertex_count)
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
        if primitive_index >= self.edge_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let edge = self.edge_source.edge(primitive_index);
        let depth_key = average2(
            self.vertices[edge.a as usize].z,
            self.vertices[edge.b as usize].z,
        );
        self.primitives[primitive_index as usize] = depth_key;

        let behind_center = depth_key > self.screen_position.z;
        let culled = match self.face_culling {
            FaceCulling::NoCulling => false,
            FaceCulling::BackfaceCulling => behind_center,
            FaceCulling::FrontfaceCulling => !behind_center && depth_key != self.screen_position.z,
        };
        if culled {
            self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
        }

        false
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        for i in 0..self.edge_count {
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

        let edge = self.edge_source.edge(primitive_index);
        self.fragment.index = primitive_index;
        self.fragment.z = self.primitives[primitive_index as usize];
        self.fragment.vertex_a = self.vertices[edge.a as usize];
        self.fragment.vertex_b = self.vertices[edge.b as usize];

        let color = self.light_buffer.color(edge.a);
        self.fragment.red_a = color.red();
        self.fragment.green_a = color.green();
        self.fragment.blue_a = color.blue();

        let color = self.light_buffer.color(edge.b);
        self.fragment.red_b = color.red();
        self.fragment.green_b = color.green();
        self.fragment.blue_b = color.blue();

        fragment_shader.shade(rasterizer, &self.fragment);
    }
}

/// Vertex-shaded edge object over borrowed tables with one shared albedo
/// and material.
pub type SimpleEdgeVertexObject<'a, const VERTEX_COUNT: usize, const EDGE_COUNT: usize> =
    EdgeVertexObject<
        'a,
        StaticVertexSource<'a>,
        StaticEdgeSource<'a>,
        SingleAlbedoSource,
        SingleMaterialSource,
        NoNormalSource,
        VERTEX_COUNT,
        EDGE_COUNT,
    >;

impl<'a, const VERTEX_COUNT: usize, const EDGE_COUNT: usize>
    SimpleEdgeVertexObject<'a, VERTEX_COUNT, EDGE_COUNT>
{
    pub fn with_static_tables(
        vertices: &'a [Vertex16],
        edges: &'a [crate::vertex::EdgeLine],
    ) -> Self {
        let mut object = Self::with_sources(
            StaticVertexSource::new(vertices),
            StaticEdgeSource::new(edges),
            SingleAlbedoSource::default(),
            SingleMaterialSource::default(),
            NoNormalSource,
        );
        object.vertex_count = vertices.len().min(VERTEX_COUNT) as u16;
        object.edge_count = edges.len().min(EDGE_COUNT) as u16;
        object
    }

    pub fn set_albedo(&mut self, albedo: Rgb8) {
        self.albedo_source_mut().albedo = albedo;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::UFraction16;
    use crate::fragment::FragmentManager;
    use crate::frustum::frustum_from_camera;
    use crate::projector::ViewportProjector;
    use crate::rasterizer::WindowRasterizer;
    use crate::shader::fragment::{EdgeGradientShader, EdgeLineShader};
    use crate::shader::NormalVisualizerShader;
    use crate::surface::{MockSurface, SurfaceCall};
    use crate::transform::CameraState;
    use crate::vertex::{EdgeLine, VERTEX16_UNIT as UNIT};

    fn pipeline_setup() -> (Frustum, CameraTransform, ViewportProjector) {
        let mut projector = ViewportProjector::default();
        projector.set_dimensions(128, 128);
        projector.set_fov(UFraction16(16384));
        let camera = CameraState::default();
        let frustum = frustum_from_camera(&camera, &projector, 128, 128);
        let mut reverse = CameraTransform::default();
        reverse.set_from_camera(&camera);
        (frustum, reverse, projector)
    }

    // Drive the pipeline verbs the way the engine does, one index at a time
    // until each reports completion.
    fn walk(
        object: &mut dyn RenderObject,
        frustum: &Frustum,
        camera: &CameraTransform,
        projector: &ViewportProjector,
    ) {
        object.object_shade(frustum);
        let mut i = 0;
        while !object.vertex_shade(i) {
            i += 1;
        }
        let mut i = 0;
        while !object.world_transform(i) {
            i += 1;
        }
        let mut i = 0;
        while !object.world_shade(frustum, i) {
            i += 1;
        }
        let mut i = 0;
        while !object.camera_transform(camera, i) {
            i += 1;
        }
        let mut i = 0;
        while !object.screen_project(projector, i) {
            i += 1;
        }
        let mut i = 0;
        while !object.screen_shade(i) {
            i += 1;
        }
    }

    const LINE_VERTICES: [Vertex16; 2] = [
        Vertex16::new(-UNIT / 2, 0, 0),
        Vertex16::new(UNIT / 2, 0, 0),
    ];
    const LINE_EDGES: [EdgeLine; 1] = [EdgeLine { a: 0, b: 1 }];

    #[test]
    fn line_edge_walks_to_a_single_fragment() {
        let mut shader = EdgeLineShader;
        let mut surface = MockSurface::new(128, 128);
        let mut object: SimpleEdgeLineObject<2, 1> =
            SimpleEdgeLineObject::with_static_tables(&LINE_VERTICES, &LINE_EDGES);
        object.transform.translation = Vertex16::new(0, 0, UNIT);
        object.fragment_shader = Some(&mut shader);

        let (frustum, camera, projector) = pipeline_setup();
        walk(&mut object, &frustum, &camera, &projector);

        let mut manager: FragmentManager<4> = FragmentManager::new();
        manager.prepare_for_object(0);
        object.fragment_collect(&mut manager.collector());
        assert_eq!(manager.count(), 1);
        // Depth key: the projected distance denominator of the midpoint.
        assert_eq!(manager.get(0).z, 16384 + UNIT);

        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            object.fragment_shade(&mut rasterizer, 0);
        }
        assert_eq!(surface.draw_call_count(), 1);
        assert!(matches!(surface.calls[0], SurfaceCall::Line { .. }));
    }

    #[test]
    fn center_depth_face_culling_drops_the_far_hemisphere() {
        // The edge sits one unit behind the object center, so its average
        // depth lands past the projected center depth.
        const BEHIND_VERTICES: [Vertex16; 2] = [
            Vertex16::new(-UNIT / 2, 0, UNIT),
            Vertex16::new(UNIT / 2, 0, UNIT),
        ];

        let (frustum, camera, projector) = pipeline_setup();

        let mut behind: SimpleEdgeLineObject<2, 1> =
            SimpleEdgeLineObject::with_static_tables(&BEHIND_VERTICES, &LINE_EDGES);
        behind.transform.translation = Vertex16::new(0, 0, UNIT);
        behind.face_culling = FaceCulling::BackfaceCulling;
        walk(&mut behind, &frustum, &camera, &projector);

        let mut manager: FragmentManager<4> = FragmentManager::new();
        behind.fragment_collect(&mut manager.collector());
        assert_eq!(manager.count(), 0);

        let mut front: SimpleEdgeLineObject<2, 1> =
            SimpleEdgeLineObject::with_static_tables(&BEHIND_VERTICES, &LINE_EDGES);
        front.transform.translation = Vertex16::new(0, 0, UNIT);
        front.face_culling = FaceCulling::FrontfaceCulling;
        walk(&mut front, &frustum, &camera, &projector);

        let mut manager: FragmentManager<4> = FragmentManager::new();
        front.fragment_collect(&mut manager.collector());
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn frustum_culling_drops_edges_outside_the_volume() {
        let mut object: SimpleEdgeLineObject<2, 1> =
            SimpleEdgeLineObject::with_static_tables(&LINE_VERTICES, &LINE_EDGES);
        // Far behind the camera.
        object.transform.translation = Vertex16::new(0, 0, -4 * UNIT);
        object.frustum_culling = FrustumCulling::PrimitiveCulling;

        let (frustum, camera, projector) = pipeline_setup();
        walk(&mut object, &frustum, &camera, &projector);

        let mut manager: FragmentManager<4> = FragmentManager::new();
        object.fragment_collect(&mut manager.collector());
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn vertex_shade_lights_each_endpoint() {
        // Radial fallback normals point along -y and +y, which the normal
        // visualizer maps to opposite green extremes.
        const BAR_VERTICES: [Vertex16; 2] = [
            Vertex16::new(0, -UNIT / 2, 0),
            Vertex16::new(0, UNIT / 2, 0),
        ];

        let scene = NormalVisualizerShader::new();
        let mut shader = EdgeGradientShader::default();
        let mut surface = MockSurface::new(128, 128);
        let mut object: SimpleEdgeVertexObject<2, 1> =
            SimpleEdgeVertexObject::with_static_tables(&BAR_VERTICES, &LINE_EDGES);
        object.transform.translation = Vertex16::new(0, 0, 2 * UNIT);
        object.scene_shader = Some(&scene);
        object.fragment_shader = Some(&mut shader);

        let (frustum, camera, projector) = pipeline_setup();
        walk(&mut object, &frustum, &camera, &projector);

        let mut manager: FragmentManager<4> = FragmentManager::new();
        object.fragment_collect(&mut manager.collector());
        assert_eq!(manager.count(), 1);

        {
            let mut rasterizer = WindowRasterizer::new(&mut surface);
            object.fragment_shade(&mut rasterizer, 0);
        }

        // Topmost pixel carries the -y endpoint's color, bottommost the +y
        // endpoint's.
        let mut top: Option<(i16, Rgb8)> = None;
        let mut bottom: Option<(i16, Rgb8)> = None;
        for call in surface.draw_calls() {
            if let SurfaceCall::Pixel { color, y, .. } = call {
                if top.map_or(true, |(top_y, _)| *y < top_y) {
                    top = Some((*y, *color));
                }
                if bottom.map_or(true, |(bottom_y, _)| *y > bottom_y) {
                    bottom = Some((*y, *color));
                }
            }
        }
        let (_, top_color) = top.expect("gradient pixels drawn");
        let (_, bottom_color) = bottom.expect("gradient pixels drawn");
        assert!(top_color.green() < 30, "{top_color:?}");
        assert!(bottom_color.green() > 225, "{bottom_color:?}");
        assert_eq!(top_color.red(), 128);
        assert_eq!(bottom_color.red(), 128);
    }
}
