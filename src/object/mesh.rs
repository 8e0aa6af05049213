//! Mesh render objects: indexed triangle geometry with per-face or
//! per-vertex lighting.

use crate::fragment::{CompactRgb8List, FragmentCollector, MeshTriangleFragment, MeshVertexFragment};
use crate::frustum::Frustum;
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::shader::{FragmentShader, Material, SceneShader};
use crate::transform::CameraTransform;
use crate::vertex::{
    average3_approx, normal16, normalize32_fast, Vertex16, VERTEX16_UNIT,
};

use super::sources::{
    AlbedoSource, DiffuseMaterialSource, MaterialSource, NoAlbedoSource, NoNormalSource,
    NoUvSource, NormalSource, SingleAlbedoSource, SingleMaterialSource, StaticTriangleSource,
    StaticVertexSource, TriangleSource, UvSource, VertexSource,
};
use super::{FaceCulling, FrustumCulling, ObjectTransform, RenderObject};

/// Per-vertex animation hook: mutate the freshly loaded object-space vertex.
pub type VertexAnimator = fn(u16, &mut Vertex16);

/// Mesh object shaded per triangle face.
///
/// Lighting runs once per primitive in the world pass and the resulting
/// color is cached compactly until the fragment pass. Culling modes and
/// shaders are plain fields; capacities are const generics.
pub struct MeshTriangleObject<
    'a,
    VS,
    TS,
    AS = NoAlbedoSource,
    MS = DiffuseMaterialSource,
    NS = NoNormalSource,
    US = NoUvSource,
    const VERTEX_COUNT: usize = 0,
    const TRIANGLE_COUNT: usize = 0,
> {
    pub transform: ObjectTransform,
    pub frustum_culling: FrustumCulling,
    pub face_culling: FaceCulling,

    /// Triangle fragment shader. If unset, fragments are not drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<MeshTriangleFragment>>,
    /// Scene lighting shader. If unset, raw albedo is used.
    pub scene_shader: Option<&'a dyn SceneShader>,
    /// Optional per-vertex animation, applied in the vertex pass.
    pub vertex_animator: Option<VertexAnimator>,

    vertex_source: VS,
    triangle_source: TS,
    albedo_source: AS,
    material_source: MS,
    normal_source: NS,
    uv_source: US,

    vertices: [Vertex16; VERTEX_COUNT],
    primitives: [i16; TRIANGLE_COUNT],
    light_buffer: CompactRgb8List<TRIANGLE_COUNT>,

    vertex_count: u16,
    triangle_count: u16,

    fragment: MeshTriangleFragment,
}

impl<
        'a,
        VS: VertexSource,
        TS: TriangleSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        US: UvSource,
        const VERTEX_COUNT: usize,
        const TRIANGLE_COUNT: usize,
    > MeshTriangleObject<'a, VS, TS, AS, MS, NS, US, VERTEX_COUNT, TRIANGLE_COUNT>
{
    pub fn with_sources(
        vertex_source: VS,
        triangle_source: TS,
        albedo_source: AS,
        material_source: MS,
        normal_source: NS,
        uv_source: US,
    ) -> Self {
        Self {
            transform: ObjectTransform::default(),
            frustum_culling: FrustumCulling::default(),
            face_culling: FaceCulling::default(),
            fragment_shader: None,
            scene_shader: None,
            vertex_animator: None,
            vertex_source,
            triangle_source,
            albedo_source,
            material_source,
            normal_source,
            uv_source,
            vertices: [Vertex16::ZERO; VERTEX_COUNT],
            primitives: [0; TRIANGLE_COUNT],
            light_buffer: CompactRgb8List::default(),
            vertex_count: VERTEX_COUNT as u16,
            triangle_count: TRIANGLE_COUNT as u16,
            fragment: MeshTriangleFragment::default(),
        }
    }

    pub fn albedo_source_mut(&mut self) -> &mut AS {
        &mut self.albedo_source
    }

    pub fn material_source_mut(&mut self) -> &mut MS {
        &mut self.material_source
    }

    /// Effective counts for this frame (smaller than the capacity when a
    /// level of detail is active).
    pub fn counts(&self) -> (u16, u16) {
        (self.vertex_count, self.triangle_count)
    }

    fn load_vertices(&mut self) {
        for i in 0..self.vertex_count {
            self.vertices[i as usize] = self.vertex_source.vertex(i);
        }
    }

    fn world_normal(&self, triangle_index: u16, a: Vertex16, b: Vertex16, c: Vertex16) -> Vertex16 {
        if NS::HAS_NORMALS {
            // Rotate the precomputed object-space normal into world space.
            let mut normal = self.normal_source.normal(triangle_index);
            self.transform.transform().rotate(&mut normal);
            normal
        } else {
            normalize32_fast(normal16(a, b, c))
        }
    }
}

impl<
        'a,
        VS: VertexSource,
        TS: TriangleSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        US: UvSource,
        const VERTEX_COUNT: usize,
        const TRIANGLE_COUNT: usize,
    > RenderObject for MeshTriangleObject<'a, VS, TS, AS, MS, NS, US, VERTEX_COUNT, TRIANGLE_COUNT>
{
    fn object_shade(&mut self, frustum: &Frustum) {
        self.transform.object_shade();

        let mut z_flag = 0;
        if self.frustum_culling.culls_objects()
            && !frustum.is_point_inside(self.transform.world_position())
        {
            z_flag = -VERTEX16_UNIT;
        }
        for primitive in self.primitives[..self.triangle_count as usize].iter_mut() {
            *primitive = z_flag;
        }

        if z_flag >= 0 {
            self.load_vertices();
        }
    }

    fn vertex_shade(&mut self, vertex_index: u16) -> bool {
        match self.vertex_animator {
            Some(animate) if vertex_index < self.vertex_count => {
                animate(vertex_index, &mut self.vertices[vertex_index as usize]);
                vertex_index + 1 >= self.vertex_count
            }
            _ => true,
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
        if primitive_index >= self.triangle_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let triangle = self.triangle_source.triangle(primitive_index);
        let a = self.vertices[triangle.a as usize];
        let b = self.vertices[triangle.b as usize];
        let c = self.vertices[triangle.c as usize];

        let world_position = Vertex16::new(
            average3_approx(a.x, b.x, c.x),
            average3_approx(a.y, b.y, c.y),
            average3_approx(a.z, b.z, c.z),
        );

        if self.frustum_culling.culls_primitives() && !frustum.is_point_inside(world_position) {
            self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
            return false;
        }

        let mut color = if AS::HAS_ALBEDOS {
            self.albedo_source.albedo(primitive_index)
        } else {
            crate::color::Rgb8::WHITE
        };

        if let Some(scene_shader) = self.scene_shader {
            let material = if MS::HAS_MATERIALS {
                self.material_source.material(primitive_index)
            } else {
                Material::DIFFUSE
            };

            let normal = self.world_normal(primitive_index, a, b, c);
            color = scene_shader.lit_color(color, &material, world_position, normal);
        }

        // Cache the lit color for the fragment pass.
        self.light_buffer.set_color(color, primitive_index);

        false
    }

    fn camera_transform(&mut self, transform: &CameraTransform, vertex_index: u16) -> bool {
        if vertex_index >= self.vertex_count {
            return true;
        }
        transform.apply(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_project(&mut self, projector: &ViewportProjector, vertex_index: u16) -> bool {
        if vertex_index >= self.vertex_count {
            return true;
        }
        projector.project(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_shade(&mut self, primitive_index: u16) -> bool {
        if primitive_index >= self.triangle_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let triangle = self.triangle_source.triangle(primitive_index);
        let a = self.vertices[triangle.a as usize];
        let b = self.vertices[triangle.b as usize];
        let c = self.vertices[triangle.c as usize];

        let depth_key = average3_approx(a.z, b.z, c.z);

        if self.face_culling == FaceCulling::NoCulling {
            self.primitives[primitive_index as usize] = depth_key;
            return false;
        }

        // Face culling from the projected 2D winding.
        let signed_area = (b.x as i32 - a.x as i32) * (c.y as i32 - a.y as i32)
            - (b.y as i32 - a.y as i32) * (c.x as i32 - a.x as i32);

        let visible = match self.face_culling {
            FaceCulling::BackfaceCulling => signed_area > 0,
            FaceCulling::FrontfaceCulling => signed_area < 0,
            FaceCulling::NoCulling => true,
        };

        self.primitives[primitive_index as usize] = if visible { depth_key } else { -VERTEX16_UNIT };

        false
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        for i in 0..self.triangle_count {
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

        let triangle = self.triangle_source.triangle(primitive_index);
        self.fragment.index = primitive_index;
        self.fragment.z = self.primitives[primitive_index as usize];
        self.fragment.vertex_a = self.vertices[triangle.a as usize];
        self.fragment.vertex_b = self.vertices[triangle.b as usize];
        self.fragment.vertex_c = self.vertices[triangle.c as usize];

        let color = self.light_buffer.color(primitive_index);
        self.fragment.red = color.red();
        self.fragment.green = color.green();
        self.fragment.blue = color.blue();

        if US::HAS_UVS {
            let uvs = self.uv_source.uvs(primitive_index);
            self.fragment.uv_a = uvs.a;
            self.fragment.uv_b = uvs.b;
            self.fragment.uv_c = uvs.c;
        }

        fragment_shader.shade(rasterizer, &self.fragment);
    }
}

/// Triangle-shaded mesh over borrowed vertex/triangle tables with one shared
/// albedo and material.
pub type SimpleMeshTriangleObject<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize> =
    MeshTriangleObject<
        'a,
        StaticVertexSource<'a>,
        StaticTriangleSource<'a>,
        SingleAlbedoSource,
        SingleMaterialSource,
        NoNormalSource,
        NoUvSource,
        VERTEX_COUNT,
        TRIANGLE_COUNT,
    >;

impl<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize>
    SimpleMeshTriangleObject<'a, VERTEX_COUNT, TRIANGLE_COUNT>
{
    /// Build from static geometry tables.
    pub fn with_static_tables(
        vertices: &'a [Vertex16],
        triangles: &'a [crate::vertex::TriangleFace],
    ) -> Self {
        let mut object = Self::with_sources(
            StaticVertexSource::new(vertices),
            StaticTriangleSource::new(triangles),
            SingleAlbedoSource::default(),
            SingleMaterialSource::default(),
            NoNormalSource,
            NoUvSource,
        );
        object.vertex_count = vertices.len().min(VERTEX_COUNT) as u16;
        object.triangle_count = triangles.len().min(TRIANGLE_COUNT) as u16;
        object
    }

    pub fn set_albedo(&mut self, albedo: crate::color::Rgb8) {
        self.albedo_source_mut().albedo = albedo;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material_source_mut().material = material;
    }

    /// Swap the geometry tables and effective counts; used by the level of
    /// detail selector. Counts clamp to the buffer capacities.
    pub(crate) fn set_tables(
        &mut self,
        vertices: &'a [Vertex16],
        triangles: &'a [crate::vertex::TriangleFace],
    ) {
        self.vertex_source.set_table(vertices);
        self.triangle_source.set_table(triangles);
        self.vertex_count = vertices.len().min(VERTEX_COUNT) as u16;
        self.triangle_count = triangles.len().min(TRIANGLE_COUNT) as u16;
    }

    pub(crate) fn set_empty(&mut self) {
        self.vertex_count = 0;
        self.triangle_count = 0;
    }
}

/// One level of detail: geometry tables valid up to a distance.
#[derive(Copy, Clone, Debug)]
pub struct MeshLodLevel<'a> {
    pub vertices: &'a [Vertex16],
    pub triangles: &'a [crate::vertex::TriangleFace],
    /// Beyond this camera distance the level is no longer selected.
    pub max_distance: u16,
}

/// Static mesh with level-of-detail selection.
///
/// Each frame the first level whose squared distance threshold exceeds the
/// camera distance is bound; below the minimum render distance, or past
/// every threshold, nothing renders. Level capacities must fit the object's
/// const-generic buffers.
pub struct MeshLodObject<
    'a,
    const VERTEX_COUNT: usize,
    const TRIANGLE_COUNT: usize,
    const LEVELS: usize,
> {
    pub mesh: SimpleMeshTriangleObject<'a, VERTEX_COUNT, TRIANGLE_COUNT>,

    levels: [Option<MeshLodLevel<'a>>; LEVELS],
    level_count: u8,
    square_min_distance: u32,
}

impl<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize, const LEVELS: usize>
    MeshLodObject<'a, VERTEX_COUNT, TRIANGLE_COUNT, LEVELS>
{
    pub fn new() -> Self {
        Self {
            mesh: SimpleMeshTriangleObject::with_static_tables(&[], &[]),
            levels: [None; LEVELS],
            level_count: 0,
            square_min_distance: 0,
        }
    }

    /// Register a level; levels are kept ordered by increasing threshold so
    /// selection is deterministic. Returns false when the table is full or
    /// the level exceeds the buffer capacities.
    pub fn add_level(&mut self, level: MeshLodLevel<'a>) -> bool {
        if (self.level_count as usize) >= LEVELS
            || level.vertices.len() > VERTEX_COUNT
            || level.triangles.len() > TRIANGLE_COUNT
        {
            return false;
        }

        // Insertion-sorted by threshold.
        let mut insert_at = self.level_count as usize;
        while insert_at > 0 {
            let Some(previous) = self.levels[insert_at - 1] else {
                break;
            };
            if previous.max_distance <= level.max_distance {
                break;
            }
            self.levels[insert_at] = Some(previous);
            insert_at -= 1;
        }
        self.levels[insert_at] = Some(level);
        self.level_count += 1;
        true
    }

    /// Below this distance the mesh is not rendered at all.
    pub fn set_render_distance_minimum(&mut self, distance: u16) {
        self.square_min_distance = distance as u32 * distance as u32;
    }

    pub fn level_count(&self) -> u8 {
        self.level_count
    }

    fn select_level(&mut self, frustum: &Frustum) {
        let position = self.mesh.transform.translation;
        let dx = position.x as i64 - frustum.origin.x as i64;
        let dy = position.y as i64 - frustum.origin.y as i64;
        let dz = position.z as i64 - frustum.origin.z as i64;
        let square_distance = (dx * dx + dy * dy + dz * dz) as u64;

        if square_distance >= self.square_min_distance as u64 {
            for level in self.levels.iter().take(self.level_count as usize).flatten() {
                let threshold = level.max_distance as u64 * level.max_distance as u64;
                if square_distance < threshold {
                    self.mesh.set_tables(level.vertices, level.triangles);
                    return;
                }
            }
        }

        // No level matched; skip rendering this frame.
        self.mesh.set_empty();
    }
}

impl<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize, const LEVELS: usize> Default
    for MeshLodObject<'a, VERTEX_COUNT, TRIANGLE_COUNT, LEVELS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize, const LEVELS: usize> RenderObject
    for MeshLodObject<'a, VERTEX_COUNT, TRIANGLE_COUNT, LEVELS>
{
    fn object_shade(&mut self, frustum: &Frustum) {
        self.select_level(frustum);
        self.mesh.object_shade(frustum);
    }

    fn vertex_shade(&mut self, vertex_index: u16) -> bool {
        self.mesh.vertex_shade(vertex_index)
    }

    fn world_transform(&mut self, vertex_index: u16) -> bool {
        self.mesh.world_transform(vertex_index)
    }

    fn world_shade(&mut self, frustum: &Frustum, primitive_index: u16) -> bool {
        self.mesh.world_shade(frustum, primitive_index)
    }

    fn camera_transform(&mut self, transform: &CameraTransform, vertex_index: u16) -> bool {
        self.mesh.camera_transform(transform, vertex_index)
    }

    fn screen_project(&mut self, projector: &ViewportProjector, vertex_index: u16) -> bool {
        self.mesh.screen_project(projector, vertex_index)
    }

    fn screen_shade(&mut self, primitive_index: u16) -> bool {
        self.mesh.screen_shade(primitive_index)
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        self.mesh.fragment_collect(collector);
    }

    fn fragment_shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, primitive_index: u16) {
        self.mesh.fragment_shade(rasterizer, primitive_index);
    }
}

/// Mesh object shaded per vertex.
///
/// Lighting runs once per vertex in the world pass; the fragment carries the
/// three corner colors for barycentric interpolation at raster time. When no
/// normal table is bound, the rotated object-space vertex direction stands in
/// for the vertex normal.
pub struct MeshVertexObject<
    'a,
    VS,
    TS,
    AS = NoAlbedoSource,
    MS = DiffuseMaterialSource,
    NS = NoNormalSource,
    US = NoUvSource,
    const VERTEX_COUNT: usize = 0,
    const TRIANGLE_COUNT: usize = 0,
> {
    pub transform: ObjectTransform,
    pub frustum_culling: FrustumCulling,
    pub face_culling: FaceCulling,

    /// Vertex-shaded triangle fragment shader. If unset, fragments are not
    /// drawn.
    pub fragment_shader: Option<&'a mut dyn FragmentShader<MeshVertexFragment>>,
    /// Scene lighting shader. If unset, raw albedo is used.
    pub scene_shader: Option<&'a dyn SceneShader>,
    pub vertex_animator: Option<VertexAnimator>,

    vertex_source: VS,
    triangle_source: TS,
    albedo_source: AS,
    material_source: MS,
    normal_source: NS,
    uv_source: US,

    vertices: [Vertex16; VERTEX_COUNT],
    primitives: [i16; TRIANGLE_COUNT],
    light_buffer: CompactRgb8List<VERTEX_COUNT>,

    vertex_count: u16,
    triangle_count: u16,

    fragment: MeshVertexFragment,
}

impl<
        'a,
        VS: VertexSource,
        TS: TriangleSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        US: UvSource,
        const VERTEX_COUNT: usize,
        const TRIANGLE_COUNT: usize,
    > MeshVertexObject<'a, VS, TS, AS, MS, NS, US, VERTEX_COUNT, TRIANGLE_COUNT>
{
    pub fn with_sources(
        vertex_source: VS,
        triangle_source: TS,
        albedo_source: AS,
        material_source: MS,
        normal_source: NS,
        uv_source: US,
    ) -> Self {
        Self {
            transform: ObjectTransform::default(),
            frustum_culling: FrustumCulling::default(),
            face_culling: FaceCulling::default(),
            fragment_shader: None,
            scene_shader: None,
            vertex_animator: None,
            vertex_source,
            triangle_source,
            albedo_source,
            material_source,
            normal_source,
            uv_source,
            vertices: [Vertex16::ZERO; VERTEX_COUNT],
            primitives: [0; TRIANGLE_COUNT],
            light_buffer: CompactRgb8List::default(),
            vertex_count: VERTEX_COUNT as u16,
            triangle_count: TRIANGLE_COUNT as u16,
            fragment: MeshVertexFragment::default(),
        }
    }

    pub fn albedo_source_mut(&mut self) -> &mut AS {
        &mut self.albedo_source
    }

    pub fn material_source_mut(&mut self) -> &mut MS {
        &mut self.material_source
    }

    /// Vertex normal: the bound table rotated into world space, or the
    /// rotated object-space vertex direction as a radial fallback.
    fn vertex_normal(&self, vertex_index: u16) -> Vertex16 {
        let mut normal = if NS::HAS_NORMALS {
            self.normal_source.normal(vertex_index)
        } else {
            self.vertex_source.vertex(vertex_index)
        };
        self.transform.transform().rotate(&mut normal);
        if !NS::HAS_NORMALS {
            crate::vertex::normalize16(&mut normal);
        }
        normal
    }
}

impl<
        'a,
        VS: VertexSource,
        TS: TriangleSource,
        AS: AlbedoSource,
        MS: MaterialSource,
        NS: NormalSource,
        US: UvSource,
        const VERTEX_COUNT: usize,
        const TRIANGLE_COUNT: usize,
    > RenderObject for MeshVertexObject<'a, VS, TS, AS, MS, NS, US, VERTEX_COUNT, TRIANGLE_COUNT>
{
    fn object_shade(&mut self, frustum: &Frustum) {
        self.transform.object_shade();

        let mut z_flag = 0;
        if self.frustum_culling.culls_objects()
            && !frustum.is_point_inside(self.transform.world_position())
        {
            z_flag = -VERTEX16_UNIT;
        }
        for primitive in self.primitives[..self.triangle_count as usize].iter_mut() {
            *primitive = z_flag;
        }

        if z_flag >= 0 {
            for i in 0..self.vertex_count {
                self.vertices[i as usize] = self.vertex_source.vertex(i);
            }
        }
    }

    fn vertex_shade(&mut self, vertex_index: u16) -> bool {
        match self.vertex_animator {
            Some(animate) if vertex_index < self.vertex_count => {
                animate(vertex_index, &mut self.vertices[vertex_index as usize]);
                vertex_index + 1 >= self.vertex_count
            }
            _ => true,
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
        // This pass walks two ranges at once: triangle culling while
        // indices cover the primitives, vertex lighting while they cover
        // the vertices.
        if primitive_index < self.triangle_count
            && self.frustum_culling.culls_primitives()
            && self.primitives[primitive_index as usize] >= 0
        {
            let triangle = self.triangle_source.triangle(primitive_index);
            let a = self.vertices[triangle.a as usize];
            let b = self.vertices[triangle.b as usize];
            let c = self.vertices[triangle.c as usize];

            if !frustum.is_point_inside(a)
                && !frustum.is_point_inside(b)
                && !frustum.is_point_inside(c)
            {
                self.primitives[primitive_index as usize] = -VERTEX16_UNIT;
            }
        }

        if primitive_index < self.vertex_count {
            let mut color = if AS::HAS_ALBEDOS {
                self.albedo_source.albedo(primitive_index)
            } else {
                crate::color::Rgb8::WHITE
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

        primitive_index + 1 >= self.triangle_count.max(self.vertex_count)
    }

    fn camera_transform(&mut self, transform: &CameraTransform, vertex_index: u16) -> bool {
        if vertex_index >= self.vertex_count {
            return true;
        }
        transform.apply(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_project(&mut self, projector: &ViewportProjector, vertex_index: u16) -> bool {
        if vertex_index >= self.vertex_count {
            return true;
        }
        projector.project(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_shade(&mut self, primitive_index: u16) -> bool {
        if primitive_index >= self.triangle_count {
            return true;
        }
        if self.primitives[primitive_index as usize] < 0 {
            return false;
        }

        let triangle = self.triangle_source.triangle(primitive_index);
        let a = self.vertices[triangle.a as usize];
        let b = self.vertices[triangle.b as usize];
        let c = self.vertices[triangle.c as usize];

        let depth_key = average3_approx(a.z, b.z, c.z);

        if self.face_culling == FaceCulling::NoCulling {
            self.primitives[primitive_index as usize] = depth_key;
            return false;
        }

        let signed_area = (b.x as i32 - a.x as i32) * (c.y as i32 - a.y as i32)
            - (b.y as i32 - a.y as i32) * (c.x as i32 - a.x as i32);

        let visible = match self.face_culling {
            FaceCulling::BackfaceCulling => signed_area > 0,
            FaceCulling::FrontfaceCulling => signed_area < 0,
            FaceCulling::NoCulling => true,
        };

        self.primitives[primitive_index as usize] = if visible { depth_key } else { -VERTEX16_UNIT };

        false
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        for i in 0..self.triangle_count {
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

        let triangle = self.triangle_source.triangle(primitive_index);
        self.fragment.index = primitive_index;
        self.fragment.z = self.primitives[primitive_index as usize];
        self.fragment.vertex_a = self.vertices[triangle.a as usize];
        self.fragment.vertex_b = self.vertices[triangle.b as usize];
        self.fragment.vertex_c = self.vertices[triangle.c as usize];

        let color = self.light_buffer.color(triangle.a);
        self.fragment.red_a = color.red();
        self.fragment.green_a = color.green();
        self.fragment.blue_a = color.blue();

        let color = self.light_buffer.color(triangle.b);
        self.fragment.red_b = color.red();
        self.fragment.green_b = color.green();
        self.fragment.blue_b = color.blue();

        let color = self.light_buffer.color(triangle.c);
        self.fragment.red_c = color.red();
        self.fragment.green_c = color.green();
        self.fragment.blue_c = color.blue();

        if US::HAS_UVS {
            let uvs = self.uv_source.uvs(primitive_index);
            self.fragment.uv_a = uvs.a;
            self.fragment.uv_b = uvs.b;
            self.fragment.uv_c = uvs.c;
        }

        fragment_shader.shade(rasterizer, &self.fragment);
    }
}

/// Vertex-shaded mesh over borrowed tables with one shared albedo and
/// material.
pub type SimpleMeshVertexObject<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize> =
    MeshVertexObject<
        'a,
        StaticVertexSource<'a>,
        StaticTriangleSource<'a>,
        SingleAlbedoSource,
        SingleMaterialSource,
        NoNormalSource,
        NoUvSource,
        VERTEX_COUNT,
        TRIANGLE_COUNT,
    >;

impl<'a, const VERTEX_COUNT: usize, const TRIANGLE_COUNT: usize>
    SimpleMeshVertexObject<'a, VERTEX_COUNT, TRIANGLE_COUNT>
{
    pub fn with_static_tables(
        vertices: &'a [Vertex16],
        triangles: &'a [crate::vertex::TriangleFace],
    ) -> Self {
        Self::with_sources(
            StaticVertexSource::new(vertices),
            StaticTriangleSource::new(triangles),
            SingleAlbedoSource::default(),
            SingleMaterialSource::default(),
            NoNormalSource,
            NoUvSource,
        )
    }

    pub fn set_albedo(&mut self, albedo: crate::color::Rgb8) {
        self.albedo_source_mut().albedo = albedo;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material_source_mut().material = material;
    }
}
