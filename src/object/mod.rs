//! The render object contract and the objects implementing it.
//!
//! Every object walks the same pipeline verbs each frame; the engine calls
//! them with rising indices until the verb reports completion, which keeps
//! each call to a single unit of work. Buffers are owned by their object and
//! sized by const generics; the engine only ever borrows.

pub mod background;
pub mod billboard;
pub mod edge;
pub mod mesh;
pub mod point_cloud;
pub mod sources;

#[cfg(feature = "frustum-debug")]
pub mod frustum_debug;

pub use background::BackgroundFillObject;
pub use billboard::BillboardObject;
pub use edge::{EdgeLineObject, EdgeVertexObject, SimpleEdgeLineObject, SimpleEdgeVertexObject};
#[cfg(feature = "frustum-debug")]
pub use frustum_debug::FrustumDebugObject;
pub use mesh::{
    MeshLodLevel, MeshLodObject, MeshTriangleObject, MeshVertexObject, SimpleMeshTriangleObject,
    SimpleMeshVertexObject, VertexAnimator,
};
pub use point_cloud::{PointCloudObject, SimplePointCloudObject};

use crate::fragment::FragmentCollector;
use crate::frustum::Frustum;
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::transform::{CameraTransform, RotationAngle, Transform16};
use crate::vertex::Vertex16;
use crate::fixed::Scale16;

/// Frustum culling granularity of an object.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FrustumCulling {
    /// Everything is considered for rendering.
    NoCulling,
    /// Whole objects outside the frustum are dropped in the object pass.
    ObjectCulling,
    /// Individual primitives outside the frustum are dropped in the world
    /// pass.
    #[default]
    PrimitiveCulling,
    /// Both of the above.
    ObjectAndPrimitiveCulling,
}

impl FrustumCulling {
    #[inline]
    pub(crate) fn culls_objects(self) -> bool {
        matches!(self, Self::ObjectCulling | Self::ObjectAndPrimitiveCulling)
    }

    #[inline]
    pub(crate) fn culls_primitives(self) -> bool {
        matches!(
            self,
            Self::PrimitiveCulling | Self::ObjectAndPrimitiveCulling
        )
    }
}

/// Face orientation culling applied after projection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FaceCulling {
    /// Faces pointing away from the camera are dropped.
    #[default]
    BackfaceCulling,
    /// Every face is drawn.
    NoCulling,
    /// Faces pointing toward the camera are dropped.
    FrontfaceCulling,
}

/// How a billboard's pixel size relates to its distance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BillboardScaleMode {
    /// Fixed pixel size.
    ScreenSpace,
    /// Scales with the projected distance.
    #[default]
    WorldSpace,
}

/// The pipeline verbs every render object implements.
///
/// The indexed verbs return `true` once no more indices remain; the engine
/// increments the index until that happens, one call per tick. Defaults make
/// every verb a completed no-op so trivial objects only override what they
/// use.
pub trait RenderObject {
    /// Per-frame object preparation: derive the world transform, apply
    /// object-level culling, load source data into working buffers.
    fn object_shade(&mut self, frustum: &Frustum) {
        let _ = frustum;
    }

    /// Per-vertex animation hook, before the world transform.
    fn vertex_shade(&mut self, vertex_index: u16) -> bool {
        let _ = vertex_index;
        true
    }

    /// Transform one working vertex into world space.
    fn world_transform(&mut self, vertex_index: u16) -> bool {
        let _ = vertex_index;
        true
    }

    /// Per-primitive world pass: world position, primitive culling, normals
    /// and lighting.
    fn world_shade(&mut self, frustum: &Frustum, primitive_index: u16) -> bool {
        let _ = (frustum, primitive_index);
        true
    }

    /// Transform one working vertex into camera space.
    fn camera_transform(&mut self, transform: &CameraTransform, vertex_index: u16) -> bool {
        let _ = (transform, vertex_index);
        true
    }

    /// Project one working vertex to screen space.
    fn screen_project(&mut self, projector: &ViewportProjector, vertex_index: u16) -> bool {
        let _ = (projector, vertex_index);
        true
    }

    /// Per-primitive screen pass: face culling and the depth key.
    fn screen_shade(&mut self, primitive_index: u16) -> bool {
        let _ = primitive_index;
        true
    }

    /// Push every surviving primitive into the collector.
    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        let _ = collector;
    }

    /// Draw one collected primitive.
    fn fragment_shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, primitive_index: u16) {
        let _ = (rasterizer, primitive_index);
    }
}

/// Shared pose state of a transformable object: the public translation /
/// rotation / resize fields plus the derived per-frame transform.
#[derive(Clone, Debug, Default)]
pub struct ObjectTransform {
    pub translation: Vertex16,
    pub rotation: RotationAngle,
    pub resize: Scale16,

    world_position: Vertex16,
    mesh_transform: Transform16,
}

impl ObjectTransform {
    /// Recompute the derived transform; the object pass calls this first.
    pub(crate) fn object_shade(&mut self) {
        self.world_position = self.translation;
        self.mesh_transform.translation = self.world_position;
        self.mesh_transform.resize = self.resize;
        self.mesh_transform.set_rotation(self.rotation);
    }

    /// The object's world-space anchor for this frame.
    pub fn world_position(&self) -> Vertex16 {
        self.world_position
    }

    pub(crate) fn transform(&self) -> &Transform16 {
        &self.mesh_transform
    }
}
