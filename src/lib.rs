//! A fixed-point, integer-only 3D rendering engine for small and embedded
//! displays.
//!
//! `intrast` renders scenes of meshes, edges, point clouds, billboards and
//! backgrounds into a shaded 2D raster without ever touching floating point:
//! positions are `i16` at a unit of 4096, fractions are shift-scaled
//! newtypes, and every division is guarded. The pipeline is a cooperative
//! state machine - each [`engine::EngineRenderTask::tick`] performs a single
//! unit of work - so a frame can be interleaved with everything else a small
//! target has to do.
//!
//! The drawing boundary is the [`surface::OutputSurface`] trait; anything
//! from a memory framebuffer to a DMA-driven display controller fits behind
//! it. Depth ordering uses the painter's algorithm over per-primitive depth
//! keys; there is no z-buffer.
//!
//! ```
//! use intrast::prelude::*;
//!
//! let mut fill = TriangleFillShader;
//! let mut cube: SimpleMeshTriangleObject<8, 12> =
//!     SimpleMeshTriangleObject::with_static_tables(
//!         &intrast::shapes::CUBE_VERTICES,
//!         &intrast::shapes::CUBE_TRIANGLES,
//!     );
//! cube.transform.translation = Vertex16::new(0, 0, 3 * VERTEX16_UNIT);
//! cube.fragment_shader = Some(&mut fill);
//!
//! let mut engine: EngineRenderTask<_, 4, 64> =
//!     EngineRenderTask::new(MockSurface::new(96, 64));
//! engine.add_object(&mut cube);
//! engine.start();
//! engine.render_frames(1);
//! assert!(engine.surface().draw_call_count() > 0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod color;
pub mod engine;
pub mod fixed;
pub mod fragment;
pub mod frustum;
pub mod object;
pub mod projector;
pub mod rasterizer;
pub mod sampler;
pub mod shader;
pub mod shapes;
pub mod stats;
pub mod surface;
pub mod transform;
pub mod vertex;

// Reexports
pub use self::color::Rgb8;
pub use self::engine::EngineRenderTask;
pub use self::fixed::{Angle, Fraction16, Fraction32, Scale16, UFraction16, UFraction8};
pub use self::fragment::{FragmentKey, FragmentManager};
pub use self::frustum::Frustum;
pub use self::object::RenderObject;
pub use self::projector::ViewportProjector;
pub use self::rasterizer::{PixelShader, WindowRasterizer};
pub use self::shader::{FragmentShader, LightSource, LightsShader, Material, SceneShader};
pub use self::surface::{OutputSurface, PixelBlendMode, SurfaceDimensions};
pub use self::transform::{CameraState, RotationAngle};
pub use self::vertex::{TriangleFace, Vertex16, VERTEX16_UNIT};

/// The common imports for building and rendering a scene.
pub mod prelude {
    pub use crate::color::Rgb8;
    pub use crate::engine::EngineRenderTask;
    pub use crate::fixed::{Angle, Scale16, UFraction16, UFraction8};
    pub use crate::object::{
        BackgroundFillObject, BillboardObject, BillboardScaleMode, FaceCulling, FrustumCulling,
        RenderObject, SimpleEdgeLineObject, SimpleEdgeVertexObject, SimpleMeshTriangleObject,
        SimplePointCloudObject,
    };
    pub use crate::object::mesh::SimpleMeshVertexObject;
    pub use crate::shader::fragment::{
        BackgroundFillShader, BillboardFillShader, BillboardOutlineShader, EdgeGradientShader,
        EdgeLineShader, PointPixelShader, TriangleFillShader, TriangleWireframeShader,
        VertexColorTriangleShader,
    };
    pub use crate::shader::{LightSource, LightsShader, Material, NormalVisualizerShader};
    pub use crate::surface::OutputSurface;
    #[cfg(feature = "std")]
    pub use crate::surface::{FrameBufferSurface, MockSurface};
    pub use crate::transform::{CameraState, RotationAngle};
    pub use crate::vertex::{EdgeLine, TriangleFace, Vertex16, VERTEX16_UNIT};
}
