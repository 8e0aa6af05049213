//! Frustum visualizer: wireframe of the culling volume, for debugging
//! culling mismatches against the projection.
//!
//! The wireframe is captured on demand: [`FrustumDebugObject::capture`] arms
//! a trigger and the next object pass locks in the current frustum, so the
//! camera can then fly around and inspect the captured volume from outside.

use crate::color::Rgb8;
use crate::fragment::FragmentCollector;
use crate::frustum::{Frustum, Plane16};
use crate::projector::ViewportProjector;
use crate::rasterizer::WindowRasterizer;
use crate::transform::CameraTransform;
use crate::vertex::{average2, Vertex16, VERTEX16_UNIT_SHIFT};

use super::RenderObject;

const RAY_COLOR: Rgb8 = Rgb8::YELLOW;
const FRAME_COLOR: Rgb8 = Rgb8::CYAN;

// Vertex layout of the captured wireframe. Far corners sit four slots after
// their near counterparts.
const NEAR_BOTTOM_RIGHT: u16 = 0;
const NEAR_BOTTOM_LEFT: u16 = 1;
const NEAR_TOP_LEFT: u16 = 2;
const NEAR_TOP_RIGHT: u16 = 3;
const FAR_BOTTOM_RIGHT: u16 = 4;
const FAR_BOTTOM_LEFT: u16 = 5;
const FAR_TOP_LEFT: u16 = 6;
const FAR_TOP_RIGHT: u16 = 7;
const ORIGIN: u16 = 8;
const VERTEX_COUNT: usize = 9;

// Near quad, far quad, the four connecting edges and the four origin rays.
const EDGES: [(u16, u16); 16] = [
    (NEAR_BOTTOM_LEFT, NEAR_BOTTOM_RIGHT),
    (NEAR_TOP_LEFT, NEAR_BOTTOM_LEFT),
    (NEAR_TOP_RIGHT, NEAR_TOP_LEFT),
    (NEAR_BOTTOM_RIGHT, NEAR_TOP_RIGHT),
    (FAR_BOTTOM_RIGHT, FAR_BOTTOM_LEFT),
    (FAR_TOP_LEFT, FAR_BOTTOM_LEFT),
    (FAR_TOP_RIGHT, FAR_TOP_LEFT),
    (FAR_BOTTOM_RIGHT, FAR_TOP_RIGHT),
    (NEAR_BOTTOM_LEFT, FAR_BOTTOM_LEFT),
    (NEAR_TOP_LEFT, FAR_TOP_LEFT),
    (NEAR_TOP_RIGHT, FAR_TOP_RIGHT),
    (NEAR_BOTTOM_RIGHT, FAR_BOTTOM_RIGHT),
    (NEAR_TOP_LEFT, ORIGIN),
    (NEAR_TOP_RIGHT, ORIGIN),
    (NEAR_BOTTOM_LEFT, ORIGIN),
    (NEAR_BOTTOM_RIGHT, ORIGIN),
];

/// Intersection point of three planes.
///
/// Planes follow the frustum convention: unit normal plus a distance in
/// vertex units. Cross products are downscaled in powers of two until every
/// later sum stays inside 32 bits; a vanishing determinant (parallel
/// planes) collapses to the zero vertex.
fn plane_intersection(p1: &Plane16, p2: &Plane16, p3: &Plane16) -> Vertex16 {
    const LIMIT: i32 = i32::MAX / (3 * i16::MAX as i32);

    let (a1, b1, c1) = (
        p1.normal.x as i32,
        p1.normal.y as i32,
        p1.normal.z as i32,
    );
    let (a2, b2, c2) = (
        p2.normal.x as i32,
        p2.normal.y as i32,
        p2.normal.z as i32,
    );
    let (a3, b3, c3) = (
        p3.normal.x as i32,
        p3.normal.y as i32,
        p3.normal.z as i32,
    );

    let mut cross23 = [b2 * c3 - c2 * b3, c2 * a3 - a2 * c3, a2 * b3 - b2 * a3];
    let mut cross31 = [b3 * c1 - c3 * b1, c3 * a1 - a3 * c1, a3 * b1 - b3 * a1];
    let mut cross12 = [b1 * c2 - c1 * b2, c1 * a2 - a1 * c2, a1 * b2 - b1 * a2];

    let mut max_abs = 0u32;
    for component in cross23.iter().chain(&cross31).chain(&cross12) {
        max_abs = max_abs.max(component.unsigned_abs());
    }

    while max_abs > LIMIT as u32 {
        for component in cross23
            .iter_mut()
            .chain(&mut cross31)
            .chain(&mut cross12)
        {
            *component >>= 1;
        }
        max_abs >>= 1;
    }

    // The determinant drops back to vertex units to match the scaled
    // cross products.
    let determinant =
        (a1 * cross23[0] + b1 * cross23[1] + c1 * cross23[2]) >> VERTEX16_UNIT_SHIFT;
    if determinant == 0 {
        return Vertex16::ZERO;
    }

    let nd1 = -(p1.distance as i32);
    let nd2 = -(p2.distance as i32);
    let nd3 = -(p3.distance as i32);

    let numerator_x = nd1 * cross23[0] + nd2 * cross31[0] + nd3 * cross12[0];
    let numerator_y = nd1 * cross23[1] + nd2 * cross31[1] + nd3 * cross12[1];
    let numerator_z = nd1 * cross23[2] + nd2 * cross31[2] + nd3 * cross12[2];

    Vertex16::new(
        (numerator_x / determinant).clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        (numerator_y / determinant).clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        (numerator_z / determinant).clamp(i16::MIN as i32, i16::MAX as i32) as i16,
    )
}

/// Renders the edges of a captured frustum.
///
/// The near corners are the exact three-plane intersections of the near
/// plane with each pair of adjacent side planes; the far corners extrude
/// each near corner away from the origin by `far_scale`. The result is the
/// full cage: near quad, far quad, four connectors and the four rays back
/// to the camera origin.
pub struct FrustumDebugObject {
    /// Extrusion factor from each near corner to its far corner.
    pub far_scale: i16,

    capture_pending: bool,
    source_vertices: [Vertex16; VERTEX_COUNT],
    vertices: [Vertex16; VERTEX_COUNT],
    primitives: [i16; EDGES.len()],
}

impl FrustumDebugObject {
    /// A visualizer armed to capture the first rendered frame's frustum.
    pub fn new() -> Self {
        Self {
            far_scale: 8,
            capture_pending: true,
            source_vertices: [Vertex16::ZERO; VERTEX_COUNT],
            vertices: [Vertex16::ZERO; VERTEX_COUNT],
            primitives: [0; EDGES.len()],
        }
    }

    /// Capture the frustum of the next rendered frame; until then the
    /// previously captured wireframe keeps rendering.
    pub fn capture(&mut self) {
        self.capture_pending = true;
    }

    fn capture_frustum(&mut self, frustum: &Frustum) {
        self.source_vertices[ORIGIN as usize] = frustum.origin;

        // Near corners: intersections of the near plane with each pair of
        // adjacent side planes.
        self.source_vertices[NEAR_BOTTOM_LEFT as usize] = plane_intersection(
            &frustum.near_plane,
            &frustum.left_plane,
            &frustum.bottom_plane,
        );
        self.source_vertices[NEAR_BOTTOM_RIGHT as usize] = plane_intersection(
            &frustum.near_plane,
            &frustum.right_plane,
            &frustum.bottom_plane,
        );
        self.source_vertices[NEAR_TOP_LEFT as usize] = plane_intersection(
            &frustum.near_plane,
            &frustum.left_plane,
            &frustum.top_plane,
        );
        self.source_vertices[NEAR_TOP_RIGHT as usize] = plane_intersection(
            &frustum.near_plane,
            &frustum.right_plane,
            &frustum.top_plane,
        );

        // Far corners: extrude each near corner away from the origin,
        // clamped to the coordinate range.
        let scale = self.far_scale.max(1) as i32;
        for i in 0..4u16 {
            let near = self.source_vertices[(NEAR_BOTTOM_RIGHT + i) as usize];
            let dx = near.x as i32 - frustum.origin.x as i32;
            let dy = near.y as i32 - frustum.origin.y as i32;
            let dz = near.z as i32 - frustum.origin.z as i32;

            self.source_vertices[(FAR_BOTTOM_RIGHT + i) as usize] = Vertex16::new(
                (frustum.origin.x as i32 + dx * scale).clamp(i16::MIN as i32, i16::MAX as i32)
                    as i16,
                (frustum.origin.y as i32 + dy * scale).clamp(i16::MIN as i32, i16::MAX as i32)
                    as i16,
                (frustum.origin.z as i32 + dz * scale).clamp(i16::MIN as i32, i16::MAX as i32)
                    as i16,
            );
        }
    }
}

impl Default for FrustumDebugObject {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderObject for FrustumDebugObject {
    fn object_shade(&mut self, frustum: &Frustum) {
        if self.capture_pending {
            self.capture_pending = false;
            self.capture_frustum(frustum);
        }

        // The captured cage is already in world space; refresh the working
        // copy for this frame's camera passes.
        self.vertices = self.source_vertices;
        for primitive in &mut self.primitives {
            *primitive = 0;
        }
    }

    fn camera_transform(&mut self, transform: &CameraTransform, vertex_index: u16) -> bool {
        if vertex_index as usize >= VERTEX_COUNT {
            return true;
        }
        transform.apply(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_project(&mut self, projector: &ViewportProjector, vertex_index: u16) -> bool {
        if vertex_index as usize >= VERTEX_COUNT {
            return true;
        }
        projector.project(&mut self.vertices[vertex_index as usize]);
        false
    }

    fn screen_shade(&mut self, primitive_index: u16) -> bool {
        if primitive_index as usize >= EDGES.len() {
            return true;
        }
        let (a, b) = EDGES[primitive_index as usize];
        self.primitives[primitive_index as usize] = average2(
            self.vertices[a as usize].z,
            self.vertices[b as usize].z,
        );
        false
    }

    fn fragment_collect(&mut self, collector: &mut FragmentCollector<'_>) {
        for (index, z) in self.primitives.iter().enumerate() {
            if *z >= 0 {
                collector.add_fragment(index as u16, *z);
            }
        }
    }

    fn fragment_shade(&mut self, rasterizer: &mut WindowRasterizer<'_>, primitive_index: u16) {
        let (a, b) = EDGES[primitive_index as usize];
        let color = if b == ORIGIN { RAY_COLOR } else { FRAME_COLOR };
        rasterizer.draw_line_3d(
            color,
            self.vertices[a as usize],
            self.vertices[b as usize],
        );
    }
}
