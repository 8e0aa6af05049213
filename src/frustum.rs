//! View-volume culling: near plane, four side planes and a bounding sphere,
//! rebuilt from the camera state every frame.

use crate::projector::ViewportProjector;
use crate::transform::{CameraState, RotationAngle, Transform16};
use crate::vertex::{
    dot16, normalize32_fast, Vertex16, Vertex32, VERTEX16_UNIT, VERTEX16_UNIT_SHIFT,
};

/// Default slack on the side-plane tests, in vertex units.
pub const PLANE_TOLERANCE: i16 = VERTEX16_UNIT / 16;

/// Default culling draw distance. Also the far end of the depth shading ramp.
pub const DRAW_DISTANCE_MAX: i16 = 6 * VERTEX16_UNIT;

/// Full-scale value of the projection mapping; a point is on the screen edge
/// when `|x| * d == E * (d + z)`.
const PROJECTION_EDGE: i32 = 1 << 14;

/// A plane as a unit normal plus a signed distance, both in vertex units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Plane16 {
    pub normal: Vertex16,
    pub distance: i16,
}

impl Plane16 {
    /// Plane through `point` with the given unit normal.
    fn through(normal: Vertex16, point: Vertex16) -> Self {
        let distance = -(dot16(normal, point) >> VERTEX16_UNIT_SHIFT);
        Self {
            normal,
            distance: distance.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        }
    }

    /// Signed distance from the plane to a point, in vertex units.
    pub fn distance_to_point(&self, point: Vertex16) -> i16 {
        let dot = dot16(self.normal, point) >> VERTEX16_UNIT_SHIFT;
        (dot + self.distance as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// The culling volume for one frame.
///
/// Side planes carry outward normals, so points pass when their signed
/// distance stays at or below a small tolerance; the near plane's normal is
/// the camera forward axis and points pass in front of it.
#[derive(Copy, Clone, Debug, Default)]
pub struct Frustum {
    pub near_plane: Plane16,
    pub left_plane: Plane16,
    pub right_plane: Plane16,
    pub top_plane: Plane16,
    pub bottom_plane: Plane16,

    pub rotation: RotationAngle,
    pub origin: Vertex16,
    pub radius_squared: i32,
}

impl Frustum {
    /// Rebuild the frustum from the camera pose, the projector's FoV distance
    /// and the viewport aspect.
    pub fn set_from_camera(
        &mut self,
        camera: &CameraState,
        projector: &ViewportProjector,
        view_width: u16,
        view_height: u16,
    ) {
        self.rotation = camera.rotation;
        self.origin = camera.position;
        self.radius_squared = DRAW_DISTANCE_MAX as i32 * DRAW_DISTANCE_MAX as i32;

        // Camera basis in world space.
        let mut basis = Transform16::default();
        basis.set_rotation(camera.rotation);
        let mut forward = Vertex16::new(0, 0, VERTEX16_UNIT);
        let mut right = Vertex16::new(VERTEX16_UNIT, 0, 0);
        let mut up = Vertex16::new(0, VERTEX16_UNIT, 0);
        basis.rotate(&mut forward);
        basis.rotate(&mut right);
        basis.rotate(&mut up);

        self.near_plane = Plane16::through(forward, self.origin);

        // The side planes meet at the projection apex, one FoV distance
        // behind the camera along the forward axis.
        let distance = projector.view_distance() as i32;
        let apex = Vertex16::new(
            self.origin.x
                .saturating_sub(((forward.x as i32 * distance) >> VERTEX16_UNIT_SHIFT) as i16),
            self.origin.y
                .saturating_sub(((forward.y as i32 * distance) >> VERTEX16_UNIT_SHIFT) as i16),
            self.origin.z
                .saturating_sub(((forward.z as i32 * distance) >> VERTEX16_UNIT_SHIFT) as i16),
        );

        // Screen-edge condition of the projector: |x| * d = E * (d + z),
        // giving outward side-plane normals of +-axis * d - forward * E. The
        // vertical pair folds in the aspect correction.
        let vertical_distance = if view_height == 0 {
            distance
        } else {
            distance * view_width as i32 / view_height as i32
        };

        self.left_plane = Plane16::through(
            side_normal(right, -distance, forward),
            apex,
        );
        self.right_plane = Plane16::through(
            side_normal(right, distance, forward),
            apex,
        );
        self.top_plane = Plane16::through(
            side_normal(up, -vertical_distance, forward),
            apex,
        );
        self.bottom_plane = Plane16::through(
            side_normal(up, vertical_distance, forward),
            apex,
        );
    }

    /// Whether a world-space point is inside the frustum, with the default
    /// side-plane tolerance.
    pub fn is_point_inside(&self, point: Vertex16) -> bool {
        self.is_point_inside_tolerant(point, PLANE_TOLERANCE)
    }

    pub fn is_point_inside_tolerant(&self, point: Vertex16, plane_tolerance: i16) -> bool {
        // Sphere culling first; outside the bounding sphere is always out.
        {
            let dx = point.x as i64 - self.origin.x as i64;
            let dy = point.y as i64 - self.origin.y as i64;
            let dz = point.z as i64 - self.origin.z as i64;
            let square_distance = dx * dx + dy * dy + dz * dz;
            if square_distance > self.radius_squared as i64 {
                return false;
            }
        }

        // Points must sit in front of the near plane.
        if self.near_plane.distance_to_point(point) < 0 {
            return false;
        }

        // Side planes face outward.
        if self.left_plane.distance_to_point(point) > plane_tolerance {
            return false;
        }
        if self.right_plane.distance_to_point(point) > plane_tolerance {
            return false;
        }
        if self.top_plane.distance_to_point(point) > plane_tolerance {
            return false;
        }
        if self.bottom_plane.distance_to_point(point) > plane_tolerance {
            return false;
        }

        true
    }

    /// Camera forward axis, recoverable from the near plane.
    pub fn forward(&self) -> Vertex16 {
        self.near_plane.normal
    }
}

/// Outward side-plane normal `axis * axis_scale - forward * E`, normalized.
fn side_normal(axis: Vertex16, axis_scale: i32, forward: Vertex16) -> Vertex16 {
    normalize32_fast(Vertex32::new(
        axis.x as i32 * axis_scale - forward.x as i32 * PROJECTION_EDGE,
        axis.y as i32 * axis_scale - forward.y as i32 * PROJECTION_EDGE,
        axis.z as i32 * axis_scale - forward.z as i32 * PROJECTION_EDGE,
    ))
}

/// Convenience constructor used by the engine each frame.
pub fn frustum_from_camera(
    camera: &CameraState,
    projector: &ViewportProjector,
    view_width: u16,
    view_height: u16,
) -> Frustum {
    let mut frustum = Frustum::default();
    frustum.set_from_camera(camera, projector, view_width, view_height);
    frustum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{Angle, UFraction16};

    fn identity_frustum() -> Frustum {
        let mut projector = ViewportProjector::default();
        projector.set_dimensions(128, 128);
        projector.set_fov(UFraction16(16384));
        frustum_from_camera(&CameraState::default(), &projector, 128, 128)
    }

    #[test]
    fn ahead_is_inside_behind_is_out() {
        let frustum = identity_frustum();
        assert!(frustum.is_point_inside(Vertex16::new(0, 0, VERTEX16_UNIT)));
        assert!(frustum.is_point_inside(Vertex16::new(0, 0, 2 * VERTEX16_UNIT)));
        assert!(!frustum.is_point_inside(Vertex16::new(0, 0, -VERTEX16_UNIT)));
    }

    #[test]
    fn far_points_fail_the_sphere() {
        let frustum = identity_frustum();
        assert!(!frustum.is_point_inside(Vertex16::new(0, 0, 7 * VERTEX16_UNIT)));
    }

    #[test]
    fn wide_offsets_fail_side_planes() {
        let frustum = identity_frustum();
        // Far to the side at shallow depth: inside the sphere but outside
        // the view cone.
        assert!(!frustum.is_point_inside(Vertex16::new(5 * VERTEX16_UNIT, 0, 0)));
        assert!(!frustum.is_point_inside(Vertex16::new(-5 * VERTEX16_UNIT, 0, 0)));
        assert!(!frustum.is_point_inside(Vertex16::new(0, 5 * VERTEX16_UNIT, 0)));
        // A smaller offset at depth is within the cone.
        assert!(frustum.is_point_inside(Vertex16::new(VERTEX16_UNIT, 0, 4 * VERTEX16_UNIT)));
    }

    #[test]
    fn rotated_camera_faces_its_forward() {
        let mut projector = ViewportProjector::default();
        projector.set_dimensions(128, 128);
        projector.set_fov(UFraction16(16384));
        // Quarter yaw: forward becomes +x.
        let camera = CameraState {
            position: Vertex16::ZERO,
            rotation: RotationAngle {
                x: Angle::ZERO,
                y: Angle::QUARTER,
                z: Angle::ZERO,
            },
        };
        let frustum = frustum_from_camera(&camera, &projector, 128, 128);
        assert!(frustum.is_point_inside(Vertex16::new(2 * VERTEX16_UNIT, 0, 0)));
        assert!(!frustum.is_point_inside(Vertex16::new(-2 * VERTEX16_UNIT, 0, 0)));
    }
}
