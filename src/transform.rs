//! Rotation, scale and translation transforms, plus the per-frame camera
//! transform.
//!
//! Rotations are decomposed into the three axis rotations applied X, then Y,
//! then Z, with the sines and cosines precomputed once per frame. The camera
//! uses the same decomposition at 32-bit fraction precision and with the
//! rotation order driven from the reverse angles.

use crate::fixed::{cosine16, cosine32, sine16, sine32, Angle, Fraction16, Fraction32, Scale16};
use crate::vertex::{Vertex16, VERTEX16_UNIT};

/// Per-axis rotation angles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationAngle {
    pub x: Angle,
    pub y: Angle,
    pub z: Angle,
}

/// Externally driven camera pose. The engine derives the reverse transform
/// from this every frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraState {
    pub position: Vertex16,
    pub rotation: RotationAngle,
}

/// Scale + rotate + translate transform for posing objects in world space.
#[derive(Copy, Clone, Debug)]
pub struct Transform16 {
    pub cos_x: Fraction16,
    pub sin_x: Fraction16,
    pub cos_y: Fraction16,
    pub sin_y: Fraction16,
    pub cos_z: Fraction16,
    pub sin_z: Fraction16,
    pub translation: Vertex16,
    pub resize: Scale16,
}

impl Default for Transform16 {
    fn default() -> Self {
        Self {
            cos_x: Fraction16::ONE,
            sin_x: Fraction16::ZERO,
            cos_y: Fraction16::ONE,
            sin_y: Fraction16::ZERO,
            cos_z: Fraction16::ONE,
            sin_z: Fraction16::ZERO,
            translation: Vertex16::ZERO,
            resize: Scale16::ONE,
        }
    }
}

impl Transform16 {
    /// Refresh the cached sines/cosines from the given rotation.
    pub fn set_rotation(&mut self, rotation: RotationAngle) {
        self.cos_x = cosine16(rotation.x);
        self.sin_x = sine16(rotation.x);
        self.cos_y = cosine16(rotation.y);
        self.sin_y = sine16(rotation.y);
        self.cos_z = cosine16(rotation.z);
        self.sin_z = sine16(rotation.z);
    }

    /// Scale, rotate and translate a vertex in place.
    pub fn apply(&self, vertex: &mut Vertex16) {
        vertex.x = self.resize.scale_i16(vertex.x);
        vertex.y = self.resize.scale_i16(vertex.y);
        vertex.z = self.resize.scale_i16(vertex.z);

        self.rotate(vertex);

        vertex.x = vertex.x.saturating_add(self.translation.x);
        vertex.y = vertex.y.saturating_add(self.translation.y);
        vertex.z = vertex.z.saturating_add(self.translation.z);
    }

    /// Rotate a vertex in place without scaling or translating; used for
    /// precomputed normals.
    pub fn rotate(&self, vertex: &mut Vertex16) {
        // Rotation around the X axis.
        let y1 = vertex.y;
        vertex.y = self.cos_x.scale_i16(y1) - self.sin_x.scale_i16(vertex.z);
        vertex.z = self.sin_x.scale_i16(y1) + self.cos_x.scale_i16(vertex.z);

        // Rotation around the Y axis.
        let x1 = vertex.x;
        vertex.x = self.cos_y.scale_i16(x1) + self.sin_y.scale_i16(vertex.z);
        vertex.z = -self.sin_y.scale_i16(x1) + self.cos_y.scale_i16(vertex.z);

        // Rotation around the Z axis.
        let x2 = vertex.x;
        vertex.x = self.cos_z.scale_i16(x2) - self.sin_z.scale_i16(vertex.y);
        vertex.y = self.sin_z.scale_i16(x2) + self.cos_z.scale_i16(vertex.y);
    }
}

/// The reverse camera transform: translation by the negated camera position
/// followed by rotation by the negated camera angles, with the scene shifted
/// one unit forward around the rotation so it sits in front of the origin.
#[derive(Copy, Clone, Debug)]
pub struct CameraTransform {
    pub cos_x: Fraction32,
    pub sin_x: Fraction32,
    pub cos_y: Fraction32,
    pub sin_y: Fraction32,
    pub cos_z: Fraction32,
    pub sin_z: Fraction32,
    pub translation: Vertex16,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            cos_x: Fraction32::ONE,
            sin_x: Fraction32::ZERO,
            cos_y: Fraction32::ONE,
            sin_y: Fraction32::ZERO,
            cos_z: Fraction32::ONE,
            sin_z: Fraction32::ZERO,
            translation: Vertex16::ZERO,
        }
    }
}

impl CameraTransform {
    /// Rebuild from the camera state: angles are negated modulo the angle
    /// range and the translation is the negated position.
    pub fn set_from_camera(&mut self, camera: &CameraState) {
        let x = camera.rotation.x.reversed();
        let y = camera.rotation.y.reversed();
        let z = camera.rotation.z.reversed();
        self.cos_x = cosine32(x);
        self.sin_x = sine32(x);
        self.cos_y = cosine32(y);
        self.sin_y = sine32(y);
        self.cos_z = cosine32(z);
        self.sin_z = sine32(z);
        self.translation = Vertex16::new(
            camera.position.x.saturating_neg(),
            camera.position.y.saturating_neg(),
            camera.position.z.saturating_neg(),
        );
    }

    /// Transform a world-space vertex into camera space.
    pub fn apply(&self, vertex: &mut Vertex16) {
        const CAMERA_SHIFT: i16 = VERTEX16_UNIT;

        vertex.z = vertex.z.saturating_add(CAMERA_SHIFT);

        vertex.x = vertex.x.saturating_add(self.translation.x);
        vertex.y = vertex.y.saturating_add(self.translation.y);
        vertex.z = vertex.z.saturating_add(self.translation.z);

        // Rotation around the X axis.
        let y1 = vertex.y;
        vertex.y = self.cos_x.scale_i16(y1) - self.sin_x.scale_i16(vertex.z);
        vertex.z = self.sin_x.scale_i16(y1) + self.cos_x.scale_i16(vertex.z);

        // Rotation around the Y axis.
        let x1 = vertex.x;
        vertex.x = self.cos_y.scale_i16(x1) + self.sin_y.scale_i16(vertex.z);
        vertex.z = -self.sin_y.scale_i16(x1) + self.cos_y.scale_i16(vertex.z);

        // Rotation around the Z axis.
        let x2 = vertex.x;
        vertex.x = self.cos_z.scale_i16(x2) - self.sin_z.scale_i16(vertex.y);
        vertex.y = self.sin_z.scale_i16(x2) + self.cos_z.scale_i16(vertex.y);

        vertex.z = vertex.z.saturating_sub(CAMERA_SHIFT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Angle;

    #[test]
    fn identity_transform_translates_only() {
        let mut transform = Transform16::default();
        transform.translation = Vertex16::new(10, -20, 30);
        let mut v = Vertex16::new(100, 200, 300);
        transform.apply(&mut v);
        assert_eq!(v, Vertex16::new(110, 180, 330));
    }

    #[test]
    fn quarter_turn_around_z() {
        let mut transform = Transform16::default();
        transform.set_rotation(RotationAngle {
            x: Angle::ZERO,
            y: Angle::ZERO,
            z: Angle::QUARTER,
        });
        let mut v = Vertex16::new(1000, 0, 0);
        transform.apply(&mut v);
        assert!(v.x.abs() <= 1, "{v:?}");
        assert!((v.y - 1000).abs() <= 1, "{v:?}");
        assert_eq!(v.z, 0);
    }

    #[test]
    fn resize_scales_before_rotation() {
        let mut transform = Transform16::default();
        transform.resize = Scale16::factor(1, 2);
        let mut v = Vertex16::new(1000, -500, 250);
        transform.apply(&mut v);
        assert_eq!(v, Vertex16::new(500, -250, 125));
    }

    #[test]
    fn identity_camera_round_trips() {
        let mut camera = CameraTransform::default();
        camera.set_from_camera(&CameraState::default());
        let mut v = Vertex16::new(123, -456, 789);
        camera.apply(&mut v);
        assert_eq!(v, Vertex16::new(123, -456, 789));
    }

    #[test]
    fn camera_translation_is_reversed() {
        let mut camera = CameraTransform::default();
        camera.set_from_camera(&CameraState {
            position: Vertex16::new(100, 0, 0),
            rotation: RotationAngle::default(),
        });
        let mut v = Vertex16::new(100, 0, 500);
        camera.apply(&mut v);
        assert_eq!(v, Vertex16::new(0, 0, 500));
    }

    #[test]
    fn camera_yaw_rotates_relative_positions() {
        // The forward shift cancels out of relative positions, so the
        // difference of two transformed points is the reverse rotation of
        // their world-space difference.
        let mut camera = CameraTransform::default();
        camera.set_from_camera(&CameraState {
            position: Vertex16::ZERO,
            rotation: RotationAngle {
                x: Angle::ZERO,
                y: Angle::QUARTER,
                z: Angle::ZERO,
            },
        });
        let mut a = Vertex16::ZERO;
        let mut b = Vertex16::new(1000, 0, 0);
        camera.apply(&mut a);
        camera.apply(&mut b);
        // A point to the camera's right swings ahead under a reverse
        // quarter-turn yaw.
        assert!((b.x - a.x).abs() <= 1);
        assert_eq!(b.y - a.y, 0);
        assert!((b.z - a.z - 1000).abs() <= 1);
    }
}
