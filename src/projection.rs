//! Generalized (off-axis) perspective projection
//!
//! Derives an asymmetric view frustum from the viewer's eye position and the
//! calibrated display corners, so a flat display behaves like a window into
//! the scene. The construction follows Kooima's "Generalized Perspective
//! Projection": build the display's orthonormal basis, project the
//! eye-to-corner vectors onto it, and scale the near-plane extents by
//! `near / distance`.
//!
//! Author: Moroya Sakamoto

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::window::{Corner, WindowRect};

/// Tolerance below which edge lengths, cross products, and eye-to-plane
/// distances are treated as zero
pub const GEOMETRY_EPSILON: f32 = 1e-5;

/// Reasons a projection cannot be computed
///
/// All of these are reported to the caller rather than propagated as a
/// NaN/Inf matrix; the host holds its last good frame or falls back to a
/// symmetric default. The computation is deterministic, so retrying with
/// unchanged input reproduces the same error.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    /// `near` must be positive and `far` strictly beyond it
    #[error("invalid clip range: near = {near}, far = {far}")]
    InvalidClipRange {
        /// Rejected near clip distance
        near: f32,
        /// Rejected far clip distance
        far: f32,
    },

    /// Window corners are coincident or collinear (zero width or height)
    #[error("degenerate window geometry: corners are coincident or collinear")]
    DegenerateGeometry,

    /// The eye lies on (or within epsilon of) the window plane
    #[error("eye lies on the window plane (signed distance {distance})")]
    EyeOnWindowPlane {
        /// Measured signed eye-to-plane distance
        distance: f32,
    },
}

/// Near-plane extents of an off-center frustum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrustumExtents {
    /// Left offset of the near plane
    pub left: f32,
    /// Right offset of the near plane
    pub right: f32,
    /// Bottom offset of the near plane
    pub bottom: f32,
    /// Top offset of the near plane
    pub top: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

/// A computed off-axis projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Column-major projection matrix (GL clip-space convention)
    pub matrix: Mat4,
    /// Unit normal of the display plane, the direction the camera faces
    pub normal: Vec3,
}

/// Compute the off-center frustum extents for an eye looking through a
/// display described by three of its corners
///
/// Returns the extents together with the display's unit plane normal.
pub fn frustum_extents(
    bottom_left: Vec3,
    bottom_right: Vec3,
    top_left: Vec3,
    eye: Vec3,
    near: f32,
    far: f32,
) -> Result<(FrustumExtents, Vec3), ProjectionError> {
    if !(near > 0.0 && far > near) {
        return Err(ProjectionError::InvalidClipRange { near, far });
    }

    // Orthonormal basis of the display plane
    let right_edge = bottom_right - bottom_left;
    let up_edge = top_left - bottom_left;
    if right_edge.length() < GEOMETRY_EPSILON || up_edge.length() < GEOMETRY_EPSILON {
        return Err(ProjectionError::DegenerateGeometry);
    }
    let right = right_edge.normalize();
    let up = up_edge.normalize();
    let cross = right.cross(up);
    if cross.length() < GEOMETRY_EPSILON {
        return Err(ProjectionError::DegenerateGeometry);
    }
    let normal = cross.normalize();

    // Vectors from the eye to the measured corners
    let a = bottom_left - eye;
    let b = bottom_right - eye;
    let c = top_left - eye;

    // Perpendicular distance from the eye to the display plane
    let distance = a.dot(normal);
    if distance.abs() < GEOMETRY_EPSILON {
        return Err(ProjectionError::EyeOnWindowPlane { distance });
    }

    let scale = near / distance;
    Ok((
        FrustumExtents {
            left: right.dot(a) * scale,
            right: right.dot(b) * scale,
            bottom: up.dot(a) * scale,
            top: up.dot(c) * scale,
            near,
            far,
        },
        normal,
    ))
}

/// Build the off-center perspective matrix for the given frustum extents
///
/// Standard GL-style asymmetric frustum; an eye on the display's
/// perpendicular bisector yields `left == -right` and `bottom == -top` and
/// the matrix reduces to the symmetric form.
pub fn perspective_off_center(extents: &FrustumExtents) -> Mat4 {
    let FrustumExtents {
        left,
        right,
        bottom,
        top,
        near,
        far,
    } = *extents;

    let x = 2.0 * near / (right - left);
    let y = 2.0 * near / (top - bottom);
    let a = (right + left) / (right - left);
    let b = (top + bottom) / (top - bottom);
    let c = -(far + near) / (far - near);
    let d = -(2.0 * far * near) / (far - near);

    Mat4::from_cols(
        Vec4::new(x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y, 0.0, 0.0),
        Vec4::new(a, b, c, -1.0),
        Vec4::new(0.0, 0.0, d, 0.0),
    )
}

/// Compute the full off-axis projection for an eye and three display corners
pub fn compute_projection(
    bottom_left: Vec3,
    bottom_right: Vec3,
    top_left: Vec3,
    eye: Vec3,
    near: f32,
    far: f32,
) -> Result<Projection, ProjectionError> {
    let (extents, normal) = frustum_extents(bottom_left, bottom_right, top_left, eye, near, far)?;
    Ok(Projection {
        matrix: perspective_off_center(&extents),
        normal,
    })
}

/// Compute the off-axis projection for a calibrated window rectangle
///
/// An incomplete rectangle reports [`ProjectionError::DegenerateGeometry`];
/// degenerate captures are tolerated at calibration time and only surface
/// here.
pub fn window_projection(
    window: &WindowRect,
    eye: Vec3,
    near: f32,
    far: f32,
) -> Result<Projection, ProjectionError> {
    match (
        window.corner(Corner::BottomLeft),
        window.corner(Corner::BottomRight),
        window.corner(Corner::TopLeft),
    ) {
        (Some(bottom_left), Some(bottom_right), Some(top_left)) => {
            compute_projection(bottom_left, bottom_right, top_left, eye, near, far)
        }
        _ => Err(ProjectionError::DegenerateGeometry),
    }
}

/// Orientation facing along `forward` with the world Y axis up
///
/// The viewing camera faces along the display normal regardless of where
/// the eye is; only the projection is skewed off-axis. Falls back to the Z
/// axis as up when `forward` is vertical.
pub fn look_rotation(forward: Vec3) -> Quat {
    let forward = forward.normalize_or(Vec3::Z);
    let world_up = if forward.dot(Vec3::Y).abs() > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = world_up.cross(forward).normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

/// Keep the yaw and pitch of `rotation` but zero its roll
///
/// The "enhanced perspective" variant: prevents the horizon from twisting
/// with the tracked head, at the cost of only being correct for vertical
/// displays.
pub fn roll_locked(rotation: Quat) -> Quat {
    let (yaw, pitch, _roll) = rotation.to_euler(glam::EulerRot::YXZ);
    Quat::from_euler(glam::EulerRot::YXZ, yaw, pitch, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unit display in the XY plane, spanning [-1, 1] on both axes
    const BL: Vec3 = Vec3::new(-1.0, -1.0, 0.0);
    const BR: Vec3 = Vec3::new(1.0, -1.0, 0.0);
    const TL: Vec3 = Vec3::new(-1.0, 1.0, 0.0);

    #[test]
    fn test_centered_eye_is_symmetric() {
        let eye = Vec3::new(0.0, 0.0, -2.0);
        let (extents, normal) = frustum_extents(BL, BR, TL, eye, 0.1, 100.0).unwrap();

        assert!((extents.left + extents.right).abs() < 1e-6);
        assert!((extents.bottom + extents.top).abs() < 1e-6);
        assert!((normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_offset_eye_skews_frustum() {
        // Eye shifted toward the right edge: the frustum must open wider to
        // the left than to the right
        let eye = Vec3::new(0.5, 0.0, -2.0);
        let (extents, _) = frustum_extents(BL, BR, TL, eye, 0.1, 100.0).unwrap();

        assert!(extents.left.abs() > extents.right.abs());
        assert!((extents.bottom + extents.top).abs() < 1e-6);
    }

    #[test]
    fn test_off_center_matrix_entries() {
        let extents = FrustumExtents {
            left: -0.2,
            right: 0.4,
            bottom: -0.1,
            top: 0.3,
            near: 0.1,
            far: 100.0,
        };
        let m = perspective_off_center(&extents);

        assert!((m.x_axis.x - 2.0 * 0.1 / 0.6).abs() < 1e-6);
        assert!((m.y_axis.y - 2.0 * 0.1 / 0.4).abs() < 1e-6);
        assert!((m.z_axis.x - 0.2 / 0.6).abs() < 1e-6);
        assert!((m.z_axis.y - 0.2 / 0.4).abs() < 1e-6);
        assert!((m.z_axis.z + 100.1 / 99.9).abs() < 1e-5);
        assert!((m.w_axis.z + 2.0 * 100.0 * 0.1 / 99.9).abs() < 1e-5);
        assert!((m.z_axis.w + 1.0).abs() < 1e-6);
        assert_eq!(m.w_axis.w, 0.0);
    }

    #[test]
    fn test_invalid_clip_range() {
        let eye = Vec3::new(0.0, 0.0, -2.0);
        assert_eq!(
            compute_projection(BL, BR, TL, eye, 0.0, 100.0),
            Err(ProjectionError::InvalidClipRange {
                near: 0.0,
                far: 100.0
            })
        );
        assert_eq!(
            compute_projection(BL, BR, TL, eye, 1.0, 0.5),
            Err(ProjectionError::InvalidClipRange {
                near: 1.0,
                far: 0.5
            })
        );
    }

    #[test]
    fn test_collinear_corners_rejected() {
        let eye = Vec3::new(0.0, 0.0, -2.0);
        // Top-left on the bottom edge: zero-area display
        let result = compute_projection(BL, BR, Vec3::new(0.0, -1.0, 0.0), eye, 0.1, 100.0);
        assert_eq!(result, Err(ProjectionError::DegenerateGeometry));

        // Coincident corners
        let result = compute_projection(BL, BL, TL, eye, 0.1, 100.0);
        assert_eq!(result, Err(ProjectionError::DegenerateGeometry));
    }

    #[test]
    fn test_eye_on_plane_rejected() {
        let eye = Vec3::new(5.0, 3.0, 0.0);
        match compute_projection(BL, BR, TL, eye, 0.1, 100.0) {
            Err(ProjectionError::EyeOnWindowPlane { distance }) => {
                assert!(distance.abs() < GEOMETRY_EPSILON);
            }
            other => panic!("expected EyeOnWindowPlane, got {:?}", other),
        }
    }

    #[test]
    fn test_look_rotation_faces_forward() {
        let forward = Vec3::new(1.0, 0.0, 1.0).normalize();
        let rotation = look_rotation(forward);
        let faced = rotation * Vec3::Z;
        assert!((faced - forward).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_vertical_forward() {
        // Forward parallel to world up must not collapse the basis
        let rotation = look_rotation(Vec3::Y);
        let faced = rotation * Vec3::Z;
        assert!((faced - Vec3::Y).length() < 1e-5);
        assert!(rotation.is_normalized());
    }

    #[test]
    fn test_roll_locked_zeroes_roll() {
        let rotation = Quat::from_euler(glam::EulerRot::YXZ, 0.7, -0.3, 1.1);
        let locked = roll_locked(rotation);
        let (yaw, pitch, roll) = locked.to_euler(glam::EulerRot::YXZ);
        assert!((yaw - 0.7).abs() < 1e-4);
        assert!((pitch + 0.3).abs() < 1e-4);
        assert!(roll.abs() < 1e-4);
    }
}
