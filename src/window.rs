//! Window rectangle geometry
//!
//! A calibrated physical display is modeled as its four corner points in
//! world space. Three corners are measured, the fourth is derived by the
//! calibration state machine, and everything else (width, height, center,
//! plane normal) is computed on demand from the corners.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies one corner of the display rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Top-left corner (first capture)
    TopLeft,
    /// Bottom-left corner (second capture)
    BottomLeft,
    /// Bottom-right corner (third capture)
    BottomRight,
    /// Top-right corner (derived, never captured)
    TopRight,
}

/// Mean of any number of points; the origin for an empty slice
pub fn center_of(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

/// The display rectangle in world space
///
/// Corners are `None` until set, so a genuine corner at the world origin is
/// still distinguishable from an unset one. Derived values treat unset
/// corners as the origin and are only meaningful once [`is_complete`]
/// returns true.
///
/// [`is_complete`]: WindowRect::is_complete
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowRect {
    top_left: Option<Vec3>,
    bottom_left: Option<Vec3>,
    bottom_right: Option<Vec3>,
    top_right: Option<Vec3>,
}

impl WindowRect {
    /// Create an empty rectangle with all corners unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rectangle with all four corners already known
    pub fn from_corners(
        top_left: Vec3,
        bottom_left: Vec3,
        bottom_right: Vec3,
        top_right: Vec3,
    ) -> Self {
        WindowRect {
            top_left: Some(top_left),
            bottom_left: Some(bottom_left),
            bottom_right: Some(bottom_right),
            top_right: Some(top_right),
        }
    }

    /// Get a corner position, or `None` if it has not been set
    pub fn corner(&self, corner: Corner) -> Option<Vec3> {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
            Corner::TopRight => self.top_right,
        }
    }

    /// Set a corner position
    pub fn set_corner(&mut self, corner: Corner, position: Vec3) {
        let slot = match corner {
            Corner::TopLeft => &mut self.top_left,
            Corner::BottomLeft => &mut self.bottom_left,
            Corner::BottomRight => &mut self.bottom_right,
            Corner::TopRight => &mut self.top_right,
        };
        *slot = Some(position);
    }

    /// Return every corner to the unset state
    pub fn clear(&mut self) {
        *self = WindowRect::default();
    }

    /// True once all four corners are set
    pub fn is_complete(&self) -> bool {
        self.top_left.is_some()
            && self.bottom_left.is_some()
            && self.bottom_right.is_some()
            && self.top_right.is_some()
    }

    fn corner_or_origin(&self, corner: Corner) -> Vec3 {
        self.corner(corner).unwrap_or(Vec3::ZERO)
    }

    /// Physical width of the display (length of the bottom edge)
    pub fn width(&self) -> f32 {
        (self.corner_or_origin(Corner::BottomRight) - self.corner_or_origin(Corner::BottomLeft))
            .length()
    }

    /// Physical height of the display (length of the left edge)
    pub fn height(&self) -> f32 {
        (self.corner_or_origin(Corner::TopLeft) - self.corner_or_origin(Corner::BottomLeft))
            .length()
    }

    /// Center of the display rectangle
    pub fn center(&self) -> Vec3 {
        center_of(&[
            self.corner_or_origin(Corner::TopLeft),
            self.corner_or_origin(Corner::BottomLeft),
            self.corner_or_origin(Corner::BottomRight),
            self.corner_or_origin(Corner::TopRight),
        ])
    }

    /// Unit normal of the display plane
    ///
    /// Cross product of the normalized bottom and left edges. Zero when the
    /// corners are coincident or collinear.
    pub fn normal(&self) -> Vec3 {
        let right = (self.corner_or_origin(Corner::BottomRight)
            - self.corner_or_origin(Corner::BottomLeft))
        .normalize_or_zero();
        let up = (self.corner_or_origin(Corner::TopLeft)
            - self.corner_or_origin(Corner::BottomLeft))
        .normalize_or_zero();
        right.cross(up).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of_points() {
        let center = center_of(&[Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)]);
        assert!((center - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_center_of_empty() {
        assert_eq!(center_of(&[]), Vec3::ZERO);
    }

    #[test]
    fn test_unset_corner_is_distinct_from_origin() {
        let mut rect = WindowRect::new();
        assert_eq!(rect.corner(Corner::TopLeft), None);

        // A corner genuinely at the origin stays distinguishable
        rect.set_corner(Corner::TopLeft, Vec3::ZERO);
        assert_eq!(rect.corner(Corner::TopLeft), Some(Vec3::ZERO));
    }

    #[test]
    fn test_derived_metrics() {
        let rect = WindowRect::from_corners(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
        );
        assert!((rect.width() - 2.0).abs() < 1e-6);
        assert!((rect.height() - 2.0).abs() < 1e-6);
        assert!((rect.center() - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
        assert!((rect.normal() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        // All corners coincident
        let rect = WindowRect::from_corners(Vec3::ONE, Vec3::ONE, Vec3::ONE, Vec3::ONE);
        assert_eq!(rect.normal(), Vec3::ZERO);
    }

    #[test]
    fn test_clear() {
        let mut rect = WindowRect::from_corners(Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE);
        assert!(rect.is_complete());
        rect.clear();
        assert!(!rect.is_complete());
        assert_eq!(rect.corner(Corner::BottomRight), None);
    }
}
