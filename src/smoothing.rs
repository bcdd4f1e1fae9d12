//! Frame-rate-independent pose smoothing
//!
//! Damps jitter in a tracked pose by exponentially interpolating the held
//! pose toward a target every frame. The rates are dimensionless
//! responsiveness constants, not physical units; the interpolation factor
//! is clamped to [0, 1] so a frame-time spike can never overshoot the
//! target.
//!
//! Author: Moroya Sakamoto

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Default position responsiveness
pub const DEFAULT_POSITION_RATE: f32 = 45.0;

/// Default rotation responsiveness
pub const DEFAULT_ROTATION_RATE: f32 = 10.0;

/// A tracked pose with exponential damping toward a target
///
/// The target is fed in every frame from the tracking system; [`update`]
/// advances the held pose toward it. With `enabled` off the held pose
/// snaps to the target exactly (no lag). Without a target the pose holds
/// still (its own pose is the target).
///
/// [`update`]: SmoothedPose::update
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothedPose {
    current_position: Vec3,
    current_rotation: Quat,
    target_position: Option<Vec3>,
    target_rotation: Option<Quat>,
    /// Position responsiveness (higher follows the target more tightly)
    pub position_rate: f32,
    /// Rotation responsiveness (higher follows the target more tightly)
    pub rotation_rate: f32,
    /// When false, the pose snaps to the target instead of easing
    pub enabled: bool,
}

impl Default for SmoothedPose {
    fn default() -> Self {
        SmoothedPose {
            current_position: Vec3::ZERO,
            current_rotation: Quat::IDENTITY,
            target_position: None,
            target_rotation: None,
            position_rate: DEFAULT_POSITION_RATE,
            rotation_rate: DEFAULT_ROTATION_RATE,
            enabled: true,
        }
    }
}

impl SmoothedPose {
    /// Create a smoothed pose at the origin with default rates
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with explicit responsiveness rates
    pub fn with_rates(position_rate: f32, rotation_rate: f32) -> Self {
        SmoothedPose {
            position_rate,
            rotation_rate,
            ..Self::default()
        }
    }

    /// Set the pose to chase
    pub fn set_target(&mut self, position: Vec3, rotation: Quat) {
        self.target_position = Some(position);
        self.target_rotation = Some(rotation);
    }

    /// Drop the target; the pose holds still until a new one is set
    pub fn clear_target(&mut self) {
        self.target_position = None;
        self.target_rotation = None;
    }

    /// The held (smoothed) position
    pub fn position(&self) -> Vec3 {
        self.current_position
    }

    /// The held (smoothed) rotation
    pub fn rotation(&self) -> Quat {
        self.current_rotation
    }

    /// Advance the held pose toward the target by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let target_position = self.target_position.unwrap_or(self.current_position);
        let target_rotation = self.target_rotation.unwrap_or(self.current_rotation);

        if self.enabled {
            self.current_position = self
                .current_position
                .lerp(target_position, (self.position_rate * dt).clamp(0.0, 1.0));
            self.current_rotation = self
                .current_rotation
                .slerp(target_rotation, (self.rotation_rate * dt).clamp(0.0, 1.0));
        } else {
            self.current_position = target_position;
            self.current_rotation = target_rotation;
        }
    }
}
