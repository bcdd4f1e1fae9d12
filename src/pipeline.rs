//! Per-frame pipeline
//!
//! One explicitly owned [`WindowTracker`], one [`step`] per frame. The host
//! drains its input sources into a small event slice, feeds in the tracked
//! viewer pose, and gets back the camera update for the frame. Ordering
//! inside a step is fixed: input events first (calibration transitions and
//! the reset gesture), then the smoothing update, then the projection from
//! the smoothed eye and the current window.
//!
//! [`step`]: WindowTracker::step
//!
//! Author: Moroya Sakamoto

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calibration::{CalibrationSession, CalibrationState, Instruction, ResetHold};
use crate::projection::{look_rotation, roll_locked, window_projection, ProjectionError};
use crate::smoothing::SmoothedPose;

/// Input events drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Operator signalled a capture at this world position (the probe tip)
    CaptureCorner(Vec3),
    /// Reset button went down
    ResetPressed,
    /// Reset button came back up
    ResetReleased,
}

/// How the output camera orientation is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PerspectiveMode {
    /// Face along the display normal; geometrically correct for any eye
    #[default]
    Standard,
    /// Follow the tracked head's yaw and pitch with roll zeroed; keeps the
    /// horizon level but is only correct for vertical displays
    RollLocked,
}

/// Tuning for a [`WindowTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Camera orientation mode
    pub mode: PerspectiveMode,
    /// Position smoothing responsiveness
    pub position_rate: f32,
    /// Rotation smoothing responsiveness
    pub rotation_rate: f32,
    /// Whether pose smoothing eases (true) or snaps (false)
    pub smoothing: bool,
    /// Seconds the reset button must be held to reset calibration
    pub reset_hold_time: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            near: 0.1,
            far: 1000.0,
            mode: PerspectiveMode::Standard,
            position_rate: crate::smoothing::DEFAULT_POSITION_RATE,
            rotation_rate: crate::smoothing::DEFAULT_ROTATION_RATE,
            smoothing: true,
            reset_hold_time: ResetHold::DEFAULT_HOLD_TIME,
        }
    }
}

/// Camera settings for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraUpdate {
    /// Off-axis projection matrix
    pub projection: Mat4,
    /// World-space camera orientation
    pub rotation: Quat,
}

/// Everything a host needs from one pipeline step
///
/// `camera` is `Some` only when calibration is complete and the projection
/// succeeded; on `error` the host holds its previous good frame or falls
/// back to a symmetric default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Calibration state after this step's events
    pub state: CalibrationState,
    /// Instruction to show the operator
    pub instruction: Instruction,
    /// Camera update for the renderer, when one could be computed
    pub camera: Option<CameraUpdate>,
    /// Why no camera update was produced this frame
    pub error: Option<ProjectionError>,
}

/// The head-tracked window core, stepped once per rendering frame
#[derive(Debug, Clone)]
pub struct WindowTracker {
    config: TrackerConfig,
    session: CalibrationSession,
    pose: SmoothedPose,
    reset_hold: ResetHold,
}

impl Default for WindowTracker {
    fn default() -> Self {
        WindowTracker::new(TrackerConfig::default())
    }
}

impl WindowTracker {
    /// Create a tracker with the given tuning
    pub fn new(config: TrackerConfig) -> Self {
        let mut pose = SmoothedPose::with_rates(config.position_rate, config.rotation_rate);
        pose.enabled = config.smoothing;
        WindowTracker {
            config,
            session: CalibrationSession::new(),
            pose,
            reset_hold: ResetHold::new(config.reset_hold_time),
        }
    }

    /// The calibration session driven by this tracker
    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }

    /// The smoothed viewer pose
    pub fn pose(&self) -> &SmoothedPose {
        &self.pose
    }

    /// Fraction of the reset hold completed, for UI feedback
    pub fn reset_progress(&self) -> f32 {
        self.reset_hold.progress()
    }

    /// Feed in the tracked viewer pose for this frame
    pub fn set_target(&mut self, position: Vec3, rotation: Quat) {
        self.pose.set_target(position, rotation);
    }

    /// Turn pose smoothing on (ease) or off (snap)
    pub fn set_smoothing(&mut self, enabled: bool) {
        self.pose.enabled = enabled;
        info!(enabled, "pose smoothing toggled");
    }

    /// Switch the camera orientation mode
    pub fn set_mode(&mut self, mode: PerspectiveMode) {
        self.config.mode = mode;
        info!(?mode, "perspective mode changed");
    }

    /// Advance the pipeline by one frame
    ///
    /// Applies the frame's input events, runs the reset gesture and the
    /// smoothing update, then computes the projection when a calibrated
    /// window is available.
    pub fn step(&mut self, dt: f32, events: &[InputEvent]) -> FrameOutput {
        for event in events {
            match *event {
                InputEvent::CaptureCorner(position) => {
                    self.session.capture_corner(position);
                }
                InputEvent::ResetPressed => self.reset_hold.press(),
                InputEvent::ResetReleased => self.reset_hold.release(),
            }
        }
        if self.reset_hold.update(dt) {
            self.session.reset();
        }

        self.pose.update(dt);

        let mut camera = None;
        let mut error = None;
        if self.session.is_complete() {
            match window_projection(
                self.session.window(),
                self.pose.position(),
                self.config.near,
                self.config.far,
            ) {
                Ok(projection) => {
                    let rotation = match self.config.mode {
                        PerspectiveMode::Standard => look_rotation(projection.normal),
                        PerspectiveMode::RollLocked => roll_locked(self.pose.rotation()),
                    };
                    camera = Some(CameraUpdate {
                        projection: projection.matrix,
                        rotation,
                    });
                }
                Err(err) => {
                    warn!("projection failed: {err}");
                    error = Some(err);
                }
            }
        }

        FrameOutput {
            state: self.session.state(),
            instruction: self.session.instruction(),
            camera,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated_tracker() -> WindowTracker {
        let mut tracker = WindowTracker::default();
        tracker.set_target(Vec3::new(0.0, 1.0, -2.0), Quat::IDENTITY);
        tracker.step(
            0.016,
            &[
                InputEvent::CaptureCorner(Vec3::new(0.0, 2.0, 0.0)),
                InputEvent::CaptureCorner(Vec3::ZERO),
                InputEvent::CaptureCorner(Vec3::new(2.0, 0.0, 0.0)),
            ],
        );
        tracker
    }

    #[test]
    fn test_uncalibrated_step_has_no_camera() {
        let mut tracker = WindowTracker::default();
        let frame = tracker.step(0.016, &[]);
        assert_eq!(frame.state, CalibrationState::AwaitTopLeft);
        assert_eq!(frame.instruction, Instruction::CaptureTopLeft);
        assert!(frame.camera.is_none());
        assert!(frame.error.is_none());
    }

    #[test]
    fn test_calibrated_step_produces_camera() {
        let mut tracker = calibrated_tracker();
        let frame = tracker.step(0.016, &[]);
        assert_eq!(frame.state, CalibrationState::Complete);
        assert_eq!(frame.instruction, Instruction::None);
        assert!(frame.camera.is_some());
        assert!(frame.error.is_none());
    }

    #[test]
    fn test_hold_to_reset() {
        let mut tracker = calibrated_tracker();

        let frame = tracker.step(0.016, &[InputEvent::ResetPressed]);
        assert_eq!(frame.state, CalibrationState::Complete);
        assert!(tracker.reset_progress() > 0.0);

        // Released early: no reset
        tracker.step(0.016, &[InputEvent::ResetReleased]);
        assert_eq!(tracker.session().state(), CalibrationState::Complete);

        // Held past the threshold: calibration resets
        tracker.step(0.016, &[InputEvent::ResetPressed]);
        let frame = tracker.step(TrackerConfig::default().reset_hold_time, &[]);
        assert_eq!(frame.state, CalibrationState::AwaitTopLeft);
        assert_eq!(frame.instruction, Instruction::CaptureTopLeft);
        assert!(frame.camera.is_none());
    }

    #[test]
    fn test_eye_on_plane_surfaces_error() {
        let mut tracker = calibrated_tracker();
        tracker.set_smoothing(false);
        // Target on the display plane (z = 0)
        tracker.set_target(Vec3::new(1.0, 1.0, 0.0), Quat::IDENTITY);

        let frame = tracker.step(0.016, &[]);
        assert!(frame.camera.is_none());
        assert!(matches!(
            frame.error,
            Some(ProjectionError::EyeOnWindowPlane { .. })
        ));
    }

    #[test]
    fn test_roll_locked_mode_follows_head() {
        let mut tracker = calibrated_tracker();
        tracker.set_smoothing(false);
        tracker.set_mode(PerspectiveMode::RollLocked);

        let head = Quat::from_euler(glam::EulerRot::YXZ, 0.4, 0.2, 0.9);
        tracker.set_target(Vec3::new(0.0, 1.0, -2.0), head);

        let frame = tracker.step(0.016, &[]);
        let camera = frame.camera.expect("calibrated tracker yields a camera");
        let expected = crate::projection::roll_locked(head);
        assert!(camera.rotation.angle_between(expected) < 1e-5);
    }
}
