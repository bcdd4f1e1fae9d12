//! # offaxis
//!
//! Turns a flat, tracked display into a window: given the display's
//! real-world corners and the viewer's eye position, computes the
//! asymmetric (off-axis) projection matrix that renders the scene with
//! correct perspective "through" the display.
//!
//! ## Features
//!
//! - **Window geometry**: corner model with derived width, height, center,
//!   and plane normal
//! - **Guided calibration**: three point captures, the fourth corner is
//!   derived; reset returns to the start at any time
//! - **Pose smoothing**: frame-rate-independent exponential damping of the
//!   tracked viewer pose
//! - **Off-axis projection**: generalized perspective projection with
//!   explicit degenerate-geometry and eye-on-plane error reporting
//! - **Frame pipeline**: one `step(dt, events)` call per frame, no engine
//!   hooks, no singletons
//!
//! ## Example
//!
//! ```rust
//! use offaxis::prelude::*;
//!
//! let mut tracker = WindowTracker::default();
//! tracker.set_target(Vec3::new(1.0, 1.0, -1.5), Quat::IDENTITY);
//!
//! // Calibrate by touching three corners of the physical display
//! tracker.step(0.016, &[InputEvent::CaptureCorner(Vec3::new(0.0, 2.0, 0.0))]);
//! tracker.step(0.016, &[InputEvent::CaptureCorner(Vec3::ZERO)]);
//! tracker.step(0.016, &[InputEvent::CaptureCorner(Vec3::new(2.0, 0.0, 0.0))]);
//!
//! // Every frame: feed the tracked pose, step, hand the camera update to
//! // the renderer
//! let frame = tracker.step(0.016, &[]);
//! let camera = frame.camera.expect("calibrated window yields a projection");
//! assert_eq!(frame.state, CalibrationState::Complete);
//! assert!(camera.projection.x_axis.x > 0.0);
//! ```
//!
//! Author: Moroya Sakamoto

#![warn(missing_docs)]

pub mod calibration;
pub mod pipeline;
pub mod projection;
pub mod smoothing;
pub mod window;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::calibration::{
        probe_tip, CalibrationSession, CalibrationState, Instruction, ResetHold,
    };
    pub use crate::pipeline::{
        CameraUpdate, FrameOutput, InputEvent, PerspectiveMode, TrackerConfig, WindowTracker,
    };
    pub use crate::projection::{
        compute_projection, frustum_extents, look_rotation, perspective_off_center, roll_locked,
        window_projection, FrustumExtents, Projection, ProjectionError,
    };
    pub use crate::smoothing::SmoothedPose;
    pub use crate::window::{center_of, Corner, WindowRect};
    pub use glam::{Mat4, Quat, Vec3};
}

// Re-exports for convenience
pub use calibration::CalibrationSession;
pub use pipeline::WindowTracker;
pub use projection::compute_projection;
pub use window::WindowRect;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_basic_workflow() {
        let mut session = CalibrationSession::new();
        session.capture_corner(Vec3::new(0.0, 2.0, 0.0));
        session.capture_corner(Vec3::ZERO);
        session.capture_corner(Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(session.state(), CalibrationState::Complete);
        assert!((session.window().width() - 2.0).abs() < 1e-6);
        assert!((session.window().height() - 2.0).abs() < 1e-6);

        // Eye centered in front of the window
        let eye = Vec3::new(1.0, 1.0, -1.0);
        let projection = window_projection(session.window(), eye, 0.1, 100.0)
            .expect("complete window projects");
        assert!(projection.matrix.x_axis.x > 0.0);
        assert!((projection.normal - Vec3::Z).length() < 1e-6);
    }
}
