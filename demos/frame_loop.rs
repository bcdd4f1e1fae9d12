//! Simulated frame loop
//!
//! Calibrates a 2 m x 2 m display from three probe touches, then sweeps a
//! simulated viewer left to right in front of it, printing how the frustum
//! skews with the eye. Stand-in for a real host that would feed tracked
//! poses and hand the camera updates to its renderer.
//!
//! Author: Moroya Sakamoto

use glam::{Quat, Vec3};
use offaxis::prelude::*;

const FRAME: f32 = 1.0 / 90.0;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut tracker = WindowTracker::default();
    tracker.set_target(Vec3::new(1.0, 1.0, -2.0), Quat::IDENTITY);

    // Calibration: the operator touches three corners with the probe tip
    let touches = [
        Vec3::new(0.0, 2.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
    ];
    for touch in touches {
        let frame = tracker.step(FRAME, &[InputEvent::CaptureCorner(touch)]);
        if let Some(text) = frame.instruction.text() {
            println!("next: {text}");
        }
    }

    let window = tracker.session().window();
    println!(
        "calibrated: {:.2} m x {:.2} m, center {:?}",
        window.width(),
        window.height(),
        window.center()
    );

    // Sweep the viewer across the front of the display
    for tick in 0..=10 {
        let t = tick as f32 / 10.0;
        let eye = Vec3::new(2.0 * t, 1.0, -2.0);
        tracker.set_target(eye, Quat::IDENTITY);

        let frame = tracker.step(FRAME, &[]);
        match (frame.camera, frame.error) {
            (Some(camera), _) => {
                // Skew terms of the projection show the off-axis shift
                println!(
                    "eye x {:+.2}: skew ({:+.3}, {:+.3})",
                    eye.x, camera.projection.z_axis.x, camera.projection.z_axis.y
                );
            }
            (None, Some(error)) => println!("eye x {:+.2}: {error}", eye.x),
            (None, None) => println!("eye x {:+.2}: not calibrated", eye.x),
        }
    }
}
