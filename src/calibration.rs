//! Guided display calibration
//!
//! The operator touches a tracked probe to three corners of the physical
//! display in a fixed order (top-left, bottom-left, bottom-right); the
//! fourth corner is derived under the assumption that the display is
//! rectangular, so only three corners carry independent information. A
//! state machine sequences the captures and reports the instruction to
//! show the operator next.
//!
//! Author: Moroya Sakamoto

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::window::{Corner, WindowRect};

/// Local offset from a hand controller's tracked origin to its frontmost
/// tip, the point actually touched to the display corner
pub const PROBE_TIP_OFFSET: Vec3 = Vec3::new(0.0, -0.075, 0.04);

/// World position of the probe tip for a tracked controller pose
pub fn probe_tip(position: Vec3, rotation: Quat) -> Vec3 {
    position + rotation * PROBE_TIP_OFFSET
}

/// Calibration progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CalibrationState {
    /// Waiting for the top-left corner capture
    #[default]
    AwaitTopLeft,
    /// Waiting for the bottom-left corner capture
    AwaitBottomLeft,
    /// Waiting for the bottom-right corner capture
    AwaitBottomRight,
    /// All four corners set; further captures are ignored
    Complete,
}

/// The instruction to show the operator next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Ask for the top-left corner
    CaptureTopLeft,
    /// Ask for the bottom-left corner
    CaptureBottomLeft,
    /// Ask for the bottom-right corner
    CaptureBottomRight,
    /// Calibration is complete, nothing to show
    None,
}

impl Instruction {
    /// Short name of the requested corner ("top left"), `None` once done
    pub fn corner_name(&self) -> Option<&'static str> {
        match self {
            Instruction::CaptureTopLeft => Some("top left"),
            Instruction::CaptureBottomLeft => Some("bottom left"),
            Instruction::CaptureBottomRight => Some("bottom right"),
            Instruction::None => None,
        }
    }

    /// Full operator prompt, `None` once calibration is done
    pub fn text(&self) -> Option<String> {
        self.corner_name().map(|corner| {
            format!(
                "Touch the tip of the controller to the {corner} of the display \
                 and pull the trigger"
            )
        })
    }
}

/// Sequences corner captures into a [`WindowRect`]
///
/// Created once and reset rather than destroyed. The owned rectangle is
/// only ever fully unset or fully set from the outside: the fourth corner
/// is derived in the same transition that stores the third, so a consumer
/// never observes a partial rectangle in the `Complete` state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSession {
    window: WindowRect,
    state: CalibrationState,
}

impl CalibrationSession {
    /// Create a fresh session awaiting the top-left corner
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// The rectangle being populated
    pub fn window(&self) -> &WindowRect {
        &self.window
    }

    /// True once all four corners are set
    pub fn is_complete(&self) -> bool {
        self.state == CalibrationState::Complete
    }

    /// The instruction matching the current state
    pub fn instruction(&self) -> Instruction {
        match self.state {
            CalibrationState::AwaitTopLeft => Instruction::CaptureTopLeft,
            CalibrationState::AwaitBottomLeft => Instruction::CaptureBottomLeft,
            CalibrationState::AwaitBottomRight => Instruction::CaptureBottomRight,
            CalibrationState::Complete => Instruction::None,
        }
    }

    /// Store a captured corner position and advance the state machine
    ///
    /// The state decides which corner the position lands in. The third
    /// capture also derives the top-right corner from the parallelogram
    /// assumption `topRight = topLeft + (bottomRight - bottomLeft)`.
    /// Captures in the `Complete` state are ignored (calibration is
    /// idempotent once done). Degenerate captures (collinear or coincident
    /// points) are accepted here and surface later as a projection error.
    ///
    /// Returns the next instruction to show.
    pub fn capture_corner(&mut self, position: Vec3) -> Instruction {
        match self.state {
            CalibrationState::AwaitTopLeft => {
                self.window.set_corner(Corner::TopLeft, position);
                self.state = CalibrationState::AwaitBottomLeft;
                debug!(?position, "captured top-left corner");
            }
            CalibrationState::AwaitBottomLeft => {
                self.window.set_corner(Corner::BottomLeft, position);
                self.state = CalibrationState::AwaitBottomRight;
                debug!(?position, "captured bottom-left corner");
            }
            CalibrationState::AwaitBottomRight => {
                self.window.set_corner(Corner::BottomRight, position);
                if let (Some(top_left), Some(bottom_left)) = (
                    self.window.corner(Corner::TopLeft),
                    self.window.corner(Corner::BottomLeft),
                ) {
                    self.window
                        .set_corner(Corner::TopRight, top_left + (position - bottom_left));
                }
                self.state = CalibrationState::Complete;
                debug!(
                    width = self.window.width(),
                    height = self.window.height(),
                    "window calibrated"
                );
            }
            CalibrationState::Complete => {}
        }
        self.instruction()
    }

    /// Return to the initial state with all corners unset
    pub fn reset(&mut self) -> Instruction {
        self.window.clear();
        self.state = CalibrationState::AwaitTopLeft;
        debug!("calibration reset");
        self.instruction()
    }
}

/// Hold-to-reset gesture timer
///
/// Converts a held button into a single reset trigger: arm with
/// [`press`], advance with [`update`] every frame, and the timer fires
/// once when the hold time elapses, then disarms until the next press.
/// [`progress`] reports the fraction of the hold completed, for UI
/// feedback.
///
/// [`press`]: ResetHold::press
/// [`update`]: ResetHold::update
/// [`progress`]: ResetHold::progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResetHold {
    hold_time: f32,
    held: Option<f32>,
}

impl ResetHold {
    /// Default hold duration in seconds
    pub const DEFAULT_HOLD_TIME: f32 = 2.0;

    /// Create a timer that fires after `hold_time` seconds of holding
    pub fn new(hold_time: f32) -> Self {
        ResetHold {
            hold_time,
            held: None,
        }
    }

    /// Button went down; starts the timer unless already running
    pub fn press(&mut self) {
        if self.held.is_none() {
            self.held = Some(0.0);
        }
    }

    /// Button came back up; cancels the hold
    pub fn release(&mut self) {
        self.held = None;
    }

    /// Advance the timer by `dt` seconds
    ///
    /// Returns true exactly once, on the frame the hold time elapses.
    pub fn update(&mut self, dt: f32) -> bool {
        if let Some(elapsed) = &mut self.held {
            *elapsed += dt;
            if *elapsed >= self.hold_time {
                self.held = None;
                return true;
            }
        }
        false
    }

    /// Fraction of the hold completed, in [0, 1]
    pub fn progress(&self) -> f32 {
        match self.held {
            Some(elapsed) => (elapsed / self.hold_time).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

impl Default for ResetHold {
    fn default() -> Self {
        ResetHold::new(Self::DEFAULT_HOLD_TIME)
    }
}
