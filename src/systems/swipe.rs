use std::{
    fmt,
    time::{Duration, SystemTime},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    geometry_utils::{displacement, dominant_axis, Axis},
    tracking::{HandLandmarks, NormalizedPoint},
};

use super::landmark_source::LandmarkSource;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeSettings {
    /// Minimum horizontal displacement (normalised units) between two frames
    pub threshold_x: f32,
    /// Minimum vertical displacement (normalised units) between two frames
    pub threshold_y: f32,
    /// Reserved for a debounce policy; currently never consulted
    pub cooldown: Duration,
    /// Swap the horizontal labels, i.e. positive dx is reported as Left.
    /// Use this when the camera image was not mirrored before detection.
    pub mirror_x: bool,
}

impl Default for SwipeSettings {
    fn default() -> Self {
        SwipeSettings {
            threshold_x: 0.05,
            threshold_y: 0.05,
            cooldown: Duration::from_millis(500),
            mirror_x: false,
        }
    }
}

/// Classify a frame-to-frame displacement. The dominant axis must strictly
/// exceed both its threshold and the other axis; ties produce nothing.
pub fn classify_displacement(dx: f32, dy: f32, settings: &SwipeSettings) -> Option<SwipeDirection> {
    match dominant_axis(dx, dy) {
        Some(Axis::Horizontal) if dx.abs() > settings.threshold_x => {
            let positive = dx > 0.;
            if positive != settings.mirror_x {
                Some(SwipeDirection::Right)
            } else {
                Some(SwipeDirection::Left)
            }
        }
        Some(Axis::Vertical) if dy.abs() > settings.threshold_y => {
            if dy > 0. {
                Some(SwipeDirection::Down)
            } else {
                Some(SwipeDirection::Up)
            }
        }
        _ => None,
    }
}

/// Turns a stream of per-frame index fingertip positions into discrete swipes,
/// using only the previous frame's position as memory.
pub struct SwipeTracker {
    settings: SwipeSettings,
    last_position: Option<NormalizedPoint>,
    last_trigger: Option<SystemTime>,
}

impl SwipeTracker {
    pub fn new(settings: SwipeSettings) -> Self {
        SwipeTracker {
            settings,
            last_position: None,
            last_trigger: None,
        }
    }

    /// Run one frame through the landmark source and then the tracker.
    /// The landmark source is the only thing that looks at the frame itself.
    pub fn process<S: LandmarkSource>(
        &mut self,
        source: &mut S,
        frame: &S::Frame,
    ) -> (Option<SwipeDirection>, Option<HandLandmarks>) {
        let hand = source.detect(frame);
        let gesture = self.update(hand.as_ref());
        (gesture, hand)
    }

    /// Feed the (optional) hand seen this frame. A frame without a hand
    /// clears the tracking memory, so no gesture is ever computed across a gap.
    pub fn update(&mut self, hand: Option<&HandLandmarks>) -> Option<SwipeDirection> {
        let Some(hand) = hand else {
            if self.last_position.take().is_some() {
                debug!("Hand lost; forget last fingertip position");
            }
            return None;
        };

        let current = hand.index_fingertip();

        let gesture = self.last_position.and_then(|last| {
            let (dx, dy) = displacement(&last.into(), &current.into());
            classify_displacement(dx, dy, &self.settings)
        });

        self.last_position = Some(current);

        if let Some(direction) = gesture {
            debug!(
                "Swipe {} at ({:.3},{:.3}); {:?} since previous swipe",
                direction,
                current.x,
                current.y,
                self.last_trigger
                    .and_then(|t| t.elapsed().ok())
                    .unwrap_or_default()
            );
            self.last_trigger = Some(SystemTime::now());
        }

        gesture
    }

    /// Forget the last position, as if the hand had been lost
    pub fn reset(&mut self) {
        self.last_position = None;
    }

    pub fn last_position(&self) -> Option<NormalizedPoint> {
        self.last_position
    }

    pub fn last_trigger(&self) -> Option<SystemTime> {
        self.last_trigger
    }

    pub fn settings(&self) -> &SwipeSettings {
        &self.settings
    }

    /// Replace thresholds etc. without dropping the current tracking memory
    pub fn set_settings(&mut self, settings: SwipeSettings) {
        self.settings = settings;
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        SwipeTracker::new(SwipeSettings::default())
    }
}
