use serde::{Deserialize, Serialize};

use crate::{geometry_utils::distance, Point2D};

/// Hand landmark indices, as per the MediaPipe hand landmarker topology
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    pub const COUNT: usize = 21;
}

/// A position as a fraction of frame width/height; nominally in [0,1] on both axes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        NormalizedPoint { x, y }
    }

    pub fn distance_to(&self, other: &NormalizedPoint) -> f32 {
        distance(self.x, self.y, other.x, other.y)
    }
}

impl From<Point2D> for NormalizedPoint {
    fn from((x, y): Point2D) -> Self {
        NormalizedPoint { x, y }
    }
}

impl From<NormalizedPoint> for Point2D {
    fn from(p: NormalizedPoint) -> Self {
        (p.x, p.y)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; not all detectors send this
    #[serde(default)]
    pub z: f32,
}

fn default_score() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
/// A single detected hand, with the full 21-point skeleton
pub struct HandLandmarks {
    pub landmarks: [Landmark; landmarks::COUNT],
    #[serde(default = "default_score")]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
}

/// Everything the upstream hand landmarker found in one video frame.
/// An empty list means "no hand detected".
pub type HandFrame = Vec<HandLandmarks>;

impl HandLandmarks {
    pub fn new(landmarks: [Landmark; landmarks::COUNT], score: f32) -> Self {
        HandLandmarks {
            landmarks,
            score,
            handedness: None,
        }
    }

    /// A synthetic hand with every landmark collapsed onto the given fingertip
    /// position. Handy for replays recorded as plain fingertip traces.
    pub fn from_fingertip(fingertip: NormalizedPoint) -> Self {
        let point = Landmark {
            x: fingertip.x,
            y: fingertip.y,
            z: 0.,
        };
        HandLandmarks::new([point; landmarks::COUNT], default_score())
    }

    pub fn index_fingertip(&self) -> NormalizedPoint {
        let Landmark { x, y, .. } = self.landmarks[landmarks::INDEX_FINGER_TIP];
        NormalizedPoint { x, y }
    }
}
