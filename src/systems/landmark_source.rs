use log::debug;

use crate::tracking::{HandFrame, HandLandmarks};

/// Anything that can turn a frame into (at most) one hand's landmarks.
pub trait LandmarkSource {
    type Frame;

    fn detect(&mut self, frame: &Self::Frame) -> Option<HandLandmarks>;
}

/// Applies the detector policy to frames that were already run through an
/// upstream hand landmarker: drop low-confidence hands and only ever
/// consider the first `max_num_hands` of the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSelector {
    pub min_detection_confidence: f32,
    pub max_num_hands: usize,
}

impl Default for HandSelector {
    fn default() -> Self {
        HandSelector {
            min_detection_confidence: 0.7,
            max_num_hands: 1,
        }
    }
}

impl LandmarkSource for HandSelector {
    type Frame = HandFrame;

    fn detect(&mut self, frame: &HandFrame) -> Option<HandLandmarks> {
        let mut confident = frame
            .iter()
            .filter(|h| h.score >= self.min_detection_confidence)
            .take(self.max_num_hands);

        let hand = confident.next();
        if hand.is_none() && !frame.is_empty() {
            debug!(
                "Ignoring {} hand(s) below confidence {}",
                frame.len(),
                self.min_detection_confidence
            );
        }
        hand.cloned()
    }
}
