//! The frame-by-frame polling loop, decoupled from where frames come from.
//!
//! A [`FrameSource`] is the single owned capture handle; it is handed to
//! [`run_session`] rather than kept around as global state, so that a replay
//! file or a synthetic source in tests can stand in for a live feed.

use std::{collections::VecDeque, fs};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    systems::{FrameOutcome, Systems},
    tracking::{HandFrame, HandLandmarks, NormalizedPoint},
};

pub trait FrameSource {
    type Frame;

    /// The next frame in capture order. `Ok(None)` means the stream ended
    /// cleanly; an error means the frame could not be acquired.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Frames loaded up-front from a recording (or built in memory)
pub struct ReplaySource {
    frames: VecDeque<HandFrame>,
}

impl ReplaySource {
    pub fn new(frames: Vec<HandFrame>) -> Self {
        ReplaySource {
            frames: frames.into(),
        }
    }

    /// Load a JSON file containing an array of frames, each an array of hands
    /// (`[]` for frames where no hand was detected)
    pub fn from_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path))?;
        let frames: Vec<HandFrame> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse replay file {}", path))?;
        info!("Loaded {} frames from replay file \"{}\"", frames.len(), path);
        Ok(ReplaySource::new(frames))
    }

    /// Build frames from a fingertip trace; `None` is a frame without a hand
    pub fn from_fingertips(points: &[Option<NormalizedPoint>]) -> Self {
        ReplaySource::new(
            points
                .iter()
                .map(|p| match p {
                    Some(p) => vec![HandLandmarks::from_fingertip(*p)],
                    None => Vec::new(),
                })
                .collect(),
        )
    }
}

impl FrameSource for ReplaySource {
    type Frame = HandFrame;

    fn next_frame(&mut self) -> Result<Option<HandFrame>> {
        Ok(self.frames.pop_front())
    }
}

/// Pull frames until the source runs dry, processing each one in order and
/// passing the outcome on. Acquisition errors stop the loop (no retry) and are
/// returned to the caller. Returns the number of frames processed.
pub fn run_session<S, F>(source: &mut S, systems: &mut Systems, mut on_outcome: F) -> Result<usize>
where
    S: FrameSource<Frame = HandFrame>,
    F: FnMut(usize, &FrameOutcome),
{
    let mut count = 0;
    while let Some(frame) = source
        .next_frame()
        .with_context(|| format!("Frame acquisition failed after {} frames", count))?
    {
        let outcome = systems.process_frame(&frame);
        on_outcome(count, &outcome);
        count += 1;
    }
    debug!("Session ended after {} frames", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::{
        backend_config::BackendConfig,
        systems::{game::tests::ScriptedTargets, swipe::SwipeDirection},
    };

    fn systems() -> Systems {
        Systems::new(
            &BackendConfig::default(),
            Box::new(ScriptedTargets::new(&[(0.95, 0.05)])),
        )
    }

    fn p(x: f32, y: f32) -> Option<NormalizedPoint> {
        Some(NormalizedPoint::new(x, y))
    }

    fn gestures_for(points: &[Option<NormalizedPoint>]) -> Vec<Option<SwipeDirection>> {
        let mut source = ReplaySource::from_fingertips(points);
        let mut systems = systems();
        let mut gestures = Vec::new();
        let count = run_session(&mut source, &mut systems, |_i, outcome| {
            gestures.push(outcome.gesture)
        })
        .unwrap();
        assert_eq!(count, points.len());
        gestures
    }

    #[test]
    fn test_end_to_end_swipes() {
        let gestures = gestures_for(&[p(0.5, 0.5), p(0.5, 0.5), p(0.65, 0.5), p(0.2, 0.5)]);
        assert_eq!(
            gestures,
            vec![
                None,
                None,
                Some(SwipeDirection::Right),
                Some(SwipeDirection::Left)
            ]
        );
    }

    #[test]
    fn test_gap_in_the_middle() {
        let gestures = gestures_for(&[p(0.1, 0.1), None, p(0.9, 0.9)]);
        assert_eq!(gestures, vec![None, None, None]);
    }

    #[test]
    fn test_vertical_swipes() {
        let gestures = gestures_for(&[p(0.5, 0.2), p(0.5, 0.6), p(0.52, 0.3)]);
        assert_eq!(
            gestures,
            vec![None, Some(SwipeDirection::Down), Some(SwipeDirection::Up)]
        );
    }

    #[test]
    fn test_frames_processed_in_order() {
        let mut source = ReplaySource::from_fingertips(&[p(0.1, 0.5), p(0.2, 0.5), p(0.3, 0.5)]);
        let mut systems = systems();
        let mut seen = Vec::new();
        run_session(&mut source, &mut systems, |i, outcome| {
            seen.push((i, outcome.landmarks.as_ref().map(|h| h.index_fingertip().x)))
        })
        .unwrap();
        assert_eq!(seen, vec![(0, Some(0.1)), (1, Some(0.2)), (2, Some(0.3))]);
        assert!(source.next_frame().unwrap().is_none());
    }

    struct FailingCamera {
        frames_before_failure: usize,
    }

    impl FrameSource for FailingCamera {
        type Frame = HandFrame;

        fn next_frame(&mut self) -> Result<Option<HandFrame>> {
            if self.frames_before_failure == 0 {
                return Err(anyhow!("camera unplugged"));
            }
            self.frames_before_failure -= 1;
            Ok(Some(vec![HandLandmarks::from_fingertip(NormalizedPoint::new(
                0.5, 0.5,
            ))]))
        }
    }

    #[test]
    fn test_acquisition_failure_halts_the_loop() {
        let mut camera = FailingCamera {
            frames_before_failure: 2,
        };
        let mut systems = systems();
        let mut processed = 0;
        let result = run_session(&mut camera, &mut systems, |_i, _o| processed += 1);
        assert!(result.is_err());
        assert_eq!(processed, 2);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("camera unplugged"));
    }

    #[test]
    fn test_replay_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("swipe-replay-{}.json", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let frames = vec![
            vec![HandLandmarks::from_fingertip(NormalizedPoint::new(0.5, 0.5))],
            vec![],
            vec![HandLandmarks::from_fingertip(NormalizedPoint::new(0.6, 0.5))],
        ];
        fs::write(&path, serde_json::to_string(&frames).unwrap()).unwrap();

        let mut source = ReplaySource::from_file(&path).unwrap();
        fs::remove_file(&path).ok();
        let mut systems = systems();
        let mut gestures = Vec::new();
        let count = run_session(&mut source, &mut systems, |_i, outcome| {
            gestures.push(outcome.gesture)
        })
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(gestures, vec![None, None, None]);

        assert!(ReplaySource::from_file(&path).is_err());
    }
}
