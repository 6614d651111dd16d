pub mod game;
pub mod landmark_source;
pub mod swipe;

use game::{GameSnapshot, GameState, PlayerControl, TargetSampler};
use landmark_source::HandSelector;
use log::{info, warn};
use swipe::{SwipeDirection, SwipeTracker};

use crate::{
    backend_config::BackendConfig,
    tracking::{HandFrame, HandLandmarks},
};

/// Everything that came out of processing a single frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub gesture: Option<SwipeDirection>,
    pub landmarks: Option<HandLandmarks>,
    pub game: Option<GameSnapshot>,
    /// True if the player hit the target on this frame
    pub scored: bool,
}

pub struct Systems {
    pub hand_selector: HandSelector,
    pub swipe_tracker: SwipeTracker,
    pub game: Option<GameState>,
    player_control: PlayerControl,
    gesture_step: f32,
}

impl Systems {
    pub fn new(config: &BackendConfig, sampler: Box<dyn TargetSampler>) -> Systems {
        let game = if config.game_disable {
            warn!("Game disabled; only swipe gestures will be tracked");
            None
        } else {
            Some(GameState::new(sampler, config.collision_radius))
        };

        Systems {
            hand_selector: config.hand_selector(),
            swipe_tracker: SwipeTracker::new(config.swipe_settings()),
            game,
            player_control: config.player_control,
            gesture_step: config.gesture_step,
        }
    }

    /// Tracker first, then game. The game only checks for hits on frames where
    /// the player moved: any frame with a hand under fingertip control, or a
    /// frame with a swipe under gesture control.
    pub fn process_frame(&mut self, frame: &HandFrame) -> FrameOutcome {
        let (gesture, landmarks) = self.swipe_tracker.process(&mut self.hand_selector, frame);

        let mut scored = false;
        if let Some(game) = self.game.as_mut() {
            let moved = match (self.player_control, &landmarks, gesture) {
                (PlayerControl::Fingertip, Some(hand), _) => {
                    game.update(hand.index_fingertip());
                    true
                }
                (PlayerControl::Gesture, _, Some(direction)) => {
                    game.step(direction, self.gesture_step);
                    true
                }
                _ => false,
            };
            if moved {
                scored = game.check_and_resolve_collision();
            }
        }

        FrameOutcome {
            gesture,
            landmarks,
            game: self.game.as_ref().map(|g| g.snapshot()),
            scored,
        }
    }

    /// Push updated settings into the running systems, keeping tracking
    /// memory and score
    pub fn apply_config(&mut self, config: &BackendConfig) {
        self.hand_selector = config.hand_selector();
        self.swipe_tracker.set_settings(config.swipe_settings());
        if let Some(game) = self.game.as_mut() {
            game.set_collision_radius(config.collision_radius);
        }
        if config.player_control != self.player_control {
            info!("Player control is now {:?}", config.player_control);
        }
        self.player_control = config.player_control;
        self.gesture_step = config.gesture_step;
        if config.game_disable != self.game.is_none() {
            warn!("Enabling/disabling the game only takes effect after a restart");
        }
    }

    pub fn reset_game(&mut self) {
        match self.game.as_mut() {
            Some(game) => game.reset(),
            None => info!("Game reset requested, but the game is disabled"),
        }
    }
}
