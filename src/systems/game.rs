use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{systems::swipe::SwipeDirection, tracking::NormalizedPoint};

pub const DEFAULT_COLLISION_RADIUS: f32 = 0.1;
pub const DEFAULT_GESTURE_STEP: f32 = 0.05;

/// What moves the player marker
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlayerControl {
    /// The marker follows the index fingertip on every frame with a hand
    #[default]
    Fingertip,
    /// Each swipe nudges the marker one step in the swipe direction
    Gesture,
}

/// Where to put the next target
pub trait TargetSampler {
    fn sample(&mut self) -> NormalizedPoint;
}

/// Uniformly random targets in [0,1) on both axes
pub struct RandomTargets {
    rng: StdRng,
}

impl RandomTargets {
    pub fn from_entropy() -> Self {
        RandomTargets {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomTargets {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TargetSampler for RandomTargets {
    fn sample(&mut self) -> NormalizedPoint {
        NormalizedPoint {
            x: self.rng.r#gen::<f32>(),
            y: self.rng.r#gen::<f32>(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub player: NormalizedPoint,
    pub target: NormalizedPoint,
    pub score: u32,
    pub high_score: u32,
}

/// Follow-the-target game. The hand drives the player marker (see
/// [`PlayerControl`]); touching the target scores a point and sends the target
/// somewhere else.
pub struct GameState {
    player_pos: NormalizedPoint,
    target_pos: NormalizedPoint,
    score: u32,
    high_score: u32,
    collision_radius: f32,
    sampler: Box<dyn TargetSampler>,
}

impl GameState {
    pub fn new(mut sampler: Box<dyn TargetSampler>, collision_radius: f32) -> Self {
        let target_pos = sampler.sample();
        debug!("First target at {:?}", target_pos);
        GameState {
            player_pos: NormalizedPoint::new(0.5, 0.5),
            target_pos,
            score: 0,
            high_score: 0,
            collision_radius,
            sampler,
        }
    }

    /// Move the player marker to the latest fingertip position
    pub fn update(&mut self, fingertip: NormalizedPoint) {
        self.player_pos = fingertip;
    }

    /// Move the player marker one step in the direction of a swipe, staying
    /// on the board
    pub fn step(&mut self, direction: SwipeDirection, step: f32) {
        let NormalizedPoint { x, y } = self.player_pos;
        let (x, y) = match direction {
            SwipeDirection::Left => (x - step, y),
            SwipeDirection::Right => (x + step, y),
            SwipeDirection::Up => (x, y - step),
            SwipeDirection::Down => (x, y + step),
        };
        self.player_pos = NormalizedPoint::new(x.clamp(0., 1.), y.clamp(0., 1.));
    }

    /// Score and respawn the target if the player is (strictly) within the
    /// collision radius. Returns true if a point was scored.
    pub fn check_and_resolve_collision(&mut self) -> bool {
        let d = self.player_pos.distance_to(&self.target_pos);
        if d < self.collision_radius {
            self.score += 1;
            if self.score > self.high_score {
                self.high_score = self.score;
            }
            self.target_pos = self.sampler.sample();
            info!(
                "Target hit! Score {} (high score {}); next target at ({:.2},{:.2})",
                self.score, self.high_score, self.target_pos.x, self.target_pos.y
            );
            true
        } else {
            false
        }
    }

    /// Start a new round: zero the score and move the target; the high score
    /// and the player marker stay where they are
    pub fn reset(&mut self) {
        info!("Game reset; score was {}", self.score);
        self.score = 0;
        self.target_pos = self.sampler.sample();
    }

    pub fn set_collision_radius(&mut self, radius: f32) {
        self.collision_radius = radius;
    }

    pub fn player_pos(&self) -> NormalizedPoint {
        self.player_pos
    }

    pub fn target_pos(&self) -> NormalizedPoint {
        self.target_pos
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            player: self.player_pos,
            target: self.target_pos,
            score: self.score,
            high_score: self.high_score,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Hands out a fixed list of targets, then parks them far away
    pub struct ScriptedTargets(pub VecDeque<NormalizedPoint>);

    impl ScriptedTargets {
        pub fn new(points: &[(f32, f32)]) -> Self {
            ScriptedTargets(points.iter().map(|p| NormalizedPoint::from(*p)).collect())
        }
    }

    impl TargetSampler for ScriptedTargets {
        fn sample(&mut self) -> NormalizedPoint {
            self.0.pop_front().unwrap_or(NormalizedPoint::new(10., 10.))
        }
    }

    fn game(targets: &[(f32, f32)]) -> GameState {
        GameState::new(
            Box::new(ScriptedTargets::new(targets)),
            DEFAULT_COLLISION_RADIUS,
        )
    }

    #[test]
    fn test_starts_centred_with_sampled_target() {
        let g = game(&[(0.1, 0.2)]);
        assert_eq!(g.player_pos(), NormalizedPoint::new(0.5, 0.5));
        assert_eq!(g.target_pos(), NormalizedPoint::new(0.1, 0.2));
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_collision_scores_and_respawns() {
        let mut g = game(&[(0.3, 0.3), (0.8, 0.8)]);
        g.update(NormalizedPoint::new(0.35, 0.32));
        assert!(g.check_and_resolve_collision());
        assert_eq!(g.score(), 1);
        assert_eq!(g.high_score(), 1);
        assert_eq!(g.target_pos(), NormalizedPoint::new(0.8, 0.8));

        // Player has not moved, new target is far away
        assert!(!g.check_and_resolve_collision());
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn test_no_collision_outside_radius() {
        let mut g = game(&[(0.3, 0.3), (0.8, 0.8)]);
        g.update(NormalizedPoint::new(0.3, 0.45));
        assert!(!g.check_and_resolve_collision());
        assert_eq!(g.score(), 0);
        assert_eq!(g.target_pos(), NormalizedPoint::new(0.3, 0.3));
    }

    #[test]
    fn test_boundary_distance_does_not_collide() {
        let mut g = GameState::new(Box::new(ScriptedTargets::new(&[(0.0, 0.0)])), 0.5);
        g.update(NormalizedPoint::new(0.0, 0.5));
        assert!(!g.check_and_resolve_collision());
    }

    #[test]
    fn test_respawn_can_retrigger_immediately() {
        let mut g = game(&[(0.5, 0.5), (0.52, 0.5), (0.9, 0.9)]);
        assert!(g.check_and_resolve_collision());
        assert!(g.check_and_resolve_collision());
        assert!(!g.check_and_resolve_collision());
        assert_eq!(g.score(), 2);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut g = game(&[(0.5, 0.5), (0.5, 0.5), (0.1, 0.1), (0.7, 0.7)]);
        assert!(g.check_and_resolve_collision());
        assert!(g.check_and_resolve_collision());
        assert_eq!(g.score(), 2);
        g.reset();
        let snapshot = g.snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.high_score, 2);
        assert_eq!(snapshot.target, NormalizedPoint::new(0.7, 0.7));
        assert_eq!(snapshot.player, NormalizedPoint::new(0.5, 0.5));
    }

    #[test]
    fn test_step_moves_one_step_per_swipe() {
        let mut g = game(&[(0.9, 0.9)]);
        g.step(SwipeDirection::Right, 0.25);
        assert_eq!(g.player_pos(), NormalizedPoint::new(0.75, 0.5));
        g.step(SwipeDirection::Up, 0.25);
        assert_eq!(g.player_pos(), NormalizedPoint::new(0.75, 0.25));
        g.step(SwipeDirection::Left, 0.5);
        assert_eq!(g.player_pos(), NormalizedPoint::new(0.25, 0.25));
        g.step(SwipeDirection::Down, 0.5);
        assert_eq!(g.player_pos(), NormalizedPoint::new(0.25, 0.75));
    }

    #[test]
    fn test_step_stays_on_the_board() {
        let mut g = game(&[(0.9, 0.9)]);
        for _ in 0..3 {
            g.step(SwipeDirection::Left, 0.25);
            g.step(SwipeDirection::Up, 0.25);
        }
        assert_eq!(g.player_pos(), NormalizedPoint::new(0., 0.));

        for _ in 0..5 {
            g.step(SwipeDirection::Right, 0.25);
            g.step(SwipeDirection::Down, 0.25);
        }
        assert_eq!(g.player_pos(), NormalizedPoint::new(1., 1.));
    }

    #[test]
    fn test_step_onto_target_scores() {
        let mut g = game(&[(0.75, 0.5), (0.1, 0.1)]);
        assert!(!g.check_and_resolve_collision());
        g.step(SwipeDirection::Right, 0.25);
        assert!(g.check_and_resolve_collision());
        assert_eq!(g.score(), 1);
        assert_eq!(g.target_pos(), NormalizedPoint::new(0.1, 0.1));
    }

    #[test]
    fn test_player_control_labels() {
        assert_eq!(PlayerControl::default(), PlayerControl::Fingertip);
        assert_eq!(
            serde_json::to_string(&PlayerControl::Gesture).unwrap(),
            "\"gesture\""
        );
    }

    #[test]
    fn test_random_targets_are_normalised_and_repeatable() {
        let mut a = RandomTargets::seeded(42);
        let mut b = RandomTargets::seeded(42);
        for _ in 0..100 {
            let p = a.sample();
            assert!((0.0..1.0).contains(&p.x));
            assert!((0.0..1.0).contains(&p.y));
            assert_eq!(p, b.sample());
        }
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        let g = game(&[(0.25, 0.75)]);
        let json = serde_json::to_value(g.snapshot()).unwrap();
        assert_eq!(json["highScore"], 0);
        assert_eq!(json["target"]["x"], 0.25);
    }
}
