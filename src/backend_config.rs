use std::{fs, io::ErrorKind, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tether_agent::{ChannelDefinition, TetherAgent};

use crate::systems::{
    game::{PlayerControl, DEFAULT_COLLISION_RADIUS, DEFAULT_GESTURE_STEP},
    landmark_source::HandSelector,
    swipe::SwipeSettings,
    Systems,
};

/// When to publish on the gestures channel
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GestureSendMode {
    /// Only frames where a swipe was detected
    OnGesture,
    /// Every processed frame, with an empty gesture when nothing was detected
    EveryFrame,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfig {
    // -------- SWIPE SETTINGS
    /// Minimum horizontal fingertip displacement (normalised units) between
    /// two consecutive frames to count as a swipe
    pub swipe_threshold_x: f32,

    /// Minimum vertical fingertip displacement (normalised units) between
    /// two consecutive frames to count as a swipe
    pub swipe_threshold_y: f32,

    /// Reserved for debouncing repeated swipes; not currently applied
    pub swipe_cooldown_ms: u64,

    /// Report positive x movement as "left" rather than "right", for
    /// landmark sources that do not mirror the camera image
    pub mirror_x: bool,

    // -------- HAND DETECTION SETTINGS
    /// Hands detected below this score are treated as "no hand"
    pub min_detection_confidence: f32,

    /// How many of the detected hands to consider; only the first is tracked
    pub max_num_hands: usize,

    // -------- GAME SETTINGS
    /// Disable the follow-the-target game (and its gameState output)
    pub game_disable: bool,

    /// Player-to-target distance (normalised units) that counts as a hit
    pub collision_radius: f32,

    /// Whether the player marker follows the fingertip or is stepped by swipes
    pub player_control: PlayerControl,

    /// How far (normalised units) one swipe moves the player, in gesture control
    pub gesture_step: f32,

    // -------- OUTPUT SETTINGS
    pub gesture_send_mode: GestureSendMode,

    /// If enabled, skip publishing per-frame fingertip positions, which are
    /// typically only needed for visualisation
    pub skip_some_outputs: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let swipe = SwipeSettings::default();
        let selector = HandSelector::default();
        BackendConfig {
            swipe_threshold_x: swipe.threshold_x,
            swipe_threshold_y: swipe.threshold_y,
            swipe_cooldown_ms: swipe.cooldown.as_millis() as u64,
            mirror_x: swipe.mirror_x,
            min_detection_confidence: selector.min_detection_confidence,
            max_num_hands: selector.max_num_hands,
            game_disable: false,
            collision_radius: DEFAULT_COLLISION_RADIUS,
            player_control: PlayerControl::default(),
            gesture_step: DEFAULT_GESTURE_STEP,
            gesture_send_mode: GestureSendMode::OnGesture,
            skip_some_outputs: false,
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.swipe_threshold_x > 0. && self.swipe_threshold_y > 0.) {
            bail!(
                "Swipe thresholds must be above 0, got x={} y={}",
                self.swipe_threshold_x,
                self.swipe_threshold_y
            );
        }
        if !(0. ..=1.).contains(&self.min_detection_confidence) {
            bail!(
                "Min detection confidence must be in range [0,1], got {}",
                self.min_detection_confidence
            );
        }
        if self.max_num_hands == 0 {
            bail!("Max number of hands must be at least 1");
        }
        if !(self.collision_radius > 0.) {
            bail!("Collision radius must be above 0, got {}", self.collision_radius);
        }
        if !(self.gesture_step > 0. && self.gesture_step <= 1.) {
            bail!("Gesture step must be in range (0,1], got {}", self.gesture_step);
        }
        Ok(())
    }

    pub fn swipe_settings(&self) -> SwipeSettings {
        SwipeSettings {
            threshold_x: self.swipe_threshold_x,
            threshold_y: self.swipe_threshold_y,
            cooldown: Duration::from_millis(self.swipe_cooldown_ms),
            mirror_x: self.mirror_x,
        }
    }

    pub fn hand_selector(&self) -> HandSelector {
        HandSelector {
            min_detection_confidence: self.min_detection_confidence,
            max_num_hands: self.max_num_hands,
        }
    }

    /// Replace this config with one sent (MessagePack-encoded) by a remote agent.
    /// The current config is left untouched if the new one is not valid.
    pub fn parse_remote_config(&mut self, payload: &[u8]) -> Result<()> {
        let config = rmp_serde::from_slice::<BackendConfig>(payload)
            .map_err(|e| anyhow!("Failed to parse Config from message: {}", e))?;
        config.validate()?;
        *self = config;
        Ok(())
    }

    pub fn write_config_to_file(&self, config_file_path: &str) -> Result<()> {
        debug!("Current state of config: {:?}", self);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(config_file_path, text)
            .with_context(|| format!("Error writing config to file {}", config_file_path))?;
        info!("Wrote config to file: {:?}", config_file_path);
        Ok(())
    }

    pub fn handle_save_message(
        &mut self,
        tether_agent: &TetherAgent,
        config_output: &ChannelDefinition,
        payload: &[u8],
        systems: &mut Systems,
        config_file_path: &str,
    ) -> Result<()> {
        self.parse_remote_config(payload)
            .map_err(|e| anyhow!("Handle save-message failure: {e}"))?;

        info!("Remote-provided config parsed OK; apply, save to disk and (re) publish");
        systems.apply_config(self);
        self.save_and_republish(tether_agent, config_output, config_file_path)
    }

    pub fn save_and_republish(
        &self,
        tether_agent: &TetherAgent,
        config_output: &ChannelDefinition,
        config_file_path: &str,
    ) -> Result<()> {
        info!("Saving config to disk and re-publishing via Tether...");
        self.write_config_to_file(config_file_path)?;
        self.publish(tether_agent, config_output)
    }

    pub fn publish(
        &self,
        tether_agent: &TetherAgent,
        config_output: &ChannelDefinition,
    ) -> Result<()> {
        let payload = rmp_serde::to_vec_named(self)?;
        tether_agent
            .send(config_output, Some(&payload))
            .map_err(|e| anyhow!("Failed to publish config: {}", e))?;
        Ok(())
    }
}

pub fn load_config_from_file(config_file_path: &str) -> Result<BackendConfig> {
    match fs::read_to_string(config_file_path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "Swipe Config file not found at {}; using defaults",
                &config_file_path
            );
            Ok(BackendConfig::default())
        }
        Err(e) => Err(anyhow!(
            "Failed to load Swipe Config from \"{}\": {}",
            config_file_path,
            e
        )),
        Ok(s) => {
            info!("Loaded Swipe Config OK from \"{}\"", config_file_path);
            let loaded_config = serde_json::from_str::<BackendConfig>(&s)
                .map_err(|e| anyhow!("Failed to parse config data: {}", e))?;
            debug!("Config parsed data from file: {:?}", &loaded_config);
            loaded_config.validate()?;
            Ok(loaded_config)
        }
    }
}
