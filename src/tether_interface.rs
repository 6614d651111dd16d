use anyhow::{anyhow, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use tether_agent::{ChannelDefinition, ChannelOptionsBuilder, TetherAgent};

use crate::{
    backend_config::{BackendConfig, GestureSendMode},
    systems::{swipe::SwipeDirection, FrameOutcome, Systems},
    tracking::HandFrame,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GestureMessage {
    pub gesture: Option<SwipeDirection>,
}

pub struct Outputs {
    pub config_output: ChannelDefinition,
    pub gestures_output: ChannelDefinition,
    pub fingertip_output: ChannelDefinition,
    pub game_state_output: ChannelDefinition,
}

impl Outputs {
    pub fn new(tether_agent: &mut TetherAgent) -> Outputs {
        let config_output = ChannelOptionsBuilder::create_sender("provideSwipeConfig")
            .qos(Some(2))
            .retain(Some(true))
            .build(tether_agent)
            .expect("failed to create Output Plug");

        let gestures_output = ChannelOptionsBuilder::create_sender("swipeGestures")
            .qos(Some(1))
            .build(tether_agent)
            .expect("failed to create Output Plug");

        // Per-frame outputs; losing one now and then is fine
        let fingertip_output = ChannelOptionsBuilder::create_sender("fingertip")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Output Plug");
        let game_state_output = ChannelOptionsBuilder::create_sender("gameState")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Output Plug");

        Outputs {
            config_output,
            gestures_output,
            fingertip_output,
            game_state_output,
        }
    }

    pub fn channel(&self, output: Output) -> &ChannelDefinition {
        match output {
            Output::Gestures => &self.gestures_output,
            Output::Fingertip => &self.fingertip_output,
            Output::GameState => &self.game_state_output,
        }
    }
}

/// The per-frame output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Gestures,
    Fingertip,
    GameState,
}

pub struct Inputs {
    pub landmarks_input: ChannelDefinition,
    pub save_config_input: ChannelDefinition,
    pub game_reset_input: ChannelDefinition,
}

impl Inputs {
    pub fn new(tether_agent: &mut TetherAgent) -> Inputs {
        let landmarks_input = ChannelOptionsBuilder::create_receiver("handLandmarks")
            .qos(Some(0))
            .build(tether_agent)
            .expect("failed to create Input Plug");
        let save_config_input = ChannelOptionsBuilder::create_receiver("saveSwipeConfig")
            .qos(Some(2))
            .build(tether_agent)
            .expect("failed to create Input Plug");
        let game_reset_input = ChannelOptionsBuilder::create_receiver("requestGameReset")
            .qos(Some(2))
            .build(tether_agent)
            .expect("failed to create Input Plug");

        Inputs {
            landmarks_input,
            save_config_input,
            game_reset_input,
        }
    }
}

/// Decode one frame of hand landmarks. A payload that does not decode is a
/// frame we failed to acquire, so it must not reach the tracker.
pub fn decode_hand_frame(payload: &[u8]) -> Result<HandFrame> {
    rmp_serde::from_slice::<HandFrame>(payload)
        .map_err(|e| anyhow!("failed to decode hand landmarks frame: {}", e))
}

/// What (if anything) should go out on the gestures channel for this outcome
pub fn gesture_message(outcome: &FrameOutcome, mode: GestureSendMode) -> Option<GestureMessage> {
    match (outcome.gesture, mode) {
        (Some(gesture), _) => Some(GestureMessage {
            gesture: Some(gesture),
        }),
        (None, GestureSendMode::EveryFrame) => Some(GestureMessage { gesture: None }),
        (None, GestureSendMode::OnGesture) => None,
    }
}

/// Decode a landmarks payload and run it through the systems. A frame that
/// fails to decode never reaches the tracker.
pub fn decode_and_process(payload: &[u8], systems: &mut Systems) -> Result<FrameOutcome> {
    let frame = decode_hand_frame(payload)?;
    Ok(systems.process_frame(&frame))
}

/// The encoded messages to publish for one processed frame, in publish order
pub fn outgoing(outcome: &FrameOutcome, config: &BackendConfig) -> Result<Vec<(Output, Vec<u8>)>> {
    let mut messages = Vec::new();

    if let Some(message) = gesture_message(outcome, config.gesture_send_mode) {
        messages.push((Output::Gestures, rmp_serde::to_vec_named(&message)?));
    }

    if !config.skip_some_outputs {
        if let Some(hand) = &outcome.landmarks {
            let fingertip = rmp_serde::to_vec_named(&hand.index_fingertip())?;
            messages.push((Output::Fingertip, fingertip));
        }
    }

    if let Some(game) = &outcome.game {
        messages.push((Output::GameState, rmp_serde::to_vec_named(game)?));
    }

    Ok(messages)
}

pub fn handle_landmarks_message(
    payload: &[u8],
    config: &BackendConfig,
    tether_agent: &TetherAgent,
    systems: &mut Systems,
    outputs: &Outputs,
) -> Option<FrameOutcome> {
    let outcome = match decode_and_process(payload, systems) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Skipping frame: {}", e);
            return None;
        }
    };

    if let Some(gesture) = outcome.gesture {
        debug!("Publish gesture {}", gesture);
    }

    match outgoing(&outcome, config) {
        Ok(messages) => {
            for (output, payload) in messages {
                if let Err(e) = tether_agent.send(outputs.channel(output), Some(&payload)) {
                    error!("Failed to publish {:?} message: {}", output, e);
                }
            }
        }
        Err(e) => error!("Failed to encode messages: {}", e),
    }

    Some(outcome)
}
