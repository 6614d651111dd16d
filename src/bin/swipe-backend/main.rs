use clap::Parser;
use cli::Cli;
use tether_swipe_tracker::backend_config::{load_config_from_file, BackendConfig};
use tether_swipe_tracker::session::{run_session, ReplaySource};
use tether_swipe_tracker::systems::game::{RandomTargets, TargetSampler};
use tether_swipe_tracker::systems::Systems;
use tether_swipe_tracker::tether_interface::{handle_landmarks_message, Inputs, Outputs};

use env_logger::Env;
use log::{debug, error, info};
use std::thread;
use std::time::Duration;
use tether_agent::TetherAgentOptionsBuilder;

mod cli;

fn main() {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("paho_mqtt", log::LevelFilter::Warn)
        .filter_module("tether_agent", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let config = match load_config_from_file(&cli.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Error loading config: {:#}", e);
            std::process::exit(1);
        }
    };

    let sampler: Box<dyn TargetSampler> = match cli.seed {
        Some(seed) => {
            info!("Using seed {} for target placement", seed);
            Box::new(RandomTargets::seeded(seed))
        }
        None => Box::new(RandomTargets::from_entropy()),
    };

    let systems = Systems::new(&config, sampler);

    let result = match &cli.replay_path {
        Some(path) => run_replay(path, systems),
        None => run_live(&cli, config, systems),
    };

    if let Err(e) = result {
        error!("Stopped: {:#}", e);
        std::process::exit(1);
    }
}

fn run_replay(path: &str, mut systems: Systems) -> anyhow::Result<()> {
    let mut source = ReplaySource::from_file(path)?;

    let frames = run_session(&mut source, &mut systems, |i, outcome| {
        if let Some(gesture) = outcome.gesture {
            info!("Frame {}: {}", i, gesture.to_string().to_uppercase());
        }
        if outcome.scored {
            if let Some(game) = &outcome.game {
                info!("Frame {}: score {}", i, game.score);
            }
        }
    })?;

    let score = systems.game.as_ref().map(|g| g.score()).unwrap_or_default();
    info!("Replay finished: {} frames, final score {}", frames, score);
    Ok(())
}

fn run_live(cli: &Cli, mut config: BackendConfig, mut systems: Systems) -> anyhow::Result<()> {
    let mut tether_agent = TetherAgentOptionsBuilder::new(&cli.agent_role)
        .id(Some(&cli.agent_group))
        .host(Some(&cli.tether_host.to_string()))
        .username(cli.tether_username.as_deref())
        .password(cli.tether_password.as_deref())
        .build()
        .expect("failed to init and/or connect Tether Agent");

    let inputs = Inputs::new(&mut tether_agent);
    let outputs = Outputs::new(&mut tether_agent);

    // Always publish on first start/load...
    config.publish(&tether_agent, &outputs.config_output)?;

    loop {
        let mut work_done = false;

        if let Some((topic, message)) = tether_agent.check_messages() {
            work_done = true;

            if inputs.landmarks_input.matches(&topic) {
                handle_landmarks_message(
                    &message,
                    &config,
                    &tether_agent,
                    &mut systems,
                    &outputs,
                );
            }

            if inputs.save_config_input.matches(&topic) {
                if let Err(e) = config.handle_save_message(
                    &tether_agent,
                    &outputs.config_output,
                    &message,
                    &mut systems,
                    &cli.config_path,
                ) {
                    error!("Config was not updated: {:#}", e);
                }
            }

            if inputs.game_reset_input.matches(&topic) {
                info!("requestGameReset message");
                systems.reset_game();
            }
        }

        if !work_done {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
