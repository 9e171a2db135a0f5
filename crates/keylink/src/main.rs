use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use keylink_apc::midi::ApcMapping;
use keylink_apc::{ApcConfig, ApcModule};
use keylink_core::{AsyncModule, ConfigManager, LoopbackSession, ModuleEvent, ModuleMessage};
use tokio::sync::mpsc;

/// Keep an APC Key 25 in sync with a clip-launching session.
#[derive(Parser, Debug)]
#[command(name = "keylink")]
#[command(about = "APC Key 25 control surface bridge")]
struct Args {
    /// Path to the JSON config file (default: platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the MIDI input port name to match
    #[arg(long)]
    input_port: Option<String>,

    /// Override the MIDI output port name to match
    #[arg(long)]
    output_port: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config_manager = ConfigManager::new(args.config);
    let mut settings = config_manager
        .load()
        .with_context(|| format!("loading {}", config_manager.config_path().display()))?;
    if let Some(port) = args.input_port {
        settings.midi_input_port = port;
    }
    if let Some(port) = args.output_port {
        settings.midi_output_port = port;
    }
    log::info!(
        "Using config {} (input '{}', output '{}')",
        config_manager.config_path().display(),
        settings.midi_input_port,
        settings.midi_output_port
    );

    let (session_tx, mut session_rx) = mpsc::unbounded_channel();
    let mut session = LoopbackSession::new(
        ApcMapping::GRID_WIDTH,
        ApcMapping::GRID_HEIGHT,
        settings.loopback_tracks,
        settings.loopback_sends,
        session_tx,
    );
    // A diagonal of clips so there is something to launch
    for track in 0..settings.loopback_tracks {
        session.set_clip_content(track, track % ApcMapping::GRID_HEIGHT, true);
    }
    session.publish_initial_state();

    let mut module = ApcModule::new(session, ApcConfig::from(&settings));
    module
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("connecting to the controller")?;

    let (event_tx, event_rx) = mpsc::channel(256);
    let (message_tx, mut message_rx) = mpsc::channel(64);

    let forward_tx = event_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = session_rx.recv().await {
            if forward_tx.send(ModuleEvent::Session(event)).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(message) = message_rx.recv().await {
            match message {
                ModuleMessage::Status(status) => log::info!("Module status: {}", status),
                ModuleMessage::Error(error) => log::error!("Module error: {}", error),
            }
        }
    });

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        log::info!("Shutting down");
        let _ = event_tx.send(ModuleEvent::Shutdown).await;
    });

    module
        .run(event_rx, message_tx)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    module
        .shutdown()
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
