use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use voice_station::bus::{BusClient, Publisher};
use voice_station::session::SessionController;
use voice_station::transcribe::WhisperCliTranscriber;
use voice_station::volume::MixerSink;
use voice_station::{daemon, source, volume, Config};

#[derive(Parser)]
#[command(name = "voice-station")]
#[command(about = "Voice-command front end for a media search appliance")]
struct Args {
    /// Config file name (without extension)
    #[arg(short, long, default_value = "config/voice-station")]
    config: String,

    /// Disable the remote control listener
    #[arg(long)]
    local_only: bool,

    /// Skip starting/stopping the media backend daemon
    #[arg(long)]
    no_daemon: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let daemon_settings = cfg.daemon_settings();
    let manage_daemon = !args.no_daemon && daemon_settings.enabled;
    if manage_daemon {
        if let Err(e) = daemon::start(&daemon_settings).await {
            warn!("Could not start media backend daemon: {e}");
        }
    }

    let topics = cfg.topics();
    let bus = Arc::new(BusClient::connect(&cfg.bus.url, topics.clone()).await?);

    let sensor = volume::detect(cfg.sensor_settings()).await;
    let sink = Arc::new(MixerSink::new(cfg.mixer_settings()));
    let transcriber = Arc::new(WhisperCliTranscriber::new(cfg.transcriber_settings()));

    let controller = Arc::new(SessionController::new(
        cfg.controller_settings(),
        Arc::clone(&bus) as Arc<dyn Publisher>,
        transcriber,
        sensor,
        sink,
    ));

    // Monitoring starts automatically when the sensor is present; the
    // operator can still toggle it with V.
    if controller.volume_available() {
        controller.toggle_volume_monitor().await?;
    }

    let remote = if args.local_only {
        info!("Remote control disabled (--local-only)");
        None
    } else {
        let bus = Arc::clone(&bus);
        let controller = Arc::clone(&controller);
        Some(tokio::spawn(async move {
            if let Err(e) = source::remote::run(bus, controller).await {
                warn!("Remote command source failed: {e}");
            }
        }))
    };

    tokio::select! {
        result = source::local::run(Arc::clone(&controller), &topics) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received");
        }
    }

    controller.shutdown().await;

    // The listener may still be parked on broker I/O; the controller is
    // closed, so nothing it could dispatch would act.
    if let Some(handle) = remote {
        handle.abort();
    }

    if manage_daemon {
        if let Err(e) = daemon::stop(&daemon_settings).await {
            warn!("Could not stop media backend daemon: {e}");
        }
    }

    info!("Goodbye");
    Ok(())
}
