use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::info;

use crate::bus::Topics;
use crate::session::{RecordOutcome, SessionController, StopOutcome};

/// Run the local interactive command source over stdin. Returns when
/// the operator quits, input reaches EOF, or the controller closes.
pub async fn run(controller: Arc<SessionController>, topics: &Topics) -> Result<()> {
    print_banner(&controller, topics);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        prompt(controller.volume_available());

        let Some(line) = lines.next_line().await? else {
            info!("Local input closed");
            break;
        };

        if controller.is_closed() {
            break;
        }

        match line.trim().to_lowercase().as_str() {
            "r" => handle_record(&controller).await,
            "p" => handle_playback(&controller).await,
            "t" => handle_transcribe(&controller).await,
            "v" => handle_volume(&controller).await,
            "q" => {
                println!("\nShutting down...");
                break;
            }
            "" => continue,
            other => println!("Invalid option {other:?}, use R, P, T, V, or Q.\n"),
        }
    }

    Ok(())
}

async fn handle_record(controller: &SessionController) {
    match controller.record().await {
        Ok(RecordOutcome::Started) => {
            println!("\nRecording... speak now!");
            println!("Say: 'Play [Song Name] by [Artist Name]'");
            println!("Press T to stop and transcribe.\n");
        }
        Ok(RecordOutcome::AlreadyRecording) => println!("\nRecording already in progress.\n"),
        Ok(RecordOutcome::Closed) => {}
        Err(e) => println!("\nCould not start recording: {e}\n"),
    }
}

async fn handle_playback(controller: &SessionController) {
    println!("\nPlaying back...");
    match controller.play_back().await {
        Ok(()) => println!("Done.\n"),
        Err(e) => println!("Playback failed: {e}\n"),
    }
}

async fn handle_transcribe(controller: &SessionController) {
    let result = match controller.stop_and_transcribe().await {
        // Nothing live to stop: transcribe the last captured artifact,
        // the way the standalone transcribe command always worked.
        Ok(StopOutcome::NoActiveRecording) => controller.transcribe_artifact().await,
        other => other,
    };

    match result {
        Ok(StopOutcome::TranscriptReady(query)) => {
            println!("\n=== SEARCH QUERY ===");
            println!("{query}");
            println!("====================\n");
        }
        Ok(StopOutcome::TranscriptionFailed) => {
            println!("\nTranscription failed; see the log for details.\n");
        }
        Ok(StopOutcome::NoActiveRecording) | Ok(StopOutcome::Closed) => {}
        Err(e) => println!("\nTranscription error: {e}\n"),
    }
}

async fn handle_volume(controller: &SessionController) {
    if !controller.volume_available() {
        println!("\nVolume sensor not available on this system.\n");
        return;
    }

    match controller.toggle_volume_monitor().await {
        Ok(true) => println!("Volume monitoring: ON\n"),
        Ok(false) => println!("Volume monitoring: OFF\n"),
        Err(e) => println!("Volume monitoring error: {e}\n"),
    }
}

fn print_banner(controller: &SessionController, topics: &Topics) {
    println!("\nCommands:");
    println!("  R = Record voice command");
    println!("  P = Play last recording");
    println!("  T = Transcribe & publish search query");
    if controller.volume_available() {
        println!("  V = Toggle volume monitoring");
    }
    println!("  Q = Quit");
    println!("\nRemote control:");
    println!("  Topic: {}", topics.control);
    println!("  Commands: 'button_pressed' (toggle record/stop)");
    println!("\nStatus updates:");
    println!("  Topic: {}\n", topics.status);
}

fn prompt(volume_available: bool) {
    if volume_available {
        print!("Enter command (R/P/T/V/Q): ");
    } else {
        print!("Enter command (R/P/T/Q): ");
    }
    std::io::stdout().flush().ok();
}
