use anyhow::Result;
use futures::stream::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::bus::{BusClient, ControlCommand};
use crate::session::SessionController;

/// Run the remote command source: subscribe to the control topic,
/// decode payloads into typed commands, and dispatch them onto the
/// controller. Returns when the subscription ends or the controller
/// closes.
pub async fn run(bus: Arc<BusClient>, controller: Arc<SessionController>) -> Result<()> {
    let mut subscriber = bus.subscribe_control().await?;
    controller.mark_remote_attached();

    while let Some(message) = subscriber.next().await {
        if controller.is_closed() {
            break;
        }

        let payload = String::from_utf8_lossy(&message.payload);
        let Some(command) = ControlCommand::parse(&payload) else {
            warn!(payload = %payload.trim(), "Ignoring unrecognized control payload");
            continue;
        };

        debug!(?command, "Remote command received");
        dispatch(&controller, command).await;
    }

    info!("Remote command source stopped");
    Ok(())
}

async fn dispatch(controller: &SessionController, command: ControlCommand) {
    match command {
        ControlCommand::Start => match controller.record().await {
            Ok(outcome) => info!(?outcome, "Remote start handled"),
            Err(e) => error!("Remote start failed: {e}"),
        },
        ControlCommand::Stop => match controller.stop_and_transcribe().await {
            Ok(outcome) => info!(?outcome, "Remote stop handled"),
            Err(e) => error!("Remote stop failed: {e}"),
        },
        ControlCommand::Toggle => match controller.toggle_recording().await {
            Ok(action) => info!(?action, "Remote toggle handled"),
            Err(e) => error!("Remote toggle failed: {e}"),
        },
    }
}
