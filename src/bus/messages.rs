/// Status events published to the status topic.
///
/// The wire strings are a fixed contract with the downstream dashboard
/// consumer, inconsistent casing included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Recording,
    Processing,
    Error,
    /// Empty sentinel that clears the status display.
    Clear,
}

impl StatusUpdate {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusUpdate::Recording => "Recording",
            StatusUpdate::Processing => "Processing Request",
            StatusUpdate::Error => "error",
            StatusUpdate::Clear => "",
        }
    }
}

/// Commands accepted on the control topic.
///
/// Both the remote payload decoder and the local prompt reduce to this
/// set, so the two sources drive the controller through the same
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Start recording if idle, stop and transcribe if live.
    Toggle,
    Start,
    Stop,
}

impl ControlCommand {
    /// Decode a control payload. Payloads are trimmed and matched
    /// case-insensitively; anything unrecognized yields `None` and is
    /// ignored by the listener.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload.trim().to_lowercase().as_str() {
            "button_pressed" => Some(ControlCommand::Toggle),
            "true" | "start" | "record" => Some(ControlCommand::Start),
            "false" | "stop" | "transcribe" => Some(ControlCommand::Stop),
            _ => None,
        }
    }
}
