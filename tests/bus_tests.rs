use voice_station::{ControlCommand, StatusUpdate};

#[test]
fn test_toggle_payload() {
    assert_eq!(
        ControlCommand::parse("button_pressed"),
        Some(ControlCommand::Toggle)
    );
}

#[test]
fn test_start_payloads() {
    for payload in ["true", "start", "record"] {
        assert_eq!(ControlCommand::parse(payload), Some(ControlCommand::Start));
    }
}

#[test]
fn test_stop_payloads() {
    for payload in ["false", "stop", "transcribe"] {
        assert_eq!(ControlCommand::parse(payload), Some(ControlCommand::Stop));
    }
}

#[test]
fn test_payloads_are_trimmed_and_case_insensitive() {
    assert_eq!(
        ControlCommand::parse("  BUTTON_PRESSED  "),
        Some(ControlCommand::Toggle)
    );
    assert_eq!(ControlCommand::parse("Start"), Some(ControlCommand::Start));
    assert_eq!(
        ControlCommand::parse("\tTRANSCRIBE\n"),
        Some(ControlCommand::Stop)
    );
}

#[test]
fn test_unknown_payloads_rejected() {
    for payload in ["", "banana", "start now", "recordx", "toggle"] {
        assert_eq!(ControlCommand::parse(payload), None, "payload {payload:?}");
    }
}

#[test]
fn test_status_wire_strings() {
    // Fixed contract with the downstream dashboard, casing included.
    assert_eq!(StatusUpdate::Recording.as_str(), "Recording");
    assert_eq!(StatusUpdate::Processing.as_str(), "Processing Request");
    assert_eq!(StatusUpdate::Error.as_str(), "error");
    assert_eq!(StatusUpdate::Clear.as_str(), "");
}
