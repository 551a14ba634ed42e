//! End-to-end session behaviour against in-memory devices and transport

mod common;

use common::{session_with, test_config, wait_until, FakeBackend, FakeTransport};
use sumy_command::audio::codec::encode_frame;
use sumy_command::live::LiveEvent;
use sumy_command::messages::LogSource;
use sumy_command::session::{ConnectionState, INTERRUPTED_MARKER};
use sumy_command::SumyError;

fn two_clip_message() -> String {
    let data = encode_frame(&vec![0.2; 4800]).data;
    format!(
        r#"{{"serverContent":{{"modelTurn":{{"parts":[
            {{"inlineData":{{"mimeType":"audio/pcm;rate=24000","data":"{0}"}}}},
            {{"inlineData":{{"mimeType":"audio/pcm;rate=24000","data":"{0}"}}}}
        ]}}}}}}"#,
        data
    )
}

#[test]
fn test_connect_with_microphone_denied() {
    let backend = FakeBackend::denying_microphone();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());
    let states = session.state().watch_connection();

    let result = session.connect();

    assert!(matches!(result, Err(SumyError::MicrophoneUnavailable(_))));
    let seen: Vec<_> = states.try_iter().collect();
    assert_eq!(seen, vec![ConnectionState::Connecting, ConnectionState::Error]);
    assert!(session.state().log().is_empty());
    assert_eq!(backend.open_devices(), 0);
    assert_eq!(transport.open_count(), 0);
    assert!(!session.holds_resources());
    assert!(session.state().last_error().is_some());
}

#[test]
fn test_connect_without_api_key_releases_devices() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut config = test_config();
    config.api_key = None;
    let mut session = session_with(&backend, &transport, config);

    let result = session.connect();

    assert!(matches!(result, Err(SumyError::CredentialsMissing(_))));
    assert_eq!(session.connection_state(), ConnectionState::Error);
    assert_eq!(backend.outputs_opened.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(backend.open_devices(), 0);
    assert_eq!(transport.open_count(), 0);
}

#[test]
fn test_transport_failure_releases_devices() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::failing(SumyError::ConnectionError("refused".into()));
    let mut session = session_with(&backend, &transport, test_config());

    assert!(session.connect().is_err());
    assert_eq!(session.connection_state(), ConnectionState::Error);
    assert_eq!(backend.open_devices(), 0);
}

#[test]
fn test_open_session_greets_and_streams() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    assert_eq!(session.connection_state(), ConnectionState::Connecting);
    assert_eq!(backend.open_devices(), 2);

    let mut remote = transport.take_remote();
    assert_eq!(remote.api_key, "test-key");
    assert_eq!(remote.setup.generation_config.response_modalities, vec!["AUDIO"]);
    assert!(remote.setup.model.starts_with("models/"));

    // Audio captured before the session opens is not forwarded
    assert!(backend.speak(vec![0.3; 4096]));
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(remote.drain_sent().is_empty());

    remote.send(LiveEvent::Opened);
    assert!(wait_until(|| session.connection_state() == ConnectionState::Connected));

    let mut sent = Vec::new();
    assert!(wait_until(|| {
        sent.extend(remote.drain_sent());
        !sent.is_empty()
    }));
    assert!(sent[0].contains("Startup Greeting Protocol"));

    assert!(backend.speak(vec![0.5; 4096]));
    assert!(wait_until(|| {
        sent.extend(remote.drain_sent());
        sent.iter().any(|m| m.contains("mediaChunks"))
    }));
    assert!(session.state().volume() > 0.4);

    session.disconnect();
    assert_eq!(backend.open_devices(), 0);
}

#[test]
fn test_move_tool_call_round_trip() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    let mut remote = transport.take_remote();
    remote.send(LiveEvent::Opened);
    assert!(wait_until(|| session.connection_state() == ConnectionState::Connected));

    remote.send_json(
        r#"{"toolCall":{"functionCalls":[{"id":"call-7","name":"moveRobot","args":{"steps":10}}]}}"#,
    );

    assert!(wait_until(|| session.state().unit().trail.len() == 2));
    let unit = session.state().unit();
    assert!(unit.x.abs() < 1e-9);
    assert!((unit.y + 10.0).abs() < 1e-9);

    let log = session.state().log_entries();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].source, LogSource::Agent);
    assert_eq!(log[0].text, "⚡ Advancing: 10m");

    let mut sent = Vec::new();
    assert!(wait_until(|| {
        sent.extend(remote.drain_sent());
        sent.iter().any(|m| m.contains("toolResponse"))
    }));
    let response = sent.iter().find(|m| m.contains("toolResponse")).unwrap();
    assert!(response.contains("\"id\":\"call-7\""));
    assert!(response.contains("Maneuver Complete"));
}

#[test]
fn test_interruption_stops_scheduled_audio() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    let remote = transport.take_remote();
    remote.send(LiveEvent::Opened);
    remote.send_json(&two_clip_message());

    assert!(wait_until(|| backend.sink.active_count() == 2));
    let starts = backend.sink.starts.lock().clone();
    assert!((starts[1] - starts[0] - 0.2).abs() < 1e-9);

    remote.send_json(r#"{"serverContent":{"interrupted":true}}"#);

    assert!(wait_until(|| backend.sink.active_count() == 0));
    assert!(wait_until(|| session.state().log().len() == 1));
    let log = session.state().log_entries();
    assert_eq!(log[0].text, INTERRUPTED_MARKER);
    assert_eq!(log[0].source, LogSource::Agent);
    assert_eq!(backend.sink.stopped.lock().len(), 2);

    // The schedule restarts from the clock after an interruption
    remote.send_json(&two_clip_message());
    assert!(wait_until(|| backend.sink.starts.lock().len() == 4));
    assert_eq!(backend.sink.starts.lock()[2], 0.0);
}

#[test]
fn test_disconnect_twice() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    // Never connected
    session.disconnect();
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);

    session.connect().unwrap();
    session.disconnect();
    session.disconnect();

    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    assert_eq!(backend.open_devices(), 0);
    assert_eq!(session.state().volume(), 0.0);
    assert!(!session.holds_resources());
}

#[test]
fn test_remote_close_released_on_poll() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    let remote = transport.take_remote();
    remote.send(LiveEvent::Opened);
    remote.send(LiveEvent::Closed {
        reason: "session expired".into(),
    });

    assert!(wait_until(|| session.connection_state() == ConnectionState::Disconnected));
    assert!(session.holds_resources());

    session.poll();
    assert!(!session.holds_resources());
    assert_eq!(backend.open_devices(), 0);
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
}

#[test]
fn test_remote_error_then_reconnect() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    let remote = transport.take_remote();
    remote.send(LiveEvent::Opened);
    remote.send_json(r#"{"toolCall":{"functionCalls":[{"id":"1","name":"turnRobot","args":{"direction":"right"}}]}}"#);
    assert!(wait_until(|| session.state().unit().angle == 90.0));

    remote.send(LiveEvent::Error("socket reset".into()));
    assert!(wait_until(|| session.connection_state() == ConnectionState::Error));

    session.connect().unwrap();
    assert_eq!(session.connection_state(), ConnectionState::Connecting);
    assert_eq!(session.state().unit().angle, 0.0);
    assert!(session.state().log().is_empty());
    assert_eq!(transport.open_count(), 2);
    assert_eq!(backend.open_devices(), 2);
}

#[test]
fn test_connect_while_active_is_ignored() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    session.connect().unwrap();

    assert_eq!(transport.open_count(), 1);
    assert_eq!(backend.open_devices(), 2);
}

#[test]
fn test_events_after_disconnect_are_ignored() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();
    let mut session = session_with(&backend, &transport, test_config());

    session.connect().unwrap();
    let remote = transport.take_remote();
    session.disconnect();

    remote.send(LiveEvent::Opened);
    remote.send_json(r#"{"toolCall":{"functionCalls":[{"id":"1","name":"moveRobot","args":{"steps":5}}]}}"#);
    std::thread::sleep(std::time::Duration::from_millis(50));

    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    assert_eq!(session.state().unit().trail.len(), 1);
    assert!(session.state().log().is_empty());
}

#[test]
fn test_drop_releases_devices() {
    let backend = FakeBackend::default();
    let transport = FakeTransport::default();

    {
        let mut session = session_with(&backend, &transport, test_config());
        session.connect().unwrap();
        assert_eq!(backend.open_devices(), 2);
    }

    assert_eq!(backend.open_devices(), 0);
}
