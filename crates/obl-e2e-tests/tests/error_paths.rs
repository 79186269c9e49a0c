//! E2E tests for failure paths: timeouts, write failures, malformed frames.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::ScriptedAdapter;
use obl_elm_channel::{ElmError, MockTransport, ObdSession, SessionConfig, Transport};
use obl_protocol::pid::Pid;

/// A dead adapter: every command times out, yet the session never errors and
/// never hangs — each command degrades to an empty partial frame.
#[tokio::test(start_paused = true)]
async fn e2e_silent_adapter_degrades_to_partials() {
    let transport = Arc::new(MockTransport::new());
    let session = ObdSession::connect(
        transport.clone() as Arc<dyn Transport>,
        SessionConfig::default(),
    )
    .await
    .unwrap();

    // Init succeeds command-by-command on partial (empty) frames.
    session.initialize().await.unwrap();
    assert_eq!(session.channel().timeouts(), 6);

    // A data query degrades to an absent-value reading.
    let reading = session.read_reading(Pid::new(0x0C)).await.unwrap().unwrap();
    assert!(reading.value.is_none());
    assert_eq!(session.channel().timeouts(), 7);
}

/// A write failure is fatal to the running operation but not to the session.
#[tokio::test]
async fn e2e_write_failure_mid_session() {
    let adapter = ScriptedAdapter::new();
    let mut session = adapter.connect().await;

    adapter.transport.fail_writes(true);
    let err = session.discover().await.unwrap_err();
    assert!(matches!(err, ElmError::Transport(_)));

    // The channel slot was released; the session recovers once writes work.
    adapter.transport.fail_writes(false);
    adapter.script_discovery();
    let supported = session.discover().await.unwrap();
    assert_eq!(supported.len(), 3);
}

/// Init failure names the exact command for the caller's retry decision.
#[tokio::test(start_paused = true)]
async fn e2e_init_failure_is_attributed() {
    let adapter = ScriptedAdapter::new();
    // ATZ and ATE0 get answers, ATL0 times out to a partial, and every
    // write after the third fails outright.
    adapter.transport.script_frame("ELM327 v1.5\r\r>");
    adapter.transport.script_frame("OK\r\r>");
    adapter.transport.script_silence();

    let session = adapter.connect().await;
    let transport = adapter.transport.clone();
    let saboteur = async {
        while transport.writes().len() < 3 {
            tokio::task::yield_now().await;
        }
        transport.fail_writes(true);
    };
    let (result, ()) = tokio::join!(session.initialize(), saboteur);

    match result.unwrap_err() {
        ElmError::Init { command, .. } => assert_eq!(command, "ATS0"),
        other => panic!("unexpected error: {other}"),
    }
}

/// Malformed probe responses skip their block; the rest of discovery stands.
#[tokio::test]
async fn e2e_partial_discovery_survives_garbage() {
    let adapter = ScriptedAdapter::new();
    adapter.transport.script_frame("41 00 80 00 00 00\r\r>"); // PID 01
    adapter.transport.script_frame("BUS INIT... ERROR\r\r>");
    adapter.transport.script_frame("41 40 80 00 00 00\r\r>"); // PID 41
    adapter.transport.script_frame("?\r\r>");

    let mut session = adapter.connect().await;
    let supported = session.discover().await.unwrap().clone();

    let expected: Vec<Pid> = [0x01, 0x41].into_iter().map(Pid::new).collect();
    assert_eq!(supported.into_iter().collect::<Vec<_>>(), expected);
}

/// NO DATA anywhere in a response always wins over payload parsing.
#[tokio::test]
async fn e2e_no_data_always_absent() {
    let adapter = ScriptedAdapter::new();
    adapter.transport.script_frame("41 0C NO DATA 1A F8\r\r>");

    let session = adapter.connect().await;
    let reading = session.read_reading(Pid::new(0x0C)).await.unwrap().unwrap();
    assert!(reading.value.is_none());
}

/// A slow multi-fragment response that completes just inside the deadline.
#[tokio::test(start_paused = true)]
async fn e2e_response_racing_the_deadline() {
    let transport = Arc::new(MockTransport::new());
    let session = ObdSession::connect(
        transport.clone() as Arc<dyn Transport>,
        SessionConfig::default(),
    )
    .await
    .unwrap();

    transport.script_fragments(&["41 0D "]); // first fragment at write time
    let transport2 = transport.clone();
    let reader = async { session.read_reading(Pid::new(0x0D)).await };
    let feeder = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        transport2.push_notification("3C\r\r>");
    };
    let (reading, ()) = tokio::join!(reader, feeder);

    let reading = reading.unwrap().unwrap();
    assert!((reading.value.unwrap() - 60.0).abs() < 0.01);
    assert_eq!(session.channel().timeouts(), 0);
}
