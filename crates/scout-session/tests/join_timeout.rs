//! A scout joining a room with no lead gives up after the join timeout.

use std::sync::Arc;
use std::time::Duration;

use scout_core::MemoryKeyValueStore;
use scout_session::{
    SessionConfig, SessionDriver, SessionError, SessionInput, SessionManager, SessionNotice,
    StateKind,
};
use scout_testkit::MockSignaling;

#[tokio::test(start_paused = true)]
async fn scout_without_lead_returns_to_select_after_thirty_seconds() {
    scout_testkit::init_test_tracing();
    let signaling = MockSignaling::new();
    let manager = SessionManager::new(
        SessionConfig::default(),
        signaling.clone(),
        Arc::new(MemoryKeyValueStore::new()),
        "Grace",
    );
    let (driver, handle, mut notices) = SessionDriver::new(manager);
    let task = tokio::spawn(driver.run());

    let started = tokio::time::Instant::now();
    handle
        .send(SessionInput::JoinRoom {
            room_code: "123456".into(),
        })
        .unwrap();

    let mut countdown = Vec::new();
    let mut timed_out = false;
    loop {
        let notice = notices.recv().await.expect("driver stopped early");
        match notice {
            SessionNotice::Countdown { remaining_secs } => countdown.push(remaining_secs),
            SessionNotice::Error(SessionError::JoinTimedOut { room_code }) => {
                assert_eq!(room_code, "123456");
                timed_out = true;
            }
            SessionNotice::StateChanged {
                to: StateKind::Select,
                ..
            } => break,
            _ => {}
        }
    }

    let elapsed = started.elapsed();
    assert!(timed_out, "error notice must precede the return to select");
    assert!(elapsed >= Duration::from_secs(30), "gave up after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(32), "gave up after {elapsed:?}");
    assert_eq!(countdown.first(), Some(&30));
    assert_eq!(countdown.last(), Some(&1));
    assert_eq!(signaling.joined(), vec!["123456"]);
    assert_eq!(signaling.left(), vec!["123456"]);

    drop(handle);
    let manager = task.await.unwrap();
    assert_eq!(manager.kind(), StateKind::Select);
    assert!(manager.shows_room_entry());
}

#[tokio::test(start_paused = true)]
async fn cancelled_join_stops_the_countdown() {
    let signaling = MockSignaling::new();
    let manager = SessionManager::new(
        SessionConfig::default(),
        signaling.clone(),
        Arc::new(MemoryKeyValueStore::new()),
        "Grace",
    );
    let (driver, handle, mut notices) = SessionDriver::new(manager);
    let task = tokio::spawn(driver.run());

    handle
        .send(SessionInput::JoinRoom {
            room_code: "654321".into(),
        })
        .unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    handle.send(SessionInput::CancelJoin).unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    drop(handle);
    let manager = task.await.unwrap();

    let mut seen = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        seen.push(notice);
    }
    assert!(
        !seen
            .iter()
            .any(|n| matches!(n, SessionNotice::Error(SessionError::JoinTimedOut { .. })))
    );
    let countdowns = seen
        .iter()
        .filter(|n| matches!(n, SessionNotice::Countdown { .. }))
        .count();
    assert!(countdowns <= 7, "countdown kept running: {countdowns}");
    assert_eq!(manager.kind(), StateKind::Select);
    assert_eq!(signaling.left(), vec!["654321"]);
}
