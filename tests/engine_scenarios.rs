//! Scenario tests for the session engine.
//!
//! These drive the public engine API the way a front end would and check
//! the schedule, goal accounting and event stream over whole sessions.

use std::sync::Arc;

use tokio::sync::mpsc;

use timerable::engine::{
    EngineError, MockTicker, SessionEngine, SessionEvent, TickOutcome, Ticker,
};
use timerable::store::{
    DefaultsStore, JsonDefaultsStore, MemoryDefaultsStore, MemoryPersistence, SessionRecorder,
};
use timerable::types::{ChunkType, SessionSettings, TimerStatus};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_engine(
    settings: SessionSettings,
) -> (SessionEngine, mpsc::UnboundedReceiver<SessionEvent>, MockTicker) {
    let ticker = MockTicker::new();
    let mut engine = SessionEngine::new(
        Box::new(MemoryDefaultsStore::with_settings(settings)),
        Arc::new(MemoryPersistence::with_subjects(["Math"])),
        Box::new(ticker.clone()),
    );
    let rx = engine.subscribe();
    (engine, rx, ticker)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn tiny_settings(sessions: u32) -> SessionSettings {
    SessionSettings::default()
        .with_number_of_sessions(sessions)
        .with_work_seconds(2)
        .with_short_break_seconds(1)
        .with_long_break_seconds(1)
}

// ============================================================================
// Schedule
// ============================================================================

#[test]
fn test_schedule_alternates_and_ends_with_long_break() {
    let (mut engine, _rx, _ticker) = create_engine(SessionSettings::default());
    engine.start_session("Math").unwrap();

    let types: Vec<ChunkType> = engine
        .session()
        .unwrap()
        .chunks()
        .iter()
        .map(|c| c.chunk_type)
        .collect();

    assert_eq!(
        types,
        vec![
            ChunkType::Work,
            ChunkType::ShortBreak,
            ChunkType::Work,
            ChunkType::ShortBreak,
            ChunkType::Work,
            ChunkType::ShortBreak,
            ChunkType::Work,
            ChunkType::LongBreak,
        ]
    );
}

#[test]
fn test_single_session_is_work_then_long_break() {
    let (mut engine, _rx, _ticker) = create_engine(tiny_settings(1));
    engine.start_session("Math").unwrap();

    let session = engine.session().unwrap();
    assert_eq!(session.len(), 2);
    assert_eq!(session.chunks()[1].chunk_type, ChunkType::LongBreak);
}

// ============================================================================
// Goals
// ============================================================================

#[test]
fn test_session_count_never_exceeds_target() {
    let (mut engine, _rx, _ticker) = create_engine(tiny_settings(3));
    engine.start_session("Math").unwrap();

    let mut last = 0;
    while engine.status() == TimerStatus::Timing {
        engine.tick();
        let count = engine.session_count();
        assert!(count >= last, "session count went backwards");
        assert!(count <= 3);
        last = count;
    }

    assert_eq!(engine.session_count(), 3);
}

#[test]
fn test_daily_goal_reads_recorded_completions() {
    let persistence = Arc::new(MemoryPersistence::new());
    persistence.record_completed_session(Some("Math"));
    persistence.record_completed_session(Some("Math"));
    persistence.record_completed_session(None);

    let engine = SessionEngine::new(
        Box::new(MemoryDefaultsStore::with_settings(
            SessionSettings::default().with_daily_goal(10),
        )),
        persistence,
        Box::new(MockTicker::new()),
    );

    let daily = engine.goal_progress().daily;
    assert_eq!(daily.current, 3);
    assert_eq!(daily.target, 10);
    assert!(!daily.is_reached());
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_every_tick_publishes_chunk_changed() {
    let (mut engine, mut rx, _ticker) = create_engine(SessionSettings::default());
    engine.start_session("Math").unwrap();
    drain(&mut rx);

    for _ in 0..5 {
        engine.tick();
    }

    let events = drain(&mut rx);
    assert_eq!(events.len(), 5);
    let elapsed: Vec<u32> = events
        .iter()
        .map(|e| match e {
            SessionEvent::ChunkChanged(chunk) => chunk.elapsed,
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(elapsed, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_whole_session_event_counts() {
    let (mut engine, mut rx, ticker) = create_engine(tiny_settings(2));
    engine.start_session("Math").unwrap();
    drain(&mut rx);

    let mut outcomes = Vec::new();
    loop {
        let outcome = engine.accept_tick(ticker.signal());
        outcomes.push(outcome);
        if outcome == TickOutcome::Finished {
            break;
        }
    }

    let events = drain(&mut rx);
    let count = |name: &str| events.iter().filter(|e| e.name() == name).count();

    // 2 + 1 + 2 + 1 seconds
    assert_eq!(outcomes.len(), 6);
    assert_eq!(count("chunk_completed"), 4);
    assert_eq!(count("session_finished"), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == TickOutcome::ChunkAdvanced)
            .count(),
        3
    );
    assert!(!ticker.is_running());
}

#[test]
fn test_reset_mid_chunk_then_skip_fails() {
    let (mut engine, mut rx, _ticker) = create_engine(SessionSettings::default());
    engine.start_session("Math").unwrap();
    engine.tick();
    engine.reset().unwrap();

    assert_eq!(engine.skip(), Err(EngineError::NoActiveChunk));
    assert_eq!(
        drain(&mut rx)
            .iter()
            .filter(|e| matches!(e, SessionEvent::SessionFinished))
            .count(),
        1
    );
}

// ============================================================================
// Restart
// ============================================================================

#[test]
fn test_interrupted_session_comes_back_paused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("defaults.json");

    {
        let mut engine = SessionEngine::new(
            Box::new(JsonDefaultsStore::open(&path).unwrap()),
            Arc::new(MemoryPersistence::with_subjects(["Math"])),
            Box::new(MockTicker::new()),
        );
        engine.start_session("Math").unwrap();
        engine.tick();
        // Process "dies" while timing
    }

    let engine = SessionEngine::new(
        Box::new(JsonDefaultsStore::open(&path).unwrap()),
        Arc::new(MemoryPersistence::with_subjects(["Math"])),
        Box::new(MockTicker::new()),
    );

    assert_eq!(engine.status(), TimerStatus::Paused);
    assert_eq!(engine.subject(), Some("Math"));
    assert_eq!(engine.current_chunk().unwrap().elapsed, 0);
    assert_eq!(engine.defaults().timer_status(), TimerStatus::Paused);
}

#[test]
fn test_finished_session_restarts_ready() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("defaults.json");

    {
        let mut engine = SessionEngine::new(
            Box::new(JsonDefaultsStore::open(&path).unwrap()),
            Arc::new(MemoryPersistence::new()),
            Box::new(MockTicker::new()),
        );
        engine.start_session("Math").unwrap();
        engine.reset().unwrap();
    }

    let store = JsonDefaultsStore::open(&path).unwrap();
    assert_eq!(store.timer_status(), TimerStatus::Ready);
    // The last subject is remembered
    assert_eq!(store.subject(), Some("Math".to_string()));
}
