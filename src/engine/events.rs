//! Engine events and their delivery.
//!
//! Events are pushed to every subscriber the moment they happen. There is
//! no buffering on the engine side and no coalescing: two ticks produce two
//! `ChunkChanged` events.

use tokio::sync::mpsc;

use crate::types::{TimeChunk, TimerStatus};

// ============================================================================
// SessionEvent
// ============================================================================

/// Events published by the session engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The active chunk's elapsed time changed or a new chunk became active
    ChunkChanged(TimeChunk),
    /// A chunk ran to its full duration (not sent for skipped chunks)
    ChunkCompleted(TimeChunk),
    /// The session ended, naturally or by reset
    SessionFinished,
    /// Goal counters should be recomputed
    GoalsChanged,
    /// The timer status changed
    StatusChanged {
        status: TimerStatus,
        subject: Option<String>,
    },
}

impl SessionEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::ChunkChanged(_) => "chunk_changed",
            SessionEvent::ChunkCompleted(_) => "chunk_completed",
            SessionEvent::SessionFinished => "session_finished",
            SessionEvent::GoalsChanged => "goals_changed",
            SessionEvent::StatusChanged { .. } => "status_changed",
        }
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// Fan-out of engine events to any number of subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber.
    pub fn publish(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::trace!(
            event = event.name(),
            subscribers = self.subscriber_count(),
            "published session event"
        );
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkType;

    #[test]
    fn test_event_names() {
        let chunk = TimeChunk::new(ChunkType::Work, 10);
        assert_eq!(SessionEvent::ChunkChanged(chunk).name(), "chunk_changed");
        assert_eq!(SessionEvent::ChunkCompleted(chunk).name(), "chunk_completed");
        assert_eq!(SessionEvent::SessionFinished.name(), "session_finished");
        assert_eq!(SessionEvent::GoalsChanged.name(), "goals_changed");
        assert_eq!(
            SessionEvent::StatusChanged {
                status: TimerStatus::Ready,
                subject: None
            }
            .name(),
            "status_changed"
        );
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let mut bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(SessionEvent::GoalsChanged);

        assert_eq!(first.try_recv().unwrap(), SessionEvent::GoalsChanged);
        assert_eq!(second.try_recv().unwrap(), SessionEvent::GoalsChanged);
    }

    #[test]
    fn test_publish_keeps_order_without_coalescing() {
        let mut bus = EventBus::new();
        let mut rx = bus.subscribe();

        let mut chunk = TimeChunk::new(ChunkType::Work, 10);
        chunk.elapsed = 1;
        bus.publish(SessionEvent::ChunkChanged(chunk));
        chunk.elapsed = 2;
        bus.publish(SessionEvent::ChunkChanged(chunk));

        match rx.try_recv().unwrap() {
            SessionEvent::ChunkChanged(c) => assert_eq!(c.elapsed, 1),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.try_recv().unwrap() {
            SessionEvent::ChunkChanged(c) => assert_eq!(c.elapsed, 2),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        let mut kept = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        bus.publish(SessionEvent::SessionFinished);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), SessionEvent::SessionFinished);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let mut bus = EventBus::new();
        bus.publish(SessionEvent::GoalsChanged);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
