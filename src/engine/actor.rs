//! Async front end for the coordinator.
//!
//! The coordinator lives on one task and takes events from a single
//! command queue, so events from the camera pipeline, the tick scheduler, and
//! the UI are applied strictly one after another. Outbound events go to an
//! unbounded channel and the latest [`EngineSnapshot`] is published on a
//! `watch` channel.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, trace};

use super::coordinator::{EngineSnapshot, SessionCoordinator};
use crate::clock::{Clock, Timestamp};
use crate::error::EngineError;
use crate::types::{InboundEvent, OutboundEvent};

#[derive(Debug)]
enum Command {
    Event {
        at: Option<Timestamp>,
        event: InboundEvent,
    },
    Shutdown,
}

// ============================================================================
// EngineHandle
// ============================================================================

/// Cloneable sender side of a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<EngineSnapshot>,
}

impl EngineHandle {
    /// Queues an event stamped by the engine's clock when it is processed.
    pub fn send(&self, event: InboundEvent) -> Result<(), EngineError> {
        self.push(Command::Event { at: None, event })
    }

    /// Queues an event with an explicit arrival time.
    pub fn send_at(&self, at: Timestamp, event: InboundEvent) -> Result<(), EngineError> {
        self.push(Command::Event { at: Some(at), event })
    }

    /// Asks the engine task to finish after the events already queued.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.push(Command::Shutdown)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    fn push(&self, command: Command) -> Result<(), EngineError> {
        self.command_tx
            .send(command)
            .map_err(|_| EngineError::ChannelClosed)
    }
}

// ============================================================================
// EngineActor
// ============================================================================

/// Task that owns a [`SessionCoordinator`].
pub struct EngineActor<C: Clock> {
    coordinator: SessionCoordinator<C>,
    command_rx: mpsc::UnboundedReceiver<Command>,
    outbound_tx: mpsc::UnboundedSender<OutboundEvent>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
}

impl<C: Clock + 'static> EngineActor<C> {
    /// Spawns the engine on the current tokio runtime.
    ///
    /// Returns the handle, the outbound event stream, and the task handle,
    /// which yields the coordinator back once the engine shuts down.
    pub fn spawn(
        coordinator: SessionCoordinator<C>,
    ) -> (
        EngineHandle,
        mpsc::UnboundedReceiver<OutboundEvent>,
        JoinHandle<SessionCoordinator<C>>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());

        let actor = Self {
            coordinator,
            command_rx,
            outbound_tx,
            snapshot_tx,
        };
        let task = tokio::spawn(actor.run());

        let handle = EngineHandle {
            command_tx,
            snapshot_rx,
        };
        (handle, outbound_rx, task)
    }

    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) -> SessionCoordinator<C> {
        while let Some(command) = self.command_rx.recv().await {
            match command {
                Command::Event { at, event } => {
                    trace!(event = event.name(), "Processing event");
                    let outbound = match at {
                        Some(at) => self.coordinator.handle_at(at, event),
                        None => self.coordinator.handle(event),
                    };
                    for event in outbound {
                        if self.outbound_tx.send(event).is_err() {
                            trace!("Outbound receiver dropped");
                        }
                    }
                    self.snapshot_tx.send_replace(self.coordinator.snapshot());
                }
                Command::Shutdown => {
                    debug!("Engine shutting down");
                    break;
                }
            }
        }
        self.coordinator
    }
}

// ============================================================================
// Tick scheduler
// ============================================================================

/// Sends a `TimerTick` every `period` until the engine goes away.
///
/// Missed ticks are skipped rather than replayed in a burst.
pub fn spawn_ticker(handle: EngineHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if handle.send(InboundEvent::TimerTick).is_err() {
                debug!("Ticker stopped: engine closed");
                break;
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use crate::types::{EyeSample, Mode};
    use tokio::time::timeout;

    fn spawn_default() -> (
        EngineHandle,
        mpsc::UnboundedReceiver<OutboundEvent>,
        JoinHandle<SessionCoordinator<ManualClock>>,
    ) {
        let coordinator =
            SessionCoordinator::new(EngineConfig::default(), ManualClock::new()).unwrap();
        EngineActor::spawn(coordinator)
    }

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    #[tokio::test]
    async fn test_events_processed_in_order() {
        let (handle, mut rx, task) = spawn_default();
        handle
            .send_at(ms(0), InboundEvent::StartMonitoring { trip_reset: true })
            .unwrap();
        for t in (0..=1_000).step_by(100) {
            handle
                .send_at(ms(t), InboundEvent::EyeSample(EyeSample::closed(ms(t))))
                .unwrap();
        }
        handle.send_at(ms(2_000), InboundEvent::AcknowledgeAlert).unwrap();
        handle.shutdown().unwrap();

        let coordinator = task.await.unwrap();
        assert_eq!(coordinator.mode(), Mode::Monitoring);

        let mut modes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let OutboundEvent::ModeChanged(mode) = event {
                modes.push(mode);
            }
        }
        assert_eq!(
            modes,
            vec![Mode::Monitoring, Mode::AlertTriggered, Mode::Monitoring]
        );
    }

    #[tokio::test]
    async fn test_snapshot_published() {
        let (handle, _rx, _task) = spawn_default();
        let mut updates = handle.subscribe();

        handle
            .send_at(ms(0), InboundEvent::StartMonitoring { trip_reset: true })
            .unwrap();

        let changed = timeout(Duration::from_secs(2), updates.changed()).await;
        assert!(changed.is_ok());
        assert_eq!(handle.snapshot().mode, Mode::Monitoring);
    }

    #[tokio::test]
    async fn test_send_after_shutdown_fails() {
        let (handle, _rx, task) = spawn_default();
        handle.shutdown().unwrap();
        task.await.unwrap();

        let result = handle.send(InboundEvent::TimerTick);
        assert_eq!(result, Err(EngineError::ChannelClosed));
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_concurrent_senders() {
        let (handle, mut rx, task) = spawn_default();
        handle
            .send_at(ms(0), InboundEvent::StartMonitoring { trip_reset: true })
            .unwrap();

        let mut joins = Vec::new();
        for _ in 0..4 {
            let h = handle.clone();
            joins.push(tokio::spawn(async move {
                for _ in 0..25 {
                    h.send(InboundEvent::AcknowledgeAlert).unwrap();
                }
            }));
        }
        for j in joins {
            j.await.unwrap();
        }
        handle.shutdown().unwrap();
        let coordinator = task.await.unwrap();

        // Acknowledgments without an alert are all dropped
        assert_eq!(coordinator.mode(), Mode::Monitoring);
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 2); // CameraRequest(Start) and ModeChanged
    }

    #[tokio::test]
    async fn test_ticker_drives_focus_timer() {
        let config = EngineConfig::default().with_focus_seconds(Some(60));
        let coordinator = SessionCoordinator::new(config, ManualClock::new()).unwrap();
        let (handle, mut rx, _task) = EngineActor::spawn(coordinator);
        handle
            .send(InboundEvent::StartMonitoring { trip_reset: true })
            .unwrap();

        let ticker = spawn_ticker(handle.clone(), Duration::from_millis(20));

        let result = timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Some(OutboundEvent::TimerDisplayChanged(59)) => return true,
                    Some(_) => continue,
                    None => return false,
                }
            }
        })
        .await;

        ticker.abort();
        assert!(matches!(result, Ok(true)));
    }

    #[tokio::test]
    async fn test_ticker_exits_when_engine_closes() {
        let (handle, _rx, task) = spawn_default();
        let ticker = spawn_ticker(handle.clone(), Duration::from_millis(10));
        handle.shutdown().unwrap();
        task.await.unwrap();

        let finished = timeout(Duration::from_secs(2), ticker).await;
        assert!(finished.is_ok());
    }
}
