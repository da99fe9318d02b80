//! Script replay through the engine actor.

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::script::ScriptLine;
use crate::clock::{ManualClock, Timestamp};
use crate::config::EngineConfig;
use crate::engine::{EngineActor, SessionCoordinator};
use crate::types::OutboundEvent;
use crate::vision::OpennessClassifier;

/// Feeds `lines` through a freshly spawned engine.
///
/// `on_event` sees every outbound event together with the arrival time of
/// the script line that produced it. Returns the coordinator once the
/// engine has shut down.
pub async fn run_replay<F>(
    config: EngineConfig,
    lines: &[ScriptLine],
    mut on_event: F,
) -> Result<SessionCoordinator<ManualClock>>
where
    F: FnMut(Timestamp, &OutboundEvent),
{
    let clock = ManualClock::new();
    let coordinator =
        SessionCoordinator::new(config, clock.clone()).context("Invalid engine configuration")?;
    let (handle, mut outbound, task) = EngineActor::spawn(coordinator);
    let mut processed = handle.subscribe();
    processed.borrow_and_update();

    let classifier = OpennessClassifier::default();
    for line in lines {
        let at = line.at();
        clock.set(at);
        let event = line.to_event(&classifier);
        debug!(at_ms = line.at_ms, event = event.name(), "Replaying");

        handle
            .send_at(at, event)
            .context("Failed to send event to engine")?;
        // A snapshot is published after every processed event.
        if processed.changed().await.is_err() {
            bail!("Engine stopped unexpectedly");
        }
        while let Ok(event) = outbound.try_recv() {
            on_event(at, &event);
        }
    }

    handle.shutdown().context("Failed to stop engine")?;
    let coordinator = task.await.context("Engine task failed")?;
    Ok(coordinator)
}
