//! Async host for a [`PlaybackController`].
//!
//! The controller is moved into a single tokio task which is its only writer. Commands
//! are sent over an mpsc channel and applied one at a time between ticks, so each
//! transition is observed whole. The tick source is a `tokio::time::interval`; the delta
//! handed to the controller is the measured time since the previous tick, so a late or
//! skipped tick never loses time.
//!
//! Observers get two views:
//! - a `watch` channel holding the latest [`PlaybackSnapshot`]
//! - a `broadcast` channel carrying every [`PlaybackEvent`]

use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::playback::{
    Direction, PlaybackController, PlaybackEvent, PlaybackSnapshot, PlaybackStatus,
};

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Requests routed to the owning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Toggle,
    Navigate(Direction),
    Reset,
    JumpTo(usize),
}

pub struct PlaybackDriver {
    commands: mpsc::Sender<DriverCommand>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<PlaybackController>,
}

impl PlaybackDriver {
    /// Spawn the owning task on the current tokio runtime.
    ///
    /// `tick_interval` is raised to at least one millisecond.
    pub fn spawn(controller: PlaybackController, tick_interval: Duration) -> Self {
        let tick_interval = tick_interval.max(MIN_TICK_INTERVAL);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snap_tx, snap_rx) = watch::channel(controller.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let cancel = CancellationToken::new();

        let task = DriverTask {
            controller,
            commands: cmd_rx,
            snapshots: snap_tx,
            events: event_tx.clone(),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(task.run(tick_interval));

        info!(tick_ms = tick_interval.as_millis() as u64, "playback driver started");
        Self {
            commands: cmd_tx,
            snapshots: snap_rx,
            events: event_tx,
            cancel,
            handle,
        }
    }

    pub async fn send(&self, command: DriverCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("playback driver has stopped").into())
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Stop the task and hand the controller back.
    pub async fn shutdown(self) -> Result<PlaybackController> {
        self.cancel.cancel();
        let controller = self
            .handle
            .await
            .map_err(|err| anyhow!("playback driver task failed: {err}"))?;
        info!("playback driver stopped");
        Ok(controller)
    }
}

struct DriverTask {
    controller: PlaybackController,
    commands: mpsc::Receiver<DriverCommand>,
    snapshots: watch::Sender<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
    cancel: CancellationToken,
}

impl DriverTask {
    async fn run(mut self, tick_interval: Duration) -> PlaybackController {
        let mut ticker = time::interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("command channel closed");
                        break;
                    };
                    let was_running = self.controller.is_running();
                    self.apply(command);
                    // Time spent idle must not be charged to the first running tick.
                    if !was_running && self.controller.is_running() {
                        last_tick = Instant::now();
                    }
                    self.publish();
                }
                now = ticker.tick() => {
                    let delta = now.saturating_duration_since(last_tick);
                    last_tick = now;
                    if self.controller.status() == PlaybackStatus::Running {
                        self.controller.tick(delta.as_secs_f64());
                        self.publish();
                    }
                }
            }
        }

        self.controller
    }

    fn apply(&mut self, command: DriverCommand) {
        debug!(?command, "applying command");
        match command {
            DriverCommand::Toggle => {
                self.controller.toggle();
            }
            DriverCommand::Navigate(direction) => {
                self.controller.navigate(direction);
            }
            DriverCommand::Reset => self.controller.reset(),
            DriverCommand::JumpTo(index) => {
                self.controller.jump_to(index);
            }
        }
    }

    fn publish(&mut self) {
        for event in self.controller.drain_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.controller.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn controller() -> PlaybackController {
        PlaybackController::new(parse("## One (2 seconds)\n## Two (3 seconds)\n"))
    }

    #[tokio::test(start_paused = true)]
    async fn runs_a_segment_to_completion() -> anyhow::Result<()> {
        let driver = PlaybackDriver::spawn(controller(), Duration::from_millis(100));
        let mut events = driver.subscribe();

        driver.send(DriverCommand::Toggle).await?;
        assert_eq!(events.recv().await?, PlaybackEvent::Started { segment_id: 1 });
        assert_eq!(
            events.recv().await?,
            PlaybackEvent::SegmentCompleted { segment_id: 1 }
        );

        let snap = driver.snapshot();
        assert_eq!(snap.status, PlaybackStatus::SegmentComplete);
        assert_eq!(snap.remaining_secs, 0.0);

        let controller = driver.shutdown().await?;
        assert_eq!(controller.status(), PlaybackStatus::SegmentComplete);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn commands_are_applied_in_order() -> anyhow::Result<()> {
        let driver = PlaybackDriver::spawn(controller(), Duration::from_millis(100));
        let mut events = driver.subscribe();

        driver.send(DriverCommand::Navigate(Direction::Next)).await?;
        // Already on the last segment: no event, no change.
        driver.send(DriverCommand::Navigate(Direction::Next)).await?;
        driver.send(DriverCommand::JumpTo(0)).await?;
        driver.send(DriverCommand::Navigate(Direction::Next)).await?;

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(events.recv().await?);
        }
        assert_eq!(
            seen,
            vec![
                PlaybackEvent::Navigated { from_id: 1, to_id: 2 },
                PlaybackEvent::Navigated { from_id: 2, to_id: 1 },
                PlaybackEvent::Navigated { from_id: 1, to_id: 2 },
            ]
        );

        let controller = driver.shutdown().await?;
        assert_eq!(controller.current_index(), 1);
        assert_eq!(controller.remaining_time(), 3.0);
        assert_eq!(controller.status(), PlaybackStatus::Idle);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tick_interval_is_raised_to_the_minimum() -> anyhow::Result<()> {
        let driver = PlaybackDriver::spawn(controller(), Duration::ZERO);
        let mut events = driver.subscribe();

        driver.send(DriverCommand::Toggle).await?;
        assert_eq!(events.recv().await?, PlaybackEvent::Started { segment_id: 1 });
        assert_eq!(
            events.recv().await?,
            PlaybackEvent::SegmentCompleted { segment_id: 1 }
        );

        let controller = driver.shutdown().await?;
        assert_eq!(controller.status(), PlaybackStatus::SegmentComplete);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn paused_time_is_not_counted() -> anyhow::Result<()> {
        let driver = PlaybackDriver::spawn(controller(), Duration::from_millis(100));
        let mut snapshots = driver.watch();

        driver.send(DriverCommand::Toggle).await?;
        time::sleep(Duration::from_millis(550)).await;
        driver.send(DriverCommand::Toggle).await?;
        snapshots.wait_for(|snap| !snap.is_running).await?;
        let paused_at = driver.snapshot().remaining_secs;

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(driver.snapshot().remaining_secs, paused_at);
        assert!(paused_at > 0.0 && paused_at < 2.0);

        driver.shutdown().await?;
        Ok(())
    }
}
