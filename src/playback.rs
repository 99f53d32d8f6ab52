//! Countdown and navigation state machine for one script.
//!
//! The controller is driven entirely from outside: time advances only through
//! [`PlaybackController::tick`], with caller-supplied deltas, and commands arrive through
//! [`toggle`](PlaybackController::toggle), [`navigate`](PlaybackController::navigate) and
//! [`reset`](PlaybackController::reset). Invalid requests are no-ops, never errors.
//!
//! Transitions are recorded as [`PlaybackEvent`]s which the owner drains after each call;
//! the controller never calls out to a renderer.

use serde::Serialize;
use tracing::{debug, info};

use crate::progress::{ProgressReporter, Threshold, format_clock};
use crate::segments::{ScriptDocument, Segment};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    /// Armed and not counting; entered on construction, navigation and reset.
    #[default]
    Idle,
    Running,
    /// Stopped by `toggle`; behaves like `Idle`.
    Paused,
    /// The countdown hit zero. Only `navigate`/`reset` leave this state.
    SegmentComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Discrete state changes, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PlaybackEvent {
    Started { segment_id: u32 },
    Paused { segment_id: u32 },
    SegmentCompleted { segment_id: u32 },
    Navigated { from_id: u32, to_id: u32 },
    Reset { segment_id: u32 },
}

/// What a call to [`PlaybackController::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running (or an invalid delta); nothing changed.
    Ignored,
    Counting,
    /// This tick drove the countdown to zero.
    Completed,
}

/// Mutable playback fields, owned by exactly one controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    current_segment_index: usize,
    remaining_time: f64,
    status: PlaybackStatus,
}

impl PlaybackState {
    fn armed(index: usize, segment: &Segment) -> Self {
        Self {
            current_segment_index: index,
            remaining_time: segment.duration_secs(),
            status: PlaybackStatus::Idle,
        }
    }

    pub fn current_segment_index(&self) -> usize {
        self.current_segment_index
    }

    /// Seconds left in the current segment, within `[0, duration]`.
    pub fn remaining_time(&self) -> f64 {
        self.remaining_time
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == PlaybackStatus::Running
    }
}

/// Read model handed to renderers after each tick or command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub segment_index: usize,
    pub segment_id: u32,
    pub segment_count: usize,
    pub title: String,
    pub duration_secs: u32,
    pub remaining_secs: f64,
    pub status: PlaybackStatus,
    pub is_running: bool,
    pub progress_ratio: f64,
    pub threshold: Threshold,
    pub clock: String,
}

pub struct PlaybackController {
    document: ScriptDocument,
    state: PlaybackState,
    events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new(document: ScriptDocument) -> Self {
        let state = PlaybackState::armed(0, document.first());
        Self {
            document,
            state,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &ScriptDocument {
        &self.document
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn remaining_time(&self) -> f64 {
        self.state.remaining_time
    }

    pub fn current_index(&self) -> usize {
        self.state.current_segment_index
    }

    pub fn current_segment(&self) -> &Segment {
        // The index is kept in range by every transition.
        &self.document.segments()[self.state.current_segment_index]
    }

    pub fn is_first(&self) -> bool {
        self.state.current_segment_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.state.current_segment_index == self.document.last_index()
    }

    /// Start or pause the countdown. Returns whether the status changed.
    ///
    /// Starting requires time left; a completed segment must be reset or left first.
    pub fn toggle(&mut self) -> bool {
        let segment_id = self.current_segment().id;
        match self.state.status {
            PlaybackStatus::Idle | PlaybackStatus::Paused => {
                if self.state.remaining_time <= 0.0 {
                    debug!(segment_id, "toggle ignored: no time left");
                    return false;
                }
                self.state.status = PlaybackStatus::Running;
                debug!(segment_id, remaining = self.state.remaining_time, "playback started");
                self.events.push(PlaybackEvent::Started { segment_id });
                true
            }
            PlaybackStatus::Running => {
                self.state.status = PlaybackStatus::Paused;
                debug!(segment_id, remaining = self.state.remaining_time, "playback paused");
                self.events.push(PlaybackEvent::Paused { segment_id });
                true
            }
            PlaybackStatus::SegmentComplete => {
                debug!(segment_id, "toggle ignored: segment complete");
                false
            }
        }
    }

    /// Advance the countdown by `delta_seconds`.
    ///
    /// Only effective while running. Negative or non-finite deltas are ignored. The
    /// completion event is recorded once, on the tick that reaches zero.
    pub fn tick(&mut self, delta_seconds: f64) -> TickOutcome {
        if self.state.status != PlaybackStatus::Running
            || !delta_seconds.is_finite()
            || delta_seconds < 0.0
        {
            return TickOutcome::Ignored;
        }

        self.state.remaining_time = (self.state.remaining_time - delta_seconds).max(0.0);
        if self.state.remaining_time > 0.0 {
            return TickOutcome::Counting;
        }

        let segment_id = self.current_segment().id;
        self.state.status = PlaybackStatus::SegmentComplete;
        info!(segment_id, "segment complete");
        self.events.push(PlaybackEvent::SegmentCompleted { segment_id });
        TickOutcome::Completed
    }

    /// Move one segment forward or back. Out-of-range moves are no-ops.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let current = self.state.current_segment_index;
        let target = match direction {
            Direction::Next => current.checked_add(1),
            Direction::Previous => current.checked_sub(1),
        };
        match target {
            Some(target) => self.jump_to(target),
            None => false,
        }
    }

    /// Move to an arbitrary segment with the same semantics as [`navigate`](Self::navigate).
    pub fn jump_to(&mut self, index: usize) -> bool {
        let Some(target) = self.document.get(index) else {
            debug!(index, len = self.document.len(), "navigation ignored: out of range");
            return false;
        };

        let from_id = self.current_segment().id;
        let to_id = target.id;
        self.state = PlaybackState::armed(index, target);

        // A completion that was never drained belongs to the segment we just left.
        self.events.retain(
            |event| !matches!(event, PlaybackEvent::SegmentCompleted { segment_id } if *segment_id == from_id),
        );
        debug!(from_id, to_id, "navigated");
        self.events.push(PlaybackEvent::Navigated { from_id, to_id });
        true
    }

    /// Re-arm the current segment to its full duration and stop counting.
    pub fn reset(&mut self) {
        let index = self.state.current_segment_index;
        let segment = &self.document.segments()[index];
        let segment_id = segment.id;
        self.state = PlaybackState::armed(index, segment);
        debug!(segment_id, "segment reset");
        self.events.push(PlaybackEvent::Reset { segment_id });
    }

    /// Take the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let segment = self.current_segment();
        let progress = ProgressReporter::report(&self.state, segment);
        PlaybackSnapshot {
            segment_index: self.state.current_segment_index,
            segment_id: segment.id,
            segment_count: self.document.len(),
            title: segment.title.clone(),
            duration_secs: segment.duration,
            remaining_secs: self.state.remaining_time,
            status: self.state.status,
            is_running: self.state.is_running(),
            progress_ratio: progress.ratio,
            threshold: progress.threshold,
            clock: format_clock(self.state.remaining_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(durations: &[u32]) -> ScriptDocument {
        let segments = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Segment {
                id: 0,
                title: format!("S{i}"),
                duration: *d,
                bullets: Vec::new(),
            })
            .collect();
        ScriptDocument::new(segments, 60)
    }

    #[test]
    fn construction_arms_first_segment() {
        let ctl = PlaybackController::new(document(&[30, 45]));
        assert_eq!(ctl.current_index(), 0);
        assert_eq!(ctl.remaining_time(), 30.0);
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert!(!ctl.is_running());
    }

    #[test]
    fn toggle_cycles_running_and_paused() {
        let mut ctl = PlaybackController::new(document(&[30]));
        assert!(ctl.toggle());
        assert_eq!(ctl.status(), PlaybackStatus::Running);
        assert!(ctl.toggle());
        assert_eq!(ctl.status(), PlaybackStatus::Paused);
        assert!(ctl.toggle());
        assert!(ctl.is_running());
    }

    #[test]
    fn tick_only_counts_while_running() {
        let mut ctl = PlaybackController::new(document(&[30]));
        assert_eq!(ctl.tick(5.0), TickOutcome::Ignored);
        assert_eq!(ctl.remaining_time(), 30.0);

        ctl.toggle();
        assert_eq!(ctl.tick(0.25), TickOutcome::Counting);
        assert_eq!(ctl.tick(1.75), TickOutcome::Counting);
        assert!((ctl.remaining_time() - 28.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_deltas_are_ignored() {
        let mut ctl = PlaybackController::new(document(&[30]));
        ctl.toggle();
        assert_eq!(ctl.tick(-1.0), TickOutcome::Ignored);
        assert_eq!(ctl.tick(f64::NAN), TickOutcome::Ignored);
        assert_eq!(ctl.remaining_time(), 30.0);
    }

    #[test]
    fn completion_fires_once() {
        let mut ctl = PlaybackController::new(document(&[10]));
        ctl.toggle();
        ctl.drain_events();

        assert_eq!(ctl.tick(11.0), TickOutcome::Completed);
        assert_eq!(ctl.remaining_time(), 0.0);
        assert_eq!(ctl.status(), PlaybackStatus::SegmentComplete);
        assert_eq!(ctl.tick(1.0), TickOutcome::Ignored);
        assert_eq!(ctl.tick(1.0), TickOutcome::Ignored);

        let completions = ctl
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, PlaybackEvent::SegmentCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn toggle_is_a_no_op_after_completion() {
        let mut ctl = PlaybackController::new(document(&[1]));
        ctl.toggle();
        ctl.tick(1.0);
        assert!(!ctl.toggle());
        assert_eq!(ctl.status(), PlaybackStatus::SegmentComplete);
    }

    #[test]
    fn toggle_with_no_time_left_stays_idle() {
        let mut ctl = PlaybackController::new(document(&[0]));
        assert_eq!(ctl.remaining_time(), 0.0);
        assert!(!ctl.toggle());
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert!(ctl.drain_events().is_empty());
    }

    #[test]
    fn navigation_rearms_and_stops() {
        let mut ctl = PlaybackController::new(document(&[30, 45]));
        ctl.toggle();
        ctl.tick(10.0);
        assert!(ctl.navigate(Direction::Next));
        assert_eq!(ctl.current_index(), 1);
        assert_eq!(ctl.remaining_time(), 45.0);
        assert_eq!(ctl.status(), PlaybackStatus::Idle);

        assert!(ctl.navigate(Direction::Previous));
        assert_eq!(ctl.remaining_time(), 30.0);
    }

    #[test]
    fn out_of_range_navigation_changes_nothing() {
        let mut ctl = PlaybackController::new(document(&[30, 45]));
        ctl.toggle();
        ctl.tick(3.0);
        ctl.drain_events();
        let before = ctl.state().clone();

        assert!(!ctl.navigate(Direction::Previous));
        assert_eq!(ctl.state(), &before);

        ctl.jump_to(1);
        ctl.toggle();
        ctl.drain_events();
        let before = ctl.state().clone();
        assert!(!ctl.navigate(Direction::Next));
        assert_eq!(ctl.state(), &before);
        assert!(!ctl.jump_to(9));
        assert_eq!(ctl.state(), &before);
        assert!(ctl.drain_events().is_empty());
    }

    #[test]
    fn navigation_discards_pending_completion() {
        let mut ctl = PlaybackController::new(document(&[5, 5]));
        ctl.toggle();
        ctl.tick(5.0);
        ctl.navigate(Direction::Next);
        let events = ctl.drain_events();
        assert_eq!(
            events,
            vec![
                PlaybackEvent::Started { segment_id: 1 },
                PlaybackEvent::Navigated { from_id: 1, to_id: 2 },
            ]
        );
    }

    #[test]
    fn reset_keeps_index_and_rearms() {
        let mut ctl = PlaybackController::new(document(&[30, 20]));
        ctl.navigate(Direction::Next);
        ctl.toggle();
        ctl.tick(20.0);
        assert_eq!(ctl.status(), PlaybackStatus::SegmentComplete);

        ctl.reset();
        assert_eq!(ctl.current_index(), 1);
        assert_eq!(ctl.remaining_time(), 20.0);
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert!(ctl.toggle());
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut ctl = PlaybackController::new(document(&[60]));
        let snap = ctl.snapshot();
        assert_eq!(snap.progress_ratio, 0.0);
        assert_eq!(snap.clock, "01:00");
        assert_eq!(snap.threshold, Threshold::Normal);

        ctl.toggle();
        ctl.tick(60.0);
        let snap = ctl.snapshot();
        assert!((snap.progress_ratio - 1.0).abs() < 1e-9);
        assert_eq!(snap.status, PlaybackStatus::SegmentComplete);
        assert_eq!(snap.threshold, Threshold::Critical);
        assert!(!snap.is_running);
    }
}
