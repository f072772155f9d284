//! Transition animator.
//!
//! [`Transition`] is a timing-only handle driven by the host's frame clock.
//! [`Tween`] pairs one with the per-node tracks a layout change produced and
//! writes interpolated coordinates into the tree on every tick.

use kurbo::Point;
use std::time::Duration;
use tocmap_core::{Easing, NodeIndex, TreeStore};

// ─── Transition ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Complete,
}

/// Result of one [`Transition::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was delivered; more will follow.
    Running,
    /// The final frame (`t = 1`) was delivered. Reported exactly once.
    Completed,
    /// Already complete; no frame was delivered.
    Idle,
}

/// Time-parameterised progress from 0 to 1.
///
/// Times are offsets on the host's monotonic frame clock. Progress never
/// decreases, even if the clock passed to [`Transition::tick`] does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    started: Duration,
    duration: Duration,
    easing: Easing,
    t: f64,
    phase: Phase,
}

impl Transition {
    pub fn start(now: Duration, duration: Duration, easing: Easing) -> Self {
        Self {
            started: now,
            duration,
            easing,
            t: 0.0,
            phase: Phase::Running,
        }
    }

    /// Replace this transition with a fresh one starting at `now`.
    ///
    /// Returns `true` when an unfinished transition was cut short. The cut
    /// transition never reports completion.
    pub fn supersede(&mut self, now: Duration, duration: Duration, easing: Easing) -> bool {
        let interrupted = self.is_running();
        if interrupted {
            log::debug!("transition superseded at t={:.3}", self.t);
        }
        *self = Self::start(now, duration, easing);
        interrupted
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Linear progress of the last delivered frame, in [0, 1].
    pub fn progress(&self) -> f64 {
        self.t
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Advance to `now` and hand the eased progress to `on_tick`.
    pub fn tick(&mut self, now: Duration, on_tick: impl FnOnce(f64)) -> TickOutcome {
        if self.phase == Phase::Complete {
            return TickOutcome::Idle;
        }
        let raw = if self.duration.is_zero() {
            1.0
        } else {
            let elapsed = now.saturating_sub(self.started);
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        self.t = self.t.max(raw);
        log::trace!("transition tick t={:.3}", self.t);
        on_tick(self.easing.apply(self.t));

        if self.t >= 1.0 {
            self.phase = Phase::Complete;
            TickOutcome::Completed
        } else {
            TickOutcome::Running
        }
    }
}

// ─── Tween ───────────────────────────────────────────────────────────────

/// One node's start and end coordinates for a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub node: NodeIndex,
    pub from: Point,
    pub to: Point,
    /// The node is detached and travels into its collapsed ancestor; it is
    /// drawn only until the transition settles.
    pub exiting: bool,
}

impl Track {
    /// Position at eased progress `eased`; exactly `to` once it reaches 1.
    pub fn at(&self, eased: f64) -> Point {
        if eased >= 1.0 {
            self.to
        } else {
            self.from.lerp(self.to, eased)
        }
    }
}

/// A running transition plus the nodes it moves.
#[derive(Debug, Clone)]
pub struct Tween {
    pub transition: Transition,
    pub tracks: Vec<Track>,
}

impl Tween {
    pub fn new(transition: Transition, tracks: Vec<Track>) -> Self {
        Self { transition, tracks }
    }

    pub fn exiting(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.tracks.iter().filter(|t| t.exiting).map(|t| t.node)
    }

    /// Advance and write interpolated positions into `tree`.
    pub fn tick(&mut self, now: Duration, tree: &mut TreeStore) -> TickOutcome {
        let tracks = &self.tracks;
        self.transition.tick(now, |eased| {
            for track in tracks {
                tree.node_mut(track.node).pos = track.at(eased);
            }
        })
    }
}
