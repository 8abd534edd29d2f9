//! Pausable countdown for a timed attempt.
//!
//! The countdown is tick-driven: something outside feeds it one tick per
//! second, and the session controller forwards ticks only while the session
//! is in progress. Pausing is therefore a pure wall-clock freeze; nothing is
//! restored or penalized on resume.

/// Outcome of advancing the countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down; carries the remaining seconds.
    Running(u32),
    /// The countdown just reached zero. Emitted exactly once.
    Expired,
    /// The countdown already expired earlier; the tick was dropped.
    Idle,
}

/// One-shot countdown in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    expired: bool,
}

impl Countdown {
    /// Arms the countdown with the full test duration.
    #[must_use]
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            remaining: duration_seconds,
            expired: duration_seconds == 0,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advances the countdown by exactly one second.
    ///
    /// Returns `Expired` on the tick that reaches zero and `Idle` for every
    /// tick after that, so expiry can trigger exactly one submission.
    pub fn tick(&mut self) -> TickOutcome {
        if self.expired {
            return TickOutcome::Idle;
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.expired = true;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }
}
