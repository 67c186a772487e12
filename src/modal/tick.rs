use std::time::{Duration, Instant};

use super::session::SessionId;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// A timer event addressed to one modal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub session: SessionId,
    pub due: Instant,
}

impl Tick {
    pub fn after(session: SessionId, interval: Duration) -> Self {
        Self {
            session,
            due: Instant::now() + interval,
        }
    }

    /// A tick that is due immediately.
    pub fn now(session: SessionId) -> Self {
        Self {
            session,
            due: Instant::now(),
        }
    }
}

/// Pending ticks, drained by the UI loop between input polls.
#[derive(Debug, Default)]
pub struct TickScheduler {
    pending: Vec<Tick>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tick: Tick) {
        self.pending.push(tick);
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|tick| tick.due).min()
    }

    /// How long the input poll may block before the next tick is due.
    pub fn poll_timeout(&self, now: Instant, cap: Duration) -> Duration {
        match self.next_due() {
            Some(due) => due.saturating_duration_since(now).min(cap),
            None => cap,
        }
    }

    /// Remove and return every tick due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Tick> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|tick| tick.due <= now);
        self.pending = pending;
        due.sort_by_key(|tick| tick.due);
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
