//! Refresh scheduling state machine.
//!
//! Decides when the next scrape may start. It holds no timer itself; the
//! monitor owns exactly one timer and re-arms it whenever
//! [`RefreshScheduler::next_interval`] differs from the armed period.
//!
//! ```text
//!            arm()                begin_tick()
//!   Idle ───────────▶ Armed(d) ────────────────▶ Ticking
//!                        ▲                          │
//!                        └──────── finish_tick() ───┘
//! ```
//!
//! A reset forces one fast (1 s) tick so a reconfiguration shows up
//! immediately, then the configured interval resumes.

use std::time::Duration;

use tracing::debug;

/// Interval used for the single tick that follows a reset.
pub const FAST_INTERVAL: Duration = Duration::from_secs(1);

/// Fallback when a zero interval slips through.
pub const FALLBACK_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not running yet.
    Idle,
    /// Waiting for the timer; holds the armed period.
    Armed(Duration),
    /// A scrape is in flight.
    Ticking,
}

/// Identifies the reset epoch a tick was started in.
///
/// Results from a tick started before the latest reset are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    pub generation: u64,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    state: SchedulerState,
    configured: Duration,
    /// Next tick uses [`FAST_INTERVAL`].
    fast_pending: bool,
    generation: u64,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            configured: sanitize(interval),
            fast_pending: false,
            generation: 0,
        }
    }

    /// Leave `Idle` and return the period to arm the timer with.
    pub fn arm(&mut self) -> Duration {
        let interval = self.next_interval();
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Armed(interval);
        }
        interval
    }

    /// Use `interval` from the next re-arm on. An in-flight tick is not
    /// affected.
    pub fn configure(&mut self, interval: Duration) {
        let interval = sanitize(interval);
        if interval != self.configured {
            debug!(from = ?self.configured, to = ?interval, "scrape interval changed");
        }
        self.configured = interval;
        if let SchedulerState::Armed(_) = self.state {
            self.state = SchedulerState::Armed(self.next_interval());
        }
    }

    /// Timer fired. Returns a ticket if a scrape should start now, or
    /// `None` when one is still in flight (or the scheduler is idle).
    pub fn begin_tick(&mut self) -> Option<TickTicket> {
        match self.state {
            SchedulerState::Armed(_) => {
                self.state = SchedulerState::Ticking;
                self.fast_pending = false;
                Some(TickTicket {
                    generation: self.generation,
                })
            }
            SchedulerState::Ticking => {
                debug!("previous scrape still in flight, skipping tick");
                None
            }
            SchedulerState::Idle => None,
        }
    }

    /// The in-flight scrape finished; go back to `Armed`.
    pub fn finish_tick(&mut self) -> Duration {
        let interval = self.next_interval();
        if self.state == SchedulerState::Ticking {
            self.state = SchedulerState::Armed(interval);
        }
        interval
    }

    /// Force the next tick to run after [`FAST_INTERVAL`] and invalidate
    /// scrapes started before now.
    pub fn reset(&mut self) {
        self.fast_pending = true;
        self.generation += 1;
        if let SchedulerState::Armed(_) = self.state {
            self.state = SchedulerState::Armed(FAST_INTERVAL);
        }
    }

    /// Period the timer should currently be armed with.
    pub fn next_interval(&self) -> Duration {
        if self.fast_pending {
            FAST_INTERVAL
        } else {
            self.configured
        }
    }

    /// Whether a ticket still belongs to the current reset epoch.
    pub fn is_current(&self, ticket: TickTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn configured_interval(&self) -> Duration {
        self.configured
    }
}

fn sanitize(interval: Duration) -> Duration {
    if interval.is_zero() {
        FALLBACK_INTERVAL
    } else {
        interval
    }
}
