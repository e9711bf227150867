//! Background scrape loop.
//!
//! One task owns the timer, the [`RefreshScheduler`], the [`Session`] and
//! at most one in-flight scrape. Everything else talks to it through a
//! [`MonitorHandle`]: commands go in over a channel and the latest
//! [`MonitorStatus`] comes out over a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use promlive_core::{
    MetricsSnapshot, Projection, ScanConfig, ScanConfigPatch, Session, scrape_snapshot,
};

use crate::error::{FetchResult, MonitorError, MonitorResult};
use crate::fetch::Fetcher;
use crate::scheduler::{RefreshScheduler, TickTicket};

const COMMAND_BUFFER: usize = 16;

/// Published after every tick and every applied command.
#[derive(Debug, Clone, Default)]
pub struct MonitorStatus {
    pub config: ScanConfig,
    /// Names from the latest non-empty scrape, in first-seen order.
    pub metrics: Vec<String>,
    pub selected: Option<String>,
    pub projection: Projection,
    /// Scrapes applied so far.
    pub ticks: u64,
}

enum Command {
    Configure {
        config: ScanConfig,
        reply: oneshot::Sender<MonitorResult<()>>,
    },
    Update {
        patch: ScanConfigPatch,
        reply: oneshot::Sender<MonitorResult<ScanConfig>>,
    },
    Select {
        metric: String,
        reply: oneshot::Sender<MonitorResult<()>>,
    },
    Clear {
        reply: oneshot::Sender<MonitorResult<()>>,
    },
}

/// Cloneable control surface for a running [`Monitor`].
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<MonitorStatus>,
}

impl MonitorHandle {
    /// Replace the scan config. A new URL clears the selection and resets
    /// the chart; a new interval applies from the next re-arm.
    pub async fn configure(&self, config: ScanConfig) -> MonitorResult<()> {
        self.request(|reply| Command::Configure { config, reply })
            .await
    }

    /// Merge `patch` into the monitor's current config and apply it.
    ///
    /// The merge happens inside the monitor task, so concurrent patches
    /// touching different fields don't overwrite each other. Returns the
    /// resulting config.
    pub async fn update(&self, patch: ScanConfigPatch) -> MonitorResult<ScanConfig> {
        self.request(|reply| Command::Update { patch, reply }).await
    }

    /// Follow `metric`, which must be in the latest scrape.
    pub async fn select(&self, metric: &str) -> MonitorResult<()> {
        let metric = metric.to_string();
        self.request(|reply| Command::Select { metric, reply }).await
    }

    /// Zero-fill the chart and clear min/max, keeping the selection.
    pub async fn clear(&self) -> MonitorResult<()> {
        self.request(|reply| Command::Clear { reply }).await
    }

    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.clone()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<MonitorResult<T>>) -> Command,
    ) -> MonitorResult<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| MonitorError::Stopped)?;
        rx.await.map_err(|_| MonitorError::Stopped)?
    }
}

/// Wall-clock milliseconds that advance with the tokio clock.
///
/// Point timestamps come from here so they never go backwards when the
/// system clock is adjusted.
#[derive(Debug, Clone, Copy)]
struct Clock {
    wall_at_start: u64,
    started: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            wall_at_start: promlive_core::now_millis(),
            started: Instant::now(),
        }
    }

    fn now_millis(&self) -> u64 {
        self.wall_at_start + self.started.elapsed().as_millis() as u64
    }
}

struct FetchOutcome {
    ticket: TickTicket,
    captured_at: u64,
    body: FetchResult<String>,
}

pub struct Monitor {
    config: ScanConfig,
    scheduler: RefreshScheduler,
    session: Session,
    fetch: Fetcher,
    clock: Clock,
    commands: mpsc::Receiver<Command>,
    status: watch::Sender<MonitorStatus>,
    ticks: u64,
}

impl Monitor {
    /// Create a monitor and its handle. Nothing runs until [`Monitor::run`].
    pub fn new(config: ScanConfig, fetch: Fetcher) -> MonitorResult<(Self, MonitorHandle)> {
        config.validate()?;

        let clock = Clock::new();
        let session = Session::new(clock.now_millis()).with_preferred(config.metric.clone());
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (status_tx, status_rx) = watch::channel(MonitorStatus {
            config: config.clone(),
            projection: session.projection(),
            ..MonitorStatus::default()
        });

        let monitor = Self {
            scheduler: RefreshScheduler::new(config.interval()),
            config,
            session,
            fetch,
            clock,
            commands: commands_rx,
            status: status_tx,
            ticks: 0,
        };
        let handle = MonitorHandle {
            commands: commands_tx,
            status: status_rx,
        };
        Ok((monitor, handle))
    }

    /// Run the refresh loop until shutdown signal.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            url = %self.config.url,
            interval_secs = self.config.interval_secs,
            "metrics monitor started"
        );

        // First scrape comes fast, then the configured cadence.
        self.scheduler.reset();
        let mut armed = self.scheduler.arm();
        let mut timer = new_timer(armed);
        let mut in_flight: Option<JoinHandle<FetchOutcome>> = None;
        self.publish();

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    if let Some(ticket) = self.scheduler.begin_tick() {
                        in_flight = Some(self.spawn_fetch(ticket));
                    }
                }
                joined = join_in_flight(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.complete(joined);
                }
                Some(command) = self.commands.recv() => {
                    self.handle(command);
                }
                _ = shutdown.changed() => {
                    info!("metrics monitor shutting down");
                    break;
                }
            }

            let wanted = self.scheduler.next_interval();
            if wanted != armed {
                debug!(from = ?armed, to = ?wanted, "re-arming refresh timer");
                timer = new_timer(wanted);
                armed = wanted;
            }
        }

        if let Some(handle) = in_flight {
            handle.abort();
        }
    }

    fn spawn_fetch(&self, ticket: TickTicket) -> JoinHandle<FetchOutcome> {
        let fetch = Arc::clone(&self.fetch);
        let url = self.config.url.clone();
        let timeout = self.config.timeout();
        let clock = self.clock;

        tokio::spawn(async move {
            let captured_at = clock.now_millis();
            let body = fetch(url, timeout).await;
            FetchOutcome {
                ticket,
                captured_at,
                body,
            }
        })
    }

    fn complete(&mut self, joined: Result<FetchOutcome, JoinError>) {
        self.scheduler.finish_tick();

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "scrape task failed");
                return;
            }
        };

        if !self.scheduler.is_current(outcome.ticket) {
            debug!(captured_at = outcome.captured_at, "discarding scrape started before reset");
            return;
        }

        let snapshot = match outcome.body {
            Ok(body) => scrape_snapshot(&body, outcome.captured_at),
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "scrape failed, no metrics this tick");
                MetricsSnapshot::empty(outcome.captured_at)
            }
        };

        let projection = self.session.apply(&snapshot);
        self.ticks += 1;
        debug!(
            records = snapshot.len(),
            metric = ?projection.metric,
            value = ?projection.current_value,
            points = projection.points.len(),
            "tick applied"
        );
        self.publish();
    }

    // Each arm publishes before replying so an acknowledged command is
    // already visible in the status.
    fn handle(&mut self, command: Command) {
        match command {
            Command::Configure { config, reply } => {
                let result = self.configure(config);
                self.publish();
                let _ = reply.send(result);
            }
            Command::Update { patch, reply } => {
                let config = patch.apply_to(&self.config);
                let result = self.configure(config).map(|()| self.config.clone());
                self.publish();
                let _ = reply.send(result);
            }
            Command::Select { metric, reply } => {
                let result = self
                    .session
                    .select(&metric, self.clock.now_millis())
                    .map_err(MonitorError::from);
                if result.is_ok() {
                    self.scheduler.reset();
                    info!(%metric, "metric selected");
                }
                self.publish();
                let _ = reply.send(result);
            }
            Command::Clear { reply } => {
                self.session.reset(self.clock.now_millis());
                self.scheduler.reset();
                info!("chart cleared");
                self.publish();
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn configure(&mut self, config: ScanConfig) -> MonitorResult<()> {
        config.validate()?;

        self.scheduler.configure(config.interval());
        if config.url != self.config.url {
            info!(from = %self.config.url, to = %config.url, "scrape source changed");
            self.session.clear_selection(self.clock.now_millis());
            self.scheduler.reset();
        }
        self.config = config;
        Ok(())
    }

    fn publish(&self) {
        self.status.send_replace(MonitorStatus {
            config: self.config.clone(),
            metrics: self.session.metric_names().to_vec(),
            selected: self.session.selected().map(str::to_string),
            projection: self.session.projection(),
            ticks: self.ticks,
        });
    }
}

fn new_timer(period: Duration) -> Interval {
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn join_in_flight(
    slot: &mut Option<JoinHandle<FetchOutcome>>,
) -> Result<FetchOutcome, JoinError> {
    match slot {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
