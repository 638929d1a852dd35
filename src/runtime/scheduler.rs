//! One-second scheduler.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, instrument, warn};

use crate::game::Message;
use crate::runtime::bus::BusSender;
use crate::runtime::shutdown::ShutdownListener;

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Receives the wall-clock time on every tick.
///
/// Refreshing the clock is a render concern and never goes through the
/// update engine.
pub trait ClockFace: Send + 'static {
    /// Shows `now`.
    fn refresh(&self, now: DateTime<Local>);
}

/// Publishes the current time to a watch channel read by the view.
#[derive(Debug)]
pub struct WallClock {
    tx: watch::Sender<DateTime<Local>>,
}

impl WallClock {
    /// Creates a clock and the receiver the view reads from.
    pub fn channel() -> (Self, watch::Receiver<DateTime<Local>>) {
        let (tx, rx) = watch::channel(Local::now());
        (Self { tx }, rx)
    }
}

impl ClockFace for WallClock {
    fn refresh(&self, now: DateTime<Local>) {
        self.tx.send_replace(now);
    }
}

/// Posts [`Message::Tick`] once per period until shutdown.
#[derive(Debug)]
pub struct Scheduler<C> {
    bus: BusSender,
    clock: C,
    period: Duration,
}

impl<C: ClockFace> Scheduler<C> {
    /// Creates a scheduler ticking every [`TICK_PERIOD`].
    pub fn new(bus: BusSender, clock: C) -> Self {
        Self {
            bus,
            clock,
            period: TICK_PERIOD,
        }
    }

    /// Overrides the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Runs the scheduler on a tokio task.
    pub fn spawn(self, shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    #[instrument(skip_all, fields(period_ms = self.period.as_millis() as u64))]
    async fn run(self, mut shutdown: ShutdownListener) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.clock.refresh(Local::now());
                    if self.bus.post(Message::Tick).is_err() {
                        warn!("Bus closed, scheduler stopping");
                        return;
                    }
                }
            }
        }
    }
}
