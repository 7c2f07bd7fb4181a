//! Session liveness monitor: inactivity timeout with a forced-logout warning.
//!
//! DESIGN
//! ======
//! Split in two layers. [`LivenessMonitor`] is a plain state machine that
//! takes explicit `Instant`s, so every transition is testable without timers.
//! [`spawn_monitor`] wraps it in a tokio task that owns the only timers: a
//! periodic idle check (armed only while `Active`) and the warning countdown.
//!
//! Phases:
//! - `Idle`: not authenticated, nothing is checked.
//! - `Active`: authenticated; activity resets the idle clock.
//! - `Warning`: idle time exceeded the threshold; logout follows after the
//!   warning period. Activity during the countdown does not cancel it.
//! - `Expired`: logout has fired; stays here until the next login.
//!
//! Dropping the [`MonitorHandle`] aborts the task, which releases its timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Warning,
    Expired,
}

/// User interactions that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Pointer,
    Key,
    Scroll,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WarningShown,
    Expired,
}

/// Side effect run when the warning countdown ends.
#[async_trait::async_trait]
pub trait LogoutHook: Send + Sync {
    async fn logout(&self);
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    config: MonitorConfig,
    phase: Phase,
    last_activity: Instant,
    warning_started: Option<Instant>,
}

impl LivenessMonitor {
    /// Timings are clamped with [`MonitorConfig::bounded`].
    #[must_use]
    pub fn new(config: MonitorConfig, authenticated: bool, now: Instant) -> Self {
        Self {
            config: config.bounded(),
            phase: if authenticated { Phase::Active } else { Phase::Idle },
            last_activity: now,
            warning_started: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    /// Time since the last recorded activity.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// When the current warning countdown ends, if one is running. A deadline
    /// past the clock's range collapses to the warning start.
    #[must_use]
    pub fn warning_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Warning => self
                .warning_started
                .map(|start| start.checked_add(self.config.warning_period).unwrap_or(start)),
            _ => None,
        }
    }

    pub fn set_authenticated(&mut self, authenticated: bool, now: Instant) {
        match (authenticated, self.phase) {
            (true, Phase::Idle | Phase::Expired) => {
                self.phase = Phase::Active;
                self.last_activity = now;
                self.warning_started = None;
            }
            (false, Phase::Active | Phase::Warning) => {
                self.phase = Phase::Idle;
                self.warning_started = None;
            }
            _ => {}
        }
    }

    /// Record a user interaction. Only resets the idle clock while `Active`.
    pub fn record_activity(&mut self, now: Instant) {
        if self.phase == Phase::Active {
            self.last_activity = now;
        }
    }

    /// Advance the machine to `now`, returning the transition taken, if any.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        match self.phase {
            Phase::Active if self.idle_for(now) > self.config.inactivity_timeout => {
                self.phase = Phase::Warning;
                self.warning_started = Some(now);
                Some(Transition::WarningShown)
            }
            Phase::Warning if self.warning_deadline().is_some_and(|deadline| now >= deadline) => {
                self.phase = Phase::Expired;
                self.warning_started = None;
                Some(Transition::Expired)
            }
            _ => None,
        }
    }
}

// =============================================================================
// DRIVER
// =============================================================================

#[derive(Debug)]
enum Command {
    Touch(ActivityKind),
    Authenticated(bool),
}

/// Owner handle for a running monitor task.
pub struct MonitorHandle {
    commands: mpsc::UnboundedSender<Command>,
    phase: watch::Receiver<Phase>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Report a user interaction.
    pub fn touch(&self, kind: ActivityKind) {
        let _ = self.commands.send(Command::Touch(kind));
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        let _ = self.commands.send(Command::Authenticated(authenticated));
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Watch phase changes (e.g. to show or hide the warning overlay).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.clone()
    }

    /// Stop the monitor and release its timers.
    pub fn shutdown(self) {}
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the monitor task. Must be called inside a tokio runtime.
#[must_use]
pub fn spawn_monitor(config: MonitorConfig, authenticated: bool, hook: Arc<dyn LogoutHook>) -> MonitorHandle {
    let monitor = LivenessMonitor::new(config, authenticated, Instant::now());
    let config = monitor.config();
    let (commands, rx) = mpsc::unbounded_channel();
    let (phase_tx, phase) = watch::channel(monitor.phase());

    info!(
        inactivity_timeout_secs = config.inactivity_timeout.as_secs(),
        check_interval_ms = u64::try_from(config.check_interval.as_millis()).unwrap_or(u64::MAX),
        warning_secs = config.warning_period.as_secs(),
        "liveness monitor started"
    );

    let task = tokio::spawn(run_monitor(monitor, rx, phase_tx, hook));
    MonitorHandle { commands, phase, task }
}

async fn run_monitor(
    mut monitor: LivenessMonitor,
    mut rx: mpsc::UnboundedReceiver<Command>,
    phase_tx: watch::Sender<Phase>,
    hook: Arc<dyn LogoutHook>,
) {
    let mut ticker = idle_ticker(&monitor);

    loop {
        let deadline = monitor.warning_deadline();

        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                let now = Instant::now();
                match cmd {
                    Command::Touch(kind) => {
                        debug!(?kind, "activity");
                        monitor.record_activity(now);
                    }
                    Command::Authenticated(authenticated) => monitor.set_authenticated(authenticated, now),
                }
            }
            () = next_tick(ticker.as_mut()) => {
                if monitor.tick(Instant::now()) == Some(Transition::WarningShown) {
                    warn!(
                        warning_secs = monitor.config().warning_period.as_secs(),
                        "session inactive; logging out after warning"
                    );
                }
            }
            () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if monitor.tick(Instant::now()) == Some(Transition::Expired) {
                    hook.logout().await;
                    info!("session expired by inactivity");
                }
            }
        }

        match (monitor.phase(), ticker.is_some()) {
            (Phase::Active, false) => ticker = idle_ticker(&monitor),
            (Phase::Idle | Phase::Warning | Phase::Expired, true) => ticker = None,
            _ => {}
        }
        phase_tx.send_if_modified(|current| {
            let changed = *current != monitor.phase();
            *current = monitor.phase();
            changed
        });
    }
}

fn idle_ticker(monitor: &LivenessMonitor) -> Option<Interval> {
    if monitor.phase() != Phase::Active {
        return None;
    }
    let period = monitor.config().check_interval;
    let now = Instant::now();
    let mut ticker = tokio::time::interval_at(now.checked_add(period).unwrap_or(now), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(ticker)
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;
