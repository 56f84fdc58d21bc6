// Single-slot refresh scheduler
//
// At most one load is in flight. A tick that arrives while a load is still
// running is dropped, not queued.
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    StartLoad,
    Skip,
}

#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
    state: SchedulerState,
    loads_started: u64,
    ticks_skipped: u64,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: SchedulerState::Idle,
            loads_started: 0,
            ticks_skipped: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// IDLE -> FETCHING, or a skip when a load is already running.
    pub fn on_tick(&mut self) -> TickDecision {
        match self.state {
            SchedulerState::Idle => {
                self.state = SchedulerState::Fetching;
                self.loads_started += 1;
                TickDecision::StartLoad
            }
            SchedulerState::Fetching => {
                self.ticks_skipped += 1;
                tracing::debug!(skipped = self.ticks_skipped, "load still in flight, skipping tick");
                TickDecision::Skip
            }
        }
    }

    /// FETCHING -> IDLE, whatever the load's outcome.
    pub fn on_load_complete(&mut self) {
        if self.state == SchedulerState::Idle {
            tracing::warn!("load completion reported while idle");
        }
        self.state = SchedulerState::Idle;
    }

    pub fn loads_started(&self) -> u64 {
        self.loads_started
    }

    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped
    }
}
