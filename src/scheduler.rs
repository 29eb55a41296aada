//! # scheduler
//!
//! Three rates, kept apart:
//!  - instructions: a fixed number per batch, however often the host runs one
//!  - timers: one tick per 1/timer_hz of elapsed time, carried across batches
//!  - frames: at most one "frame ready" per batch, once 1/refresh_hz has passed
use crate::config::Chip8Config;
use crate::error::Chip8Error;
use crate::interpreter::{Chip8Interpreter, StepOutcome};
use std::time::Duration;
use tracing::debug;

/// what one batch did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// instructions that ran to completion
    pub dispatched: u32,
    /// steps spent waiting on FX0A or parked in a self-jump
    pub stalled: u32,
    pub faults: u32,
    pub timer_ticks: u32,
    pub frame_ready: bool,
    pub sound_active: bool,
}

pub struct Scheduler {
    cycles_per_batch: u32,
    timer_interval: Duration,
    frame_interval: Duration,
    timer_debt: Duration,
    frame_debt: Duration,
}

fn interval(hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / hz as u64)
}

impl Scheduler {
    pub fn new(config: &Chip8Config) -> Result<Self, Chip8Error> {
        config.validate()?;
        Ok(Scheduler {
            cycles_per_batch: config.cycles_per_batch,
            timer_interval: interval(config.timer_hz),
            frame_interval: interval(config.refresh_hz),
            timer_debt: Duration::ZERO,
            frame_debt: Duration::ZERO,
        })
    }

    pub fn timer_interval(&self) -> Duration {
        self.timer_interval
    }

    /// run one batch of instructions, then account for `elapsed` wall-clock
    /// time since the previous batch
    pub fn run_batch(&mut self, machine: &mut Chip8Interpreter, elapsed: Duration) -> BatchReport {
        let mut report = BatchReport::default();
        for _ in 0..self.cycles_per_batch {
            match machine.step() {
                StepOutcome::Executed => report.dispatched += 1,
                StepOutcome::WaitingForKey | StepOutcome::Idle => report.stalled += 1,
                StepOutcome::Faulted(_) => report.faults += 1,
            }
        }

        self.timer_debt += elapsed;
        while self.timer_debt >= self.timer_interval {
            self.timer_debt -= self.timer_interval;
            machine.timers_mut().tick();
            report.timer_ticks += 1;
        }
        if report.timer_ticks > 1 {
            debug!(ticks = report.timer_ticks, "timers catching up");
        }

        self.frame_debt += elapsed;
        if self.frame_debt >= self.frame_interval {
            // frames that were missed are dropped, not queued
            let frame_ns = self.frame_interval.as_nanos();
            let rem = self.frame_debt.as_nanos() % frame_ns;
            self.frame_debt = Duration::from_nanos(rem as u64);
            report.frame_ready = true;
        }

        report.sound_active = machine.timers().is_sound_active();
        report
    }
}
