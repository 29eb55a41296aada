//! # environment
//!
//! Sets everything up and runs the main loop:
//!
//! ```text
//! loop {
//!     input.update(keypad)          // once per batch
//!     scheduler.run_batch(elapsed)  // N instructions, timers by wall clock
//!     display.draw() if frame ready
//!     sound.beep()/stop() on edges
//!     sleep until the next batch is due
//! }
//! ```
use crate::config::Chip8Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{HostControl, Input};
use crate::interpreter::Chip8Interpreter;
use crate::scheduler::{BatchReport, Scheduler};
use crate::sound::Sound;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// totals for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: u64,
    pub dispatched: u64,
    pub faults: u64,
    pub frames: u64,
}

pub struct Environment<'a> {
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    interpreter: Chip8Interpreter,
    scheduler: Scheduler,
    batch_interval: Duration,
    sounding: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: &Chip8Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Result<Environment<'a>, Chip8Error> {
        let interpreter = Chip8Interpreter::new(config)?;
        Environment::with_interpreter(config, interpreter, display, input, sound)
    }

    /// wrap a machine that already has its program loaded
    pub fn with_interpreter(
        config: &Chip8Config,
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Result<Environment<'a>, Chip8Error> {
        let scheduler = Scheduler::new(config)?;
        Ok(Environment {
            display,
            input,
            sound,
            interpreter,
            scheduler,
            batch_interval: Duration::from_nanos(1_000_000_000 / config.batch_hz as u64),
            sounding: false,
        })
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Chip8Interpreter {
        &mut self.interpreter
    }

    /// poll input, run one batch as if `elapsed` had passed, then present
    /// and beep as the batch asks
    pub fn cycle(&mut self, elapsed: Duration) -> Result<Option<BatchReport>, Chip8Error> {
        if self.input.update(self.interpreter.keypad_mut())? == HostControl::Quit {
            return Ok(None);
        }
        let report = self.scheduler.run_batch(&mut self.interpreter, elapsed);
        if report.frame_ready {
            self.display.draw(self.interpreter.frame())?;
        }
        if report.sound_active != self.sounding {
            if report.sound_active {
                self.sound.beep()?;
            } else {
                self.sound.stop()?;
            }
            self.sounding = report.sound_active;
        }
        Ok(Some(report))
    }

    /// run until input asks to quit or `max_batches` have run, paced against
    /// the wall clock
    pub fn main_loop(&mut self, max_batches: Option<u64>) -> Result<RunSummary, Chip8Error> {
        let mut summary = RunSummary::default();
        let mut last = Instant::now();
        info!("starting at {:#05x}", self.interpreter.registers().pc);
        while max_batches.map_or(true, |max| summary.batches < max) {
            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            let report = match self.cycle(elapsed)? {
                Some(report) => report,
                None => {
                    debug!("quit requested");
                    break;
                }
            };
            summary.batches += 1;
            summary.dispatched += report.dispatched as u64;
            summary.faults += report.faults as u64;
            summary.frames += report.frame_ready as u64;

            let busy = now.elapsed();
            if busy < self.batch_interval {
                spin_sleep::sleep(self.batch_interval - busy);
            }
        }
        if self.sounding {
            self.sound.stop()?;
            self.sounding = false;
        }
        info!(
            batches = summary.batches,
            dispatched = summary.dispatched,
            faults = summary.faults,
            "stopped"
        );
        Ok(summary)
    }
}
