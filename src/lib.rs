//! A CHIP-8 interpreter.
//!
//! ## Design
//!
//! * one `Chip8Interpreter` owns all machine state: RAM, V0-VF, I, PC, the
//!   call stack, the frame buffer, timers and keypad
//! * `step()` executes exactly one instruction and never blocks; FX0A waits
//!   by not advancing PC
//! * quirks where historical interpreters disagree are configuration, not
//!   hard-wired
//! * nothing a program does can stop the machine; bad opcodes, stack misuse
//!   and out-of-range accesses are reported as faults and skipped
//! * display, input and audio are traits so the interpreter doesn't need to
//!   know how any of them work
//!
//! Model
//!
//! ```text
//! Environment
//!  |-- display, input, sound
//!  |-- interpreter(config)
//!  |    |-- memory, registers, stack, frame buffer, timers, keypad
//!  |    `-- instruction decoder
//!  |-- scheduler(config)
//!  `-- main loop
//!       |-- input.update(keypad)
//!       |-- scheduler.run_batch(interpreter, elapsed)
//!       |     |-- N x interpreter.step()
//!       |     |-- timers.tick() per 1/60s elapsed
//!       |     `-- frame ready per 1/refresh_hz elapsed
//!       |-- display.draw(frame) / sound.beep() / sound.stop()
//!       `-- sleep until the next batch
//! ```
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod scheduler;
pub mod sound;
pub mod timers;

pub use config::{Chip8Config, Quirks};
pub use error::{Chip8Error, Fault};
pub use interpreter::{Chip8Interpreter, StepOutcome};
