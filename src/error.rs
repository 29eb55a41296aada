use std::io;
use thiserror::Error;

/// Conditions that stop a machine from starting at all.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is {size} bytes but only {available} bytes are free from {base:#05x}")]
    ProgramTooLarge {
        size: usize,
        base: u16,
        available: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Non-fatal conditions raised while dispatching a single instruction. The
/// faulting instruction has no effect on memory or registers; execution
/// carries on at the next instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("unknown opcode {opcode:#06x} at {addr:#05x}")]
    UnknownOpcode { addr: u16, opcode: u16 },

    #[error("call stack overflow at {addr:#05x}")]
    StackOverflow { addr: u16 },

    #[error("call stack underflow at {addr:#05x}")]
    StackUnderflow { addr: u16 },

    #[error("memory access {start:#05x}+{len} out of bounds at {addr:#05x}")]
    MemoryOutOfBounds { addr: u16, start: usize, len: usize },

    #[error("key {key:#04x} out of range at {addr:#05x}")]
    KeyOutOfRange { addr: u16, key: u8 },
}
