//! # config
//!
//! CHIP-8 interpreters from the COSMAC VIP onwards disagree on a handful of
//! opcodes, and ROMs are written against one behaviour or the other. Each
//! disagreement is a named switch with the legacy behaviour as the default.
use clap::ValueEnum;

use crate::error::Chip8Error;
use crate::memory::{CHIP8_FONT_LEN, CHIP8_RAM_SIZE_BYTES};

/// where 8XY6/8XYE take the value to shift from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShiftSource {
    /// VX := VY shifted (COSMAC VIP)
    Vy,
    /// VX := VX shifted (CHIP-48 and later)
    Vx,
}

/// which register BNNN adds to NNN
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JumpOffset {
    V0,
    /// BXNN jumps to XNN + VX
    Vx,
}

/// what happens to sprite bits falling off the edge of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpriteEdges {
    Wrap,
    Clip,
}

/// what happens to I when FX1E or FX55/FX65 push it past 0xFFF
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexOverflow {
    /// I keeps the out-of-range value; later accesses through it fault
    Unbounded,
    /// I is masked to 12 bits
    Wrap,
    /// I sticks at 0xFFF
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY1/8XY2/8XY3 zero VF afterwards
    pub bitwise_resets_vf: bool,
    pub shift_source: ShiftSource,
    pub jump_offset: JumpOffset,
    pub sprite_edges: SpriteEdges,
    /// FX55/FX65 leave I pointing after the last byte transferred
    pub load_store_advances_i: bool,
    pub index_overflow: IndexOverflow,
}

impl Quirks {
    /// behaviour of the original interpreter as most early ROMs expect it
    pub fn legacy() -> Self {
        Quirks {
            bitwise_resets_vf: false,
            shift_source: ShiftSource::Vy,
            jump_offset: JumpOffset::V0,
            sprite_edges: SpriteEdges::Wrap,
            load_store_advances_i: true,
            index_overflow: IndexOverflow::Unbounded,
        }
    }

    /// behaviour most post-CHIP-48 ROMs expect
    pub fn modern() -> Self {
        Quirks {
            bitwise_resets_vf: false,
            shift_source: ShiftSource::Vx,
            jump_offset: JumpOffset::V0,
            sprite_edges: SpriteEdges::Clip,
            load_store_advances_i: false,
            index_overflow: IndexOverflow::Wrap,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::legacy()
    }
}

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;
/// where the hex glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x0050;

/// Everything fixed at machine construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8Config {
    pub quirks: Quirks,
    pub program_addr: u16,
    pub font_addr: u16,
    pub width: usize,
    pub height: usize,
    /// instructions dispatched per scheduler batch
    pub cycles_per_batch: u32,
    pub timer_hz: u32,
    /// how often the host is asked to present a frame
    pub refresh_hz: u32,
    /// how often the host runs a batch; only used for pacing the host loop
    pub batch_hz: u32,
    /// fixed seed for CXNN, for reproducible runs
    pub rng_seed: Option<u64>,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Chip8Config {
            quirks: Quirks::default(),
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
            width: 64,
            height: 32,
            cycles_per_batch: 10,
            timer_hz: 60,
            refresh_hz: 60,
            batch_hz: 60,
            rng_seed: None,
        }
    }
}

impl Chip8Config {
    pub fn validate(&self) -> Result<(), Chip8Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Chip8Error::InvalidConfig("display must be at least 1x1"));
        }
        if self.cycles_per_batch == 0 {
            return Err(Chip8Error::InvalidConfig("cycles per batch must be non-zero"));
        }
        if self.timer_hz == 0 || self.refresh_hz == 0 || self.batch_hz == 0 {
            return Err(Chip8Error::InvalidConfig("rates must be non-zero"));
        }
        if self.program_addr as usize >= CHIP8_RAM_SIZE_BYTES {
            return Err(Chip8Error::InvalidConfig("program address outside memory"));
        }
        let font_end = self.font_addr as usize + CHIP8_FONT_LEN;
        if font_end > CHIP8_RAM_SIZE_BYTES {
            return Err(Chip8Error::InvalidConfig("glyph table does not fit in memory"));
        }
        if font_end > self.program_addr as usize {
            return Err(Chip8Error::InvalidConfig("glyph table must sit below the program"));
        }
        Ok(())
    }
}
