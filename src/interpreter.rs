//! # interpreter
//!
//! (from: https://laurencescotford.com/chip-8-on-the-cosmac-vip-initialisation/)
//! The COSMAC VIP interpreter kept its CHIP-8 state in RCA1802 registers and
//! the top pages of RAM:
//!  - chip-8 program counter                   -- 0x200
//!  - stack pointer                            -- penultimate page of RAM
//!  - VX/VY pointers, I pointer
//!  - tone and general timers
//!  - display page pointer                     -- last page of RAM
//!
//! Here everything is owned by one `Chip8Interpreter`. A `step()` fetches,
//! decodes and executes exactly one instruction and never blocks: FX0A with no
//! key down simply leaves PC where it is, so the next step retries it.
use crate::config::{Chip8Config, IndexOverflow, JumpOffset, Quirks, ShiftSource};
use crate::display::FrameBuffer;
use crate::error::{Chip8Error, Fault};
use crate::input::Keypad;
use crate::instruction::{Instruction, Reg};
use crate::memory::{Chip8MemoryMap, MemoryMap, OutOfBounds};
use crate::registers::{CallStack, RegisterFile, VF};
use crate::timers::Timers;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use tracing::{debug, info, trace, warn};

/// highest valid address
const CHIP8_ADDR_MAX: u32 = 0x0fff;

/// what a single step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Executed,
    /// FX0A with no key down; PC unchanged
    WaitingForKey,
    /// 1NNN jumping to itself; PC unchanged
    Idle,
    /// reported and skipped; PC moved on to the next instruction, except for
    /// a stack underflow which leaves PC on the 00EE
    Faulted(Fault),
}

/// where PC goes after an instruction
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Wait,
    Idle,
}

fn skip_if(cond: bool) -> Flow {
    if cond {
        Flow::Skip
    } else {
        Flow::Next
    }
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: RegisterFile,
    stack: CallStack,
    frame: FrameBuffer,
    timers: Timers,
    keypad: Keypad,
    quirks: Quirks,
    rng: StdRng,
    idle_at: Option<u16>,
    faults: u64,
}

impl Chip8Interpreter {
    pub fn new(config: &Chip8Config) -> Result<Chip8Interpreter, Chip8Error> {
        config.validate()?;
        let memory = Chip8MemoryMap::new(config.program_addr, config.font_addr)?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Chip8Interpreter {
            memory,
            registers: RegisterFile::new(config.program_addr),
            stack: CallStack::new(),
            frame: FrameBuffer::new(config.width, config.height),
            timers: Timers::new(),
            keypad: Keypad::new(),
            quirks: config.quirks,
            rng,
            idle_at: None,
            faults: 0,
        })
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.memory.load_program(reader)
    }

    pub fn load_program_bytes(&mut self, program: &[u8]) -> Result<usize, Chip8Error> {
        let mut reader = program;
        self.load_program(&mut reader)
    }

    /// back to power-on state, keeping the loaded program
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers = RegisterFile::new(self.memory.program_addr);
        self.stack.clear();
        self.frame.clear();
        self.timers = Timers::new();
        self.keypad.release_all();
        self.idle_at = None;
        self.faults = 0;
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// for the host to reflect its input onto
    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn quirks(&self) -> &Quirks {
        &self.quirks
    }

    /// how many faults have been reported since start or reset
    pub fn fault_count(&self) -> u64 {
        self.faults
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self) -> StepOutcome {
        let addr = self.registers.pc;
        match self.memory.get_word(addr) {
            Ok(word) => self.execute(Instruction::decode(word)),
            Err(oob) => {
                // running off the end of memory carries on from the bottom
                let outcome = self.fault(oob_fault(addr, oob));
                self.registers.pc = (addr.wrapping_add(2) as u32 & CHIP8_ADDR_MAX) as u16;
                outcome
            }
        }
    }

    /// execute `instr` as if it had been fetched from the current PC
    pub fn execute(&mut self, instr: Instruction) -> StepOutcome {
        let addr = self.registers.pc;
        trace!(pc = addr, "{}", instr.describe(self.quirks.jump_offset));
        let outcome = match self.dispatch(instr, addr) {
            Ok(Flow::Next) => {
                self.registers.advance();
                StepOutcome::Executed
            }
            Ok(Flow::Skip) => {
                self.registers.advance();
                self.registers.advance();
                StepOutcome::Executed
            }
            Ok(Flow::Jump(target)) => {
                self.registers.pc = target;
                StepOutcome::Executed
            }
            Ok(Flow::Wait) => StepOutcome::WaitingForKey,
            Ok(Flow::Idle) => {
                if self.idle_at != Some(addr) {
                    info!("idle loop at {:#05x}", addr);
                }
                self.idle_at = Some(addr);
                return StepOutcome::Idle;
            }
            Err(fault) => {
                let outcome = self.fault(fault);
                // an unmatched 00EE has nowhere to go back to, so it stays put
                if !matches!(fault, Fault::StackUnderflow { .. }) {
                    self.registers.advance();
                }
                outcome
            }
        };
        self.idle_at = None;
        outcome
    }

    fn fault(&mut self, fault: Fault) -> StepOutcome {
        warn!("{}", fault);
        self.faults += 1;
        StepOutcome::Faulted(fault)
    }

    /// where I ends up after being moved to `raw`
    fn bound_index(&self, raw: u32) -> u16 {
        match self.quirks.index_overflow {
            IndexOverflow::Unbounded => raw as u16,
            IndexOverflow::Wrap => (raw & CHIP8_ADDR_MAX) as u16,
            IndexOverflow::Clamp => raw.min(CHIP8_ADDR_MAX) as u16,
        }
    }

    fn shift_source(&self, x: Reg, y: Reg) -> u8 {
        match self.quirks.shift_source {
            ShiftSource::Vy => self.registers.v[y],
            ShiftSource::Vx => self.registers.v[x],
        }
    }

    fn bitwise(&mut self, x: Reg, value: u8) {
        self.registers.v[x] = value;
        if self.quirks.bitwise_resets_vf {
            self.registers.v[VF] = 0;
        }
    }

    fn dispatch(&mut self, instr: Instruction, addr: u16) -> Result<Flow, Fault> {
        use Instruction::*;
        let next = addr.wrapping_add(2);
        let v = &mut self.registers.v;
        let flow = match instr {
            Cls => {
                self.frame.clear();
                Flow::Next
            }
            Ret => match self.stack.pop() {
                Some(ret) => Flow::Jump(ret),
                None => return Err(Fault::StackUnderflow { addr }),
            },
            Jp(nnn) if nnn == addr => Flow::Idle,
            Jp(nnn) => Flow::Jump(nnn),
            Call(nnn) => {
                if !self.stack.push(next) {
                    return Err(Fault::StackOverflow { addr });
                }
                Flow::Jump(nnn)
            }
            SeImm(x, nn) => skip_if(v[x] == nn),
            SneImm(x, nn) => skip_if(v[x] != nn),
            SeReg(x, y) => skip_if(v[x] == v[y]),
            SneReg(x, y) => skip_if(v[x] != v[y]),
            LdImm(x, nn) => {
                v[x] = nn;
                Flow::Next
            }
            AddImm(x, nn) => {
                v[x] = v[x].wrapping_add(nn);
                Flow::Next
            }
            LdReg(x, y) => {
                v[x] = v[y];
                Flow::Next
            }
            Or(x, y) => {
                let r = v[x] | v[y];
                self.bitwise(x, r);
                Flow::Next
            }
            And(x, y) => {
                let r = v[x] & v[y];
                self.bitwise(x, r);
                Flow::Next
            }
            Xor(x, y) => {
                let r = v[x] ^ v[y];
                self.bitwise(x, r);
                Flow::Next
            }
            AddReg(x, y) => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[x] = sum;
                v[VF] = carry as u8;
                Flow::Next
            }
            Sub(x, y) => {
                let no_borrow = v[x] >= v[y];
                v[x] = v[x].wrapping_sub(v[y]);
                v[VF] = no_borrow as u8;
                Flow::Next
            }
            Subn(x, y) => {
                let no_borrow = v[y] >= v[x];
                v[x] = v[y].wrapping_sub(v[x]);
                v[VF] = no_borrow as u8;
                Flow::Next
            }
            Shr(x, y) => {
                let src = self.shift_source(x, y);
                self.registers.v[x] = src >> 1;
                self.registers.v[VF] = src & 0x01;
                Flow::Next
            }
            Shl(x, y) => {
                let src = self.shift_source(x, y);
                self.registers.v[x] = src << 1;
                self.registers.v[VF] = src >> 7;
                Flow::Next
            }
            LdI(nnn) => {
                self.registers.i = nnn;
                Flow::Next
            }
            JpOffset(x, nnn) => {
                let offset = match self.quirks.jump_offset {
                    JumpOffset::V0 => v[0],
                    JumpOffset::Vx => v[x],
                };
                Flow::Jump(nnn + offset as u16)
            }
            Rnd(x, nn) => {
                let r: u8 = self.rng.gen();
                self.registers.v[x] = r & nn;
                Flow::Next
            }
            Drw(x, y, n) => {
                let (vx, vy) = (v[x], v[y]);
                let i = self.registers.i;
                let sprite = self
                    .memory
                    .get_ro_slice(i, n as usize)
                    .map_err(|oob| oob_fault(addr, oob))?;
                debug!(i, x = vx, y = vy, rows = n, "draw sprite");
                let collision = self
                    .frame
                    .draw_sprite(vx, vy, sprite, self.quirks.sprite_edges);
                self.registers.set_vf(collision);
                Flow::Next
            }
            Skp(x) => {
                let key = v[x];
                skip_if(self.key_down(addr, key)?)
            }
            Sknp(x) => {
                let key = v[x];
                skip_if(!self.key_down(addr, key)?)
            }
            LdFromDelay(x) => {
                v[x] = self.timers.get_delay();
                Flow::Next
            }
            WaitKey(x) => match self.keypad.first_down() {
                Some(key) => {
                    v[x] = key;
                    Flow::Next
                }
                None => Flow::Wait,
            },
            LdDelay(x) => {
                self.timers.set_delay(v[x]);
                Flow::Next
            }
            LdSound(x) => {
                self.timers.set_sound(v[x]);
                Flow::Next
            }
            AddI(x) => {
                let raw = self.registers.i as u32 + v[x] as u32;
                self.registers.i = self.bound_index(raw);
                self.registers.set_vf(raw > CHIP8_ADDR_MAX);
                Flow::Next
            }
            LdGlyph(x) => {
                self.registers.i = self.memory.glyph_addr(v[x]);
                Flow::Next
            }
            Bcd(x) => {
                let value = v[x];
                let digits = self
                    .memory
                    .get_rw_slice(self.registers.i, 3)
                    .map_err(|oob| oob_fault(addr, oob))?;
                digits.copy_from_slice(&[value / 100, (value / 10) % 10, value % 10]);
                Flow::Next
            }
            Store(x) => {
                let dst = self
                    .memory
                    .get_rw_slice(self.registers.i, x + 1)
                    .map_err(|oob| oob_fault(addr, oob))?;
                dst.copy_from_slice(&v[..=x]);
                self.advance_index(x);
                Flow::Next
            }
            Load(x) => {
                let src = self
                    .memory
                    .get_ro_slice(self.registers.i, x + 1)
                    .map_err(|oob| oob_fault(addr, oob))?;
                v[..=x].copy_from_slice(src);
                self.advance_index(x);
                Flow::Next
            }
            Unknown(opcode) => return Err(Fault::UnknownOpcode { addr, opcode }),
        };
        Ok(flow)
    }

    fn advance_index(&mut self, x: Reg) {
        if self.quirks.load_store_advances_i {
            let raw = self.registers.i as u32 + x as u32 + 1;
            self.registers.i = self.bound_index(raw);
        }
    }

    fn key_down(&self, addr: u16, key: u8) -> Result<bool, Fault> {
        self.keypad
            .is_down(key)
            .ok_or(Fault::KeyOutOfRange { addr, key })
    }
}

fn oob_fault(addr: u16, oob: OutOfBounds) -> Fault {
    Fault::MemoryOutOfBounds {
        addr,
        start: oob.start,
        len: oob.len,
    }
}
