//! # registers
//!
//! The COSMAC VIP kept V0-VF, I and the stack in the top pages of RAM. Here
//! they live outside addressable memory so a program can't scribble on them.

/// index of the flag register
pub const VF: usize = 0xf;
/// how deep subroutines can nest
pub const CHIP8_STACK_DEPTH: usize = 16;

/// V0-VF, I and the program counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
}

impl RegisterFile {
    pub fn new(pc: u16) -> Self {
        RegisterFile {
            v: [0; 16],
            i: 0,
            pc,
        }
    }

    pub fn vf(&self) -> u8 {
        self.v[VF]
    }

    pub fn set_vf(&mut self, flag: bool) {
        self.v[VF] = flag as u8;
    }

    /// move on to the next instruction
    pub fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }
}

/// return addresses for 2NNN/00EE. Pushing onto a full stack or popping an
/// empty one is refused rather than corrupting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    addrs: [u16; CHIP8_STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            addrs: [0; CHIP8_STACK_DEPTH],
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// false if the stack is already full
    #[must_use]
    pub fn push(&mut self, addr: u16) -> bool {
        if self.depth == CHIP8_STACK_DEPTH {
            return false;
        }
        self.addrs[self.depth] = addr;
        self.depth += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u16> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        Some(self.addrs[self.depth])
    }

    pub fn clear(&mut self) {
        self.depth = 0;
    }
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack::new()
    }
}
