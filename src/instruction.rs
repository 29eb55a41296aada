//! # instruction
//!
//! Decoding is total: every 16-bit word is some `Instruction`, with anything
//! the interpreter doesn't understand landing in `Unknown`.
use crate::config::JumpOffset;
use std::fmt;

/// register index, 0x0-0xF
pub type Reg = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1NNN
    Jp(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SeImm(Reg, u8),
    /// 4XNN
    SneImm(Reg, u8),
    /// 5XY0
    SeReg(Reg, Reg),
    /// 6XNN
    LdImm(Reg, u8),
    /// 7XNN
    AddImm(Reg, u8),
    /// 8XY0
    LdReg(Reg, Reg),
    /// 8XY1
    Or(Reg, Reg),
    /// 8XY2
    And(Reg, Reg),
    /// 8XY3
    Xor(Reg, Reg),
    /// 8XY4
    AddReg(Reg, Reg),
    /// 8XY5
    Sub(Reg, Reg),
    /// 8XY6
    Shr(Reg, Reg),
    /// 8XY7
    Subn(Reg, Reg),
    /// 8XYE
    Shl(Reg, Reg),
    /// 9XY0
    SneReg(Reg, Reg),
    /// ANNN
    LdI(u16),
    /// BNNN; X is kept for the BXNN quirk
    JpOffset(Reg, u16),
    /// CXNN
    Rnd(Reg, u8),
    /// DXYN
    Drw(Reg, Reg, u8),
    /// EX9E
    Skp(Reg),
    /// EXA1
    Sknp(Reg),
    /// FX07
    LdFromDelay(Reg),
    /// FX0A
    WaitKey(Reg),
    /// FX15
    LdDelay(Reg),
    /// FX18
    LdSound(Reg),
    /// FX1E
    AddI(Reg),
    /// FX29
    LdGlyph(Reg),
    /// FX33
    Bcd(Reg),
    /// FX55
    Store(Reg),
    /// FX65
    Load(Reg),
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Instruction {
        use Instruction::*;
        let x = ((word >> 8) & 0xf) as Reg;
        let y = ((word >> 4) & 0xf) as Reg;
        let n = (word & 0xf) as u8;
        let nn = (word & 0xff) as u8;
        let nnn = word & 0xfff;
        match word >> 12 {
            0x0 => match word {
                0x00e0 => Cls,
                0x00ee => Ret,
                _ => Unknown(word),
            },
            0x1 => Jp(nnn),
            0x2 => Call(nnn),
            0x3 => SeImm(x, nn),
            0x4 => SneImm(x, nn),
            0x5 if n == 0 => SeReg(x, y),
            0x6 => LdImm(x, nn),
            0x7 => AddImm(x, nn),
            0x8 => match n {
                0x0 => LdReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => Shr(x, y),
                0x7 => Subn(x, y),
                0xe => Shl(x, y),
                _ => Unknown(word),
            },
            0x9 if n == 0 => SneReg(x, y),
            0xa => LdI(nnn),
            0xb => JpOffset(x, nnn),
            0xc => Rnd(x, nn),
            0xd => Drw(x, y, n),
            0xe => match nn {
                0x9e => Skp(x),
                0xa1 => Sknp(x),
                _ => Unknown(word),
            },
            0xf => match nn {
                0x07 => LdFromDelay(x),
                0x0a => WaitKey(x),
                0x15 => LdDelay(x),
                0x18 => LdSound(x),
                0x1e => AddI(x),
                0x29 => LdGlyph(x),
                0x33 => Bcd(x),
                0x55 => Store(x),
                0x65 => Load(x),
                _ => Unknown(word),
            },
            _ => Unknown(word),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SeImm(x, nn) => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SneImm(x, nn) => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdImm(x, nn) => write!(f, "LD V{:X}, {:#04x}", x, nn),
            AddImm(x, nn) => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, {:#05x}", a),
            JpOffset(_, a) => write!(f, "JP V0, {:#05x}", a),
            Rnd(x, nn) => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdFromDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            LdDelay(x) => write!(f, "LD DT, V{:X}", x),
            LdSound(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdGlyph(x) => write!(f, "LD F, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            Store(x) => write!(f, "LD [I], V{:X}", x),
            Load(x) => write!(f, "LD V{:X}, [I]", x),
            Unknown(w) => write!(f, "DW {:#06x}", w),
        }
    }
}

impl Instruction {
    /// mnemonic as the machine will run it: BNNN is listed against the
    /// register `jump_offset` picks
    pub fn describe(&self, jump_offset: JumpOffset) -> String {
        match (self, jump_offset) {
            (Instruction::JpOffset(x, a), JumpOffset::Vx) => format!("JP V{:X}, {:#05x}", x, a),
            _ => self.to_string(),
        }
    }
}

/// one line per word of `program`, loaded at `base`
pub fn disassemble(program: &[u8], base: u16, jump_offset: JumpOffset) -> Vec<String> {
    program
        .chunks(2)
        .enumerate()
        .map(|(n, pair)| {
            let addr = base as usize + n * 2;
            match pair {
                [hi, lo] => {
                    let word = u16::from_be_bytes([*hi, *lo]);
                    let instr = Instruction::decode(word).describe(jump_offset);
                    format!("{:03x}: {:04x}  {}", addr, word, instr)
                }
                [b] => format!("{:03x}: {:02x}    DB {:#04x}", addr, b, b),
                _ => unreachable!("chunks(2) yields one or two bytes"),
            }
        })
        .collect()
}
