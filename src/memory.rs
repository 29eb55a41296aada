use crate::error::Chip8Error;
use std::io;
use thiserror::Error;
use tracing::debug;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;
pub const CHIP8_FONT_LEN: usize = 80;
/// bytes per hex glyph
pub const CHIP8_GLYPH_HEIGHT: u16 = 5;

/// an access that would run past the end of RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{start:#05x}+{len} is outside memory")]
pub struct OutOfBounds {
    pub start: usize,
    pub len: usize,
}

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address; returns
    /// how many bytes were written
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let available = self.size().saturating_sub(addr as usize);
        if buf.len() > available {
            return Err(Chip8Error::ProgramTooLarge {
                size: buf.len(),
                base: addr,
                available,
            });
        }
        self.write(&buf, addr)
            .map_err(|_| Chip8Error::InvalidConfig("load address outside memory"))?;
        Ok(buf.len())
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), OutOfBounds> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (opcodes)
    fn get_word(&self, addr: u16) -> Result<u16, OutOfBounds> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// total addressable bytes
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory (heap)
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], OutOfBounds>;

    /// get a r/o slice of the underlying memory (heap)
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], OutOfBounds>;
}

/// Defines the CHIP-8 standard memory map
///   0x0000-0x01ff  interpreter; hex glyphs at font_addr
///   0x0200-0x0fff  program
///
/// the stack and display live outside of addressable memory, so programs
/// can use everything above the load address
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
    program_len: usize,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], OutOfBounds> {
        let a = addr as usize;
        match a.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(&mut self.bytes[a..end]),
            _ => Err(OutOfBounds { start: a, len }),
        }
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], OutOfBounds> {
        let a = addr as usize;
        match a.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(&self.bytes[a..end]),
            _ => Err(OutOfBounds { start: a, len }),
        }
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the glyph table installed at `font_addr`
    pub fn new(program_addr: u16, font_addr: u16) -> Result<Self, Chip8Error> {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr,
            font_addr,
            program_len: 0,
        };
        mm.write(&CHIP8_FONT, font_addr)
            .map_err(|_| Chip8Error::InvalidConfig("glyph table does not fit in memory"))?;
        Ok(mm)
    }

    /// load a CHIP-8 program at the program address; anything that doesn't
    /// fit is rejected before a byte is written
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let len = self.write_any(reader, self.program_addr)?;
        // a shorter image must not leave the previous one's tail behind
        if self.program_len > len {
            let a = self.program_addr as usize;
            self.bytes[a + len..a + self.program_len].fill(0);
        }
        self.program_len = len;
        debug!(len, addr = self.program_addr, "program loaded");
        Ok(len)
    }

    /// the loaded program image
    pub fn program(&self) -> &[u8] {
        let a = self.program_addr as usize;
        &self.bytes[a..a + self.program_len]
    }

    /// address of the glyph for hex digit `digit`
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + digit as u16 * CHIP8_GLYPH_HEIGHT
    }

    /// zero everything but the glyph table and the loaded program
    pub fn reset(&mut self) {
        let program = self.program().to_vec();
        self.bytes.iter_mut().for_each(|b| *b = 0);
        let f = self.font_addr as usize;
        self.bytes[f..f + CHIP8_FONT_LEN].copy_from_slice(&CHIP8_FONT);
        let a = self.program_addr as usize;
        self.bytes[a..a + program.len()].copy_from_slice(&program);
    }
}

pub const CHIP8_FONT: [u8; CHIP8_FONT_LEN] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    fn mm() -> Chip8MemoryMap {
        Chip8MemoryMap::new(0x200, 0x50).unwrap()
    }

    #[test]
    fn test_memory_zeroed() -> Result<(), Chip8Error> {
        let m = Chip8MemoryMap::new(0x200, 0x50)?;
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
        Ok(())
    }

    #[test]
    fn test_font_installed() {
        let m = mm();
        assert_eq!(m.get_ro_slice(0x50, 80).unwrap(), &CHIP8_FONT[..]);
        assert_eq!(m.glyph_addr(0), 0x50);
        assert_eq!(m.glyph_addr(0xf), 0x50 + 75);
    }

    #[test]
    fn test_font_elsewhere() {
        let m = Chip8MemoryMap::new(0x200, 0x000).unwrap();
        assert_eq!(m.get_ro_slice(0, 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.glyph_addr(1), 5);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = mm();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 0x300).unwrap();
        assert_eq!(
            dst.bytes[0x2f8..0x308],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = mm();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300).unwrap();
        assert_eq!(m.get_word(0x304), Ok(0x0405));
    }

    #[test]
    fn test_read_word_at_end_faults() {
        let m = mm();
        assert_eq!(m.get_word(0xffe), Ok(0));
        assert_eq!(m.get_word(0xfff), Err(OutOfBounds { start: 0xfff, len: 2 }));
    }

    #[test]
    fn test_write_past_end_rejected() {
        let mut dst = mm();
        assert!(dst.write(&[1; 8], 4089).is_err());
        // nothing partially written
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = mm();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2).unwrap(), &[0x00, 0xe0]);
        assert_eq!(dst.program(), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory() -> Result<(), Chip8Error> {
        let mut dst = mm();
        let prog = vec![0xaa; 0xe00];
        dst.load_program(&mut prog.as_slice())?;
        assert_eq!(dst.bytes[0xfff], 0xaa);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = mm();
        let prog = vec![0xaa; 0xe01];
        match dst.load_program(&mut prog.as_slice()) {
            Err(Chip8Error::ProgramTooLarge {
                size,
                base,
                available,
            }) => {
                assert_eq!(size, 0xe01);
                assert_eq!(base, 0x200);
                assert_eq!(available, 0xe00);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(dst.bytes[0x200], 0);
    }

    #[test]
    fn test_reload_shorter_program() -> Result<(), Chip8Error> {
        let mut m = mm();
        m.load_program(&mut [0x6a, 0x05, 0x6b, 0x06, 0x12, 0x04].as_slice())?;
        m.load_program(&mut [0x12, 0x00].as_slice())?;
        assert_eq!(m.program(), &[0x12, 0x00]);
        assert_eq!(m.get_ro_slice(0x202, 4).unwrap(), &[0, 0, 0, 0]);

        // a rejected image leaves the loaded one alone
        let prog = vec![0xaa; 0xe01];
        assert!(m.load_program(&mut prog.as_slice()).is_err());
        assert_eq!(m.program(), &[0x12, 0x00]);
        Ok(())
    }

    #[test]
    fn test_reset_keeps_program() -> Result<(), Chip8Error> {
        let mut m = mm();
        m.load_program(&mut [0x12u8, 0x00].as_slice())?;
        m.write(&[9, 9], 0x400).unwrap();
        m.write(&[0, 0], 0x50).unwrap();
        m.reset();
        assert_eq!(m.get_ro_slice(0x400, 2).unwrap(), &[0, 0]);
        assert_eq!(m.get_ro_slice(0x50, 2).unwrap(), &[0xF0, 0x90]);
        assert_eq!(m.program(), &[0x12, 0x00]);
        Ok(())
    }
}
