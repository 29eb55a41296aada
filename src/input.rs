use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tracing::warn;

/// map of keyboard characters to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
pub const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// the 16-key hex pad as the program sees it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// keys outside 0x0-0xF are ignored
    pub fn set_key(&mut self, key: u8, down: bool) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = down;
        }
    }

    /// None for keys outside 0x0-0xF
    pub fn is_down(&self, key: u8) -> Option<bool> {
        self.keys.get(key as usize).copied()
    }

    /// lowest-numbered key currently down
    pub fn first_down(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; 16];
    }
}

/// what the host wants after polling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostControl {
    Continue,
    Quit,
}

/// reads keypresses and reflects them onto the keypad, once per batch
pub trait Input {
    fn update(&mut self, keypad: &mut Keypad) -> Result<HostControl, io::Error>;
}

/// how many polls a key stays down after the terminal reports it; terminals
/// only report presses, never releases
const KEY_HOLD_POLLS: u8 = 6;

/// simple implementation of Input, using crossterm key events
pub struct StdinInput {
    held: [u8; 16],
    keymap: HashMap<char, u8>,
}

impl StdinInput {
    pub fn new(keymap: &[(char, u8)]) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            held: [0; 16],
            keymap: keymap.iter().copied().collect(),
        })
    }

    fn read_events(&mut self) -> Result<HostControl, io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.held[*mapped_key as usize] = KEY_HOLD_POLLS,
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => return Ok(HostControl::Quit),
                    _ => {}
                }
            }
        }
        Ok(HostControl::Continue)
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn update(&mut self, keypad: &mut Keypad) -> Result<HostControl, io::Error> {
        self.held.iter_mut().for_each(|h| *h = h.saturating_sub(1));
        let control = self.read_events()?;
        for (key, held) in self.held.iter().enumerate() {
            keypad.set_key(key as u8, *held > 0);
        }
        Ok(control)
    }
}

/// dummy Input implementation for testing; holds the same keys down forever
/// and asks to quit after a fixed number of polls, if given one
pub struct DummyInput {
    keys: Vec<u8>,
    polls_left: Option<usize>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            polls_left: None,
        }
    }

    pub fn quit_after(mut self, polls: usize) -> Self {
        self.polls_left = Some(polls);
        self
    }
}

impl Input for DummyInput {
    fn update(&mut self, keypad: &mut Keypad) -> Result<HostControl, io::Error> {
        if let Some(n) = self.polls_left.as_mut() {
            if *n == 0 {
                return Ok(HostControl::Quit);
            }
            *n -= 1;
        }
        keypad.release_all();
        for key in &self.keys {
            keypad.set_key(*key, true);
        }
        Ok(HostControl::Continue)
    }
}
