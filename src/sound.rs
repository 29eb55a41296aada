use beep::beep;
use std::io;

/// the buzzer; switched on and off as the sound timer starts and stops
pub trait Sound {
    fn beep(&mut self) -> Result<(), io::Error>;
    fn stop(&mut self) -> Result<(), io::Error>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }

    pub fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        SimpleBeep::new()
    }
}

fn beep_err(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), io::Error> {
        beep(SIMPLEBEEP_PITCH).map_err(beep_err)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        beep(0).map_err(beep_err)?;
        self.is_beeping = false;
        Ok(())
    }
}

/// no sound at all; counts what it was asked to do
#[derive(Default)]
pub struct Mute {
    pub beeps: usize,
    pub stops: usize,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), io::Error> {
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), io::Error> {
        self.stops += 1;
        Ok(())
    }
}
