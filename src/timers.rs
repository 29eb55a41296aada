/// delay and sound timers; both count down to zero at 60Hz, whatever the
/// instruction throughput
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    /// one 60Hz interval has passed
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn get_delay(&self) -> u8 {
        self.delay
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn get_sound(&self) -> u8 {
        self.sound
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    /// the buzzer is on while the sound timer is running
    pub fn is_sound_active(&self) -> bool {
        self.sound > 0
    }
}
