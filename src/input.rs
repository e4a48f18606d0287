use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use log::warn;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

pub const KEY_COUNT: usize = 16;

/// The 16-key latch the interpreter reads. Overwritten wholesale before every
/// instruction; no edge detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    pressed: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// a keypad with just these keys held
    pub fn with_pressed(keys: &[u8]) -> Self {
        let mut keypad = Self::new();
        for &key in keys {
            keypad.press(key);
        }
        keypad
    }

    /// only the low nibble of `key` counts
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed[(key & 0x0f) as usize]
    }

    pub fn press(&mut self, key: u8) {
        self.pressed[(key & 0x0f) as usize] = true;
    }

    pub fn release(&mut self, key: u8) {
        self.pressed[(key & 0x0f) as usize] = false;
    }

    pub fn release_all(&mut self) {
        self.pressed = [false; KEY_COUNT];
    }

    pub fn set_all(&mut self, pressed: [bool; KEY_COUNT]) {
        self.pressed = pressed;
    }

    /// lowest-numbered key currently held
    pub fn lowest_pressed(&self) -> Option<u8> {
        self.pressed.iter().position(|&p| p).map(|k| k as u8)
    }
}

/// Supplies key state to the interpreter once per cycle.
pub trait Input {
    /// overwrite `keys` with whatever is held right now
    fn refresh(&mut self, keys: &mut Keypad) -> Result<(), io::Error>;

    /// the user asked to leave
    fn quit_requested(&self) -> bool {
        false
    }
}

/// a fixed keypad is its own input, which keeps tests and headless runs simple
impl Input for Keypad {
    fn refresh(&mut self, keys: &mut Keypad) -> Result<(), io::Error> {
        *keys = *self;
        Ok(())
    }
}

/// left-hand side of a qwerty keyboard, laid out like the COSMAC hex pad
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
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

/// Terminals only report presses (and auto-repeats), never releases, so a key
/// counts as held for this long after its last event.
const KEY_HOLD: Duration = Duration::from_millis(150);

/// keyboard input from the terminal, via crossterm; expects raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
    last_seen: [Option<Instant>; KEY_COUNT],
    quit: bool,
}

impl TermInput {
    pub fn new() -> Self {
        TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_seen: [None; KEY_COUNT],
            quit: false,
        }
    }

    fn read_events(&mut self, now: Instant) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.last_seen[mapped_key as usize] = Some(now),
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    _ => (),
                }
            }
        }
        Ok(())
    }

    /// which keys still count as held at `now`
    fn latch(&self, now: Instant) -> [bool; KEY_COUNT] {
        let mut held = [false; KEY_COUNT];
        for (h, seen) in held.iter_mut().zip(self.last_seen.iter()) {
            *h = matches!(seen, Some(t) if now.saturating_duration_since(*t) < KEY_HOLD);
        }
        held
    }
}

impl Default for TermInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Input for TermInput {
    fn refresh(&mut self, keys: &mut Keypad) -> Result<(), io::Error> {
        let now = Instant::now();
        self.read_events(now)?;
        keys.set_all(self.latch(now));
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}
