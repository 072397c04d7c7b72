use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

use crate::machine::KEY_COUNT;

/// left-hand side of a qwerty keyboard, laid out like the COSMAC hex pad;
/// character n is the host key for logical key n
pub const CHIP8_CONVENTIONAL_KEYMAP: &str = "x123qweasdzc4rfv";

/// what the host told us since the last poll, already translated to logical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(u8),
    KeyUp(u8),
    Quit,
}

/// reads keypresses
pub trait Input {
    /// drain everything that happened since the last call, without blocking
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error>;
}

/// build a host-char -> logical-key table from a 16-character layout
pub fn keymap_from_layout(layout: &str) -> Option<HashMap<char, u8>> {
    let chars: Vec<char> = layout.chars().collect();
    if chars.len() != KEY_COUNT {
        return None;
    }
    let map: HashMap<char, u8> = chars
        .iter()
        .enumerate()
        .map(|(key, &c)| (c.to_ascii_lowercase(), key as u8))
        .collect();
    // a host key bound twice would shadow a logical key
    (map.len() == KEY_COUNT).then_some(map)
}

/// Turns crossterm key events into logical key transitions. Terminals only
/// report presses, so a key is held "down" for `hold_frames` ticks after its
/// last press event and then released.
pub struct KeyLatch {
    keymap: HashMap<char, u8>,
    hold_frames: u32,
    held: [u32; KEY_COUNT],
}

impl KeyLatch {
    pub fn new(keymap: HashMap<char, u8>, hold_frames: u32) -> Self {
        KeyLatch {
            keymap,
            hold_frames: hold_frames.max(1),
            held: [0; KEY_COUNT],
        }
    }

    /// one frame has passed; release keys whose hold ran out
    pub fn tick(&mut self, events: &mut Vec<InputEvent>) {
        for (key, frames) in self.held.iter_mut().enumerate() {
            if *frames > 0 {
                *frames -= 1;
                if *frames == 0 {
                    events.push(InputEvent::KeyUp(key as u8));
                }
            }
        }
    }

    pub fn translate(&mut self, evt: KeyEvent, events: &mut Vec<InputEvent>) {
        match evt.code {
            KeyCode::Esc => events.push(InputEvent::Quit),
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                events.push(InputEvent::Quit)
            }
            KeyCode::Char(c) => match self.keymap.get(&c.to_ascii_lowercase()) {
                Some(&key) => {
                    if self.held[key as usize] == 0 {
                        events.push(InputEvent::KeyDown(key));
                    }
                    self.held[key as usize] = self.hold_frames;
                }
                None => warn!("can't map {:?} to a COSMAC key", c),
            },
            other => debug!("ignoring key {:?}", other),
        }
    }
}

/// simple implementation of Input, reading the terminal in raw mode
pub struct StdinInput {
    latch: KeyLatch,
}

impl StdinInput {
    pub fn new(latch: KeyLatch) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput { latch })
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("could not leave raw mode: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        let mut events = Vec::new();
        self.latch.tick(&mut events);
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => self.latch.translate(evt, &mut events),
                other => debug!("ignoring event {:?}", other),
            }
        }
        Ok(events)
    }
}

/// dummy Input implementation for testing; replays one batch per poll, then
/// reports nothing
pub struct DummyInput {
    script: VecDeque<Vec<InputEvent>>,
}

impl DummyInput {
    pub fn new(script: Vec<Vec<InputEvent>>) -> Self {
        DummyInput {
            script: VecDeque::from(script),
        }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}
