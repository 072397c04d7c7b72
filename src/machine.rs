use crate::error::Chip8Error;
use crate::framebuffer::{EdgePolicy, Framebuffer};
use crate::memory::{Chip8Memory, CHIP8_PROGRAM_ADDR};

pub const REGISTER_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF doubles as the carry / borrow / shift-out / collision flag
pub const FLAG: usize = 0xf;

/// Everything the interpreter mutates. Created once, owned by the
/// interpreter, and only ever touched from the thread driving it.
pub struct Machine {
    pub memory: Chip8Memory,
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub framebuffer: Framebuffer,
    pub keys: [bool; KEY_COUNT],
    pub redraw_pending: bool,
}

impl Machine {
    /// zeroed machine with the font loaded and pc at the program start
    pub fn new(edges: EdgePolicy) -> Self {
        Machine {
            memory: Chip8Memory::new(),
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: Framebuffer::new(edges),
            keys: [false; KEY_COUNT],
            redraw_pending: false,
        }
    }

    pub fn load(&mut self, image: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(image)
    }

    pub fn push_return(&mut self, addr: u16) -> Result<(), Chip8Error> {
        if self.sp == STACK_DEPTH {
            return Err(Chip8Error::StackOverflow { pc: self.pc });
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop_return(&mut self) -> Result<u16, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    /// lowest-numbered key currently held, if any
    pub fn first_pressed_key(&self) -> Option<u8> {
        self.keys.iter().position(|&down| down).map(|k| k as u8)
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        self.keys[(key & 0x0f) as usize]
    }

    pub fn set_key(&mut self, key: u8, down: bool) {
        self.keys[(key & 0x0f) as usize] = down;
    }

    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryMap, CHIP8_FONT};

    #[test]
    fn test_initial_state() -> Result<(), Chip8Error> {
        let m = Machine::new(EdgePolicy::Clip);
        assert_eq!(m.pc, 0x200);
        assert_eq!(m.i, 0);
        assert_eq!(m.v, [0; 16]);
        assert_eq!(m.stack_depth(), 0);
        assert_eq!(m.first_pressed_key(), None);
        assert!(!m.redraw_pending);
        assert_eq!(m.memory.get_ro_slice(0, 80)?, &CHIP8_FONT);
        Ok(())
    }

    #[test]
    fn test_stack_push_pop() -> Result<(), Chip8Error> {
        let mut m = Machine::new(EdgePolicy::Clip);
        m.push_return(0x202)?;
        m.push_return(0x404)?;
        assert_eq!(m.stack_depth(), 2);
        assert_eq!(m.pop_return()?, 0x404);
        assert_eq!(m.pop_return()?, 0x202);
        Ok(())
    }

    #[test]
    fn test_stack_overflow() -> Result<(), Chip8Error> {
        let mut m = Machine::new(EdgePolicy::Clip);
        for n in 0..16 {
            m.push_return(0x200 + 2 * n)?;
        }
        assert_eq!(
            m.push_return(0x300),
            Err(Chip8Error::StackOverflow { pc: 0x200 })
        );
        assert_eq!(m.stack_depth(), 16);
        Ok(())
    }

    #[test]
    fn test_stack_underflow() {
        let mut m = Machine::new(EdgePolicy::Clip);
        assert_eq!(
            m.pop_return(),
            Err(Chip8Error::StackUnderflow { pc: 0x200 })
        );
    }

    #[test]
    fn test_timers_floor_at_zero() {
        let mut m = Machine::new(EdgePolicy::Clip);
        m.delay_timer = 1;
        m.sound_timer = 3;
        m.tick_timers();
        m.tick_timers();
        assert_eq!(m.delay_timer, 0);
        assert_eq!(m.sound_timer, 1);
    }

    #[test]
    fn test_first_pressed_key_is_lowest() {
        let mut m = Machine::new(EdgePolicy::Clip);
        m.set_key(0xc, true);
        m.set_key(0x5, true);
        assert_eq!(m.first_pressed_key(), Some(0x5));
        m.set_key(0x5, false);
        assert_eq!(m.first_pressed_key(), Some(0xc));
        assert!(m.is_key_down(0xc));
    }
}
