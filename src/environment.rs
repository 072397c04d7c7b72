use log::{debug, info, warn};
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::config::UnknownPolicy;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{Input, InputEvent};
use crate::interpreter::{Chip8Interpreter, StepState};

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error(transparent)]
    Machine(#[from] Chip8Error),

    #[error("host i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Why the main loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// the host asked to quit
    Quit,
    /// the requested number of cycles ran
    CycleLimit,
}

/// The frame loop: owns the interpreter and borrows the host's display and
/// input. Each cycle polls input into the key table, runs one interpreter
/// step, presents the framebuffer if it changed, then sleeps.
pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    frame_delay: Duration,
    on_unknown: UnknownPolicy,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        frame_delay: Duration,
        on_unknown: UnknownPolicy,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            frame_delay,
            on_unknown,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// apply host input; true if the host wants to stop
    fn poll_input(&mut self) -> Result<bool, io::Error> {
        for event in self.input.poll_events()? {
            match event {
                InputEvent::KeyDown(key) => self.interpreter.set_key(key, true),
                InputEvent::KeyUp(key) => self.interpreter.set_key(key, false),
                InputEvent::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    fn step(&mut self) -> Result<(), Chip8Error> {
        match self.interpreter.step() {
            Ok(StepState::Running) => Ok(()),
            Ok(StepState::WaitingForKey) => Ok(()),
            Err(Chip8Error::UnknownInstruction { word })
                if self.on_unknown == UnknownPolicy::Skip =>
            {
                warn!(
                    "skipping unknown instruction {:#06x} at {:#05x}",
                    word,
                    self.interpreter.machine().pc
                );
                self.interpreter.skip_instruction();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// run until the host quits, the machine fails, or `max_cycles` have run
    pub fn main_loop(&mut self, max_cycles: Option<u64>) -> Result<RunOutcome, EnvironmentError> {
        info!(
            "starting main loop, {:?} between cycles, unknown instructions {:?}",
            self.frame_delay, self.on_unknown
        );
        let mut cycles: u64 = 0;
        loop {
            if max_cycles.map_or(false, |max| cycles >= max) {
                debug!("stopping after {} cycles", cycles);
                return Ok(RunOutcome::CycleLimit);
            }
            if self.poll_input()? {
                info!("quit requested after {} cycles", cycles);
                return Ok(RunOutcome::Quit);
            }

            self.step()?;
            cycles += 1;

            if self.interpreter.needs_redraw() {
                let framebuffer = self.interpreter.present();
                self.display.draw(framebuffer.cells())?;
            }

            if !self.frame_delay.is_zero() {
                spin_sleep::sleep(self.frame_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::framebuffer::EdgePolicy;
    use crate::input::DummyInput;
    use crate::machine::FLAG;
    use crate::rng::ChipRand;
    use test_log::test;

    fn interpreter_with(program: &[u16]) -> Chip8Interpreter {
        let image: Vec<u8> = program.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut c = Chip8Interpreter::new(
            EdgePolicy::Clip,
            Box::new(ChipRand::new_predictable(1)),
        );
        c.load_program(&image).unwrap();
        c
    }

    #[test]
    fn test_runs_to_cycle_limit() -> Result<(), EnvironmentError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut env = Environment::new(
            interpreter_with(&[0x6105, 0x6203, 0x8124]),
            &mut display,
            &mut input,
            Duration::ZERO,
            UnknownPolicy::Halt,
        );
        assert_eq!(env.main_loop(Some(3))?, RunOutcome::CycleLimit);
        let m = env.interpreter().machine();
        assert_eq!((m.v[1], m.v[FLAG], m.pc), (8, 0, 0x206));
        Ok(())
    }

    #[test]
    fn test_presents_only_on_redraw() -> Result<(), EnvironmentError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        {
            let mut env = Environment::new(
                // draw glyph 0, spin, then clear
                interpreter_with(&[0xd005, 0x6001, 0x6002, 0x00e0]),
                &mut display,
                &mut input,
                Duration::ZERO,
                UnknownPolicy::Halt,
            );
            env.main_loop(Some(4))?;
        }
        assert_eq!(display.frames.len(), 2);
        assert_eq!(&display.frames[0][..8], &[1, 1, 1, 1, 0, 0, 0, 0]);
        assert!(display.frames[1].iter().all(|&px| px == 0));
        Ok(())
    }

    #[test]
    fn test_quit_is_seen_before_the_cycle() -> Result<(), EnvironmentError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![vec![], vec![InputEvent::Quit]]);
        let mut env = Environment::new(
            interpreter_with(&[0x6101, 0x6202]),
            &mut display,
            &mut input,
            Duration::ZERO,
            UnknownPolicy::Halt,
        );
        assert_eq!(env.main_loop(None)?, RunOutcome::Quit);
        let m = env.interpreter().machine();
        assert_eq!((m.v[1], m.v[2], m.pc), (1, 0, 0x202));
        Ok(())
    }

    #[test]
    fn test_key_events_release_wait() -> Result<(), EnvironmentError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![
            vec![],
            vec![],
            vec![InputEvent::KeyDown(0xa)],
            vec![InputEvent::KeyUp(0xa)],
        ]);
        let mut env = Environment::new(
            interpreter_with(&[0xf50a, 0xe5a1]),
            &mut display,
            &mut input,
            Duration::ZERO,
            UnknownPolicy::Halt,
        );
        env.main_loop(Some(4))?;
        let m = env.interpreter().machine();
        assert_eq!(m.v[5], 0xa);
        // key released before EXA1 ran, so it skipped
        assert_eq!(m.pc, 0x206);
        Ok(())
    }

    #[test]
    fn test_unknown_instruction_halts() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut env = Environment::new(
            interpreter_with(&[0x6101, 0x5121, 0xf0ff]),
            &mut display,
            &mut input,
            Duration::ZERO,
            UnknownPolicy::Halt,
        );
        let err = env.main_loop(Some(10)).unwrap_err();
        assert!(matches!(
            err,
            EnvironmentError::Machine(Chip8Error::UnknownInstruction { word: 0xf0ff })
        ));
        assert_eq!(env.interpreter().machine().pc, 0x204);
    }

    #[test]
    fn test_unknown_instruction_skipped() -> Result<(), EnvironmentError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut env = Environment::new(
            interpreter_with(&[0xf0ff, 0x6109]),
            &mut display,
            &mut input,
            Duration::ZERO,
            UnknownPolicy::Skip,
        );
        env.main_loop(Some(2))?;
        assert_eq!(env.interpreter().machine().v[1], 9);
        Ok(())
    }

    #[test]
    fn test_stack_overflow_is_fatal_even_when_skipping() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut env = Environment::new(
            interpreter_with(&[0x2200]),
            &mut display,
            &mut input,
            Duration::ZERO,
            UnknownPolicy::Skip,
        );
        assert!(matches!(
            env.main_loop(None),
            Err(EnvironmentError::Machine(Chip8Error::StackOverflow { .. }))
        ));
    }
}
