//! # chip8vm
//!
//! A CHIP-8 interpreter with a terminal front end.
//!
//! ## Design
//!
//! * the core (machine state, loader, decoder/executor, step driver) knows
//!   nothing about terminals, clocks or files; it is driven one cycle at a time
//! * decode produces an [`instruction::Instruction`] value; anything that
//!   doesn't decode is an error the caller can see, not a silent fallthrough
//! * control flow writes the real target into pc and tells the step driver so
//! * randomness is injected, so tests can pin it
//! * display and input sit behind traits, so the frame loop can be driven by
//!   dummies in tests and by tui/crossterm for real
//!
//! Model
//!
//! Environment (frame loop)
//!  |-- display, input, config
//!  |-- interpreter(rng)
//!  |    `-- machine: memory(font, program), registers, stack, timers,
//!  |                 framebuffer, keys
//!  `-- main loop
//!       |-- poll input -> key table (or quit)
//!       |-- interpreter.step()
//!       |-- if redraw: display.draw(interpreter.present())
//!       `-- sleep(frame delay)
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod rng;
