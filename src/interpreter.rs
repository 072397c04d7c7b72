/// # interpreter
///
/// Fetch / decode / execute for the base CHIP-8 instruction set.
///
/// One call to [`Chip8Interpreter::step`] is one cycle:
///  1. fetch the big-endian word at pc
///  2. decode it into an [`Instruction`]
///  3. execute it, which reports a [`Flow`]
///  4. `Advance` moves pc on by one instruction, `Jumped` leaves pc where the
///     instruction put it; both then tick the timers
///  5. `Blocked` (key wait with nothing held) and any error leave pc and the
///     timers exactly as they were
///
/// Jumps, calls, returns and taken skips write the real target into pc.
use crate::error::Chip8Error;
use crate::framebuffer::{EdgePolicy, Framebuffer};
use crate::instruction::{AluOp, Instruction};
use crate::machine::{Machine, FLAG};
use crate::memory::{glyph_addr, MemoryMap};
use crate::rng::RandomSource;
use log::trace;

/// size of one instruction in bytes
const INSTRUCTION_BYTES: u16 = 2;

/// How an executed instruction wants the program counter handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// apply the default advance to the next instruction
    Advance,
    /// pc already holds the next instruction's address
    Jumped,
    /// the instruction has not completed; run it again next cycle
    Blocked,
}

/// Where the step driver is after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Running,
    WaitingForKey,
}

pub struct Chip8Interpreter {
    machine: Machine,
    rng: Box<dyn RandomSource>,
}

impl Chip8Interpreter {
    pub fn new(edges: EdgePolicy, rng: Box<dyn RandomSource>) -> Self {
        Chip8Interpreter {
            machine: Machine::new(edges),
            rng,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), Chip8Error> {
        self.machine.load(image)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn set_key(&mut self, key: u8, down: bool) {
        self.machine.set_key(key, down);
    }

    pub fn needs_redraw(&self) -> bool {
        self.machine.redraw_pending
    }

    /// hand the framebuffer to a renderer; the redraw signal is consumed
    pub fn present(&mut self) -> &Framebuffer {
        self.machine.redraw_pending = false;
        &self.machine.framebuffer
    }

    /// step over the instruction at pc without running it, for owners that
    /// choose to continue past an unknown instruction
    pub fn skip_instruction(&mut self) {
        self.machine.pc = self.machine.pc.wrapping_add(INSTRUCTION_BYTES);
    }

    /// run one fetch / decode / execute cycle
    pub fn step(&mut self) -> Result<StepState, Chip8Error> {
        let pc = self.machine.pc;
        let word = self.machine.memory.get_word(pc)?;
        let instruction = Instruction::decode(word)?;
        trace!("{:#05x}: {:04x} {:?}", pc, word, instruction);

        match self.execute(instruction)? {
            Flow::Blocked => return Ok(StepState::WaitingForKey),
            Flow::Advance => self.machine.pc = pc.wrapping_add(INSTRUCTION_BYTES),
            Flow::Jumped => {}
        }
        self.machine.tick_timers();
        Ok(StepState::Running)
    }

    /// skip the next instruction when `cond` holds
    fn skip_if(&mut self, cond: bool) -> Flow {
        if cond {
            self.machine.pc = self.machine.pc.wrapping_add(2 * INSTRUCTION_BYTES);
            Flow::Jumped
        } else {
            Flow::Advance
        }
    }

    fn jump(&mut self, addr: u16) -> Flow {
        self.machine.pc = addr;
        Flow::Jumped
    }

    /// apply one decoded instruction to the machine
    pub fn execute(&mut self, instruction: Instruction) -> Result<Flow, Chip8Error> {
        let m = &mut self.machine;
        let flow = match instruction {
            Instruction::ClearScreen => {
                m.framebuffer.clear();
                m.redraw_pending = true;
                Flow::Advance
            }
            Instruction::Return => {
                let addr = m.pop_return()?;
                self.jump(addr)
            }
            Instruction::Jump { addr } => self.jump(addr),
            Instruction::Call { addr } => {
                m.push_return(m.pc.wrapping_add(INSTRUCTION_BYTES))?;
                self.jump(addr)
            }
            Instruction::SkipIfEqImm { x, nn } => {
                let cond = m.v[x as usize] == nn;
                self.skip_if(cond)
            }
            Instruction::SkipIfNeImm { x, nn } => {
                let cond = m.v[x as usize] != nn;
                self.skip_if(cond)
            }
            Instruction::SkipIfEqReg { x, y } => {
                let cond = m.v[x as usize] == m.v[y as usize];
                self.skip_if(cond)
            }
            Instruction::SkipIfNeReg { x, y } => {
                let cond = m.v[x as usize] != m.v[y as usize];
                self.skip_if(cond)
            }
            Instruction::LoadImm { x, nn } => {
                m.v[x as usize] = nn;
                Flow::Advance
            }
            Instruction::AddImm { x, nn } => {
                m.v[x as usize] = m.v[x as usize].wrapping_add(nn);
                Flow::Advance
            }
            Instruction::Alu { op, x, y } => {
                alu(m, op, x as usize, y as usize);
                Flow::Advance
            }
            Instruction::LoadI { addr } => {
                m.i = addr;
                Flow::Advance
            }
            Instruction::JumpV0 { addr } => {
                let target = addr + m.v[0] as u16;
                self.jump(target)
            }
            Instruction::Random { x, mask } => {
                m.v[x as usize] = self.rng.next_byte() & mask;
                Flow::Advance
            }
            Instruction::Draw { x, y, height } => {
                let rows = m.memory.get_ro_slice(m.i, height as usize)?;
                let collided = m.framebuffer.draw_sprite(m.v[x as usize], m.v[y as usize], rows);
                m.v[FLAG] = collided as u8;
                m.redraw_pending = true;
                Flow::Advance
            }
            Instruction::SkipIfKey { x } => {
                let cond = m.is_key_down(m.v[x as usize]);
                self.skip_if(cond)
            }
            Instruction::SkipIfNotKey { x } => {
                let cond = !m.is_key_down(m.v[x as usize]);
                self.skip_if(cond)
            }
            Instruction::ReadDelay { x } => {
                m.v[x as usize] = m.delay_timer;
                Flow::Advance
            }
            Instruction::WaitKey { x } => match m.first_pressed_key() {
                Some(key) => {
                    m.v[x as usize] = key;
                    Flow::Advance
                }
                None => Flow::Blocked,
            },
            Instruction::SetDelay { x } => {
                m.delay_timer = m.v[x as usize];
                Flow::Advance
            }
            Instruction::SetSound { x } => {
                m.sound_timer = m.v[x as usize];
                Flow::Advance
            }
            Instruction::AddI { x } => {
                let sum = m.i as u32 + m.v[x as usize] as u32;
                m.i = sum as u16;
                m.v[FLAG] = (sum > 0xfff) as u8;
                Flow::Advance
            }
            Instruction::LoadGlyph { x } => {
                m.i = glyph_addr(m.v[x as usize]);
                Flow::Advance
            }
            Instruction::StoreBcd { x } => {
                let value = m.v[x as usize];
                m.memory
                    .write(&[value / 100, (value / 10) % 10, value % 10], m.i)?;
                Flow::Advance
            }
            Instruction::StoreRegs { x } => {
                let count = x as usize + 1;
                m.memory.write(&m.v[..count], m.i)?;
                m.i = m.i.wrapping_add(count as u16);
                Flow::Advance
            }
            Instruction::LoadRegs { x } => {
                let count = x as usize + 1;
                let src = m.memory.get_ro_slice(m.i, count)?;
                m.v[..count].copy_from_slice(src);
                m.i = m.i.wrapping_add(count as u16);
                Flow::Advance
            }
        };
        Ok(flow)
    }
}

/// `8XY_`. The result lands in Vx before the flag lands in VF, so with x = F
/// the flag wins.
fn alu(m: &mut Machine, op: AluOp, x: usize, y: usize) {
    let (vx, vy) = (m.v[x], m.v[y]);
    let (result, flag) = match op {
        AluOp::Load => (vy, None),
        AluOp::Or => (vx | vy, None),
        AluOp::And => (vx & vy, None),
        AluOp::Xor => (vx ^ vy, None),
        AluOp::Add => {
            let (sum, carry) = vx.overflowing_add(vy);
            (sum, Some(carry as u8))
        }
        AluOp::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
        AluOp::SubReversed => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
        AluOp::ShiftRight => (vx >> 1, Some(vx & 0x01)),
        AluOp::ShiftLeft => (vx << 1, Some(vx >> 7)),
    };
    m.v[x] = result;
    if let Some(flag) = flag {
        m.v[FLAG] = flag;
    }
}
