//! Decoding of raw 16-bit words into structured instructions.
//!
//! Field layout of a word `0xOXYN`:
//!
//! * `op`:  bits 12-15, primary dispatch key
//! * `x`:   bits 8-11, register index
//! * `y`:   bits 4-7, register index
//! * `n`:   bits 0-3, sprite height / sub-opcode
//! * `nn`:  bits 0-7, immediate byte / sub-opcode
//! * `nnn`: bits 0-11, address
use crate::error::Chip8Error;

/// Bitwise and arithmetic register-to-register operations (the `8XY_` group).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// Vx = Vy
    Load,
    Or,
    And,
    Xor,
    /// Vx += Vy, VF = carry
    Add,
    /// Vx -= Vy, VF = no borrow
    Sub,
    /// Vx >>= 1, VF = shifted-out LSB
    ShiftRight,
    /// Vx = Vy - Vx, VF = no borrow
    SubReversed,
    /// Vx <<= 1, VF = shifted-out MSB
    ShiftLeft,
}

/// A decoded instruction. Register indices are always in 0..16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump { addr: u16 },
    /// 2NNN
    Call { addr: u16 },
    /// 3XNN
    SkipIfEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipIfNeImm { x: u8, nn: u8 },
    /// 5XY0
    SkipIfEqReg { x: u8, y: u8 },
    /// 6XNN
    LoadImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY_
    Alu { op: AluOp, x: u8, y: u8 },
    /// 9XY0
    SkipIfNeReg { x: u8, y: u8 },
    /// ANNN
    LoadI { addr: u16 },
    /// BNNN
    JumpV0 { addr: u16 },
    /// CXNN
    Random { x: u8, mask: u8 },
    /// DXYN
    Draw { x: u8, y: u8, height: u8 },
    /// EX9E
    SkipIfKey { x: u8 },
    /// EXA1
    SkipIfNotKey { x: u8 },
    /// FX07
    ReadDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddI { x: u8 },
    /// FX29
    LoadGlyph { x: u8 },
    /// FX33
    StoreBcd { x: u8 },
    /// FX55
    StoreRegs { x: u8 },
    /// FX65
    LoadRegs { x: u8 },
}

impl Instruction {
    pub fn decode(word: u16) -> Result<Self, Chip8Error> {
        let op = (word >> 12) as u8;
        let x = ((word >> 8) & 0xf) as u8;
        let y = ((word >> 4) & 0xf) as u8;
        let n = (word & 0xf) as u8;
        let nn = (word & 0xff) as u8;
        let nnn = word & 0x0fff;

        let instruction = match (op, nn) {
            (0x0, _) if word == 0x00e0 => Instruction::ClearScreen,
            (0x0, _) if word == 0x00ee => Instruction::Return,
            (0x1, _) => Instruction::Jump { addr: nnn },
            (0x2, _) => Instruction::Call { addr: nnn },
            (0x3, _) => Instruction::SkipIfEqImm { x, nn },
            (0x4, _) => Instruction::SkipIfNeImm { x, nn },
            // the low nibble of 5XY_ and 9XY_ is not checked
            (0x5, _) => Instruction::SkipIfEqReg { x, y },
            (0x6, _) => Instruction::LoadImm { x, nn },
            (0x7, _) => Instruction::AddImm { x, nn },
            (0x8, _) => Instruction::Alu {
                op: decode_alu(n).ok_or(Chip8Error::UnknownInstruction { word })?,
                x,
                y,
            },
            (0x9, _) => Instruction::SkipIfNeReg { x, y },
            (0xa, _) => Instruction::LoadI { addr: nnn },
            (0xb, _) => Instruction::JumpV0 { addr: nnn },
            (0xc, _) => Instruction::Random { x, mask: nn },
            (0xd, _) => Instruction::Draw { x, y, height: n },
            (0xe, 0x9e) => Instruction::SkipIfKey { x },
            (0xe, 0xa1) => Instruction::SkipIfNotKey { x },
            (0xf, 0x07) => Instruction::ReadDelay { x },
            (0xf, 0x0a) => Instruction::WaitKey { x },
            (0xf, 0x15) => Instruction::SetDelay { x },
            (0xf, 0x18) => Instruction::SetSound { x },
            (0xf, 0x1e) => Instruction::AddI { x },
            (0xf, 0x29) => Instruction::LoadGlyph { x },
            (0xf, 0x33) => Instruction::StoreBcd { x },
            (0xf, 0x55) => Instruction::StoreRegs { x },
            (0xf, 0x65) => Instruction::LoadRegs { x },
            _ => return Err(Chip8Error::UnknownInstruction { word }),
        };
        Ok(instruction)
    }
}

fn decode_alu(n: u8) -> Option<AluOp> {
    Some(match n {
        0x0 => AluOp::Load,
        0x1 => AluOp::Or,
        0x2 => AluOp::And,
        0x3 => AluOp::Xor,
        0x4 => AluOp::Add,
        0x5 => AluOp::Sub,
        0x6 => AluOp::ShiftRight,
        0x7 => AluOp::SubReversed,
        0xe => AluOp::ShiftLeft,
        _ => return None,
    })
}
