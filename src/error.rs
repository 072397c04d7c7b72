use thiserror::Error;

/// Everything that can go wrong inside the machine itself. Host I/O failures
/// (opening the ROM, talking to the terminal) live elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("program image is {size} bytes, at most {max_size} fit in memory")]
    ImageTooLarge { size: usize, max_size: usize },

    #[error("unknown instruction {word:#06x}")]
    UnknownInstruction { word: u16 },

    #[error("call stack overflow at pc {pc:#05x}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack at pc {pc:#05x}")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of range at {addr:#06x}")]
    AddressOutOfRange { addr: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_instruction_message_has_word() {
        let e = Chip8Error::UnknownInstruction { word: 0x5ab1 };
        assert_eq!(e.to_string(), "unknown instruction 0x5ab1");
    }

    #[test]
    fn test_image_too_large_message() {
        let e = Chip8Error::ImageTooLarge {
            size: 3585,
            max_size: 3584,
        };
        assert_eq!(
            e.to_string(),
            "program image is 3585 bytes, at most 3584 fit in memory"
        );
    }
}
