use thiserror::Error;

/// Every way the machine can stop. All of these are fatal for the running instance
#[derive(Debug, Error)]
pub enum Error {
    #[error("stack overflow: call at {pc:#05X} with all 16 return slots in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access of {len} byte(s) at {address:#06X} is outside the 4096 byte address space")]
    AddressOutOfBounds { address: usize, len: usize },

    #[error("program counter {pc:#06X} is past the end of memory")]
    ProgramCounterOutOfBounds { pc: u16 },

    #[error("program image is empty")]
    EmptyProgram,

    #[error("program image is {size} bytes, max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read program image")]
    Io(#[from] std::io::Error),

    #[error("unable to build logger: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, Error>;
