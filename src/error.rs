use std::io;
use thiserror::Error;

/// Problems placing a program into memory. A failed load leaves memory as it
/// was.
#[derive(Error, Debug)]
pub enum LoadError {
    /// the byte source could not be read
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),

    /// program would run past the end of memory
    #[error("program of {len} bytes does not fit in the {capacity} bytes available at 0x200")]
    ProgramTooLarge { len: usize, capacity: usize },
}

/// Faults raised while executing a single instruction.
///
/// The program counter has already moved past the faulting opcode; nothing
/// else is touched, so the caller may inspect the machine and carry on.
#[derive(Error, Debug)]
pub enum StepError {
    /// 2NNN with all 16 stack slots in use
    #[error("stack overflow calling 0x{target:03x} from 0x{pc:03x}")]
    StackOverflow { pc: u16, target: u16 },

    /// 00EE with nothing to return to
    #[error("stack underflow returning from 0x{pc:03x}")]
    StackUnderflow { pc: u16 },

    /// the presentation layer failed to refresh the key latch
    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
}

/// Reasons the driver loop stops early.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Step(#[from] StepError),

    #[error("display error: {0}")]
    Display(#[source] io::Error),
}
