//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter is one owned value advanced one instruction per `step()`
//! * no globals; tests run many machines side by side
//! * timers follow the wallclock (60Hz), not the instruction count
//! * display and input sit behind traits so the interpreter doesn't need to
//!   know how the screen or keyboard work
//! * CHIP-8 instructions run as fast as possible then sleep, to match the
//!   configured rate on average; so not quite authentic
//!
//! Model
//!
//! Environment
//!  |-- display, input, run config
//!  |-- interpreter
//!  |    |-- memory (font at 0x050, program at 0x200)
//!  |    |-- registers, stack, timers, key latch, frame
//!  |    `-- instruction decode
//!  `-- main loop
//!       |-- interpreter.step(input)   // timers, keys, fetch, decode, execute
//!       |-- if interpreter.take_redraw() { display.draw(frame) }
//!       `-- sleep off the rest of the cycle
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod timer;

pub use environment::{Environment, RunConfig, RunSummary, StopReason};
pub use error::{LoadError, RunError, StepError};
pub use input::{Input, Keypad};
pub use instruction::Instruction;
pub use interpreter::Chip8Interpreter;
