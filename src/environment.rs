use crate::display::Display;
use crate::error::RunError;
use crate::input::Input;
use crate::instruction::Instruction;
use crate::interpreter::Chip8Interpreter;
use log::{debug, info};
use std::time::{Duration, Instant};

/// How the main loop drives the interpreter.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// instructions per second; 0 runs flat out
    pub instructions_per_second: u32,
    /// stop after this many instructions
    pub max_cycles: Option<u64>,
    /// stop when the program jumps to itself, the usual way of ending
    pub exit_on_halt: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            instructions_per_second: 700,
            max_cycles: None,
            exit_on_halt: false,
        }
    }
}

impl RunConfig {
    fn cycle_time(&self) -> Option<Duration> {
        match self.instructions_per_second {
            0 => None,
            hz => Some(Duration::from_secs(1) / hz),
        }
    }
}

/// why the main loop returned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    CycleLimit,
    QuitRequested,
    Halted { addr: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub frames: u64,
    pub reason: StopReason,
}

/// Wires the interpreter to its presentation layer and runs it.
pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    config: RunConfig,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        config: RunConfig,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            config,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// Step, present, sleep, repeat. Instructions run as fast as possible then
    /// sleep off the rest of their slot, so wallclock rate is right on average.
    pub fn main_loop(&mut self) -> Result<RunSummary, RunError> {
        let cycle_time = self.config.cycle_time();
        let mut cycles = 0u64;
        let mut frames = 0u64;
        info!(
            "running at {} instructions/s, limit {:?}",
            self.config.instructions_per_second, self.config.max_cycles
        );

        let reason = loop {
            if self.config.max_cycles.map_or(false, |max| cycles >= max) {
                break StopReason::CycleLimit;
            }
            if self.input.quit_requested() {
                break StopReason::QuitRequested;
            }

            let start = Instant::now();
            let addr = self.interpreter.program_counter();
            let instruction = self.interpreter.step(self.input)?;
            cycles += 1;

            if self.interpreter.take_redraw() {
                self.display
                    .draw(self.interpreter.frame())
                    .map_err(RunError::Display)?;
                frames += 1;
            }

            if self.config.exit_on_halt && instruction == Instruction::Jump(addr) {
                debug!("jump to self at 0x{:03x}", addr);
                break StopReason::Halted { addr };
            }

            if let Some(slot) = cycle_time {
                spin_sleep::sleep(slot.saturating_sub(start.elapsed()));
            }
        };

        info!("stopped after {} cycles, {} frames: {:?}", cycles, frames, reason);
        Ok(RunSummary {
            cycles,
            frames,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::error::StepError;
    use crate::input::Keypad;
    use std::io;

    fn interpreter(program: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::with_seed(1);
        i.load_bytes(program).unwrap();
        i
    }

    fn flat_out(max_cycles: Option<u64>) -> RunConfig {
        RunConfig {
            instructions_per_second: 0,
            max_cycles,
            exit_on_halt: true,
        }
    }

    #[test]
    fn test_cycle_limit() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = Keypad::new();
        // add forever
        let mut env = Environment::new(
            interpreter(&[0x70, 0x01, 0x12, 0x00]),
            &mut display,
            &mut input,
            flat_out(Some(10)),
        );
        let summary = env.main_loop()?;
        assert_eq!(summary.cycles, 10);
        assert_eq!(summary.reason, StopReason::CycleLimit);
        assert_eq!(env.interpreter().registers()[0], 5);
        Ok(())
    }

    #[test]
    fn test_halt_and_frames() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = Keypad::new();
        // ld f, v0; drw v0, v0, 5; jp 0x204
        let mut env = Environment::new(
            interpreter(&[0xf0, 0x29, 0xd0, 0x05, 0x12, 0x04]),
            &mut display,
            &mut input,
            flat_out(Some(100)),
        );
        let summary = env.main_loop()?;
        assert_eq!(summary.reason, StopReason::Halted { addr: 0x204 });
        assert_eq!(summary.cycles, 3);
        // the initial blank frame, then the glyph
        assert_eq!(summary.frames, 2);
        drop(env);
        assert_eq!(display.frames_drawn, 2);
        let frame = display.last_frame.unwrap();
        assert!(frame.get(0, 0) && frame.get(3, 4));
        Ok(())
    }

    #[test]
    fn test_stack_fault_stops_loop() {
        let mut display = DummyDisplay::new();
        let mut input = Keypad::new();
        let mut env = Environment::new(
            interpreter(&[0x00, 0xee]),
            &mut display,
            &mut input,
            flat_out(None),
        );
        let err = env.main_loop().unwrap_err();
        assert!(matches!(err, RunError::Step(StepError::StackUnderflow { .. })));
    }

    struct QuitAfter(u32);

    impl Input for QuitAfter {
        fn refresh(&mut self, keys: &mut Keypad) -> Result<(), io::Error> {
            self.0 = self.0.saturating_sub(1);
            keys.release_all();
            Ok(())
        }

        fn quit_requested(&self) -> bool {
            self.0 == 0
        }
    }

    #[test]
    fn test_quit_request() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = QuitAfter(4);
        let mut env = Environment::new(
            interpreter(&[0x12, 0x02, 0x12, 0x00]),
            &mut display,
            &mut input,
            flat_out(None),
        );
        let summary = env.main_loop()?;
        assert_eq!(summary.reason, StopReason::QuitRequested);
        assert_eq!(summary.cycles, 4);
        Ok(())
    }

    #[test]
    fn test_paced_loop_takes_time() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = Keypad::new();
        let config = RunConfig {
            instructions_per_second: 500,
            max_cycles: Some(10),
            exit_on_halt: false,
        };
        let mut env = Environment::new(interpreter(&[]), &mut display, &mut input, config);
        let start = Instant::now();
        env.main_loop()?;
        assert!(start.elapsed() >= Duration::from_millis(18));
        Ok(())
    }

    #[test]
    fn test_cycle_time() {
        assert_eq!(RunConfig::default().cycle_time(), Some(Duration::from_secs(1) / 700));
        assert_eq!(flat_out(None).cycle_time(), None);
    }
}
