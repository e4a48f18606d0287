//! # interpreter
//!
//! The whole machine as one owned value: memory, V0-VF, I, the program
//! counter, a 16-deep call stack, the two timers, the key latch and the
//! frame. Nothing is global, so any number of machines can run side by side.
//!
//! VF doubles as the flag register. It is an ordinary slot in `v` that the
//! ALU and draw instructions also write; every such write is marked below.
use crate::display::PixelBuffer;
use crate::error::{LoadError, StepError};
use crate::input::{Input, Keypad};
use crate::instruction::Instruction;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::timer::{Clock, SystemClock, Timers};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::io;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF: carry, borrow, shifted-out bit and collision all land here
pub const FLAG_REGISTER: usize = 0xf;

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    frame: PixelBuffer,
    v: [u8; REGISTER_COUNT],
    i: u16,
    program_counter: u16,
    stack: [u16; STACK_DEPTH],
    stack_pointer: usize,
    timers: Timers,
    keys: Keypad,
    redraw: bool,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
}

impl Chip8Interpreter {
    /// a fresh machine on the system clock with an entropy-seeded generator
    pub fn new() -> Self {
        Self::with_parts(Box::new(SystemClock), Box::new(StdRng::from_entropy()))
    }

    /// a fresh machine whose CXNN sequence is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_parts(Box::new(SystemClock), Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_parts(clock: Box<dyn Clock>, rng: Box<dyn RngCore>) -> Self {
        let memory = Chip8MemoryMap::new();
        let program_counter = memory.program_addr;
        Chip8Interpreter {
            memory,
            frame: PixelBuffer::new(),
            v: [0; REGISTER_COUNT],
            i: 0,
            program_counter,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            timers: Timers::new(clock.now()),
            keys: Keypad::new(),
            // force an initial blank render
            redraw: true,
            clock,
            rng,
        }
    }

    /// load a chip8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, LoadError> {
        self.memory.load_program(reader)
    }

    pub fn load_bytes(&mut self, mut program: &[u8]) -> Result<usize, LoadError> {
        self.load_program(&mut program)
    }

    /// Run the 60Hz timers up to the current time. `step` calls this before
    /// every instruction.
    pub fn tick_timers(&mut self) -> u32 {
        self.timers.tick(self.clock.now())
    }

    /// One cycle: timers, key latch, fetch, decode, execute.
    ///
    /// Returns the instruction that ran. On a stack fault the program counter
    /// is already past the offending instruction and nothing else has changed.
    pub fn step(&mut self, input: &mut dyn Input) -> Result<Instruction, StepError> {
        self.tick_timers();
        input.refresh(&mut self.keys)?;

        let addr = self.program_counter;
        let word = self.memory.get_word(addr);
        self.program_counter = self.program_counter.wrapping_add(2);
        let instruction = Instruction::decode(word);
        trace!("{:03x}: {:04x}  {}", addr, word, instruction);

        self.execute(instruction)?;
        Ok(instruction)
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), StepError> {
        use Instruction::*;

        match instruction {
            System(_) | Unknown(_) => (),
            ClearScreen => {
                self.frame.clear();
                self.redraw = true;
            }
            Return => self.program_counter = self.pop_stack()?,
            Jump(nnn) => self.program_counter = nnn,
            Call(nnn) => {
                self.push_stack(self.program_counter, nnn)?;
                self.program_counter = nnn;
            }
            SkipIfEqual { x, nn } => self.skip_if(self.reg(x) == nn),
            SkipIfNotEqual { x, nn } => self.skip_if(self.reg(x) != nn),
            SkipIfRegistersEqual { x, y } => self.skip_if(self.reg(x) == self.reg(y)),
            SkipIfRegistersNotEqual { x, y } => self.skip_if(self.reg(x) != self.reg(y)),
            Load { x, nn } => self.set_reg(x, nn),
            // no carry for the immediate form; VF untouched
            AddImmediate { x, nn } => self.set_reg(x, self.reg(x).wrapping_add(nn)),
            Move { x, y } => self.set_reg(x, self.reg(y)),
            Or { x, y } => self.set_reg(x, self.reg(x) | self.reg(y)),
            And { x, y } => self.set_reg(x, self.reg(x) & self.reg(y)),
            Xor { x, y } => self.set_reg(x, self.reg(x) ^ self.reg(y)),
            Add { x, y } => {
                let (sum, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_flag_then_reg(x, sum, carry as u8);
            }
            Sub { x, y } => {
                let (vx, vy) = (self.reg(x), self.reg(y));
                self.set_flag_then_reg(x, vx.wrapping_sub(vy), (vx > vy) as u8);
            }
            SubReversed { x, y } => {
                let (vx, vy) = (self.reg(x), self.reg(y));
                self.set_flag_then_reg(x, vy.wrapping_sub(vx), (vx < vy) as u8);
            }
            // shifts read VY and write VX, as the COSMAC VIP interpreter did
            ShiftRight { x, y } => {
                let vy = self.reg(y);
                self.set_reg_with_flag(x, vy >> 1, vy & 0x01);
            }
            ShiftLeft { x, y } => {
                let vy = self.reg(y);
                self.set_reg_with_flag(x, vy << 1, vy >> 7);
            }
            LoadIndex(nnn) => self.i = nnn,
            JumpOffset(nnn) => self.program_counter = nnn.wrapping_add(self.reg(0) as u16),
            Random { x, nn } => {
                let byte = (self.rng.next_u32() & 0xff) as u8;
                self.set_reg(x, byte & nn);
            }
            Draw { x, y, n } => self.draw(x, y, n),
            SkipIfKeyPressed { x } => self.skip_if(self.keys.is_pressed(self.reg(x))),
            SkipIfKeyNotPressed { x } => self.skip_if(!self.keys.is_pressed(self.reg(x))),
            GetDelay { x } => self.set_reg(x, self.timers.delay),
            WaitKey { x } => match self.keys.lowest_pressed() {
                Some(key) => self.set_reg(x, key),
                // replay this instruction next cycle
                None => self.program_counter = self.program_counter.wrapping_sub(2),
            },
            SetDelay { x } => self.timers.delay = self.reg(x),
            SetSound { x } => self.timers.sound = self.reg(x),
            AddIndex { x } => self.i = self.i.wrapping_add(self.reg(x) as u16),
            LoadGlyph { x } => self.i = self.memory.glyph_addr(self.reg(x)),
            StoreBcd { x } => {
                let vx = self.reg(x);
                for (offset, digit) in [vx / 100, vx / 10 % 10, vx % 10].into_iter().enumerate() {
                    self.memory.write_byte(self.i.wrapping_add(offset as u16), digit);
                }
            }
            StoreRegisters { x } => {
                for r in 0..=x {
                    self.memory.write_byte(self.i.wrapping_add(r as u16), self.reg(r));
                }
            }
            LoadRegisters { x } => {
                for r in 0..=x {
                    self.set_reg(r, self.memory.read_byte(self.i.wrapping_add(r as u16)));
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, x: u8, y: u8, n: u8) {
        let origin = (self.reg(x) as usize, self.reg(y) as usize);
        let sprite: Vec<u8> = (0..n as u16)
            .map(|row| self.memory.read_byte(self.i.wrapping_add(row)))
            .collect();
        let collision = self.frame.draw_sprite(origin.0, origin.1, &sprite);
        // VF: collision
        self.v[FLAG_REGISTER] = collision as u8;
        self.redraw = true;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    fn reg(&self, r: u8) -> u8 {
        self.v[r as usize & 0xf]
    }

    fn set_reg(&mut self, r: u8, value: u8) {
        self.v[r as usize & 0xf] = value;
    }

    /// Add and subtract: VF first, then the result. With VF as the
    /// destination the result survives.
    fn set_flag_then_reg(&mut self, r: u8, value: u8, flag: u8) {
        self.v[FLAG_REGISTER] = flag;
        self.set_reg(r, value);
    }

    /// Shifts: the result first, then VF. With VF as the destination the
    /// shifted-out bit survives.
    fn set_reg_with_flag(&mut self, r: u8, value: u8, flag: u8) {
        self.set_reg(r, value);
        self.v[FLAG_REGISTER] = flag;
    }

    fn push_stack(&mut self, return_addr: u16, target: u16) -> Result<(), StepError> {
        let slot = self.stack.get_mut(self.stack_pointer).ok_or_else(|| {
            debug!("stack overflow at 0x{:03x}", return_addr.wrapping_sub(2));
            StepError::StackOverflow {
                pc: return_addr.wrapping_sub(2),
                target,
            }
        })?;
        *slot = return_addr;
        self.stack_pointer += 1;
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u16, StepError> {
        if self.stack_pointer == 0 {
            let pc = self.program_counter.wrapping_sub(2);
            debug!("stack underflow at 0x{:03x}", pc);
            return Err(StepError::StackUnderflow { pc });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }

    // read-only views for the presentation layer, debuggers and tests

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw
    }

    /// Checks and clears the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// the buzzer should sound while this is true
    pub fn sound_active(&self) -> bool {
        self.timers.sound > 0
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn keys(&self) -> &Keypad {
        &self.keys
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
