use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use chip8::display::{DummyDisplay, MonoTermDisplay};
use chip8::input::TermInput;
use chip8::{Chip8Interpreter, Environment, Keypad, RunConfig};
use clap::Parser;
use crossterm::terminal;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "chip8")]
#[command(about = "Run a CHIP-8 program in the terminal", long_about = None)]
struct Args {
    /// Path to the program image
    rom: PathBuf,

    /// Instructions per second (0 for flat out)
    #[arg(long, default_value_t = 700)]
    hz: u32,

    /// Stop after this many instructions
    #[arg(long)]
    cycles: Option<u64>,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// No terminal UI; print the last frame when done
    #[arg(long)]
    headless: bool,

    /// Stop when the program jumps to itself
    #[arg(long)]
    exit_on_halt: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    // initialise
    let mut interpreter = match args.seed {
        Some(seed) => Chip8Interpreter::with_seed(seed),
        None => Chip8Interpreter::new(),
    };

    // load a program
    let mut f = File::open(&args.rom)?;
    let len = interpreter.load_program(&mut f)?;
    info!("loaded {} ({} bytes)", args.rom.display(), len);

    let config = RunConfig {
        instructions_per_second: args.hz,
        max_cycles: args.cycles,
        exit_on_halt: args.exit_on_halt,
    };

    if args.headless {
        let mut display = DummyDisplay::new();
        let mut input = Keypad::new();
        let summary = Environment::new(interpreter, &mut display, &mut input, config).main_loop()?;
        println!("{:?}", summary);
        if let Some(frame) = display.last_frame {
            print!("{}", frame);
        }
        return Ok(());
    }

    terminal::enable_raw_mode()?;
    let result = run_in_terminal(interpreter, config);
    terminal::disable_raw_mode()?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    println!("{:?}", result?);
    Ok(())
}

fn run_in_terminal(
    interpreter: Chip8Interpreter,
    config: RunConfig,
) -> Result<chip8::RunSummary, Box<dyn Error>> {
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new();
    let summary = Environment::new(interpreter, &mut display, &mut input, config).main_loop()?;
    Ok(summary)
}
