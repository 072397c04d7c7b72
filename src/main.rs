use clap::{Parser, Subcommand};
use log::{error, info};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chip8vm::config::Config;
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::{Environment, RunOutcome};
use chip8vm::input::{KeyLatch, StdinInput};
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::rng::ChipRand;

#[derive(Parser)]
#[command(name = "chip8vm", version, about = "CHIP-8 interpreter for the terminal")]
struct Cli {
    /// TOML config file; every setting has a default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// run a ROM
    Run {
        rom: PathBuf,
        /// milliseconds to sleep between cycles
        frame_delay_ms: Option<u64>,
        /// seed the random number generator for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// step through a ROM (not implemented yet)
    Debug { rom: PathBuf },
    /// disassemble a ROM (not implemented yet)
    Disassemble { rom: PathBuf },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // usage and help are not failures
            e.print()?;
            return Ok(());
        }
    };

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Run {
            rom,
            frame_delay_ms,
            seed,
        } => {
            if let Some(ms) = frame_delay_ms {
                config.frame_delay_ms = ms;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Err(e) = run(&rom, &config) {
                error!("{}: {}", rom.display(), e);
                return Err(e);
            }
        }
        Command::Debug { .. } | Command::Disassemble { .. } => {
            println!("Not implemented yet.");
        }
    }
    Ok(())
}

fn run(rom: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    // load everything before touching the terminal, so errors print cleanly
    let image = fs::read(rom)?;
    let rng = ChipRand::from_seed(config.seed);
    let mut interpreter = Chip8Interpreter::new(config.sprite_edges, Box::new(rng));
    interpreter.load_program(&image)?;
    let latch = KeyLatch::new(config.key_table()?, config.key_hold_frames);

    let outcome = {
        let mut display = MonoTermDisplay::new()?;
        let mut input = StdinInput::new(latch)?;
        let mut environment = Environment::new(
            interpreter,
            &mut display,
            &mut input,
            config.frame_delay(),
            config.on_unknown_instruction,
        );
        environment.main_loop(None)
    };

    // shove some junk on stdout to stop the cli messing up the last frame
    println!();
    match outcome? {
        RunOutcome::Quit => info!("quit by user"),
        RunOutcome::CycleLimit => info!("cycle limit reached"),
    }
    Ok(())
}
