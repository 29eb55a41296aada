use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Mutex;

use chip8::config::{Chip8Config, IndexOverflow, JumpOffset, Quirks, ShiftSource, SpriteEdges};
use chip8::display::MonoTermDisplay;
use chip8::environment::Environment;
use chip8::input::{StdinInput, CHIP8_CONVENTIONAL_KEYMAP, CHIP8_LITERAL_KEYMAP};
use chip8::instruction::disassemble;
use chip8::interpreter::Chip8Interpreter;
use chip8::sound::{Mute, SimpleBeep, Sound};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Legacy,
    Modern,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Keymap {
    /// 1234/QWER/ASDF/ZXCV
    Conventional,
    /// 0-9, A-F
    Literal,
}

/// CHIP-8 interpreter in the terminal
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// program image to run
    rom: PathBuf,

    /// starting set of quirks; individual options below override it
    #[arg(long, value_enum, default_value = "legacy")]
    quirks: Preset,
    /// 8XY1/8XY2/8XY3 zero VF
    #[arg(long, action = ArgAction::Set)]
    bitwise_resets_vf: Option<bool>,
    #[arg(long, value_enum)]
    shift_source: Option<ShiftSource>,
    #[arg(long, value_enum)]
    jump_offset: Option<JumpOffset>,
    #[arg(long, value_enum)]
    sprite_edges: Option<SpriteEdges>,
    /// FX55/FX65 advance I
    #[arg(long, action = ArgAction::Set)]
    load_store_advances_i: Option<bool>,
    #[arg(long, value_enum)]
    index_overflow: Option<IndexOverflow>,

    /// where the program is loaded, e.g. 0x200
    #[arg(long, value_parser = parse_addr, default_value = "0x200")]
    program_addr: u16,
    /// where the hex glyphs live, e.g. 0x050
    #[arg(long, value_parser = parse_addr, default_value = "0x050")]
    font_addr: u16,
    /// instructions per batch
    #[arg(long, default_value_t = 10)]
    cycles: u32,
    /// batches per second
    #[arg(long, default_value_t = 60)]
    batch_hz: u32,
    #[arg(long, default_value_t = 60)]
    timer_hz: u32,
    #[arg(long, default_value_t = 60)]
    refresh_hz: u32,
    /// seed CXNN for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// stop after this many batches
    #[arg(long)]
    max_batches: Option<u64>,

    #[arg(long, value_enum, default_value = "conventional")]
    keymap: Keymap,
    #[arg(long)]
    mute: bool,

    /// list the program instead of running it
    #[arg(long)]
    disassemble: bool,

    /// the terminal is busy drawing the screen, so logs go here
    #[arg(long, default_value = "chip8.log")]
    log_file: PathBuf,
    /// tracing filter; falls back to RUST_LOG, then chip8=info
    #[arg(long)]
    log_filter: Option<String>,
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    let addr = u16::from_str_radix(digits, 16).map_err(|e| format!("{}: {}", s, e))?;
    if addr > 0x0fff {
        return Err(format!("{} is outside the 4K address space", s));
    }
    Ok(addr)
}

impl Args {
    fn config(&self) -> Chip8Config {
        let mut quirks = match self.quirks {
            Preset::Legacy => Quirks::legacy(),
            Preset::Modern => Quirks::modern(),
        };
        if let Some(v) = self.bitwise_resets_vf {
            quirks.bitwise_resets_vf = v;
        }
        if let Some(v) = self.shift_source {
            quirks.shift_source = v;
        }
        if let Some(v) = self.jump_offset {
            quirks.jump_offset = v;
        }
        if let Some(v) = self.sprite_edges {
            quirks.sprite_edges = v;
        }
        if let Some(v) = self.load_store_advances_i {
            quirks.load_store_advances_i = v;
        }
        if let Some(v) = self.index_overflow {
            quirks.index_overflow = v;
        }
        Chip8Config {
            quirks,
            program_addr: self.program_addr,
            font_addr: self.font_addr,
            cycles_per_batch: self.cycles,
            timer_hz: self.timer_hz,
            refresh_hz: self.refresh_hz,
            batch_hz: self.batch_hz,
            rng_seed: self.seed,
            ..Chip8Config::default()
        }
    }
}

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let filter = match &args.log_filter {
        Some(f) => EnvFilter::try_new(f)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chip8=info")),
    };
    let file = File::create(&args.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    let mut f = File::open(&args.rom)?;
    if args.disassemble {
        let mut program = Vec::new();
        f.read_to_end(&mut program)?;
        for line in disassemble(&program, config.program_addr, config.quirks.jump_offset) {
            println!("{}", line);
        }
        return Ok(());
    }

    init_logging(&args)?;

    // a program that doesn't fit is rejected before the terminal is taken over
    let mut interpreter = Chip8Interpreter::new(&config)?;
    interpreter.load_program(&mut f)?;

    let mut display = MonoTermDisplay::new(config.width, config.height)?;
    let mut input = StdinInput::new(match args.keymap {
        Keymap::Conventional => &CHIP8_CONVENTIONAL_KEYMAP,
        Keymap::Literal => &CHIP8_LITERAL_KEYMAP,
    })?;
    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beeper };

    let summary = {
        let mut env =
            Environment::with_interpreter(&config, interpreter, &mut display, &mut input, sound)?;
        env.main_loop(args.max_batches)?
    };

    // put the terminal back before saying anything
    drop(input);
    drop(display);
    eprintln!(
        "ran {} instructions in {} batches; {} faults (see {})",
        summary.dispatched,
        summary.batches,
        summary.faults,
        args.log_file.display()
    );
    Ok(())
}
