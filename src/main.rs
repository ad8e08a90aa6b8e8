mod config;
mod script;

use clap::Parser;
use config::RunnerConfig;
use log::{info, warn};
use pockemu_core::{
    gameboy::GameBoy,
    ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
};
use script::ScriptedPress;
use std::{
    error::Error,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(version, about = "Headless DMG emulator runner")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Number of frames to run
    #[arg(long)]
    frames: Option<usize>,

    /// Runner config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write cartridge RAM here instead of next to the ROM
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Write the last frame as a PNG
    #[arg(long, value_name = "PATH")]
    screenshot: Option<PathBuf>,

    /// Write audio as raw interleaved stereo s16le
    #[arg(long, value_name = "PATH")]
    audio_out: Option<PathBuf>,

    /// Hold a button, e.g. start@120 or a@300:10
    #[arg(long, value_name = "BUTTON@FRAME[:LEN]")]
    press: Vec<ScriptedPress>,

    /// Do not write cartridge RAM on exit
    #[arg(long)]
    no_save: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Print CPU state every N frames
    #[arg(long, value_name = "N")]
    trace_every: Option<usize>,
}

fn write_png(
    path: &Path,
    cfg: &RunnerConfig,
    frame: &[u8; SCREEN_WIDTH * SCREEN_HEIGHT],
) -> Result<(), Box<dyn Error>> {
    let rgb: Vec<u8> = frame.iter().flat_map(|&s| cfg.shade_rgb(s)).collect();
    let w = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(w, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgb)?;
    Ok(())
}

fn write_samples(out: &mut impl Write, samples: &[(i16, i16)]) -> std::io::Result<()> {
    for &(l, r) in samples {
        out.write_all(&l.to_le_bytes())?;
        out.write_all(&r.to_le_bytes())?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let cfg = args
        .config
        .as_deref()
        .map(config::load_from_file)
        .unwrap_or_default();
    let frames = args.frames.unwrap_or(cfg.frames);

    let mut gb = GameBoy::from_file(&args.rom)?;
    gb.apu.set_sample_rate(cfg.sample_rate);
    info!("Running {} for {frames} frames", args.rom.display());

    let mut audio = match &args.audio_out {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut cycles = 0u64;
    let mut illegal = 0usize;
    for frame in 0..frames {
        for (button, held) in script::buttons_at(&args.press, frame) {
            gb.press(button, held);
        }

        cycles += u64::from(gb.run_frame());
        gb.ppu.clear_frame_flag();
        illegal += gb.cpu.take_diagnostics().len();

        let samples = gb.take_audio();
        if let Some(out) = audio.as_mut() {
            write_samples(out, &samples)?;
        }

        if let Some(n) = args.trace_every
            && n > 0
            && frame % n == 0
        {
            println!("[frame {frame}] {}", gb.cpu.debug_state());
        }
    }

    if let Some(mut out) = audio {
        out.flush()?;
    }
    if illegal > 0 {
        warn!("{illegal} illegal opcode(s) executed");
    }
    info!("Ran {frames} frames ({cycles} M-cycles)");

    if let Some(path) = &args.screenshot {
        write_png(path, &cfg, gb.framebuffer())?;
        info!("Wrote screenshot to {}", path.display());
    }

    if !args.no_save && cfg.save_on_exit {
        match &args.save {
            Some(path) => gb.save_ram_to(path)?,
            None => gb.save_ram()?,
        }
    }

    Ok(())
}
