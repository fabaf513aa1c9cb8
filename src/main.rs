//! Game Boy CPU core runner.
//!
//! Loads a cartridge, binds it to the bus, and runs frames until an error or the frame limit.
//! Usage: dmgcore <path/to/game.gb> [--frames N] [--unthrottled]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ansi_term::Colour::{Green, Red, Yellow};
use anyhow::Context;
use clap::Parser;
use dmgcore::cpu::registers::Registers;
use dmgcore::{CLOCK_HZ, CPU, CYCLES_PER_FRAME, Cartridge, CpuError};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One frame lasts 70224 cycles at 4.194304 MHz, about 16.74 ms (~59.73 Hz).
const FRAME_DURATION: Duration =
    Duration::from_nanos(CYCLES_PER_FRAME as u64 * 1_000_000_000 / CLOCK_HZ as u64);

#[derive(Parser, Debug)]
#[command(version, about = "Run a Game Boy cartridge on the CPU core")]
struct Args {
    /// Cartridge image to load.
    rom: PathBuf,

    /// Stop after this many frames (runs until an error otherwise).
    #[arg(long)]
    frames: Option<u64>,

    /// Run frames back to back instead of pacing them to real time.
    #[arg(long)]
    unthrottled: bool,
}

/// Coloured report of the error that halted emulation, with the register state at that point.
fn failure_line(err: &CpuError, regs: &Registers) -> String {
    format!("{} {} ({})", Red.bold().paint("ERROR"), err, regs)
}

/// The error `main` returns once the failure line is printed. It carries only the frame so the
/// CPU error is not reported twice.
fn stopped(frame: u64) -> anyhow::Error {
    anyhow::anyhow!("emulation stopped in frame {frame}")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let cart = Cartridge::load(&args.rom)
        .with_context(|| format!("loading cartridge {}", args.rom.display()))?;
    info!(
        title = %cart.title(),
        banks = cart.bank_count(),
        kind = ?cart.cartridge_type(),
        "cartridge loaded"
    );

    let mut cpu = CPU::new();
    cpu.bus.load_cartridge(&cart);

    let started = Instant::now();
    let mut frames: u64 = 0;

    while args.frames.is_none_or(|limit| frames < limit) {
        let frame_start = Instant::now();

        if let Err(err) = cpu.run_frame() {
            eprintln!("{}", failure_line(&err, &cpu.regs));
            return Err(stopped(frames));
        }
        frames += 1;

        // Emulation runs far faster than the console; sleep off the rest of the frame.
        if !args.unthrottled {
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_DURATION {
                std::thread::sleep(FRAME_DURATION - elapsed);
            }
        }
    }

    println!(
        "{} ran {} frames in {:.2?} (PC {})",
        Green.bold().paint("DONE"),
        frames,
        started.elapsed(),
        Yellow.paint(format!("${:04X}", cpu.pc())),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_error_is_reported_once() {
        let err = CpuError::UnimplementedOpcode {
            opcode: 0xD3,
            pc: 0x0150,
            extended: false,
        };

        let line = failure_line(&err, &Registers::new());
        assert!(line.contains("unimplemented opcode $D3 at $0150"));

        let returned = format!("{:#}", stopped(7));
        assert_eq!(returned, "emulation stopped in frame 7");
        assert!(!returned.contains("unimplemented"));
    }
}
