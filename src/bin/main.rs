use chipvm::{terminal_logger, Config, Emulator, TimerClock, TIMER_INTERVAL};
use sloggers::types::Severity;
use std::process;

/// Runs a ROM headless for a number of frames (passes of `cycles_per_frame`
/// instructions, paced at 60 Hz), printing the screen as text
/// every time it changes
fn main() {
    let mut args = std::env::args().skip(1);
    let rom = match args.next() {
        Some(rom) => rom,
        None => {
            eprintln!("Usage: chipvm <ROM file> [frames]");
            process::exit(1);
        }
    };
    let frames: u64 = args.next().and_then(|f| f.parse().ok()).unwrap_or(600);

    if let Err(e) = run(&rom, frames) {
        eprintln!("chipvm: {}", e);
        process::exit(1);
    }
}

fn run(rom: &str, frames: u64) -> chipvm::Result<()> {
    let logger = terminal_logger(Severity::Info)?;
    let config = Config::default();
    let cycles_per_frame = config.cycles_per_frame;
    let mut emulator = Emulator::with_game_file(rom, Some(logger), config)?;
    let mut clock = TimerClock::new();

    let mut frame = 0;
    while frame < frames {
        for _ in 0..cycles_per_frame {
            emulator.cycle()?;
        }

        // decay the timers by however much real time actually passed
        for _ in 0..clock.ticks_elapsed() {
            emulator.tick_timers();
        }
        frame += 1;

        if emulator.take_redraw() {
            println!("{}", emulator.graphics());
        }

        std::thread::sleep(TIMER_INTERVAL);
    }
    Ok(())
}
