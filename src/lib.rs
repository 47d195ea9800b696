use anyhow::Error;
use log::info;

pub mod config;
pub mod constants;
pub mod display;
pub mod emulator;
pub mod frontend;
pub mod headless;
pub mod input;
pub mod mem;
pub mod opcode;
mod process;
pub mod rng;
pub mod timers;

pub use config::{
    Args,
    Config,
};
pub use emulator::{
    Emulator,
    EmulatorError,
};
pub use mem::Rom;
pub use process::ProcessingError;

/// Builds an emulator for `config` with its ROM loaded and ready to cycle.
pub fn boot(config: &Config) -> Result<Emulator, Error> {
    let rom = Rom::load(&config.rom)?;
    let mut emulator = match config.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    emulator.load(rom.data())?;
    info!("booted {} ({} bytes)", config.rom.display(), rom.len());

    Ok(emulator)
}
