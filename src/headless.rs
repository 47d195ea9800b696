use anyhow::{
    Context,
    Error,
};
use log::info;

use crate::{
    config::Config,
    emulator::Emulator,
};

/// Runs a session for a fixed number of cycles without a window.
pub struct Headless {
    config: Config,
}

impl Headless {
    pub fn new(config: &Config) -> Self {
        Self { config: config.clone() }
    }

    /// Returns the number of cycles executed. Stops at the first fault.
    pub fn run(&self, emulator: &mut Emulator) -> Result<u64, Error> {
        let mut ticks = 0;
        for executed in 0..self.config.cycles {
            emulator
                .cycle()
                .with_context(|| format!("session stopped after {} cycles", executed))?;
            while ticks < self.config.ticks_due(executed + 1) {
                emulator.tick_timers();
                ticks += 1;
            }
        }
        info!("headless run finished after {} cycles, {} timer ticks", self.config.cycles, ticks);

        if let Some(path) = &self.config.screenshot {
            emulator
                .display()
                .save_png(path, self.config.pixel_size)
                .with_context(|| format!("writing screenshot to {}", path.display()))?;
        }

        Ok(self.config.cycles)
    }
}
