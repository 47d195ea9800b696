use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::constants;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "CHIP-8 interpreter")]
pub struct Args {
    /// Program image to load at 0x200
    pub rom: PathBuf,

    /// Size of one CHIP-8 pixel in window pixels
    #[arg(long, default_value_t = constants::PIXEL_SIZE)]
    pub pixel_size: u32,

    /// Instructions executed per second
    #[arg(long, default_value_t = constants::INSTRUCTIONS_PER_SECOND)]
    pub ips: u32,

    /// Timer decrement rate
    #[arg(long, default_value_t = constants::TIMER_HZ)]
    pub timer_hz: u32,

    /// Seed for the random number generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run without a window
    #[arg(long)]
    pub headless: bool,

    /// Number of instructions to execute in headless mode
    #[arg(long, default_value_t = constants::HEADLESS_CYCLES)]
    pub cycles: u64,

    /// Write the final frame to this PNG file (headless only)
    #[arg(long)]
    pub screenshot: Option<PathBuf>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    #[error("timer rate {timer_hz} exceeds instruction rate {ips}")]
    TimerFasterThanClock { timer_hz: u32, ips: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rom: PathBuf,
    pub pixel_size: u32,
    pub instructions_per_second: u32,
    pub timer_hz: u32,
    pub seed: Option<u64>,
    pub headless: bool,
    pub cycles: u64,
    pub screenshot: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        for (name, value) in [("pixel size", args.pixel_size), ("ips", args.ips), ("timer hz", args.timer_hz)] {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }
        if args.timer_hz > args.ips {
            return Err(ConfigError::TimerFasterThanClock {
                timer_hz: args.timer_hz,
                ips: args.ips,
            });
        }

        let config = Self {
            rom: args.rom,
            pixel_size: args.pixel_size,
            instructions_per_second: args.ips,
            timer_hz: args.timer_hz,
            seed: args.seed,
            headless: args.headless,
            cycles: args.cycles,
            screenshot: args.screenshot,
        };
        log::debug!("resolved configuration: {:?}", config);

        Ok(config)
    }

    /// Timer ticks owed once `cycles` instructions have run.
    pub fn ticks_due(&self, cycles: u64) -> u64 {
        cycles * u64::from(self.timer_hz) / u64::from(self.instructions_per_second)
    }

    pub fn ms_per_instruction(&self) -> f64 {
        1000.0 / self.instructions_per_second as f64
    }

    pub fn ms_per_tick(&self) -> f64 {
        1000.0 / self.timer_hz as f64
    }
}
