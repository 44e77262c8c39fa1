use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use emu8_core::constants::CYCLE_PERIOD_MS;

/// Runs a Chip-8 program in a window
#[derive(Debug, Parser)]
#[command(name = "emu8", version)]
pub struct Config {
    /// Path to the program image
    pub rom: PathBuf,

    /// Window pixels per machine pixel
    #[arg(long, default_value_t = 10)]
    pub scale: u32,

    /// Milliseconds between cycles
    #[arg(long, default_value_t = CYCLE_PERIOD_MS)]
    pub cycle_period: u64,

    /// Seed for the random number generator; seeded from the OS if absent
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["emu8", "pong.ch8"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.scale, 10);
        assert_eq!(config.cycle_period, 3);
        assert_eq!(config.seed, None);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "emu8",
            "pong.ch8",
            "--scale",
            "4",
            "--cycle-period",
            "1",
            "--seed",
            "42",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.scale, 4);
        assert_eq!(config.cycle_period, 1);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_requires_rom() {
        assert!(Config::try_parse_from(["emu8"]).is_err());
    }
}
