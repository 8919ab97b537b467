use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::loader::catalog::DEFAULT_RHYTHM;
use crate::playback::{DEFAULT_VOLUME_DB, MAX_VOLUME_DB, MIN_VOLUME_DB};

#[derive(Parser, Debug)]
#[command(name = "biorhythms", version, about = "Listen to a heart rhythm while you watch it")]
pub struct Args {
    /// Directory with `<rhythm>.json` recordings (built-in traces otherwise)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Rhythm to load at startup
    #[arg(long, default_value = DEFAULT_RHYTHM)]
    pub rhythm: String,

    /// Starting volume in dB (-60..=0)
    #[arg(long, default_value_t = DEFAULT_VOLUME_DB, allow_negative_numbers = true)]
    pub volume: f32,

    /// Write logs here (the terminal is busy drawing)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Screen refresh rate; playback timing doesn't depend on it
    #[arg(long, default_value_t = 60)]
    pub fps: u32,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub rhythm: String,
    pub volume_db: f32,
    pub log_file: Option<PathBuf>,
    pub frame_time: Duration,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let fps = args.fps.clamp(1, 240);
        let volume_db = if args.volume.is_nan() {
            DEFAULT_VOLUME_DB
        } else {
            args.volume.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
        };
        Self {
            data_dir: args.data_dir,
            rhythm: args.rhythm,
            volume_db,
            log_file: args.log_file,
            frame_time: Duration::from_secs(1) / fps,
        }
    }
}

impl Config {
    pub fn from_args() -> Self {
        Args::parse().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Config {
        Args::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn defaults() {
        let cfg = parse(&["biorhythms"]);
        assert_eq!(cfg.rhythm, "sinus_normal");
        assert_eq!(cfg.volume_db, -12.0);
        assert!(cfg.data_dir.is_none());
        assert_eq!(cfg.frame_time, Duration::from_secs(1) / 60);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(parse(&["biorhythms", "--volume", "-90"]).volume_db, -60.0);
        assert_eq!(parse(&["biorhythms", "--volume", "6"]).volume_db, 0.0);
    }

    #[test]
    fn custom_rhythm_and_dir() {
        let cfg = parse(&["biorhythms", "--rhythm", "afib", "--data-dir", "/tmp/ecg", "--fps", "0"]);
        assert_eq!(cfg.rhythm, "afib");
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/ecg")));
        assert_eq!(cfg.frame_time, Duration::from_secs(1));
    }
}
