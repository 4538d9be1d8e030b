use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lumen_viewer")]
#[command(about = "Render a scene with the Lumen CPU path tracer")]
pub struct Args {
    /// JSON scene file (renders the built-in demo scene when omitted)
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Samples per pixel
    #[arg(long, short = 's', default_value_t = 50)]
    pub samples: u32,

    /// Maximum bounce depth
    #[arg(long, default_value_t = 5)]
    pub depth: u32,

    /// Number of progressive passes; the last one is saved
    #[arg(long, default_value_t = 1)]
    pub passes: u32,

    /// Seed for reproducible renders
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render buckets in parallel on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Logging level (RUST_LOG filters still apply on top)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    /// Passes actually rendered; at least one so there is always an image to save.
    pub fn pass_count(&self) -> u32 {
        self.passes.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["lumen_viewer"]);
        assert_eq!(args.scene, None);
        assert_eq!((args.width, args.height), (800, 600));
        assert_eq!(args.samples, 50);
        assert_eq!(args.depth, 5);
        assert_eq!(args.passes, 1);
        assert_eq!(args.seed, None);
        assert!(!args.parallel);
        assert_eq!(args.output, PathBuf::from("render.png"));
        assert_eq!(args.log_level, LogLevel::Info);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "lumen_viewer",
            "--scene",
            "room.json",
            "--width",
            "320",
            "-s",
            "8",
            "--seed",
            "42",
            "--parallel",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.scene, Some(PathBuf::from("room.json")));
        assert_eq!(args.width, 320);
        assert_eq!(args.samples, 8);
        assert_eq!(args.seed, Some(42));
        assert!(args.parallel);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_zero_passes_still_renders_once() {
        let args = Args::parse_from(["lumen_viewer", "--passes", "0"]);
        assert_eq!(args.pass_count(), 1);

        let args = Args::parse_from(["lumen_viewer", "--passes", "3"]);
        assert_eq!(args.pass_count(), 3);
    }
}
