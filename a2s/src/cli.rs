use std::{path::PathBuf, process::exit};

use clap::{ArgAction, Parser, crate_version, error::ErrorKind, value_parser};
use libasciiv::{PlaybackConfig, validate_speed};

#[derive(Parser, Debug)]
#[command(
    version(crate_version!()),
    about = "Plays an ASCII video file in the terminal",
    disable_version_flag = true
)]
pub struct Args {
    /// Path to the ASCII video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Playback speed factor (e.g. 0.5 or 2)
    #[arg(
        short,
        long,
        default_value_t = 1.0,
        value_parser = parse_speed,
        allow_negative_numbers = true
    )]
    pub speed: f64,

    /// Frames per second, overrides the rate stored in the file
    #[arg(short, long, value_parser = value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Args {
    /// Parses the command line.
    ///
    /// `--version` exits with 0; help and every usage error exit with 1.
    pub fn parse_or_exit() -> Self {
        Self::try_parse().unwrap_or_else(|err| {
            let code = match err.kind() {
                ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            err.print().ok();
            exit(code);
        })
    }

    pub fn into_config(self) -> (PathBuf, PlaybackConfig) {
        (self.input, PlaybackConfig { fps: self.fps, speed: self.speed })
    }
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let speed = value
        .parse::<f64>()
        .map_err(|_| format!("`{value}` is not a number"))?;

    validate_speed(speed).map_err(|err| err.to_string())
}
