use std::{path::PathBuf, process::exit};

use clap::{ArgAction, Parser, crate_version, error::ErrorKind, value_parser};

use crate::primitives::{EncodeConfig, Input};

#[derive(Parser, Debug)]
#[command(
    version(crate_version!()),
    about = "Converts a video into an ASCII video file",
    disable_version_flag = true
)]
pub struct Args {
    /// Input video file or http(s) URL
    #[arg(short, long)]
    pub input: String,

    /// Output ASCII file, defaults to the input's name with a .txt extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Frames per second, defaults to the video's own rate
    #[arg(short, long, value_parser = value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Arguments for jp2a, split on whitespace
    #[arg(short, long, default_value = "--colors", allow_hyphen_values = true)]
    pub jp2a: String,

    /// Play the ASCII video once it is written
    #[arg(short, long)]
    pub preview: bool,

    /// Overwrite the output file without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Sets a custom path to create the temporary frame directory in.
    /// Pointing it to /dev/shm keeps the frames in memory.
    #[arg(long)]
    pub temp: Option<PathBuf>,

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

    pub fn into_config(self) -> EncodeConfig {
        let input = Input::parse(&self.input);
        let output = self.output.unwrap_or_else(|| input.default_output());

        EncodeConfig {
            input,
            output,
            fps: self.fps,
            jp2a_args: self.jp2a.split_whitespace().map(str::to_owned).collect(),
            preview: self.preview,
            overwrite: self.yes,
            temp_parent: self.temp,
        }
    }
}
