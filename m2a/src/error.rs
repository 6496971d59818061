use std::{error::Error, fmt::Display, io, path::PathBuf, process::ExitStatus};

use libasciiv::colours::{RESET, YELLOW};

const NO_FRAMES: &str = "\
FFmpeg did not produce any frame.
Check that the input is a video file with a video stream.";

#[derive(Debug)]
pub enum EncoderError {
    CtrlC(ctrlc::Error),
    Io(io::Error),
    Reqwest(reqwest::Error),
    Template(indicatif::style::TemplateError),
    Prompt(dialoguer::Error),
    Player(libasciiv::PlayerError),
    MissingTool { name: &'static str, source: which::Error },
    Tool { tool: String, status: ExitStatus, stderr: String },
    InputNotFound(PathBuf),
    NoFrames,
}

#[allow(clippy::enum_glob_use)]
use EncoderError::*;

impl Error for EncoderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CtrlC(e) => Some(e),
            Io(e) => Some(e),
            Reqwest(e) => Some(e),
            Template(e) => Some(e),
            Prompt(e) => Some(e),
            Player(e) => Some(e),
            MissingTool { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Display for EncoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoFrames => write!(f, "{NO_FRAMES}"),
            InputNotFound(path) => {
                write!(f, "Input file {YELLOW}'{}'{RESET} not found", path.display())
            }
            MissingTool { name, source } => {
                write!(f, "{name} is required but was not found in PATH ({source})")
            }
            Tool { tool, status, stderr } => {
                write!(
                    f,
                    "{tool} failed with status: {{{}}}",
                    status
                        .code()
                        .map_or_else(|| "TERMINATED".into(), |s| s.to_string())
                )?;
                if !stderr.is_empty() {
                    write!(f, "\n{stderr}")?;
                }
                Ok(())
            }
            CtrlC(e) => write!(f, "{e}"),
            Io(e) => write!(f, "{e}"),
            Reqwest(e) => write!(f, "{e}"),
            Template(e) => write!(f, "{e}"),
            Prompt(e) => write!(f, "{e}"),
            Player(e) => write!(f, "{e}"),
        }
    }
}

macro_rules! map_error {
   ($($from:ty => $enum_variant:tt,)*) => {
        $(impl From<$from> for EncoderError {
            fn from(value: $from) -> Self {
                Self::$enum_variant(value)
            }
        })*
    };
}

map_error! {
    ctrlc::Error => CtrlC,
    io::Error => Io,
    reqwest::Error => Reqwest,
    indicatif::style::TemplateError => Template,
    dialoguer::Error => Prompt,
    libasciiv::PlayerError => Player,
}
