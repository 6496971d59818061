use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::{Res, download::file_name_from_url, error::EncoderError};

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http|https)://\S+$").expect("the url pattern is a valid regex")
});

/// Where the video comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Path(PathBuf),
    Url(String),
}

impl Input {
    pub fn parse(raw: &str) -> Self {
        if URL.is_match(raw) {
            Self::Url(raw.to_owned())
        } else {
            Self::Path(PathBuf::from(raw))
        }
    }

    /// The input's name with a `.txt` extension: next to the video for local
    /// files, in the working directory for URLs.
    pub fn default_output(&self) -> PathBuf {
        match self {
            Self::Path(path) => path.with_extension("txt"),
            Self::Url(url) => PathBuf::from(file_name_from_url(url)).with_extension("txt"),
        }
    }

    /// Local inputs have to exist; URLs are only checked when downloaded.
    pub fn check(&self) -> Res<()> {
        match self {
            Self::Path(path) if !path.is_file() => {
                Err(EncoderError::InputNotFound(path.clone()))
            }
            _ => Ok(()),
        }
    }

    /// How the input is shown to the user.
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => file_name(path),
            Self::Url(url) => url.clone(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Everything the encoder needs, built once from the command line.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub input: Input,
    pub output: PathBuf,
    /// Extraction rate; probed from the video when unset.
    pub fps: Option<u32>,
    pub jp2a_args: Vec<String>,
    pub preview: bool,
    /// Overwrite an existing output without asking.
    pub overwrite: bool,
    /// Parent of the temporary working directory.
    pub temp_parent: Option<PathBuf>,
}
