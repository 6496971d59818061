//! The external programs doing the actual work: ffprobe, ffmpeg and jp2a.
//!
//! Every program is spawned directly with an argument vector; no shell is
//! involved, so paths and renderer arguments are never reinterpreted.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::from_utf8,
};

use tracing::debug;
use which::which;

use crate::{Res, error::EncoderError};

const FPS_PROBE: &[&str] = &[
    "-v",
    "error",
    "-select_streams",
    "v:0",
    "-show_entries",
    "stream=avg_frame_rate",
    "-of",
    "default=nokey=1:noprint_wrappers=1",
];

const SIZE_PROBE: &[&str] = &[
    "-v",
    "error",
    "-select_streams",
    "v:0",
    "-show_entries",
    "stream=width,height",
    "-of",
    "csv=s=x:p=0",
];

/// Where the external programs live.
#[derive(Debug, Clone)]
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub jp2a: PathBuf,
}

impl Tools {
    /// Looks every program up in `PATH`.
    pub fn locate() -> Res<Self> {
        Ok(Self {
            ffmpeg: locate("ffmpeg")?,
            ffprobe: locate("ffprobe")?,
            jp2a: locate("jp2a")?,
        })
    }
}

fn locate(name: &'static str) -> Res<PathBuf> {
    let path = which(name).map_err(|source| EncoderError::MissingTool { name, source })?;
    debug!(tool = name, path = %path.display(), "located");
    Ok(path)
}

/// Runs `program` and returns what it wrote to standard output.
///
/// A non-zero exit becomes [`EncoderError::Tool`], carrying whatever the
/// program wrote to standard error.
pub fn capture<I, S>(program: &Path, args: I) -> Res<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    debug!(?command, "running");

    let output = command.output()?;

    if !output.status.success() {
        return Err(EncoderError::Tool {
            tool: tool_name(program),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    Ok(output.stdout)
}

fn tool_name(program: &Path) -> String {
    program
        .file_stem()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Asks ffprobe for the average frame rate of the first video stream.
///
/// Returns `None` when ffprobe answers with something that is not a usable
/// positive rate.
pub fn probe_fps(ffprobe: &Path, video: &Path) -> Res<Option<u32>> {
    let args = FPS_PROBE.iter().map(OsStr::new).chain([video.as_os_str()]);
    let output = capture(ffprobe, args)?;
    Ok(from_utf8(&output).ok().and_then(parse_rate))
}

/// Asks ffprobe for the width and height of the first video stream.
pub fn probe_resolution(ffprobe: &Path, video: &Path) -> Res<Option<(u32, u32)>> {
    let args = SIZE_PROBE.iter().map(OsStr::new).chain([video.as_os_str()]);
    let output = capture(ffprobe, args)?;
    Ok(from_utf8(&output).ok().and_then(parse_resolution))
}

/// Dumps the frames of `video` at `fps` into `out_dir` as `frame_0001.jpg`,
/// `frame_0002.jpg` and so on.
pub fn extract_frames(ffmpeg: &Path, video: &Path, fps: u32, out_dir: &Path) -> Res<()> {
    let pattern = out_dir.join("frame_%04d.jpg");
    let fps = fps.to_string();

    capture(
        ffmpeg,
        [
            OsStr::new("-nostdin"),
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            video.as_os_str(),
            OsStr::new("-r"),
            OsStr::new(&fps),
            pattern.as_os_str(),
        ],
    )?;
    Ok(())
}

/// Renders one picture with jp2a and returns the ASCII art.
pub fn jp2a(jp2a: &Path, jp2a_args: &[String], image: &Path) -> Res<Vec<u8>> {
    let args = jp2a_args.iter().map(OsStr::new).chain([image.as_os_str()]);
    capture(jp2a, args)
}

/// Parses ffprobe's `num/den` rate (or a plain integer), dividing like
/// integers do. Zero and malformed rates give `None`.
pub fn parse_rate(text: &str) -> Option<u32> {
    let text = text.lines().next()?.trim();

    let fps = match text.split_once('/') {
        Some((number, denominator)) => {
            let number = number.trim().parse::<u64>().ok()?;
            let denominator = denominator.trim().parse::<u64>().ok()?;
            number.checked_div(denominator)?
        }
        None => text.parse::<u64>().ok()?,
    };

    u32::try_from(fps).ok().filter(|&fps| fps > 0)
}

/// Parses ffprobe's `<width>x<height>` answer.
pub fn parse_resolution(text: &str) -> Option<(u32, u32)> {
    let (width, height) = text.lines().next()?.trim().split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}
