use std::{
    fs::{File, create_dir, read_dir},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use libasciiv::{
    DEFAULT_FPS,
    colours::{BCYAN, BOLD, GREEN, RESET, YELLOW},
    write_frame, write_header,
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::{
    Res,
    children::{Tools, extract_frames, jp2a, probe_fps, probe_resolution},
    download::download,
    error::EncoderError,
    primitives::{EncodeConfig, Input},
};

const PROGRESS_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} frames ({eta})";

/// Turns one video into one ASCII video file.
///
/// Owns the temporary working directory; it is removed when the encoder is
/// dropped.
pub struct AsciiEncoder {
    config: EncodeConfig,
    tools: Tools,
    pub temp_dir: TempDir,
}

impl AsciiEncoder {
    pub fn new(config: EncodeConfig) -> Res<Self> {
        let tools = Tools::locate()?;

        let temp_dir = match &config.temp_parent {
            Some(parent) => TempDir::with_prefix_in("m2a-", parent)?,
            None => TempDir::with_prefix("m2a-")?,
        };
        debug!(temp_dir = %temp_dir.path().display(), "created working directory");

        Ok(Self { config, tools, temp_dir })
    }

    #[inline]
    pub fn config(&self) -> &EncodeConfig {
        &self.config
    }

    /// Runs the whole pipeline and returns the path of the written file.
    pub fn encode(&self) -> Res<&Path> {
        let video = self.fetch_input()?;
        let fps = self.resolve_fps(&video);
        self.print_summary(&video, fps);

        println!("{BCYAN}Handling frames...{RESET}");
        let frames_dir = self.temp_dir.path().join("frames");
        create_dir(&frames_dir)?;
        extract_frames(&self.tools.ffmpeg, &video, fps, &frames_dir)?;

        let frames = list_frames(&frames_dir)?;
        if frames.is_empty() {
            return Err(EncoderError::NoFrames);
        }
        debug!(count = frames.len(), "extracted frames");

        let rendered = self.render(&frames)?;
        self.write_output(fps, &rendered)?;

        println!(
            "{GREEN}ASCII video saved to {BOLD}{}{RESET}",
            self.config.output.display()
        );
        Ok(&self.config.output)
    }

    fn fetch_input(&self) -> Res<PathBuf> {
        match &self.config.input {
            Input::Path(path) => Ok(path.clone()),
            Input::Url(url) => {
                println!("{BCYAN}Downloading {url}...{RESET}");
                download(url, self.temp_dir.path())
            }
        }
    }

    fn resolve_fps(&self, video: &Path) -> u32 {
        if let Some(fps) = self.config.fps {
            return fps;
        }

        match probe_fps(&self.tools.ffprobe, video) {
            Ok(Some(fps)) => fps,
            result => {
                if let Err(err) = result {
                    warn!("frame rate probe failed: {err}");
                }
                eprintln!(
                    "{YELLOW}Warning: Could not determine FPS of input video, \
                    using default FPS of {DEFAULT_FPS}{RESET}"
                );
                DEFAULT_FPS
            }
        }
    }

    fn print_summary(&self, video: &Path, fps: u32) {
        let resolution = match probe_resolution(&self.tools.ffprobe, video) {
            Ok(Some((width, height))) => format!("{width}x{height}"),
            Ok(None) => "unknown".to_owned(),
            Err(err) => {
                warn!("resolution probe failed: {err}");
                "unknown".to_owned()
            }
        };

        println!("File        {}", self.config.input.display_name());
        println!("Resolution  {resolution}");
        println!("FPS         {fps}\n");
    }

    /// Renders every frame with jp2a, in parallel, keeping file order.
    fn render(&self, frames: &[PathBuf]) -> Res<Vec<Vec<u8>>> {
        let progress = ProgressBar::new(frames.len() as u64);
        progress.set_style(ProgressStyle::with_template(PROGRESS_TEMPLATE)?);

        let rendered = frames
            .par_iter()
            .map(|frame| {
                let art = jp2a(&self.tools.jp2a, &self.config.jp2a_args, frame);
                progress.inc(1);
                art
            })
            .collect::<Res<Vec<_>>>();

        progress.finish_and_clear();
        rendered
    }

    /// Writes the header and the frames. The output is only created once
    /// every frame is rendered, so a failed run leaves any old file intact.
    fn write_output(&self, fps: u32, rendered: &[Vec<u8>]) -> Res<()> {
        let mut out = BufWriter::new(File::create(&self.config.output)?);
        write_header(&mut out, fps)?;

        for (index, art) in rendered.iter().enumerate() {
            if write_frame(&mut out, art)? == 0 {
                warn!(frame = index + 1, "renderer produced an empty frame, skipped");
            }
        }

        out.flush()?;
        Ok(())
    }
}

/// The extracted pictures, sorted by file name.
fn list_frames(dir: &Path) -> Res<Vec<PathBuf>> {
    let mut frames = read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();

    frames.sort();
    Ok(frames)
}
