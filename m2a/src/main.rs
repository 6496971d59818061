#![warn(clippy::pedantic)]

use std::{
    fs::remove_dir_all,
    io,
    path::{Path, PathBuf},
    process::exit,
    sync::{Arc, OnceLock},
};

use dialoguer::Confirm;
use libasciiv::{
    AsciiVideo, CursorState, PlaybackConfig, Player,
    colours::{RED, RESET, YELLOW},
    logging::init_logging,
};

use crate::{cli::Args, encoder::AsciiEncoder, error::EncoderError, primitives::EncodeConfig};

type Res<T> = Result<T, EncoderError>;

mod children;
mod cli;
mod download;
mod encoder;
mod error;
mod primitives;

/// What has to be undone if the user hits Ctrl-C.
struct Interrupt {
    temp_dir: PathBuf,
    cursor: OnceLock<CursorState>,
}

fn main() {
    init_logging();
    let args = Args::parse_or_exit();

    if let Err(err) = run(args.into_config()) {
        eprintln!("{RED}Error:{RESET} {err}");
        exit(1);
    }
}

fn run(config: EncodeConfig) -> Res<()> {
    config.input.check()?;

    if !confirm_overwrite(&config)? {
        return Ok(());
    }

    let encoder = AsciiEncoder::new(config)?;

    let interrupt = Arc::new(Interrupt {
        temp_dir: encoder.temp_dir.path().to_path_buf(),
        cursor: OnceLock::new(),
    });
    register_ctrl_c_handle(interrupt.clone())?;

    let output = encoder.encode()?.to_path_buf();
    let preview = encoder.config().preview;

    // Removes the working directory before playback starts.
    drop(encoder);

    if preview {
        let video = AsciiVideo::open(&output)?;
        let mut player = Player::stdout();
        interrupt.cursor.set(player.terminal().cursor_state()).ok();
        player.play(video, &PlaybackConfig::default())?;
    }

    Ok(())
}

fn confirm_overwrite(config: &EncodeConfig) -> Res<bool> {
    if config.overwrite || !config.output.exists() {
        return Ok(true);
    }

    let overwrite = Confirm::new()
        .with_prompt(format!(
            "Output file '{}' already exists. Overwrite?",
            config.output.display()
        ))
        .default(false)
        .interact()?;

    Ok(overwrite)
}

fn register_ctrl_c_handle(interrupt: Arc<Interrupt>) -> Res<()> {
    ctrlc::set_handler(move || abort_cleanly(&interrupt))?;
    Ok(())
}

fn abort_cleanly(interrupt: &Interrupt) -> ! {
    if let Some(cursor) = interrupt.cursor.get() {
        cursor.restore().ok();
    }
    cleanup(&interrupt.temp_dir);
    eprintln!("{YELLOW}Cleanup successful, now aborting...{RESET}");
    exit(1);
}

fn cleanup(temp_dir: &Path) {
    eprintln!("\n{YELLOW}Cleaning up...{RESET}");

    match remove_dir_all(temp_dir) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => eprintln!(
            "{RED}remove_dir_all() failed ({err}). Check for littering on {}{RESET}",
            temp_dir.display()
        ),
        _ => {}
    }
}
