#![warn(clippy::pedantic)]

use std::{error::Error, process::exit};

use libasciiv::{
    AsciiVideo, CursorState, Player,
    colours::{RED, RESET},
    logging::init_logging,
};
use tracing::debug;

use crate::cli::Args;

mod cli;

type Res<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Exit status after Ctrl-C, as a shell would report it.
const INTERRUPTED: i32 = 130;

fn main() {
    init_logging();
    let args = Args::parse_or_exit();

    if let Err(err) = run(args) {
        eprintln!("{RED}Error:{RESET} {err}");
        exit(1);
    }
}

fn run(args: Args) -> Res<()> {
    let (input, config) = args.into_config();

    // Open first: a bad path must not touch the terminal.
    let video = AsciiVideo::open(&input)?;
    debug!(input = %input.display(), header_fps = ?video.header_fps(), "loaded");

    let mut player = Player::stdout();
    register_ctrl_c_handle(player.terminal().cursor_state())?;

    player.play(video, &config)?;
    Ok(())
}

fn register_ctrl_c_handle(cursor: CursorState) -> Res<()> {
    ctrlc::set_handler(move || {
        cursor.restore().ok();
        exit(INTERRUPTED);
    })?;
    Ok(())
}
