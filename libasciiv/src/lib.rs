//! Reading, writing and playing plain-text ASCII videos.
//!
//! An ASCII video is a text file holding an optional frame rate header
//! followed by frames, each frame being a run of non-empty lines and frames
//! being separated by one blank line:
//!
//! ```text
//! # FPS: 30
//!
//! <frame 1 line 1>
//! <frame 1 line 2>
//!
//! <frame 2 line 1>
//! ```
//!
//! Lines may carry ANSI colour sequences; they are written to the terminal
//! verbatim.
//!
//! # Examples
//!
//! Playing a file on standard output:
//!
//! ```no_run
//! use libasciiv::{AsciiVideo, PlaybackConfig, Player};
//!
//! let video = AsciiVideo::open("bad_apple.txt")?;
//! let config = PlaybackConfig { fps: None, speed: 1.5 };
//! Player::stdout().play(video, &config)?;
//! # Ok::<(), libasciiv::PlayerError>(())
//! ```

#![warn(clippy::pedantic)]

pub mod colours;
mod error;
mod format;
pub mod logging;
mod player;
mod rate;
mod terminal;

pub use error::PlayerError;
pub use format::{AsciiVideo, Frame, Frames, write_frame, write_header};
pub use player::{PlaybackConfig, PlaybackStats, Player, Sleep, ThreadSleep};
pub use rate::{DEFAULT_FPS, frame_delay, resolve_fps, validate_speed};
pub use terminal::{AnsiTerminal, CursorGuard, CursorState, Terminal};
