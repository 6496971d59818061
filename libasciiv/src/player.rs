use std::{
    io::{self, BufRead, Stdout},
    thread,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    AnsiTerminal, AsciiVideo, CursorGuard, Frame, PlayerError, Terminal,
    frame_delay, resolve_fps,
};

/// Blocks the calling thread between frames.
pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}

/// [`Sleep`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    #[inline]
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Playback settings coming from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Overrides the rate declared in the file header.
    pub fps: Option<u32>,
    /// Multiplies the playback speed; must be above zero.
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { fps: None, speed: 1.0 }
    }
}

/// What a finished playback did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub frames: usize,
    pub waits: usize,
}

/// Deadline based pacing: frame `n` is due `n` delays after the start, so
/// time spent drawing does not add up into drift.
struct Pacer {
    delay: Duration,
    deadline: Instant,
}

impl Pacer {
    fn start(delay: Duration) -> Self {
        Self { delay, deadline: Instant::now() }
    }

    fn wait<S: Sleep + ?Sized>(&mut self, sleeper: &mut S) {
        let now = Instant::now();
        self.deadline += self.delay;

        // Running late: start counting again from now rather than rushing
        // through the frames that are overdue. A wait never exceeds one delay.
        if self.deadline < now {
            self.deadline = now;
        } else if self.deadline > now + self.delay {
            self.deadline = now + self.delay;
        }

        sleeper.sleep(self.deadline - now);
    }
}

/// Draws frames one after the other at a fixed cadence.
pub struct Player<T, S> {
    terminal: T,
    sleeper: S,
}

impl Player<AnsiTerminal<Stdout>, ThreadSleep> {
    /// A player drawing on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(AnsiTerminal::stdout(), ThreadSleep)
    }
}

impl<T: Terminal, S: Sleep> Player<T, S> {
    pub fn new(terminal: T, sleeper: S) -> Self {
        Self { terminal, sleeper }
    }

    #[inline]
    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn into_parts(self) -> (T, S) {
        (self.terminal, self.sleeper)
    }

    /// Plays `video` to the end.
    ///
    /// The rate comes from `config.fps`, then the file header, then
    /// [`crate::DEFAULT_FPS`]. It is validated together with the speed before
    /// anything touches the terminal.
    ///
    /// # Errors
    ///
    /// Fails on an invalid rate or speed, and on any read or write error
    /// during playback. The cursor is restored before the error is returned.
    pub fn play<R: BufRead>(
        &mut self,
        video: AsciiVideo<R>,
        config: &PlaybackConfig,
    ) -> Result<PlaybackStats, PlayerError> {
        let (header_fps, frames) = video.into_parts();
        let fps = resolve_fps(config.fps, header_fps);
        let delay = frame_delay(fps, config.speed)?;

        debug!(fps, speed = config.speed, ?delay, "starting playback");

        self.play_frames(frames, delay)
    }

    /// Plays already parsed frames, waiting `delay` after every frame that was
    /// closed by a blank line.
    ///
    /// # Errors
    ///
    /// Propagates the first read or draw error, after restoring the cursor.
    pub fn play_frames<I>(
        &mut self,
        frames: I,
        delay: Duration,
    ) -> Result<PlaybackStats, PlayerError>
    where
        I: IntoIterator<Item = io::Result<Frame>>,
    {
        let mut stats = PlaybackStats::default();
        let mut cursor = CursorGuard::hide(&mut self.terminal);
        let mut pacer = Pacer::start(delay);

        for frame in frames {
            let frame = frame?;
            cursor.terminal().draw(frame.as_bytes())?;
            stats.frames += 1;

            if frame.is_delimited() {
                pacer.wait(&mut self.sleeper);
                stats.waits += 1;
            }
        }

        drop(cursor);
        debug!(frames = stats.frames, waits = stats.waits, "playback done");
        Ok(stats)
    }
}
