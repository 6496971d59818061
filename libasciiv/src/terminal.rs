use std::{
    io::{self, Stdout, Write, stdout},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering::SeqCst},
    },
};

use crossterm::{QueueableCommand, cursor};
use tracing::warn;

/// The terminal operations playback needs.
pub trait Terminal {
    fn hide_cursor(&mut self) -> io::Result<()>;

    fn show_cursor(&mut self) -> io::Result<()>;

    /// Moves the cursor to the top-left corner, writes `frame` over whatever
    /// was there and flushes.
    fn draw(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// Shared record of whether an [`AnsiTerminal`] currently hides the cursor.
///
/// A signal handler can hold a clone and call [`CursorState::restore`]; the
/// cursor is shown at most once per hide, whichever side gets there first.
#[derive(Debug, Clone, Default)]
pub struct CursorState(Arc<AtomicBool>);

impl CursorState {
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.0.load(SeqCst)
    }

    /// Shows the cursor on standard output if it is still hidden.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    #[inline]
    pub fn restore(&self) -> io::Result<()> {
        self.restore_to(&mut stdout())
    }

    /// Like [`CursorState::restore`], writing the escape to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn restore_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        if self.0.swap(false, SeqCst) {
            out.queue(cursor::Show)?;
            out.flush()?;
        }
        Ok(())
    }
}

/// A [`Terminal`] driven by ANSI escape sequences written to `W`.
pub struct AnsiTerminal<W: Write> {
    out: W,
    cursor: CursorState,
}

impl AnsiTerminal<Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(stdout())
    }
}

impl<W: Write> AnsiTerminal<W> {
    pub fn new(out: W) -> Self {
        Self { out, cursor: CursorState::default() }
    }

    #[must_use]
    pub fn cursor_state(&self) -> CursorState {
        self.cursor.clone()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Terminal for AnsiTerminal<W> {
    fn hide_cursor(&mut self) -> io::Result<()> {
        // Marked before writing: a hide that half went through still gets a show.
        self.cursor.0.store(true, SeqCst);
        self.out.queue(cursor::Hide)?;
        self.out.flush()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        if self.cursor.0.swap(false, SeqCst) {
            self.out.queue(cursor::Show)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &[u8]) -> io::Result<()> {
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.write_all(frame)?;
        self.out.flush()
    }
}

/// Keeps the cursor hidden for as long as it lives.
///
/// Dropping the guard shows the cursor again, which happens on every way out
/// of the scope owning it: normal completion, `?` and unwinding.
pub struct CursorGuard<'t, T: Terminal + ?Sized> {
    terminal: &'t mut T,
}

impl<'t, T: Terminal + ?Sized> CursorGuard<'t, T> {
    /// Hides the cursor. Failing to do so only costs some flicker, so it is
    /// logged and playback goes on.
    pub fn hide(terminal: &'t mut T) -> Self {
        if let Err(err) = terminal.hide_cursor() {
            warn!("could not hide the cursor: {err}");
        }
        Self { terminal }
    }

    #[inline]
    pub fn terminal(&mut self) -> &mut T {
        &mut *self.terminal
    }
}

impl<T: Terminal + ?Sized> Drop for CursorGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.terminal.show_cursor() {
            warn!("could not restore the cursor: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIDE: &[u8] = b"\x1b[?25l";
    const SHOW: &[u8] = b"\x1b[?25h";

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn draw_homes_the_cursor_before_the_frame() {
        let mut terminal = AnsiTerminal::new(Vec::new());
        terminal.draw(b"ab\ncd\n").unwrap();

        assert_eq!(terminal.into_inner(), b"\x1b[1;1Hab\ncd\n");
    }

    #[test]
    fn guard_hides_then_shows_once() {
        let mut terminal = AnsiTerminal::new(Vec::new());
        let state = terminal.cursor_state();

        {
            let mut guard = CursorGuard::hide(&mut terminal);
            assert!(state.is_hidden());
            guard.terminal().draw(b"x\n").unwrap();
        }

        assert!(!state.is_hidden());
        terminal.show_cursor().unwrap();

        let out = terminal.into_inner();
        assert!(out.starts_with(HIDE));
        assert!(out.ends_with(SHOW));
        assert_eq!(count(&out, SHOW), 1);
    }

    #[test]
    fn guard_restores_during_unwinding() {
        let mut terminal = AnsiTerminal::new(Vec::new());
        let state = terminal.cursor_state();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = CursorGuard::hide(&mut terminal);
            panic!("renderer blew up");
        }));

        assert!(result.is_err());
        assert!(!state.is_hidden());
        assert_eq!(count(&terminal.into_inner(), SHOW), 1);
    }

    #[test]
    fn handler_restore_wins_over_the_guard() {
        let mut terminal = AnsiTerminal::new(Vec::new());
        let state = terminal.cursor_state();
        let mut handler_out = Vec::new();

        {
            let _guard = CursorGuard::hide(&mut terminal);
            state.restore_to(&mut handler_out).unwrap();
            state.restore_to(&mut handler_out).unwrap();
        }

        assert_eq!(handler_out, SHOW);
        assert_eq!(count(&terminal.into_inner(), SHOW), 0);
    }

    #[test]
    fn handler_restore_after_the_guard_writes_nothing() {
        let mut terminal = AnsiTerminal::new(Vec::new());
        let state = terminal.cursor_state();
        let mut handler_out = Vec::new();

        drop(CursorGuard::hide(&mut terminal));
        state.restore_to(&mut handler_out).unwrap();

        assert!(handler_out.is_empty());
        assert_eq!(count(&terminal.into_inner(), SHOW), 1);
    }

    #[test]
    fn restore_without_a_hide_writes_nothing() {
        let state = AnsiTerminal::new(Vec::new()).cursor_state();
        let mut out = Vec::new();

        state.restore_to(&mut out).unwrap();

        assert!(out.is_empty());
    }

    /// Accepts every byte but can never flush.
    #[derive(Default)]
    struct StuckFlush(Vec<u8>);

    impl Write for StuckFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("flush refused"))
        }
    }

    #[test]
    fn failed_hide_flush_is_still_undone() {
        let mut terminal = AnsiTerminal::new(StuckFlush::default());
        let state = terminal.cursor_state();

        drop(CursorGuard::hide(&mut terminal));

        assert!(!state.is_hidden());
        let out = terminal.into_inner().0;
        assert!(out.starts_with(HIDE));
        assert_eq!(count(&out, SHOW), 1);
    }

    #[test]
    fn failed_hide_flush_leaves_the_handler_a_restore() {
        let mut terminal = AnsiTerminal::new(StuckFlush::default());
        let state = terminal.cursor_state();
        let mut handler_out = Vec::new();

        assert!(terminal.hide_cursor().is_err());
        state.restore_to(&mut handler_out).unwrap();

        assert_eq!(handler_out, SHOW);
    }
}
