//! The ASCII video file format: an optional `# FPS: <n>` header line, then
//! frames made of non-empty lines, separated by blank lines.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    mem,
    path::Path,
    str,
    sync::LazyLock,
};

use regex::bytes::Regex;
use tracing::{debug, warn};

use crate::PlayerError;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^# FPS: ([0-9]+)$").expect("the header pattern is a valid regex")
});

/// One still ASCII picture.
///
/// Every line, including the last one, is stored with its `\n` terminator so
/// the content can be written to a terminal as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    content: Vec<u8>,
    delimited: bool,
}

impl Frame {
    /// The raw bytes of the frame, escape sequences included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Iterates over the lines of the frame, without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.content
            .split_inclusive(|&b| b == b'\n')
            .map(|line| &line[..line.len() - 1])
    }

    pub fn line_count(&self) -> usize {
        self.content.iter().filter(|&&b| b == b'\n').count()
    }

    /// Whether a blank line closed this frame, as opposed to the end of the
    /// stream.
    #[inline]
    pub fn is_delimited(&self) -> bool {
        self.delimited
    }
}

/// An ASCII video whose header has been read and whose frames are pending.
pub struct AsciiVideo<R> {
    header_fps: Option<u32>,
    frames: Frames<R>,
}

impl AsciiVideo<BufReader<File>> {
    /// Opens an ASCII video file and reads its header.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Open`] if the file cannot be opened and
    /// [`PlayerError::Io`] if the first line cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlayerError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PlayerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "opened ascii video");
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> AsciiVideo<R> {
    /// Reads the first line of `reader`.
    ///
    /// A `# FPS: <n>` line is consumed as the header. Anything else is kept as
    /// the beginning of the first frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Io`] if the first line cannot be read.
    pub fn from_reader(mut reader: R) -> Result<Self, PlayerError> {
        let mut first = Vec::new();
        let read = reader.read_until(b'\n', &mut first)?;

        let mut frames = Frames::new(reader);
        let mut header_fps = None;

        if read > 0 {
            let line = trim_line_ending(&first);
            match parse_header(line) {
                Header::Rate(fps) => header_fps = Some(fps),
                Header::Unusable => {}
                // A blank first line is a delimiter with nothing before it.
                Header::Absent => {
                    accumulate(&mut frames.buffer, line);
                }
            }
        }

        Ok(Self { header_fps, frames })
    }

    /// The rate declared by the header line, if there was a usable one.
    #[inline]
    pub fn header_fps(&self) -> Option<u32> {
        self.header_fps
    }

    #[inline]
    pub fn into_frames(self) -> Frames<R> {
        self.frames
    }

    #[inline]
    pub fn into_parts(self) -> (Option<u32>, Frames<R>) {
        (self.header_fps, self.frames)
    }
}

enum Header {
    Rate(u32),
    Unusable,
    Absent,
}

fn parse_header(line: &[u8]) -> Header {
    let Some(captures) = HEADER.captures(line) else {
        return Header::Absent;
    };

    let fps = str::from_utf8(&captures[1])
        .ok()
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|&fps| fps > 0);

    match fps {
        Some(fps) => Header::Rate(fps),
        None => {
            warn!(
                header = %String::from_utf8_lossy(line),
                "ignoring out of range frame rate header"
            );
            Header::Unusable
        }
    }
}

/// Lazy, forward-only sequence of the frames of a stream.
///
/// The underlying reader is dropped as soon as the end of the stream (or a
/// read error) is reached, and the iterator is fused from then on.
pub struct Frames<R> {
    reader: Option<R>,
    buffer: Vec<u8>,
    line: Vec<u8>,
}

impl<R: BufRead> Frames<R> {
    /// Reads frames from a stream that has no header.
    pub fn new(reader: R) -> Self {
        Self { reader: Some(reader), buffer: Vec::new(), line: Vec::new() }
    }
}

impl<R: BufRead> Iterator for Frames<R> {
    type Item = io::Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(reader) = self.reader.as_mut() {
            self.line.clear();

            match reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.reader = None;
                    return take_frame(&mut self.buffer, false).map(Ok);
                }
                Ok(_) => {
                    let line = trim_line_ending(&self.line);
                    if let Some(frame) = accumulate(&mut self.buffer, line) {
                        return Some(Ok(frame));
                    }
                }
                Err(err) => {
                    self.reader = None;
                    return Some(Err(err));
                }
            }
        }

        None
    }
}

/// Adds a line to the frame being built, returning the frame once a blank
/// line closes it.
fn accumulate(buffer: &mut Vec<u8>, line: &[u8]) -> Option<Frame> {
    if line.is_empty() {
        return take_frame(buffer, true);
    }

    buffer.extend_from_slice(line);
    buffer.push(b'\n');
    None
}

fn take_frame(buffer: &mut Vec<u8>, delimited: bool) -> Option<Frame> {
    if buffer.is_empty() {
        return None;
    }

    Some(Frame { content: mem::take(buffer), delimited })
}

#[inline]
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Writes the `# FPS: <fps>` header and the blank line following it.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_header<W: Write>(out: &mut W, fps: u32) -> io::Result<()> {
    write!(out, "# FPS: {fps}\n\n")
}

/// Writes one frame followed by its blank delimiter line.
///
/// Empty lines inside `art` are dropped, since they would split the frame in
/// two when read back. Nothing is written if `art` has no non-empty line.
///
/// Returns the number of lines written.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_frame<W: Write>(out: &mut W, art: &[u8]) -> io::Result<usize> {
    let mut written = 0;

    for line in art.split(|&b| b == b'\n') {
        let line = trim_line_ending(line);
        if line.is_empty() {
            continue;
        }
        out.write_all(line)?;
        out.write_all(b"\n")?;
        written += 1;
    }

    if written > 0 {
        out.write_all(b"\n")?;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;

    fn video(text: &str) -> AsciiVideo<Cursor<Vec<u8>>> {
        AsciiVideo::from_reader(Cursor::new(text.as_bytes().to_vec())).unwrap()
    }

    fn frames_of(text: &str) -> Vec<Frame> {
        video(text).into_frames().collect::<io::Result<_>>().unwrap()
    }

    #[test]
    fn frames_come_back_in_file_order() {
        let blocks = ["@@@\n###", "...\n:::\n---", "x"];
        let text = format!("# FPS: 30\n\n{}\n", blocks.join("\n\n"));

        let frames = frames_of(&text);

        assert_eq!(frames.len(), blocks.len());
        for (frame, block) in frames.iter().zip(blocks) {
            assert_eq!(frame.as_bytes(), format!("{block}\n").as_bytes());
        }
    }

    #[test]
    fn header_rate_is_read_and_consumed() {
        let video = video("# FPS: 24\n\nab\ncd\n");
        assert_eq!(video.header_fps(), Some(24));

        let frames = video.into_frames().collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), b"ab\ncd\n");
    }

    #[test]
    fn first_line_without_header_is_frame_content() {
        let video = video("first\nsecond\n\nthird\n");
        assert_eq!(video.header_fps(), None);

        let frames = video.into_frames().collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), b"first\nsecond\n");
        assert_eq!(frames[1].as_bytes(), b"third\n");
    }

    #[test]
    fn header_must_match_exactly() {
        for line in ["# FPS: 24 ", "#FPS: 24", "# FPS: -3", "# fps: 24", "# FPS: 2.5"] {
            let video = video(&format!("{line}\nframe\n"));
            assert_eq!(video.header_fps(), None, "{line:?}");

            let frames = video.into_frames().collect::<io::Result<Vec<_>>>().unwrap();
            assert_eq!(frames[0].lines().next().unwrap(), line.as_bytes());
        }
    }

    #[test]
    fn zero_or_huge_header_rate_is_dropped_but_consumed() {
        for header in ["# FPS: 0", "# FPS: 99999999999"] {
            let video = video(&format!("{header}\n\nframe\n"));
            assert_eq!(video.header_fps(), None);

            let frames = video.into_frames().collect::<io::Result<Vec<_>>>().unwrap();
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0].as_bytes(), b"frame\n");
        }
    }

    #[test]
    fn final_frame_without_delimiter_is_emitted() {
        let frames = frames_of("a\n\nb\nc");

        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_delimited());
        assert!(!frames[1].is_delimited());
        assert_eq!(frames[1].as_bytes(), b"b\nc\n");
    }

    #[test]
    fn repeated_blank_lines_never_make_empty_frames() {
        let frames = frames_of("\n\na\n\n\n\nb\n\n");

        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(Frame::is_delimited));
    }

    #[test]
    fn crlf_line_endings_are_understood() {
        let video = video("# FPS: 12\r\n\r\nab\r\ncd\r\n\r\nef\r\n");
        assert_eq!(video.header_fps(), Some(12));

        let frames = video.into_frames().collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), b"ab\ncd\n");
    }

    #[test]
    fn escape_sequences_are_kept_verbatim() {
        let line = "\x1b[38;2;255;0;0m@\x1b[0m";
        let frames = frames_of(&format!("{line}\n\n"));

        assert_eq!(frames[0].lines().collect::<Vec<_>>(), vec![line.as_bytes()]);
        assert_eq!(frames[0].line_count(), 1);
    }

    #[test]
    fn empty_and_header_only_streams_have_no_frames() {
        assert!(frames_of("").is_empty());
        assert!(frames_of("# FPS: 10\n\n").is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_errors_surface_once_then_stop() {
        let mut frames = Frames::new(BufReader::new(FailingReader));

        assert!(frames.next().unwrap().is_err());
        assert!(frames.next().is_none());
    }

    #[test]
    fn open_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");

        let Err(PlayerError::Open { path, .. }) = AsciiVideo::open(&missing) else {
            panic!("expected an open error");
        };
        assert_eq!(path, missing);
    }

    #[test]
    fn written_files_read_back() {
        let mut out = Vec::new();
        write_header(&mut out, 15).unwrap();
        assert_eq!(write_frame(&mut out, b"ab\n\ncd\n").unwrap(), 2);
        assert_eq!(write_frame(&mut out, b"\n\n").unwrap(), 0);
        assert_eq!(write_frame(&mut out, b"ef").unwrap(), 1);

        assert_eq!(out, b"# FPS: 15\n\nab\ncd\n\nef\n\n");

        let video = AsciiVideo::from_reader(Cursor::new(out)).unwrap();
        assert_eq!(video.header_fps(), Some(15));
        assert_eq!(video.into_frames().count(), 2);
    }
}
