//! Smart corpus reading: mmap for large files, buffered otherwise.
//!
//! Corpus dumps range from a few KiB (test fixtures) to hundreds of MiB
//! (full OpenSubtitles exports), so files above a threshold are mapped
//! instead of copied. Decoding stays explicit: the caller decides what an
//! invalid-UTF-8 corpus means.

use std::fs::File;
use std::io;
use std::path::Path;

use memmap2::Mmap;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

pub enum FileContent {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl FileContent {
    /// Borrow the raw bytes regardless of backing.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Mapped(mmap) => mmap,
            FileContent::Buffered(buf) => buf.as_slice(),
        }
    }

    /// Decode as UTF-8, or report where decoding broke.
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}

pub fn read_file_smart<P: AsRef<Path>>(path: P) -> io::Result<FileContent> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)?;

    if metadata.len() > MMAP_THRESHOLD {
        // Memory-map large corpora
        let file = File::open(path)?;

        // Safety: the mapping is read-only and the corpus file is treated
        // as immutable for the duration of a query
        let mmap = unsafe { Mmap::map(&file) }?;

        Ok(FileContent::Mapped(mmap))
    } else {
        // Read small files into memory
        let buf = std::fs::read(path)?;

        Ok(FileContent::Buffered(buf))
    }
}

/// Split a buffer into logical lines in a single memchr pass.
///
/// Trailing '\n' is consumed; a '\r' before it is excluded so CRLF corpora
/// behave like LF ones. A final line without a newline is still yielded.
pub fn split_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut lines = Vec::with_capacity(bytes.len() / 48);
    let mut start = 0usize;

    for nl in memchr::memchr_iter(b'\n', bytes) {
        let mut end = nl;
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        // Prefix boundaries are char boundaries: '\n'/'\r' are ASCII
        lines.push(&content[start..end]);
        start = nl + 1;
    }

    if start < bytes.len() {
        lines.push(&content[start..]);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_lf() {
        assert_eq!(split_lines("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_lines_crlf() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_lines_empty_and_blank() {
        assert_eq!(split_lines(""), Vec::<&str>::new());
        assert_eq!(split_lines("\n\n"), vec!["", ""]);
    }
}
