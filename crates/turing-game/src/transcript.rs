//! Append-only transcript sinks

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Line-oriented transcript destination
pub trait TranscriptSink: Send {
    /// Append one line; a trailing newline is added
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Push buffered lines to the backing store
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Transcript appended to a file on disk
#[derive(Debug)]
pub struct FileTranscript {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileTranscript {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSink for FileTranscript {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for FileTranscript {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "Transcript flush failed");
        }
    }
}

/// Transcript kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    lines: Vec<String>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The transcript as it would appear on disk
    pub fn contents(&self) -> String {
        self.lines.iter().map(|l| format!("{l}\n")).collect()
    }
}

impl TranscriptSink for MemoryTranscript {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_transcript_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_session.log");

        {
            let mut sink = FileTranscript::open(&path).unwrap();
            sink.write_line("Game 1 started: {}").unwrap();
            sink.write_line("### Red: hi").unwrap();
        }
        {
            let mut sink = FileTranscript::open(&path).unwrap();
            sink.write_line("Game 1 ended.").unwrap();
            sink.flush().unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Game 1 started: {}\n### Red: hi\nGame 1 ended.\n");
    }

    #[test]
    fn test_memory_transcript() {
        let mut sink = MemoryTranscript::new();
        sink.write_line("a").unwrap();
        sink.write_line("").unwrap();
        assert_eq!(sink.lines(), &["a".to_string(), String::new()]);
        assert_eq!(sink.contents(), "a\n\n");
    }
}
