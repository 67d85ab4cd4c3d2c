//! JSON and NDJSON export of samples.

use crate::model::Sample;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Error type for export failures.
#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "I/O error: {}", e),
            SinkError::Serialize(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(e: serde_json::Error) -> Self {
        SinkError::Serialize(e)
    }
}

/// Writes one pretty-printed JSON object followed by a newline.
pub fn write_pretty<W: Write>(mut out: W, sample: &Sample) -> Result<(), SinkError> {
    serde_json::to_writer_pretty(&mut out, sample)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Writes one compact JSON object on its own line.
pub fn write_ndjson<W: Write>(mut out: W, sample: &Sample) -> Result<(), SinkError> {
    // Serialize fully before touching the writer so a failure never leaves
    // a partial line behind.
    let mut line = serde_json::to_vec(sample)?;
    line.push(b'\n');
    out.write_all(&line)?;
    out.flush()?;
    Ok(())
}

/// Appends samples as NDJSON to a file.
///
/// The file is opened lazily on the first write and reopened after a
/// failed write, so a transient error (disk full, permissions fixed later)
/// costs only the samples written while it lasts.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    written: u64,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of samples successfully written.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write(&mut self, sample: &Sample) -> Result<(), SinkError> {
        let file = match self.file.as_mut() {
            Some(f) => f,
            None => {
                let f = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?;
                self.file.insert(BufWriter::new(f))
            }
        };
        if let Err(e) = write_ndjson(file, sample) {
            self.file = None;
            return Err(e);
        }
        self.written += 1;
        Ok(())
    }

    /// Writes and logs failures at debug level instead of returning them.
    pub fn write_or_skip(&mut self, sample: &Sample) {
        if let Err(e) = self.write(sample) {
            tracing::debug!(path = %self.path.display(), error = %e, "export skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Process, Sample};

    fn sample(pid: u32) -> Sample {
        Sample {
            top: vec![Process {
                pid,
                command: "cargo test".to_string(),
                ..Process::default()
            }],
            ..Sample::default()
        }
    }

    #[test]
    fn test_ndjson_appends_one_line_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.ndjson");
        let mut sink = JsonFileSink::new(&path);
        sink.write(&sample(1)).unwrap();
        sink.write(&sample(2)).unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: Sample = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.top[0].pid, 2);
    }

    #[test]
    fn test_existing_file_is_appended_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.ndjson");
        std::fs::write(&path, "{}\n").unwrap();
        let mut sink = JsonFileSink::new(&path);
        sink.write(&sample(7)).unwrap();
        drop(sink);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("{}\n"));
    }

    #[test]
    fn test_unwritable_path_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("samples.ndjson");
        let mut sink = JsonFileSink::new(&path);
        assert!(matches!(sink.write(&sample(1)), Err(SinkError::Io(_))));
        sink.write_or_skip(&sample(1));
        assert_eq!(sink.written(), 0);
    }

    #[test]
    fn test_pretty_output_is_single_object() {
        let mut buf = Vec::new();
        write_pretty(&mut buf, &sample(3)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"Timestamp\""));
        let parsed: Sample = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.top[0].pid, 3);
    }

    #[test]
    fn test_ndjson_line_has_no_inner_newlines() {
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &sample(4)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.ends_with('\n'));
    }
}
