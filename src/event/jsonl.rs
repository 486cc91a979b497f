//! JSON Lines event sink.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::{Event, EventSink, SinkError};

#[derive(Debug, Clone)]
enum Target {
    Stdout,
    File(PathBuf),
}

/// Writes each event as one compact JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    target: Target,
}

impl JsonLinesSink {
    /// Creates a sink writing to standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            target: Target::Stdout,
        }
    }

    /// Creates a sink appending to the file at `path`.
    ///
    /// The file and its parent directories are created on first write.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::File(path.into()),
        }
    }

    /// Returns the file path, or `None` for stdout.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::Stdout => None,
            Target::File(path) => Some(path),
        }
    }

    fn encode(event: &Event) -> Result<Vec<u8>, SinkError> {
        let mut line = serde_json::to_vec(event).map_err(SinkError::Serialize)?;
        line.push(b'\n');
        Ok(line)
    }
}

impl EventSink for JsonLinesSink {
    async fn emit(&self, event: &Event) -> Result<(), SinkError> {
        let line = Self::encode(event)?;

        match &self.target {
            Target::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&line).await.map_err(SinkError::Write)?;
                stdout.flush().await.map_err(SinkError::Write)
            }
            Target::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent)
                            .await
                            .map_err(SinkError::Write)?;
                    }
                }
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(SinkError::Write)?;
                file.write_all(&line).await.map_err(SinkError::Write)?;
                file.flush().await.map_err(SinkError::Write)
            }
        }
    }
}
