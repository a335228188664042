//! Chat line source
//!
//! Text recognition runs outside this process and appends recognized chat
//! lines to a plain text file. [`ChatTail`] follows that file and hands back
//! complete lines as they appear; a trailing partial line is held until its
//! newline arrives.

mod error;

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use memchr::memchr_iter;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub use error::ChatError;

/// Longest pending text without a newline before it is emitted as a line
pub const MAX_PARTIAL_LINE: usize = 4096;

/// Follows a growing text file by byte offset
#[derive(Debug)]
pub struct ChatTail {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
}

impl ChatTail {
    /// Follow `path` from its first byte
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            partial: Vec::new(),
        }
    }

    /// Follow `path` from its current end, skipping existing lines
    pub async fn from_end(path: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let mut tail = Self::new(path);
        tail.offset = tail.file_len().await?.unwrap_or(0);
        Ok(tail)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read complete lines appended since the last poll.
    ///
    /// A missing file yields no lines. A file that shrank is assumed to have
    /// been truncated and is read again from the start.
    pub async fn poll(&mut self) -> Result<Vec<String>, ChatError> {
        let Some(len) = self.file_len().await? else {
            return Ok(Vec::new());
        };

        if len < self.offset {
            tracing::debug!(path = %self.path.display(), len, offset = self.offset, "Chat file truncated");
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let read_err = |source| ChatError::Read {
            path: self.path.clone(),
            source,
        };

        let mut file = File::open(&self.path).await.map_err(read_err)?;
        file.seek(SeekFrom::Start(self.offset))
            .await
            .map_err(read_err)?;

        let mut buf = Vec::with_capacity((len - self.offset) as usize);
        let read = file
            .take(len - self.offset)
            .read_to_end(&mut buf)
            .await
            .map_err(read_err)?;
        self.offset += read as u64;

        self.partial.extend_from_slice(&buf);
        Ok(self.drain_lines())
    }

    async fn file_len(&self) -> Result<Option<u64>, ChatError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ChatError::Metadata {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Split complete lines off the front of the pending buffer
    fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut start = 0;

        for end in memchr_iter(b'\n', &self.partial) {
            let mut line = &self.partial[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
        }

        self.partial.drain(..start);

        if self.partial.len() > MAX_PARTIAL_LINE {
            tracing::debug!(
                path = %self.path.display(),
                len = self.partial.len(),
                "Flushing overlong chat line"
            );
            lines.push(String::from_utf8_lossy(&self.partial).into_owned());
            self.partial.clear();
        }
        lines
    }
}
