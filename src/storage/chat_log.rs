//! Append-only chat logs
//!
//! Two files: public chat (including server notices) and private exchanges.
//! Each append opens the file, writes one timestamped line, and closes it
//! again. Appends to the same file are serialised so lines never interleave.

use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::error::ChatLogError;
use crate::protocol::responses::format_private_record;

/// Public and private log files for one server
pub struct ChatLog {
    public: LogFile,
    private: LogFile,
}

impl ChatLog {
    pub fn new(public_path: impl Into<PathBuf>, private_path: impl Into<PathBuf>) -> Self {
        Self {
            public: LogFile::new(public_path.into()),
            private: LogFile::new(private_path.into()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.chat_log(), config.private_log())
    }

    /// Appends a public chat line or server notice.
    pub async fn append_public(&self, line: &str) -> Result<(), ChatLogError> {
        self.public.append(line).await
    }

    /// Appends a private exchange as `sender -> recipient: body`.
    pub async fn append_private(
        &self,
        sender: &str,
        recipient: &str,
        body: &str,
    ) -> Result<(), ChatLogError> {
        self.private
            .append(&format_private_record(sender, recipient, body))
            .await
    }

    pub fn public_path(&self) -> &Path {
        &self.public.path
    }

    pub fn private_path(&self) -> &Path {
        &self.private.path
    }
}

struct LogFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LogFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn append(&self, line: &str) -> Result<(), ChatLogError> {
        let record = format!("[{}] {}\n", timestamp(), line);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.error(source))?;

        file.write_all(record.as_bytes())
            .await
            .map_err(|source| self.error(source))?;
        // tokio closes files lazily; flush so the line is on disk before we return
        file.flush().await.map_err(|source| self.error(source))
    }

    fn error(&self, source: std::io::Error) -> ChatLogError {
        ChatLogError {
            path: self.path.clone(),
            source,
        }
    }
}

/// Local wall-clock time as `HH:MM:SS`
pub fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
