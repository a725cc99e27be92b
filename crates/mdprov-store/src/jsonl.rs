//! Append-only JSON Lines files.
//!
//! One JSON document per line. Writers only ever append; readers skip blank
//! and malformed lines, so a line torn by a crash mid-write costs that one
//! record and nothing else.

use std::io::{ErrorKind, SeekFrom};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::{Result, StoreError};

/// A JSON Lines file holding values of type `T`.
#[derive(Debug, Clone)]
pub struct JsonLines<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonLines<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one value as a single line.
    ///
    /// Creates the file and its parent directory if needed. The file is
    /// opened in append mode and synced before returning. A torn final line
    /// left by an interrupted writer is terminated first so the new record
    /// starts on a line of its own.
    pub async fn append(&self, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        if ends_mid_line(&mut file)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?
        {
            line.insert(0, b'\n');
        }
        file.write_all(&line)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.sync_data()
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    /// Read every well-formed value, in file order.
    ///
    /// A missing file reads as empty.
    pub async fn read_all(&self) -> Result<Vec<T>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        Ok(parse_lines(&self.path, &bytes))
    }
}

async fn ends_mid_line(file: &mut fs::File) -> std::io::Result<bool> {
    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

fn parse_lines<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Vec<T> {
    let mut values = Vec::new();
    for (index, line) in bytes.split(|&b| b == b'\n').enumerate() {
        let Ok(line) = std::str::from_utf8(line) else {
            tracing::debug!(path = %path.display(), line = index + 1, "skipping non-UTF-8 line");
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(value) => values.push(value),
            Err(e) => tracing::debug!(
                path = %path.display(),
                line = index + 1,
                error = %e,
                "skipping malformed line"
            ),
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        n: u32,
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log: JsonLines<Entry> = JsonLines::new(dir.path().join("absent.jsonl"));
        assert!(log.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonLines::new(dir.path().join("nested/state/log.jsonl"));
        log.append(&Entry { n: 1 }).await.unwrap();
        log.append(&Entry { n: 2 }).await.unwrap();

        assert_eq!(
            log.read_all().await.unwrap(),
            vec![Entry { n: 1 }, Entry { n: 2 }]
        );
        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text, "{\"n\":1}\n{\"n\":2}\n");
    }

    #[tokio::test]
    async fn test_skips_blank_and_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut raw = b"{\"n\":1}\n\n   \nnot json\n{\"n\":\xff}\n{\"n\":2}\n{\"n\":".to_vec();
        raw.extend_from_slice(b"\r\n");
        std::fs::write(&path, raw).unwrap();

        let log: JsonLines<Entry> = JsonLines::new(&path);
        assert_eq!(
            log.read_all().await.unwrap(),
            vec![Entry { n: 1 }, Entry { n: 2 }]
        );
    }

    #[tokio::test]
    async fn test_append_after_torn_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(&path, "{\"n\":1}\n{\"n\":").unwrap();

        let log = JsonLines::new(&path);
        log.append(&Entry { n: 3 }).await.unwrap();

        assert_eq!(
            log.read_all().await.unwrap(),
            vec![Entry { n: 1 }, Entry { n: 3 }]
        );
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\"n\":1}\n{\"n\":\n{\"n\":3}\n"));
    }
}
