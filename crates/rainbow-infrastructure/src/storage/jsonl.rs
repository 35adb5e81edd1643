//! Append-only JSON Lines files.

use rainbow_core::Result;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Bytes read per step when scanning a file backwards.
const TAIL_CHUNK: u64 = 8 * 1024;

/// One record per line. Lines that fail to parse are skipped with a warning
/// so a single torn write does not hide the rest of the log. An append after
/// a torn write starts on a fresh line.
pub struct JsonlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> JsonlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;
        if !ends_with_newline(&mut file).await? {
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Every readable record, in file order. A missing file is empty.
    pub async fn read_all(&self) -> Result<Vec<T>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let (records, skipped) = parse_lines(&content);
        self.warn_skipped(skipped);
        Ok(records)
    }

    /// The last `limit` readable records, in file order.
    ///
    /// Reads backwards from the end in fixed steps, so the cost follows the
    /// size of the tail rather than the size of the file.
    pub async fn read_tail(&self, limit: usize) -> Result<Vec<T>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut offset = file.metadata().await?.len();
        let mut buffer: Vec<u8> = Vec::new();
        loop {
            let step = TAIL_CHUNK.min(offset);
            offset -= step;
            let mut chunk = vec![0u8; step as usize];
            file.seek(SeekFrom::Start(offset)).await?;
            file.read_exact(&mut chunk).await?;
            chunk.extend_from_slice(&buffer);
            buffer = chunk;

            // Before the start of the file, the first line may be cut off.
            let complete = if offset == 0 {
                &buffer[..]
            } else {
                match buffer.iter().position(|byte| *byte == b'\n') {
                    Some(index) => &buffer[index + 1..],
                    None => continue,
                }
            };

            let (mut records, skipped) = parse_lines::<T>(complete);
            if records.len() >= limit || offset == 0 {
                self.warn_skipped(skipped);
                let excess = records.len().saturating_sub(limit);
                return Ok(records.split_off(excess));
            }
        }
    }

    fn warn_skipped(&self, skipped: usize) {
        if skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                skipped,
                "Skipping unreadable records"
            );
        }
    }
}

async fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).await?;
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

/// Parses every non-blank line; returns the records and how many lines failed.
fn parse_lines<T: DeserializeOwned>(content: &[u8]) -> (Vec<T>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;
    for line in content.split(|byte| *byte == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice(line) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }
    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        n: u32,
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let file = JsonlFile::<Entry>::new(dir.path().join("none.jsonl"));
        assert!(file.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appends_preserve_order_and_skip_torn_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log/entries.jsonl");
        let file = JsonlFile::new(path.clone());

        file.append(&Entry { n: 1 }).await.unwrap();
        tokio::fs::write(
            &path,
            format!("{}{{\"n\": 2\n", tokio::fs::read_to_string(&path).await.unwrap()),
        )
        .await
        .unwrap();
        file.append(&Entry { n: 3 }).await.unwrap();

        let entries = file.read_all().await.unwrap();
        assert_eq!(entries, vec![Entry { n: 1 }, Entry { n: 3 }]);
    }

    #[tokio::test]
    async fn append_after_unterminated_tail_starts_a_new_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.jsonl");
        let file = JsonlFile::new(path.clone());

        file.append(&Entry { n: 1 }).await.unwrap();
        let mut raw = OpenOptions::new().append(true).open(&path).await.unwrap();
        raw.write_all(b"{\"n\": 2").await.unwrap();
        drop(raw);
        file.append(&Entry { n: 3 }).await.unwrap();

        assert_eq!(
            file.read_all().await.unwrap(),
            vec![Entry { n: 1 }, Entry { n: 3 }]
        );
        assert_eq!(file.read_tail(5).await.unwrap(), vec![Entry { n: 1 }, Entry { n: 3 }]);
    }

    #[tokio::test]
    async fn tail_spans_several_chunks() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Padded {
            n: u32,
            pad: String,
        }

        let dir = TempDir::new().unwrap();
        let file = JsonlFile::new(dir.path().join("padded.jsonl"));
        for n in 0..40 {
            file.append(&Padded {
                n,
                pad: "보리".repeat(300),
            })
            .await
            .unwrap();
        }

        let tail: Vec<u32> = file.read_tail(10).await.unwrap().into_iter().map(|p| p.n).collect();
        assert_eq!(tail, (30..40).collect::<Vec<_>>());
        assert_eq!(file.read_tail(100).await.unwrap().len(), 40);
    }

    #[tokio::test]
    async fn tail_of_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = JsonlFile::<Entry>::new(dir.path().join("none.jsonl"));
        assert!(file.read_tail(10).await.unwrap().is_empty());
    }
}
