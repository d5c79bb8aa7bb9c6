//! Temporary video files
//!
//! Uploads and downloads are written chunk by chunk through `tokio::fs` into
//! a `NamedTempFile`, which deletes itself when dropped.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

pub struct Spool {
    file: NamedTempFile,
    writer: tokio::fs::File,
    written: usize,
    limit: usize,
}

impl Spool {
    /// Create the backing file in `temp_dir`, or the system temp directory
    pub fn create(temp_dir: Option<&Path>, limit: usize) -> io::Result<Self> {
        let file = match temp_dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        let writer = tokio::fs::File::from_std(file.as_file().try_clone()?);
        Ok(Self {
            file,
            writer,
            written: 0,
            limit,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.written + chunk.len() > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("video exceeds {} bytes", self.limit),
            ));
        }
        self.writer.write_all(chunk).await?;
        self.written += chunk.len();
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand over the file
    pub async fn finish(mut self) -> io::Result<NamedTempFile> {
        self.writer.flush().await?;
        Ok(self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chunks_land_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut spool = Spool::create(Some(dir.path()), 16).unwrap();
        spool.write(b"abc").await.unwrap();
        spool.write(b"defg").await.unwrap();
        assert_eq!(spool.written(), 7);

        let file = spool.finish().await.unwrap();
        assert!(file.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"abcdefg");

        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_limit_enforced() {
        let mut spool = Spool::create(None, 4).unwrap();
        spool.write(b"1234").await.unwrap();
        let err = spool.write(b"5").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
