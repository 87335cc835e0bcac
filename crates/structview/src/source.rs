//! Random-access byte sources.
//!
//! The decoder never needs the whole input in memory: it asks a
//! [ByteSource] for the byte range of each field as it goes.

use async_trait::async_trait;

use crate::errors::SourceError;

/// Asynchronous random-access reads over a blob of fixed size.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Total size of the source in bytes.
    fn size(&self) -> u64;

    /// Reads `start..end`, clamped to the source bounds.
    ///
    /// # Errors
    /// Returns `InvalidRange` if `start > end`, or an I/O error from the
    /// underlying reader.
    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, SourceError>;
}

/// Clamps a requested range to `0..size`.
pub(crate) fn clamp_range(start: u64, end: u64, size: u64) -> Result<(u64, u64), SourceError> {
    if start > end {
        return Err(SourceError::InvalidRange { start, end });
    }
    Ok((start.min(size), end.min(size)))
}

/// A byte source over an owned buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, SourceError> {
        let (start, end) = clamp_range(start, end, self.size())?;
        Ok(self.data[start as usize..end as usize].to_vec())
    }
}

#[cfg(feature = "fs")]
pub use file::FileSource;

#[cfg(feature = "fs")]
mod file {
    use std::{io::SeekFrom, path::Path};

    use async_trait::async_trait;
    use tokio::{
        fs::File,
        io::{AsyncReadExt, AsyncSeekExt},
        sync::Mutex,
    };
    use tracing::trace;

    use super::{ByteSource, clamp_range};
    use crate::errors::SourceError;

    /// A byte source backed by a file handle. Ranges are read on demand.
    #[derive(Debug)]
    pub struct FileSource {
        file: Mutex<File>,
        size: u64,
    }

    impl FileSource {
        /// Opens `path` and records its current length as the source size.
        ///
        /// # Errors
        /// Returns an I/O error if the file cannot be opened or inspected.
        pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
            let file = File::open(path).await?;
            let size = file.metadata().await?.len();
            Ok(Self {
                file: Mutex::new(file),
                size,
            })
        }
    }

    #[async_trait]
    impl ByteSource for FileSource {
        fn size(&self) -> u64 {
            self.size
        }

        async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, SourceError> {
            let (start, end) = clamp_range(start, end, self.size)?;
            trace!(start, end, "reading file range");

            let mut buf = vec![0u8; (end - start) as usize];
            if buf.is_empty() {
                return Ok(buf);
            }

            let mut file = self.file.lock().await;
            file.seek(SeekFrom::Start(start)).await?;
            file.read_exact(&mut buf).await?;
            Ok(buf)
        }
    }
}
