//! File metadata and reads used by attachment uploads.

use std::io;
use std::path::Path;
use tokio::io::AsyncReadExt;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn file_size_impl(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn read_file_impl(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;
        Ok(contents)
    }
}
