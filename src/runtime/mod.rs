//! Runtime abstraction for process environment and file access.
//!
//! The client never touches `std::env` or the file system directly; it goes
//! through [`Runtime`] so credential resolution and attachment validation can
//! be exercised with a mock in tests.
//!
//! # Structure
//!
//! - `env` - Environment variables
//! - `fs` - File metadata and scoped reads

mod env;
mod fs;

use async_trait::async_trait;
use std::env as std_env;
use std::io;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn exists(&self, path: &Path) -> bool;

    /// Size of the file at `path` in bytes.
    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Read the whole file. The handle is opened and released inside the call.
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        self.file_size_impl(path)
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.read_file_impl(path).await
    }
}
