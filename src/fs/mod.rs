// src/fs/mod.rs

//! Filesystem seam for the log file.
//!
//! The session only touches the filesystem through this trait so tests can
//! swap in [`mock::MockFileSystem`], which can simulate a file that keeps
//! growing, a file that stays locked by another process, or one that can
//! never be deleted.
//!
//! Methods return `std::io::Result` rather than `anyhow` so callers can
//! classify failures by [`std::io::ErrorKind`].

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Make sure a session starts from an empty log: remove `path` if it
    /// exists. A missing file is not an error.
    fn prepare_empty(&self, path: &Path) -> io::Result<()>;

    /// Open `path` for reading without excluding concurrent writers,
    /// creating it first when absent.
    fn open_shared_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Delete `path`.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn prepare_empty(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn open_shared_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        // Create-if-absent needs write access; the handle we keep does not.
        fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;

        let file = shared_read_options().open(path)?;
        Ok(Box::new(file))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(windows)]
fn shared_read_options() -> fs::OpenOptions {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_SHARE_READ: u32 = 0x0000_0001;
    const FILE_SHARE_WRITE: u32 = 0x0000_0002;
    const FILE_SHARE_DELETE: u32 = 0x0000_0004;

    let mut options = fs::OpenOptions::new();
    options
        .read(true)
        .share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE);
    options
}

#[cfg(not(windows))]
fn shared_read_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.read(true);
    options
}
