// src/fs/mock.rs

use super::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Contents of one mock file, shared between the filesystem and any open
/// readers so appends become visible to them.
#[derive(Debug, Default)]
struct MockFileState {
    data: Vec<u8>,
    failing_reads: usize,
}

#[derive(Debug, Default)]
struct MockInner {
    files: HashMap<PathBuf, Arc<Mutex<MockFileState>>>,
    locked: HashSet<PathBuf>,
    undeletable: HashSet<PathBuf>,
    remove_attempts: HashMap<PathBuf, usize>,
}

/// In-memory filesystem for session tests.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    inner: Arc<Mutex<MockInner>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let state = MockFileState {
            data: content.into(),
            failing_reads: 0,
        };
        self.lock()
            .files
            .insert(path.as_ref().to_path_buf(), Arc::new(Mutex::new(state)));
    }

    /// Append to a file the way a concurrent writer would, creating it if
    /// needed. Open readers see the new bytes on their next read.
    pub fn append(&self, path: impl AsRef<Path>, bytes: impl AsRef<[u8]>) {
        let state = self.file_state(path.as_ref());
        let mut state = state.lock().unwrap_or_else(|p| p.into_inner());
        state.data.extend_from_slice(bytes.as_ref());
    }

    /// Current contents, or `None` if the file does not exist.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let inner = self.lock();
        inner.files.get(path.as_ref()).map(|state| {
            state
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .data
                .clone()
        })
    }

    /// Simulate another process holding the file open: removal fails with a
    /// sharing violation until unlocked.
    pub fn set_locked(&self, path: impl AsRef<Path>, locked: bool) {
        let mut inner = self.lock();
        let path = path.as_ref().to_path_buf();
        if locked {
            inner.locked.insert(path);
        } else {
            inner.locked.remove(&path);
        }
    }

    /// Removal fails with `PermissionDenied`.
    pub fn set_undeletable(&self, path: impl AsRef<Path>, undeletable: bool) {
        let mut inner = self.lock();
        let path = path.as_ref().to_path_buf();
        if undeletable {
            inner.undeletable.insert(path);
        } else {
            inner.undeletable.remove(&path);
        }
    }

    /// The next `count` reads of `path` from any open reader fail.
    pub fn fail_next_reads(&self, path: impl AsRef<Path>, count: usize) {
        let state = self.file_state(path.as_ref());
        state.lock().unwrap_or_else(|p| p.into_inner()).failing_reads = count;
    }

    /// How many times `remove_file` was called for `path`.
    pub fn remove_attempts(&self, path: impl AsRef<Path>) -> usize {
        self.lock()
            .remove_attempts
            .get(path.as_ref())
            .copied()
            .unwrap_or(0)
    }

    fn file_state(&self, path: &Path) -> Arc<Mutex<MockFileState>> {
        let mut inner = self.lock();
        Arc::clone(inner.files.entry(path.to_path_buf()).or_default())
    }
}

impl FileSystem for MockFileSystem {
    fn prepare_empty(&self, path: &Path) -> io::Result<()> {
        self.lock().files.remove(path);
        Ok(())
    }

    fn open_shared_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(MockReader {
            state: self.file_state(path),
            pos: 0,
        }))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        *inner.remove_attempts.entry(path.to_path_buf()).or_default() += 1;

        if inner.undeletable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access denied: {path:?}"),
            ));
        }
        if inner.locked.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::ResourceBusy,
                format!("file is being used by another process: {path:?}"),
            ));
        }

        match inner.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {path:?}"),
            )),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }
}

/// Reader over a mock file that keeps its own offset, like an OS handle.
struct MockReader {
    state: Arc<Mutex<MockFileState>>,
    pos: usize,
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());

        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(io::Error::other("simulated transient read failure"));
        }

        let available = state.data.get(self.pos..).unwrap_or(&[]);
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}
