use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::error::Error;
use crate::path::Path;

/// Hosts a subtree of the local filesystem and serves `size`/`read`/`write`
/// (the `Storage` interface) and `create`/`delete` (the `Command` interface)
/// on behalf of the naming server and its clients (spec §4.6).
///
/// All five operations are serialized through a single mutex (spec §5: "no
/// per-byte locking is provided"). This mirrors the `rfs`-style
/// `resolve_path`/backdir-guard approach of confining every operation to a
/// root directory, generalized from string paths to the immutable [`Path`]
/// type so traversal can never escape `root`.
pub struct StorageServer {
    root: PathBuf,
    lock: Mutex<()>,
}

impl StorageServer {
    /// Creates a server rooted at `root`. Fails *not-found* if `root` does not
    /// exist or is not a directory (spec §4.6 `start` preconditions).
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::not_found(format!(
                "storage root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// The set of files currently present under `root`, used to build the
    /// registration candidate list (spec §4.6 `start`).
    pub fn list_local_files(&self) -> Result<Vec<Path>, Error> {
        Path::list(&self.root)
    }

    pub async fn size(&self, path: &Path) -> Result<u64, Error> {
        let _guard = self.lock.lock().await;
        let file_path = path.to_file(&self.root);
        let metadata = fs::metadata(&file_path)
            .map_err(|_| Error::not_found(format!("no such file: {path}")))?;
        if !metadata.is_file() {
            return Err(Error::not_found(format!("not a regular file: {path}")));
        }
        Ok(metadata.len())
    }

    pub async fn read(&self, path: &Path, offset: i64, length: i64) -> Result<Vec<u8>, Error> {
        let _guard = self.lock.lock().await;
        let file_path = path.to_file(&self.root);
        let metadata = fs::metadata(&file_path)
            .map_err(|_| Error::not_found(format!("no such file: {path}")))?;
        if !metadata.is_file() {
            return Err(Error::not_found(format!("not a regular file: {path}")));
        }

        if offset < 0 || length < 0 {
            return Err(Error::out_of_bounds("offset and length must be non-negative"));
        }
        let size = metadata.len() as i64;
        let end = offset.checked_add(length).ok_or_else(|| {
            Error::out_of_bounds(format!("offset {offset} plus length {length} overflows"))
        })?;
        if end > size {
            return Err(Error::out_of_bounds(format!(
                "read of {length} bytes at offset {offset} exceeds file size {size}"
            )));
        }

        let mut file = fs::File::open(&file_path)
            .map_err(|e| Error::io_error(format!("opening {path}: {e}")))?;
        file.seek(SeekFrom::Start(offset as u64))
            .map_err(|e| Error::io_error(format!("seeking {path}: {e}")))?;

        let mut buf = vec![0u8; length as usize];
        file.read_exact(&mut buf)
            .map_err(|e| Error::io_error(format!("reading {path}: {e}")))?;
        Ok(buf)
    }

    pub async fn write(&self, path: &Path, offset: i64, data: &[u8]) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let file_path = path.to_file(&self.root);
        let metadata = fs::metadata(&file_path)
            .map_err(|_| Error::not_found(format!("no such file: {path}")))?;
        if !metadata.is_file() {
            return Err(Error::not_found(format!("not a regular file: {path}")));
        }

        if offset < 0 {
            return Err(Error::out_of_bounds("offset must be non-negative"));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .open(&file_path)
            .map_err(|e| Error::io_error(format!("opening {path} for write: {e}")))?;
        file.seek(SeekFrom::Start(offset as u64))
            .map_err(|e| Error::io_error(format!("seeking {path}: {e}")))?;
        file.write_all(data)
            .map_err(|e| Error::io_error(format!("writing {path}: {e}")))?;
        Ok(())
    }

    /// Creates `path` (and any missing parent directories), returning whether
    /// the file was newly created. `false` on root (spec §4.6 `create`).
    pub async fn create(&self, path: &Path) -> Result<bool, Error> {
        let _guard = self.lock.lock().await;
        if path.is_root() {
            return Ok(false);
        }

        let file_path = path.to_file(&self.root);
        if file_path.exists() {
            return Ok(false);
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io_error(format!("creating parents of {path}: {e}")))?;
        }
        fs::File::create(&file_path)
            .map_err(|e| Error::io_error(format!("creating {path}: {e}")))?;
        Ok(true)
    }

    /// Deletes `path` (recursively if a directory), then prunes any empty
    /// ancestor directories up to, but not including, `root`. `false` on root
    /// or if the target does not exist (spec §4.6 `delete`).
    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        let _guard = self.lock.lock().await;
        if path.is_root() {
            return Ok(false);
        }

        let file_path = path.to_file(&self.root);
        let metadata = match fs::symlink_metadata(&file_path) {
            Ok(m) => m,
            Err(_) => return Ok(false),
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&file_path)
        } else {
            fs::remove_file(&file_path)
        };
        removed.map_err(|e| Error::io_error(format!("deleting {path}: {e}")))?;

        self.prune_empty_ancestors(&file_path);
        Ok(true)
    }

    fn prune_empty_ancestors(&self, deleted: &std::path::Path) {
        let mut current = deleted.parent().map(std::path::Path::to_path_buf);
        while let Some(dir) = current {
            if dir == self.root {
                break;
            }
            match fs::read_dir(&dir) {
                Ok(mut entries) if entries.next().is_none() => {
                    if fs::remove_dir(&dir).is_err() {
                        break;
                    }
                    current = dir.parent().map(std::path::Path::to_path_buf);
                }
                _ => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_server() -> (tempfile::TempDir, StorageServer) {
        let dir = tempfile::tempdir().unwrap();
        let server = StorageServer::new(dir.path()).unwrap();
        (dir, server)
    }

    #[tokio::test]
    async fn create_then_size_then_write_then_read_round_trips() {
        let (_dir, server) = make_server();
        let path = Path::parse("/a/b/c").unwrap();

        assert!(server.create(&path).await.unwrap());
        assert!(!server.create(&path).await.unwrap());
        assert_eq!(server.size(&path).await.unwrap(), 0);

        server.write(&path, 0, b"hello").await.unwrap();
        assert_eq!(server.size(&path).await.unwrap(), 5);
        assert_eq!(server.read(&path, 0, 5).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn write_past_end_extends_the_file() {
        let (_dir, server) = make_server();
        let path = Path::parse("/f").unwrap();
        server.create(&path).await.unwrap();

        server.write(&path, 5, b"xyz").await.unwrap();
        assert_eq!(server.size(&path).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn read_past_eof_fails_out_of_bounds() {
        let (_dir, server) = make_server();
        let path = Path::parse("/f").unwrap();
        server.create(&path).await.unwrap();
        server.write(&path, 0, b"hi").await.unwrap();

        let err = server.read(&path, 0, 100).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::OutOfBounds);
    }

    #[tokio::test]
    async fn read_with_overflowing_offset_and_length_fails_out_of_bounds() {
        let (_dir, server) = make_server();
        let path = Path::parse("/f").unwrap();
        server.create(&path).await.unwrap();
        server.write(&path, 0, b"hi").await.unwrap();

        let err = server.read(&path, i64::MAX - 1, 10).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::OutOfBounds);
    }

    #[tokio::test]
    async fn size_of_missing_file_fails_not_found() {
        let (_dir, server) = make_server();
        let path = Path::parse("/missing").unwrap();
        let err = server.size(&path).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn create_and_delete_fail_on_root() {
        let (_dir, server) = make_server();
        let root = Path::root();
        assert!(!server.create(&root).await.unwrap());
        assert!(!server.delete(&root).await.unwrap());
    }

    #[tokio::test]
    async fn delete_prunes_empty_ancestor_directories_but_not_root() {
        let (dir, server) = make_server();
        let path = Path::parse("/a/b/c").unwrap();
        server.create(&path).await.unwrap();

        assert!(server.delete(&path).await.unwrap());
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn delete_prunes_only_ancestors_that_become_empty() {
        let (dir, server) = make_server();
        server.create(&Path::parse("/a/b/c").unwrap()).await.unwrap();
        server.create(&Path::parse("/a/d").unwrap()).await.unwrap();

        server.delete(&Path::parse("/a/b/c").unwrap()).await.unwrap();

        assert!(!dir.path().join("a/b").exists());
        assert!(dir.path().join("a/d").exists());
    }

    #[tokio::test]
    async fn list_local_files_enumerates_registration_candidates() {
        let (_dir, server) = make_server();
        server.create(&Path::parse("/a/b").unwrap()).await.unwrap();
        server.create(&Path::parse("/c").unwrap()).await.unwrap();

        let mut files = server.list_local_files().unwrap();
        files.sort();
        assert_eq!(
            files,
            vec![Path::parse("/a/b").unwrap(), Path::parse("/c").unwrap()]
        );
    }
}
