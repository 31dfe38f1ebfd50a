use rand::seq::SliceRandom;
use tokio::sync::{Mutex, RwLock};

use crate::error::Error;
use crate::naming::tree::PathNode;
use crate::path::Path;
use crate::storage::{CommandClient, ServerStubs, StorageClient};

/// Client-facing `Service` operations plus registration-facing logic (spec
/// §4.8): an in-memory directory tree of [`PathNode`]s, and the list of
/// storage servers that have registered with this naming server.
///
/// The tree is guarded by a single read-write lock (spec §5: "either one
/// global tree lock or a read-write lock is acceptable"); the registered-stubs
/// list has its own lock, and containment-then-add during `register` is a
/// single critical section under it.
pub struct NamingServer {
    tree: RwLock<PathNode>,
    registered: Mutex<Vec<ServerStubs>>,
}

impl Default for NamingServer {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingServer {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(PathNode::new_directory(Path::root())),
            registered: Mutex::new(Vec::new()),
        }
    }

    // ---- Service interface -------------------------------------------------

    pub async fn is_directory(&self, path: &Path) -> Result<bool, Error> {
        if path.is_root() {
            return Ok(true);
        }
        let tree = self.tree.read().await;
        let node = tree.get_node_by_path(path)?;
        Ok(node.is_directory())
    }

    pub async fn list(&self, path: &Path) -> Result<Vec<String>, Error> {
        let tree = self.tree.read().await;
        let node = if path.is_root() {
            &*tree
        } else {
            tree.get_node_by_path(path)?
        };
        if node.is_file() {
            return Err(Error::not_found(format!("not a directory: {path}")));
        }
        Ok(node.children().map(|(name, _)| name.clone()).collect())
    }

    pub async fn get_storage(&self, path: &Path) -> Result<StorageClient, Error> {
        let tree = self.tree.read().await;
        let node = tree.get_node_by_path(path)?;
        let stubs = node
            .server_stubs()
            .ok_or_else(|| Error::not_found(format!("not a file: {path}")))?;
        Ok(StorageClient::new(stubs.storage.clone()))
    }

    /// Creates a file at `path`. `false` on root, or if `path` already exists
    /// as a file or directory. Fails *not-found* if an intermediate directory
    /// is missing (spec §4.8).
    pub async fn create_file(&self, path: &Path) -> Result<bool, Error> {
        if path.is_root() {
            return Ok(false);
        }

        let stubs = {
            let mut tree = self.tree.write().await;
            let parent = tree.get_node_by_path_mut(&path.parent())?;
            if parent.is_file() {
                return Err(Error::not_found(format!(
                    "parent is not a directory: {}",
                    path.parent()
                )));
            }
            if parent.has_child(path.last()) {
                return Ok(false);
            }

            let stubs = self.pick_storage_server().await?;
            parent
                .add_child(
                    path.last().to_string(),
                    PathNode::new_file(path.clone(), stubs.clone()),
                )
                .expect("presence just checked above");
            stubs
        };

        let command = CommandClient::new(stubs.command);
        command.create(path).await?;
        Ok(true)
    }

    /// Creates a directory at `path`. Same walk rules as `create_file`.
    pub async fn create_directory(&self, path: &Path) -> Result<bool, Error> {
        if path.is_root() {
            return Ok(false);
        }

        let mut tree = self.tree.write().await;
        let parent = tree.get_node_by_path_mut(&path.parent())?;
        if parent.is_file() {
            return Err(Error::not_found(format!(
                "parent is not a directory: {}",
                path.parent()
            )));
        }
        if parent.has_child(path.last()) {
            return Ok(false);
        }
        parent
            .add_child(
                path.last().to_string(),
                PathNode::new_directory(path.clone()),
            )
            .expect("presence just checked above");
        Ok(true)
    }

    /// Removes the subtree rooted at `path` from the naming tree, issuing a
    /// `delete` command to each storage server that owns a descendant file
    /// first (spec §3 Lifecycle: deletion "issues corresponding delete
    /// commands on the owning storage servers"). `false` if `path` is root or
    /// absent. A storage server that fails its delete command is logged and
    /// skipped; the tree node is removed regardless, since the naming tree is
    /// the source of truth for what clients can see.
    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        if path.is_root() {
            return Ok(false);
        }

        let mut tree = self.tree.write().await;
        let parent = match tree.get_node_by_path_mut(&path.parent()) {
            Ok(parent) => parent,
            Err(_) => return Ok(false),
        };

        let removed = match parent.delete_child(path.last()) {
            Ok(node) => node,
            Err(_) => return Ok(false),
        };

        for descendant in removed.get_descendants() {
            let stubs = descendant
                .server_stubs()
                .expect("get_descendants yields only files");
            let command = CommandClient::new(stubs.command.clone());
            if let Err(e) = command.delete(descendant.path()).await {
                log::warn!(
                    "delete command failed on storage server for {}: {e}",
                    descendant.path()
                );
            }
        }

        Ok(true)
    }

    // ---- Registration interface --------------------------------------------

    /// Registers a storage server advertising `files`. Fails *already
    /// registered* if `(storage, command)` was already recorded. Returns the
    /// list of files that duplicate an existing assignment; the caller
    /// (the storage server) must delete those locally (spec §4.6/§4.8).
    pub async fn register(
        &self,
        stubs: ServerStubs,
        files: Vec<Path>,
    ) -> Result<Vec<Path>, Error> {
        {
            let mut registered = self.registered.lock().await;
            if registered.contains(&stubs) {
                return Err(Error::already_registered(format!(
                    "storage server already registered: {}",
                    stubs.storage
                )));
            }
            registered.push(stubs.clone());
        }

        let mut duplicates = Vec::new();
        let mut tree = self.tree.write().await;

        for file in files {
            if file.is_root() {
                // A registered root would collide with the tree's own root
                // directory node; nothing sensible to insert, so it is
                // reported back as a duplicate rather than silently dropped.
                duplicates.push(file);
                continue;
            }

            let mut node = &mut *tree;
            let mut is_duplicate = false;

            for component in file.components()[..file.components().len() - 1].iter() {
                if node.has_child(component) {
                    if node.does_child_file_exist(component) {
                        is_duplicate = true;
                        break;
                    }
                    node = node.get_child_node_mut(component).unwrap();
                } else {
                    let child_path = node.path().child(component)?;
                    node.add_child(component.clone(), PathNode::new_directory(child_path))
                        .expect("presence just checked above");
                    node = node.get_child_node_mut(component).unwrap();
                }
            }

            if is_duplicate {
                duplicates.push(file);
                continue;
            }

            let last = file.last().to_string();
            if node.has_child(&last) {
                duplicates.push(file);
                continue;
            }

            node.add_child(last, PathNode::new_file(file.clone(), stubs.clone()))
                .expect("presence just checked above");
        }

        Ok(duplicates)
    }

    async fn pick_storage_server(&self) -> Result<ServerStubs, Error> {
        let registered = self.registered.lock().await;
        registered
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| Error::not_found("no storage servers are registered"))
    }
}
