use std::collections::HashMap;

use crate::error::Error;
use crate::path::Path;
use crate::storage::ServerStubs;

/// A node in the naming server's in-memory directory tree (spec §3/§4.7).
///
/// Invariants upheld by construction:
/// - a node with `Some(server_stubs)` is a file and has no children;
/// - a node with `None` is a directory; the root is always a directory;
/// - a child's key equals that child's own last path component, and the
///   child's path equals this node's path extended by that component;
/// - paths in the tree are unique (enforced by [`PathNode::add_child`]
///   refusing to overwrite an existing entry).
pub struct PathNode {
    path: Path,
    server_stubs: Option<ServerStubs>,
    children: HashMap<String, PathNode>,
}

impl PathNode {
    /// Creates a new directory node at `path`.
    pub fn new_directory(path: Path) -> Self {
        Self {
            path,
            server_stubs: None,
            children: HashMap::new(),
        }
    }

    /// Creates a new file node at `path`, owned by `server_stubs`.
    pub fn new_file(path: Path, server_stubs: ServerStubs) -> Self {
        Self {
            path,
            server_stubs: Some(server_stubs),
            children: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_file(&self) -> bool {
        self.server_stubs.is_some()
    }

    pub fn is_directory(&self) -> bool {
        self.server_stubs.is_none()
    }

    pub fn server_stubs(&self) -> Option<&ServerStubs> {
        self.server_stubs.as_ref()
    }

    pub fn children(&self) -> impl Iterator<Item = (&String, &PathNode)> {
        self.children.iter()
    }

    pub fn get_child_node(&self, name: &str) -> Result<&PathNode, Error> {
        self.children
            .get(name)
            .ok_or_else(|| Error::not_found(format!("no such child: {name}")))
    }

    pub fn get_child_node_mut(&mut self, name: &str) -> Result<&mut PathNode, Error> {
        self.children
            .get_mut(name)
            .ok_or_else(|| Error::not_found(format!("no such child: {name}")))
    }

    pub fn does_child_file_exist(&self, name: &str) -> bool {
        self.children.get(name).is_some_and(PathNode::is_file)
    }

    pub fn does_child_directory_exist(&self, name: &str) -> bool {
        self.children.get(name).is_some_and(PathNode::is_directory)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Adds `node` as a child named `name`. Fails *duplicate* if a child of
    /// that name already exists.
    pub fn add_child(&mut self, name: String, node: PathNode) -> Result<(), Error> {
        if self.children.contains_key(&name) {
            return Err(Error::invalid_argument(format!(
                "child already exists: {name}"
            )));
        }
        self.children.insert(name, node);
        Ok(())
    }

    /// Removes and returns the child named `name`. Fails *not-found* if absent.
    pub fn delete_child(&mut self, name: &str) -> Result<PathNode, Error> {
        self.children
            .remove(name)
            .ok_or_else(|| Error::not_found(format!("no such child: {name}")))
    }

    /// Walks `path`'s components from this node, failing *not-found* if any
    /// component is absent along the way.
    pub fn get_node_by_path(&self, path: &Path) -> Result<&PathNode, Error> {
        let mut node = self;
        for component in path.iter() {
            node = node.get_child_node(component)?;
        }
        Ok(node)
    }

    pub fn get_node_by_path_mut(&mut self, path: &Path) -> Result<&mut PathNode, Error> {
        let mut node = self;
        for component in path.iter() {
            node = node.get_child_node_mut(component)?;
        }
        Ok(node)
    }

    /// Flattens every leaf (file) descendant of this node, including `self` if
    /// it is itself a file.
    pub fn get_descendants(&self) -> Vec<&PathNode> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a PathNode>) {
        if self.is_file() {
            out.push(self);
            return;
        }
        for child in self.children.values() {
            child.collect_descendants(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn stubs() -> ServerStubs {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        ServerStubs::new(
            crate::rpc::Stub::new(addr, "Storage"),
            crate::rpc::Stub::new(addr, "Command"),
        )
    }

    #[test]
    fn add_and_get_child() {
        let mut root = PathNode::new_directory(Path::root());
        let a_path = Path::root().child("a").unwrap();
        root.add_child("a".to_string(), PathNode::new_directory(a_path))
            .unwrap();

        assert!(root.does_child_directory_exist("a"));
        assert!(!root.does_child_file_exist("a"));
    }

    #[test]
    fn add_child_twice_fails_duplicate() {
        let mut root = PathNode::new_directory(Path::root());
        let a_path = Path::root().child("a").unwrap();
        root.add_child("a".to_string(), PathNode::new_directory(a_path.clone()))
            .unwrap();
        let err = root
            .add_child("a".to_string(), PathNode::new_directory(a_path))
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn get_node_by_path_walks_components() {
        let mut root = PathNode::new_directory(Path::root());
        let a = Path::root().child("a").unwrap();
        let ab = a.child("b").unwrap();
        root.add_child("a".to_string(), PathNode::new_directory(a))
            .unwrap();
        root.get_child_node_mut("a")
            .unwrap()
            .add_child("b".to_string(), PathNode::new_file(ab.clone(), stubs()))
            .unwrap();

        let found = root.get_node_by_path(&ab).unwrap();
        assert!(found.is_file());
        assert_eq!(found.path(), &ab);
    }

    #[test]
    fn get_descendants_flattens_files_only() {
        let mut root = PathNode::new_directory(Path::root());
        let a = Path::root().child("a").unwrap();
        let ab = a.child("b").unwrap();
        let ac = a.child("c").unwrap();
        let mut a_node = PathNode::new_directory(a);
        a_node
            .add_child("b".to_string(), PathNode::new_file(ab, stubs()))
            .unwrap();
        a_node
            .add_child("c".to_string(), PathNode::new_file(ac, stubs()))
            .unwrap();
        root.add_child("a".to_string(), a_node).unwrap();

        assert_eq!(root.get_descendants().len(), 2);
    }
}
