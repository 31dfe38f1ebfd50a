use std::fmt;
use std::path::{Path as StdPath, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An immutable, ordered sequence of non-empty path components.
///
/// The root path is the empty sequence and prints as `/`. A component may not
/// contain `/` or `:`, and may not be `..`. Equality, hashing, and ordering are
/// all component-wise.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    components: Vec<String>,
}

impl Path {
    /// The root path, `/`.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parses a path from its string form. Must start with `/`; must not contain
    /// `:` or a `..` component. Empty components produced by repeated or trailing
    /// slashes are dropped.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if !s.starts_with('/') {
            return Err(Error::invalid_argument(format!(
                "path must start with '/': {s:?}"
            )));
        }
        if s.contains(':') {
            return Err(Error::invalid_argument(format!(
                "path must not contain ':': {s:?}"
            )));
        }

        let components: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if components.iter().any(|c| c == "..") {
            return Err(Error::invalid_argument(format!(
                "path must not contain '..': {s:?}"
            )));
        }

        Ok(Self { components })
    }

    /// Builds a new path by appending `component` to `self`.
    pub fn child(&self, component: &str) -> Result<Self, Error> {
        if component.is_empty() {
            return Err(Error::invalid_argument("path component must not be empty"));
        }
        if component.contains('/') {
            return Err(Error::invalid_argument(
                "path component must not contain '/'",
            ));
        }
        if component.contains(':') {
            return Err(Error::invalid_argument(
                "path component must not contain ':'",
            ));
        }
        if component == ".." {
            return Err(Error::invalid_argument(
                "path component must not be '..'",
            ));
        }

        let mut components = self.components.clone();
        components.push(component.to_string());
        Ok(Self { components })
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The components, in order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// The path with the final component removed. Undefined (panics) on root;
    /// callers at the protocol boundary should check `is_root()` first.
    pub fn parent(&self) -> Self {
        assert!(!self.is_root(), "root has no parent");
        Self {
            components: self.components[..self.components.len() - 1].to_vec(),
        }
    }

    /// The final component. Undefined (panics) on root.
    pub fn last(&self) -> &str {
        assert!(!self.is_root(), "root has no last component");
        self.components.last().unwrap()
    }

    /// True iff `other`'s components are a prefix of this path's components
    /// (reflexive: `p.is_subpath(&p)` is always true).
    pub fn is_subpath(&self, other: &Path) -> bool {
        other.components.len() <= self.components.len()
            && self.components[..other.components.len()] == other.components[..]
    }

    /// Resolves this logical path against a host filesystem `root`, guaranteed to
    /// never escape `root` since every component is checked free of `/`/`..`-style
    /// traversal tricks at construction time (components are whole path segments
    /// coming only from `parse`/`child`, never raw user strings spliced in).
    pub fn to_file(&self, root: &StdPath) -> PathBuf {
        let mut buf = root.to_path_buf();
        for component in &self.components {
            buf.push(component);
        }
        buf
    }

    /// Enumerates every regular file reachable under `directory` on the host
    /// filesystem, returned as paths relative to `directory` (each starting with
    /// `/`). Traversal order is unspecified but stable within one call.
    pub fn list(directory: &StdPath) -> Result<Vec<Path>, Error> {
        if !directory.exists() {
            return Err(Error::not_found(format!(
                "directory does not exist: {}",
                directory.display()
            )));
        }
        if !directory.is_dir() {
            return Err(Error::invalid_argument(format!(
                "not a directory: {}",
                directory.display()
            )));
        }

        let mut results = Vec::new();
        Self::list_into(directory, directory, &mut results)?;
        results.sort();
        Ok(results)
    }

    fn list_into(root: &StdPath, dir: &StdPath, out: &mut Vec<Path>) -> Result<(), Error> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| Error::io_error(format!("reading {}: {e}", dir.display())))?;

        for entry in entries {
            let entry =
                entry.map_err(|e| Error::io_error(format!("reading entry: {e}")))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| Error::io_error(format!("stat {}: {e}", path.display())))?;

            if file_type.is_dir() {
                Self::list_into(root, &path, out)?;
            } else if file_type.is_file() {
                let relative = path.strip_prefix(root).expect("child of root");
                let mut components = Vec::new();
                for part in relative.components() {
                    components.push(part.as_os_str().to_string_lossy().into_owned());
                }
                out.push(Path { components });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            for component in &self.components {
                write!(f, "/{component}")?;
            }
            Ok(())
        }
    }
}

impl std::str::FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}
