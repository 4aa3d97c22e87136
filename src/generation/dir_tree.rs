//! # Directory-Tree Maps
//!
//! Turns a directory hierarchy into a map: every directory (the root
//! included) becomes a room, linked to the room of its parent directory.
//! Room ids follow a depth-first pre-order walk with entries sorted by name.
//! Symbolic links are not followed. Subdirectories that cannot be read
//! still become rooms, but nothing below them is visited.

use crate::config::{check_vertex_count, MAX_VERTEX_COUNT};
use crate::game::{RoomGraph, RoomId};
use crate::generation::{utils, GenerationConfig, Generator};
use crate::{WarrenError, WarrenResult};
use log::{debug, warn};
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};

/// A map built from a directory tree, with the directory behind each room.
#[derive(Debug, Clone)]
pub struct DirTreeMap {
    pub graph: RoomGraph,
    /// `directories[room]` is the directory that became `room`
    pub directories: Vec<PathBuf>,
}

/// Builds maps from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirTreeGenerator {
    root: PathBuf,
}

impl DirTreeGenerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the tree, stopping early once it is too large to be a map.
    fn walk(&self) -> WarrenResult<(Vec<PathBuf>, Vec<(RoomId, RoomId)>)> {
        let root = fs::canonicalize(&self.root)?;
        if !fs::symlink_metadata(&root)?.is_dir() {
            return Err(WarrenError::GenerationFailed(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut directories = Vec::new();
        let mut edges = Vec::new();
        let mut stack: Vec<(PathBuf, Option<RoomId>)> = vec![(root, None)];

        while let Some((path, parent)) = stack.pop() {
            let id = directories.len();
            if let Some(parent) = parent {
                edges.push((parent, id));
            }

            let children = match subdirectories(&path) {
                Ok(children) => children,
                Err(e) if parent.is_some() => {
                    warn!("Skipping contents of {}: {}", path.display(), e);
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };

            directories.push(path);
            if directories.len() > MAX_VERTEX_COUNT {
                break;
            }
            stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }

        Ok((directories, edges))
    }
}

/// Sorted subdirectories of `path`. Entries whose type cannot be read are
/// skipped.
fn subdirectories(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(path)? {
        match entry.and_then(|entry| Ok((entry.file_type()?, entry.path()))) {
            Ok((kind, child)) if kind.is_dir() => children.push(child),
            Ok(_) => {}
            Err(e) => warn!("Skipping an entry of {}: {}", path.display(), e),
        }
    }
    children.sort();
    Ok(children)
}

impl Generator<DirTreeMap> for DirTreeGenerator {
    fn generate(&self, config: &GenerationConfig, _rng: &mut StdRng) -> WarrenResult<DirTreeMap> {
        let (directories, edges) = self.walk()?;
        debug!(
            "{} found {}{} directories under {}",
            self.generator_type(),
            directories.len(),
            if directories.len() > MAX_VERTEX_COUNT { "+" } else { "" },
            self.root.display()
        );
        check_vertex_count(directories.len())?;

        let map = DirTreeMap {
            graph: RoomGraph::from_edges(directories.len(), &edges),
            directories,
        };
        self.validate(&map, config)?;
        Ok(map)
    }

    fn validate(&self, content: &DirTreeMap, _config: &GenerationConfig) -> WarrenResult<()> {
        utils::validate_graph(&content.graph)
    }

    fn generator_type(&self) -> &'static str {
        "DirTreeGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(root: &Path) -> WarrenResult<DirTreeMap> {
        let config = GenerationConfig::default();
        DirTreeGenerator::new(root).generate(&config, &mut utils::create_rng(&config))
    }

    #[test]
    fn test_tree_becomes_map() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "a/x", "a/y", "b", "c"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        fs::write(dir.path().join("a/file.txt"), "not a room").unwrap();

        let map = build(dir.path()).unwrap();
        let names: Vec<_> = map
            .directories
            .iter()
            .skip(1)
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a", "x", "y", "b", "c"]);

        let graph = &map.graph;
        assert_eq!(graph.vertex_count(), 6);
        assert!(graph.is_fully_connected());
        assert!(graph.are_connected(0, 1));
        assert!(graph.are_connected(1, 2));
        assert!(graph.are_connected(1, 3));
        assert!(graph.are_connected(0, 4));
        assert!(graph.are_connected(0, 5));
        assert_eq!(graph.topology().edge_count(), 5);
    }

    #[test]
    fn test_too_few_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("only")).unwrap();
        assert!(build(dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_a_leaf() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b", "locked/inner"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = build(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Superusers can still read it; either way the walk carries on.
        let map = result.unwrap();
        assert!(map.directories.iter().any(|path| path.ends_with("locked")));
        assert!(map.graph.vertex_count() >= 4);
        assert!(map.graph.is_fully_connected());
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build(&dir.path().join("nope")).is_err());
    }
}
