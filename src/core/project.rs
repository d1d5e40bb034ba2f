//! Project discovery and layout
//!
//! A project is any directory containing a `.hbt/` marker. Ledger files live
//! under `records/` at the project root.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory identifying a project root
pub const MARKER_DIR: &str = ".hbt";

/// Directory holding the four ledger files
pub const RECORDS_DIR: &str = "records";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not inside an hbt project (no .hbt directory found). Run 'hbt init' first")]
    NotFound,

    #[error("A project already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An hbt project rooted at a directory
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Discover the project by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Discover the project by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut dir = start;
        loop {
            if dir.join(MARKER_DIR).is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(ProjectError::NotFound),
            }
        }
    }

    /// Initialize a new project at the given directory
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let marker = path.join(MARKER_DIR);
        if marker.exists() {
            return Err(ProjectError::AlreadyExists(path.to_path_buf()));
        }
        fs::create_dir_all(&marker)?;
        fs::create_dir_all(path.join(RECORDS_DIR))?;
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join("config.yaml")
    }

    pub fn records_dir(&self) -> PathBuf {
        self.root.join(RECORDS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(tmp.path().join(MARKER_DIR).is_dir());
        assert!(project.records_dir().is_dir());
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_init_refuses_existing_project() {
        let tmp = TempDir::new().unwrap();
        Project::init(tmp.path()).unwrap();

        assert!(matches!(
            Project::init(tmp.path()),
            Err(ProjectError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = TempDir::new().unwrap();
        Project::init(tmp.path()).unwrap();

        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_fails_outside_project() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound)
        ));
    }
}
