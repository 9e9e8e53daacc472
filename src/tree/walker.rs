//! Filesystem walker for traversing one side of a mirror

use crate::error::PassAbort;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem entry types, relative to the walked root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A regular file with its size
    File { relative: PathBuf, size: u64 },
    /// A directory
    Directory { relative: PathBuf },
    /// A symbolic link that is not being followed
    Symlink { relative: PathBuf },
    /// Sockets, FIFOs, devices
    Other { relative: PathBuf },
}

impl Entry {
    pub fn relative(&self) -> &Path {
        match self {
            Entry::File { relative, .. }
            | Entry::Directory { relative }
            | Entry::Symlink { relative }
            | Entry::Other { relative } => relative,
        }
    }
}

/// What the walker hands to its visitor
#[derive(Debug)]
pub enum WalkEvent {
    Entry(Entry),
    /// A non-root entry could not be read; traversal continues
    Error { path: PathBuf, message: String },
}

/// Visitor decision after each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into the directory just visited
    SkipDirectory,
    Stop,
}

/// Filesystem walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
    /// Entry names to skip, matched against any component of the relative path
    pub ignore_patterns: Vec<String>,
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the tree top-down, parents before children, siblings by name
    ///
    /// The root itself is not reported. Errors on the root abort the walk;
    /// errors below it are handed to the visitor.
    pub fn visit<F>(&self, mut visitor: F) -> Result<(), PassAbort>
    where
        F: FnMut(WalkEvent) -> Visit,
    {
        let mut iter = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = iter.next() {
            let event = match next {
                Ok(entry) => {
                    let relative = match entry.path().strip_prefix(&self.root) {
                        Ok(relative) => relative.to_path_buf(),
                        Err(_) => continue,
                    };

                    if self.should_ignore(&relative) {
                        if entry.file_type().is_dir() {
                            iter.skip_current_dir();
                        }
                        continue;
                    }

                    let file_type = entry.file_type();
                    let classified = if file_type.is_dir() {
                        Entry::Directory { relative }
                    } else if file_type.is_file() {
                        match entry.metadata() {
                            Ok(metadata) => Entry::File {
                                relative,
                                size: metadata.len(),
                            },
                            Err(e) => {
                                visitor(WalkEvent::Error {
                                    path: entry.path().to_path_buf(),
                                    message: e.to_string(),
                                });
                                continue;
                            }
                        }
                    } else if file_type.is_symlink() {
                        Entry::Symlink { relative }
                    } else {
                        Entry::Other { relative }
                    };
                    WalkEvent::Entry(classified)
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    if e.depth() == 0 || path == self.root {
                        return Err(PassAbort {
                            root: self.root.clone(),
                            message: e.to_string(),
                        });
                    }
                    WalkEvent::Error {
                        path,
                        message: e.to_string(),
                    }
                }
            };

            let is_dir = matches!(event, WalkEvent::Entry(Entry::Directory { .. }));
            match visitor(event) {
                Visit::Continue => {}
                Visit::SkipDirectory => {
                    if is_dir {
                        iter.skip_current_dir();
                    }
                }
                Visit::Stop => break,
            }
        }

        Ok(())
    }

    /// Walk the filesystem and collect all entries in traversal order
    pub fn walk(&self) -> Result<Vec<Entry>, PassAbort> {
        let mut entries = Vec::new();
        self.visit(|event| {
            if let WalkEvent::Entry(entry) = event {
                entries.push(entry);
            }
            Visit::Continue
        })?;
        Ok(entries)
    }

    /// Check if a relative path falls under an ignore pattern
    fn should_ignore(&self, relative: &Path) -> bool {
        if self.config.ignore_patterns.is_empty() {
            return false;
        }
        relative.components().any(|component| match component {
            Component::Normal(name) => self
                .config
                .ignore_patterns
                .iter()
                .any(|pattern| name == std::ffi::OsStr::new(pattern)),
            _ => false,
        })
    }
}
