//! Filesystem trees
//!
//! Traversal, path correspondence and content comparison for the two sides
//! of a mirror. Nothing here mutates the filesystem except replica-root
//! creation in [`path::MirrorRoots::prepare`].

pub mod compare;
pub mod hasher;
pub mod path;
pub mod walker;
