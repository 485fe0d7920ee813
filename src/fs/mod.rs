// src/fs/mod.rs

//! File-system seam used to read the properties store.
//!
//! The resolver only ever reads whole files, so the trait stays small. Errors
//! are plain `std::io::Error` so callers can tell a missing store
//! (`ErrorKind::NotFound`) apart from an unreadable one.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}
