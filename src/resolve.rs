//! Executable lookup against the `PATH` search list.

use std::env;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Ordered list of directories consulted to resolve a bare program name.
///
/// Order determines priority: the first directory containing an executable
/// candidate wins and later directories are never consulted.
#[derive(Debug, Clone)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Build the search list from the `PATH` environment variable.
    ///
    /// A missing `PATH` yields an empty list, against which nothing resolves.
    pub fn from_env() -> Self {
        match env::var_os("PATH") {
            Some(paths) => Self::new(&paths),
            None => Self { dirs: Vec::new() },
        }
    }

    /// Build a search list from a colon-separated directory string.
    pub fn new(paths: &OsStr) -> Self {
        Self {
            dirs: env::split_paths(paths).collect(),
        }
    }

    /// Resolve `program` to the first executable candidate, in list order.
    ///
    /// A name containing a path separator is probed directly instead of being
    /// joined against each directory, so `/bin/true` and `./tool` stand or
    /// fall on their own.
    pub fn resolve(&self, program: &str) -> Option<PathBuf> {
        let path = Path::new(program);
        if path.is_absolute() || path.components().count() > 1 {
            return is_executable(path).then(|| path.to_path_buf());
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }
}

/// A regular file with any execute permission bit set.
fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
