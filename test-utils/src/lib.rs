//! The single source of truth for all test data paths.

pub mod smiles;

use std::{
    env::var_os,
    io::{Error, ErrorKind, Result},
    path::{Path, PathBuf},
};

/// The workspace directory of the test data.
pub const DATA_DIR: &str = "data";

/// Resolves the path to the requested data relative to the workspace directory.
pub fn resolve_path(path: &[impl AsRef<Path>]) -> Result<PathBuf> {
    let manifest = var_os("CARGO_MANIFEST_DIR")
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing CARGO_MANIFEST_DIR"))?;
    let workspace = PathBuf::from(manifest)
        .parent()
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing cargo workspace dir"))?
        .to_path_buf();

    path.iter()
        .fold(workspace, |path, component| path.join(component))
        .canonicalize()
}
