//! Contextual path resolution.
//!
//! [`resolve_path`] is the single gate every declared stage path passes
//! through: it roots the path against the active [`Context`], records or
//! checks its [`Kind`] in the ledger, and makes sure the target directory
//! exists on disk before any stage body runs.

use std::fs;
use std::path::{Path, PathBuf, absolute};

use crate::contexts::{Context, Key, Kind};
use crate::error::{KindMismatch, Result};

/// Resolve a declared path against `ctx`.
///
/// When the category has a configured root, the path is joined onto it
/// (absolute inputs pass through), the target directory is created with any
/// missing parents (the path itself for directories, its parent for files),
/// and the returned canonical path is absolute. Without a root the path is
/// returned unchanged and nothing is created.
///
/// In recording mode the canonical path is added to the ledger under its
/// expected kind. In checking mode a non-empty ledger must already hold the
/// expected kind for the path (looked up relative to the root when rooted),
/// otherwise a [`KindMismatch`] aborts resolution.
pub fn resolve_path(
    raw: impl Into<PathBuf>,
    ctx: &mut Context,
    key: Key,
    file: bool,
) -> Result<PathBuf> {
    let raw: PathBuf = raw.into();
    let root = ctx.roots.resolve(key).map(Path::to_path_buf);
    let canonical = match &root {
        Some(root) if raw.is_absolute() => absolute(root)?.join(&raw),
        Some(root) => root.join(&raw),
        None => raw,
    };
    let kind = Kind::of(key, file);
    if ctx.track_kinds {
        ctx.kinds.insert(canonical.clone(), kind);
    } else if !ctx.kinds.is_empty() {
        let lookup = match &root {
            Some(root) => canonical.strip_prefix(root).unwrap_or(canonical.as_path()),
            None => canonical.as_path(),
        };
        let registered = ctx.kinds.get(lookup).copied();
        if registered != Some(kind) {
            return Err(KindMismatch {
                path: canonical,
                expected: registered,
                got: kind,
            }
            .into());
        }
    }
    if root.is_none() {
        return Ok(canonical);
    }
    let canonical = absolute(&canonical)?;
    let made = if file {
        canonical.parent().unwrap_or(canonical.as_path())
    } else {
        canonical.as_path()
    };
    fs::create_dir_all(made)?;
    Ok(canonical)
}

/// A path's POSIX-style string form.
pub fn posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Serde serializers for path fields.
pub mod ser {
    use std::path::Path;

    use serde::Serializer;

    /// Serialize a path as its POSIX-style string form.
    pub fn posix<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::posix(path))
    }
}
