//! Standard project layout.

use std::path::Path;

use crate::contexts::Roots;

/// Directory holding pipeline data artifacts.
pub const DATA: &str = "data";
/// Directory holding docs and notebooks.
pub const DOCS: &str = "docs";

/// Roots for the standard layout under `root`.
pub fn rooted(root: impl AsRef<Path>) -> Roots {
    let root = root.as_ref();
    Roots {
        data: Some(root.join(DATA)),
        docs: Some(root.join(DOCS)),
    }
}
