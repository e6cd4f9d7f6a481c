//! Roots, the path-kind ledger, and the validation context.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Category a rooted path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Data,
    Docs,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Data => "data",
            Key::Docs => "docs",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a resolved path: the cross product of [`Key`] and a file flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    DataDir,
    DataFile,
    DocsDir,
    DocsFile,
}

impl Kind {
    /// The kind a path declared under `key` with `file` resolves to.
    pub fn of(key: Key, file: bool) -> Kind {
        match (key, file) {
            (Key::Data, false) => Kind::DataDir,
            (Key::Data, true) => Kind::DataFile,
            (Key::Docs, false) => Kind::DocsDir,
            (Key::Docs, true) => Kind::DocsFile,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::DataDir => "DataDir",
            Kind::DataFile => "DataFile",
            Kind::DocsDir => "DocsDir",
            Kind::DocsFile => "DocsFile",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root directories for each path category.
///
/// An unset root opts the category out of rooting entirely: its paths pass
/// through unresolved, no directories are created, and the ledger is not
/// consulted for them while it stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roots {
    pub data: Option<PathBuf>,
    pub docs: Option<PathBuf>,
}

impl Roots {
    /// The root configured for `key`, if any.
    pub fn resolve(&self, key: Key) -> Option<&Path> {
        match key {
            Key::Data => self.data.as_deref(),
            Key::Docs => self.docs.as_deref(),
        }
    }
}

/// Paths and the kind each was registered under.
pub type Kinds = BTreeMap<PathBuf, Kind>;

/// Ambient state threaded through path resolution and stage validation.
///
/// `track_kinds = true` is recording mode: every resolved path is added to
/// the ledger unchecked. `track_kinds = false` is checking mode: a non-empty
/// ledger must agree with every kind proposed for a path it knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub roots: Roots,
    pub kinds: Kinds,
    pub track_kinds: bool,
}

impl Context {
    /// Derive a context, copying the ledger of `kinds_from` when given.
    ///
    /// The copy is taken here, at derivation time: clearing the derived
    /// ledger later never drains the source.
    pub fn derive(roots: Roots, kinds_from: Option<&Context>, track_kinds: bool) -> Self {
        Self {
            roots,
            kinds: kinds_from.map(|ctx| ctx.kinds.clone()).unwrap_or_default(),
            track_kinds,
        }
    }

    /// A recording context: resolved paths populate the ledger.
    pub fn recording(roots: Roots) -> Self {
        Self::derive(roots, None, true)
    }

    /// A checking context inheriting the ledger of `kinds_from`.
    pub fn checking(roots: Roots, kinds_from: &Context) -> Self {
        Self::derive(roots, Some(kinds_from), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_of_covers_the_fixed_mapping() {
        assert_eq!(Kind::of(Key::Data, false), Kind::DataDir);
        assert_eq!(Kind::of(Key::Data, true), Kind::DataFile);
        assert_eq!(Kind::of(Key::Docs, false), Kind::DocsDir);
        assert_eq!(Kind::of(Key::Docs, true), Kind::DocsFile);
    }

    #[test]
    fn unset_root_resolves_to_none() {
        let roots = Roots {
            data: Some(PathBuf::from("/tmp/data")),
            docs: None,
        };
        assert_eq!(roots.resolve(Key::Data), Some(Path::new("/tmp/data")));
        assert_eq!(roots.resolve(Key::Docs), None);
    }

    #[test]
    fn derive_copies_the_ledger() {
        let mut source = Context::recording(Roots::default());
        source.kinds.insert(PathBuf::from("mboxes"), Kind::DataDir);

        let mut derived = Context::checking(Roots::default(), &source);
        assert_eq!(derived.kinds, source.kinds);
        assert!(!derived.track_kinds);

        derived.kinds.clear();
        assert_eq!(source.kinds.len(), 1, "clearing a derived ledger must not drain the source");
    }

    #[test]
    fn derive_without_source_starts_empty() {
        let ctx = Context::derive(Roots::default(), None, false);
        assert!(ctx.kinds.is_empty());
    }
}
