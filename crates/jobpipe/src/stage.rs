//! Stage descriptions: declared path fields, validation, classification.
//!
//! A stage description declares its path fields once, in declaration order,
//! and [`validate`] drives every field through
//! [`resolve_path`](crate::path::resolve_path) against the structure's own
//! [`Context`]. The ledger is cleared when validation finishes, so a
//! validated structure never re-checks against stale entries.

use std::mem;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::contexts::{Context, Key, Kind};
use crate::error::Result;
use crate::path::resolve_path;

/// Whether a stage path is consumed or produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Deps,
    Outs,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Deps => "deps",
            Role::Outs => "outs",
        }
    }
}

/// One declared path field, borrowed mutably for resolution.
pub struct PathSpec<'a> {
    pub name: &'static str,
    pub key: Key,
    pub file: bool,
    pub path: &'a mut PathBuf,
}

/// One declared path field, borrowed for inspection.
///
/// `kind` is `None` for plain path fields that are declared (and classified)
/// but not kind-tracked, such as a stage's own source file.
pub struct PathEntry<'a> {
    pub name: &'static str,
    pub kind: Option<Kind>,
    pub path: &'a Path,
}

/// One classified stage path, for external consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagePath {
    pub role: Role,
    pub kind: Option<Kind>,
    #[serde(serialize_with = "crate::path::ser::posix")]
    pub path: PathBuf,
}

/// A structure carrying its own validation context.
pub trait ContextBearing {
    fn context(&self) -> &Context;

    /// The first declared sub-structure that carries a context, if any.
    fn inner(&self) -> Option<&dyn ContextBearing> {
        None
    }
}

/// Walk first-declared sub-structures to the innermost context and copy it.
pub fn innermost_context(store: &dyn ContextBearing) -> Context {
    let mut store = store;
    while let Some(inner) = store.inner() {
        store = inner;
    }
    store.context().clone()
}

/// A structure whose declared path fields are resolved together.
pub trait StagePaths: ContextBearing {
    /// Whether these paths are stage dependencies or outputs.
    fn role(&self) -> Role;

    /// Every declared path field, in declaration order.
    fn entries(&self) -> Vec<PathEntry<'_>>;

    /// The kind-tracked path fields, mutable, in declaration order.
    fn specs(&mut self) -> Vec<PathSpec<'_>>;

    fn context_mut(&mut self) -> &mut Context;
}

/// Resolve every declared path field of `stage` against its own context.
///
/// Fields resolve in declaration order and the first mismatch aborts the
/// pass. The structure's own ledger is cleared afterwards either way; a
/// failed structure is dropped by its constructor, a validated one must not
/// carry ledger state into unrelated runs.
pub fn validate<S: StagePaths + ?Sized>(stage: &mut S) -> Result<()> {
    let mut ctx = mem::take(stage.context_mut());
    let outcome = resolve_fields(stage, &mut ctx);
    ctx.kinds.clear();
    *stage.context_mut() = ctx;
    outcome
}

fn resolve_fields<S: StagePaths + ?Sized>(stage: &mut S, ctx: &mut Context) -> Result<()> {
    for spec in stage.specs() {
        let raw = mem::take(spec.path);
        *spec.path = resolve_path(raw, ctx, spec.key, spec.file)?;
    }
    Ok(())
}

/// Stage dependency paths with no declared fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Deps {
    #[serde(skip)]
    context: Context,
}

impl Deps {
    pub fn new(context: Context) -> Result<Self> {
        let mut deps = Self { context };
        validate(&mut deps)?;
        Ok(deps)
    }
}

impl ContextBearing for Deps {
    fn context(&self) -> &Context {
        &self.context
    }
}

impl StagePaths for Deps {
    fn role(&self) -> Role {
        Role::Deps
    }

    fn entries(&self) -> Vec<PathEntry<'_>> {
        Vec::new()
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        Vec::new()
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// Stage output paths with no declared fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outs {
    #[serde(skip)]
    context: Context,
}

impl Outs {
    pub fn new(context: Context) -> Result<Self> {
        let mut outs = Self { context };
        validate(&mut outs)?;
        Ok(outs)
    }
}

impl ContextBearing for Outs {
    fn context(&self) -> &Context {
        &self.context
    }
}

impl StagePaths for Outs {
    fn role(&self) -> Role {
        Role::Outs
    }

    fn entries(&self) -> Vec<PathEntry<'_>> {
        Vec::new()
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        Vec::new()
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::Roots;
    use crate::error::PipelineError;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct PlotOuts {
        dfs: PathBuf,
        plots: PathBuf,
        context: Context,
    }

    impl PlotOuts {
        fn new(context: Context) -> Result<Self> {
            let mut outs = Self {
                dfs: PathBuf::from("dfs"),
                plots: PathBuf::from("plots"),
                context,
            };
            validate(&mut outs)?;
            Ok(outs)
        }
    }

    impl ContextBearing for PlotOuts {
        fn context(&self) -> &Context {
            &self.context
        }
    }

    impl StagePaths for PlotOuts {
        fn role(&self) -> Role {
            Role::Outs
        }

        fn entries(&self) -> Vec<PathEntry<'_>> {
            vec![
                PathEntry {
                    name: "dfs",
                    kind: Some(Kind::DataDir),
                    path: &self.dfs,
                },
                PathEntry {
                    name: "plots",
                    kind: Some(Kind::DataDir),
                    path: &self.plots,
                },
            ]
        }

        fn specs(&mut self) -> Vec<PathSpec<'_>> {
            vec![
                PathSpec {
                    name: "dfs",
                    key: Key::Data,
                    file: false,
                    path: &mut self.dfs,
                },
                PathSpec {
                    name: "plots",
                    key: Key::Data,
                    file: false,
                    path: &mut self.plots,
                },
            ]
        }

        fn context_mut(&mut self) -> &mut Context {
            &mut self.context
        }
    }

    fn rooted_data(root: &Path) -> Roots {
        Roots {
            data: Some(root.to_path_buf()),
            docs: None,
        }
    }

    #[test]
    fn validation_resolves_fields_and_clears_the_ledger() {
        let temp = TempDir::new().unwrap();
        let outs = PlotOuts::new(Context::recording(rooted_data(temp.path()))).unwrap();

        assert!(outs.dfs.is_dir());
        assert!(outs.plots.is_dir());
        assert!(
            outs.context().kinds.is_empty(),
            "a validated structure must not keep ledger entries"
        );

        let names: Vec<_> = outs.entries().iter().map(|entry| entry.name).collect();
        assert_eq!(names, ["dfs", "plots"]);
    }

    #[test]
    fn validation_aborts_on_the_first_mismatch() {
        let temp = TempDir::new().unwrap();
        let mut registry = Context::recording(Roots::default());
        resolve_path("dfs", &mut registry, Key::Data, true).unwrap();

        let checking = Context::checking(rooted_data(temp.path()), &registry);
        let err = PlotOuts::new(checking).unwrap_err();
        assert!(matches!(err, PipelineError::KindMismatch(_)));
        assert!(
            !temp.path().join("plots").exists(),
            "later fields must not resolve after a mismatch"
        );
    }

    #[test]
    fn bare_deps_and_outs_validate_trivially() {
        let deps = Deps::new(Context::default()).unwrap();
        let outs = Outs::new(Context::default()).unwrap();
        assert!(deps.entries().is_empty());
        assert!(outs.entries().is_empty());
        assert_eq!(deps.role(), Role::Deps);
        assert_eq!(outs.role(), Role::Outs);
    }

    #[test]
    fn innermost_context_walks_first_children() {
        let mut inner_ctx = Context::default();
        inner_ctx.roots.data = Some(PathBuf::from("/tmp/inner"));
        let inner = Deps::new(inner_ctx).unwrap();

        struct Wrapper {
            inner: Deps,
            context: Context,
        }
        impl ContextBearing for Wrapper {
            fn context(&self) -> &Context {
                &self.context
            }
            fn inner(&self) -> Option<&dyn ContextBearing> {
                Some(&self.inner)
            }
        }

        let wrapper = Wrapper {
            inner,
            context: Context::default(),
        };
        let adopted = innermost_context(&wrapper);
        assert_eq!(adopted.roots.data.as_deref(), Some(Path::new("/tmp/inner")));
    }
}
