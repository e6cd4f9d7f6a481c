//! Stage parameters: a dependencies structure plus an outputs structure.

use serde::Serialize;

use crate::contexts::Context;
use crate::error::Result;
use crate::stage::{ContextBearing, Role, StagePath, StagePaths, innermost_context};

/// Parameters of one pipeline stage.
///
/// `deps` and `outs` are validated at their own construction; `Params` only
/// composes them, adopting the context of its innermost first-declared
/// sub-structure so the assembled parameters share the roots their parts
/// were validated under.
#[derive(Debug, Clone, Serialize)]
pub struct Params<D, O> {
    pub deps: D,
    pub outs: O,
    #[serde(skip)]
    context: Context,
}

impl<D: StagePaths, O: StagePaths> Params<D, O> {
    pub fn new(deps: D, outs: O) -> Self {
        let context = innermost_context(&deps);
        Self {
            deps,
            outs,
            context,
        }
    }

    /// Compose with an explicitly supplied context instead of adopting one.
    pub fn with_context(deps: D, outs: O, context: Context) -> Self {
        Self {
            deps,
            outs,
            context,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Classified stage paths, dependency fields first, declaration order.
    pub fn stage_paths(&self) -> Vec<StagePath> {
        let deps = self.deps.entries().into_iter().map(|entry| StagePath {
            role: Role::Deps,
            kind: entry.kind,
            path: entry.path.to_path_buf(),
        });
        let outs = self.outs.entries().into_iter().map(|entry| StagePath {
            role: Role::Outs,
            kind: entry.kind,
            path: entry.path.to_path_buf(),
        });
        deps.chain(outs).collect()
    }

    /// The serialized form handed to notebook workers.
    pub fn to_json(&self) -> Result<String>
    where
        D: Serialize,
        O: Serialize,
    {
        Ok(serde_json::to_string(self)?)
    }
}

impl<D: StagePaths, O: StagePaths> ContextBearing for Params<D, O> {
    fn context(&self) -> &Context {
        &self.context
    }

    fn inner(&self) -> Option<&dyn ContextBearing> {
        Some(&self.deps)
    }
}
