//! The example analysis stage.

use std::path::{Path, PathBuf};

use anyhow::Result;
use jobpipe::Params;
use jobpipe::contexts::{Context, Key, Kind};
use jobpipe::stage::{self, ContextBearing, PathEntry, PathSpec, Role, StagePaths};
use serde::Serialize;
use tracing::info;

use crate::nb::{DEFAULT_MAX_WORKERS, Job, Runner};
use crate::paths::{Paths, StageName};

/// Dependencies of the example stage.
#[derive(Debug, Clone, Serialize)]
pub struct Deps {
    /// This stage's source, tracked so code changes rebuild the stage.
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub stage: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub nb: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub example: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Deps {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut deps = Self {
            stage: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/src/cmd_example.rs")),
            nb: paths.notebook(StageName::Example).to_path_buf(),
            example: paths.example.clone(),
            context,
        };
        stage::validate(&mut deps)?;
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
        vec![
            PathEntry {
                name: "stage",
                kind: None,
                path: &self.stage,
            },
            PathEntry {
                name: "nb",
                kind: Some(Kind::DocsFile),
                path: &self.nb,
            },
            PathEntry {
                name: "example",
                kind: Some(Kind::DataDir),
                path: &self.example,
            },
        ]
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        vec![
            PathSpec {
                name: "nb",
                key: Key::Docs,
                file: true,
                path: &mut self.nb,
            },
            PathSpec {
                name: "example",
                key: Key::Data,
                file: false,
                path: &mut self.example,
            },
        ]
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// Outputs of the example stage.
#[derive(Debug, Clone, Serialize)]
pub struct Outs {
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub example_out: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Outs {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut outs = Self {
            example_out: paths.example_out.clone(),
            context,
        };
        stage::validate(&mut outs)?;
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
        vec![PathEntry {
            name: "example_out",
            kind: Some(Kind::DataDir),
            path: &self.example_out,
        }]
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        vec![PathSpec {
            name: "example_out",
            key: Key::Data,
            file: false,
            path: &mut self.example_out,
        }]
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// Build the stage parameters, validating and creating their paths.
pub fn params(root: &Path, paths: &Paths) -> jobpipe::Result<Params<Deps, Outs>> {
    let deps = Deps::new(paths.checking(root), paths)?;
    let outs = Outs::new(paths.checking(root), paths)?;
    Ok(Params::new(deps, outs))
}

pub fn run(root: &Path) -> Result<()> {
    let paths = Paths::new()?;
    let params = params(root, &paths)?;

    let job = Job {
        nb: params.deps.nb.clone(),
        params: params.to_json()?,
    };
    Runner::from_env().submit_all(&[job], DEFAULT_MAX_WORKERS)?;
    info!(out = %params.outs.example_out.display(), "example stage finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn validation_creates_both_example_dirs() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::new().unwrap();
        let staged = params(temp.path(), &paths).unwrap();

        assert!(staged.deps.example.is_dir());
        assert!(staged.outs.example_out.is_dir());
        assert!(staged.context().kinds.is_empty());
    }
}
