//! The convert stage: job-alert mail in, structured requisitions out.
//!
//! The stage body itself lives in a notebook; this module validates the
//! stage description, serializes it, and hands it to a worker process.

use std::path::{Path, PathBuf};

use anyhow::Result;
use jobpipe::Params;
use jobpipe::contexts::{Context, Key, Kind};
use jobpipe::stage::{self, ContextBearing, PathEntry, PathSpec, Role, StagePaths};
use serde::Serialize;
use tracing::info;

use crate::nb::{Job, Runner};
use crate::paths::{Paths, StageName};

/// Dependencies of the convert stage.
#[derive(Debug, Clone, Serialize)]
pub struct Deps {
    /// This stage's source, tracked so code changes rebuild the stage.
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub stage: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub nb: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub mail: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Deps {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut deps = Self {
            stage: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/src/cmd_convert.rs")),
            nb: paths.notebook(StageName::Convert).to_path_buf(),
            mail: paths.mail.clone(),
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
                name: "mail",
                kind: Some(Kind::DataFile),
                path: &self.mail,
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
                name: "mail",
                key: Key::Data,
                file: true,
                path: &mut self.mail,
            },
        ]
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// Outputs of the convert stage.
#[derive(Debug, Clone, Serialize)]
pub struct Outs {
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub reqs: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Outs {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut outs = Self {
            reqs: paths.reqs.clone(),
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
            name: "reqs",
            kind: Some(Kind::DataFile),
            path: &self.reqs,
        }]
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        vec![PathSpec {
            name: "reqs",
            key: Key::Data,
            file: true,
            path: &mut self.reqs,
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

pub fn run(root: &Path, max_workers: usize) -> Result<()> {
    let paths = Paths::new()?;
    let params = params(root, &paths)?;

    let job = Job {
        nb: params.deps.nb.clone(),
        params: params.to_json()?,
    };
    Runner::from_env().submit_all(&[job], max_workers)?;
    info!(reqs = %params.outs.reqs.display(), "requisitions converted");
    Ok(())
}
