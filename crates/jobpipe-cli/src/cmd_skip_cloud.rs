//! The skip-cloud stage: mailbox outputs stay local.

use std::path::{Path, PathBuf};

use anyhow::Result;
use jobpipe::Params;
use jobpipe::contexts::{Context, Key, Kind};
use jobpipe::stage::{self, ContextBearing, PathEntry, PathSpec, Role, StagePaths};
use serde::Serialize;
use tracing::info;

use crate::paths::Paths;

/// Outputs kept out of remote storage.
#[derive(Debug, Clone, Serialize)]
pub struct Outs {
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub mboxes: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Outs {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut outs = Self {
            mboxes: paths.mboxes.clone(),
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
            name: "mboxes",
            kind: Some(Kind::DataDir),
            path: &self.mboxes,
        }]
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        vec![PathSpec {
            name: "mboxes",
            key: Key::Data,
            file: false,
            path: &mut self.mboxes,
        }]
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// Build the stage parameters, validating and creating their paths.
pub fn params(root: &Path, paths: &Paths) -> jobpipe::Result<Params<stage::Deps, Outs>> {
    let deps = stage::Deps::new(paths.checking(root))?;
    let outs = Outs::new(paths.checking(root), paths)?;
    Ok(Params::new(deps, outs))
}

pub fn run(root: &Path) -> Result<()> {
    let paths = Paths::new()?;
    let params = params(root, &paths)?;
    info!(mboxes = %params.outs.mboxes.display(), "mailboxes stay out of remote storage");
    Ok(())
}
