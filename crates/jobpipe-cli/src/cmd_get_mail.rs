//! The get-mail stage: mboxes in, de-duplicated job alerts out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use jobpipe::Params;
use jobpipe::contexts::{Context, Key, Kind};
use jobpipe::stage::{self, ContextBearing, PathEntry, PathSpec, Role, StagePaths};
use serde::Serialize;
use tracing::info;

use crate::paths::Paths;

/// Dependencies of the get-mail stage.
#[derive(Debug, Clone, Serialize)]
pub struct Deps {
    /// This stage's source, tracked so code changes rebuild the stage.
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub stage: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub mboxes: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Deps {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut deps = Self {
            stage: stage_source(),
            mboxes: paths.mboxes.clone(),
            context,
        };
        stage::validate(&mut deps)?;
        Ok(deps)
    }
}

fn stage_source() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/src/cmd_get_mail.rs"))
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
                name: "mboxes",
                kind: Some(Kind::DataDir),
                path: &self.mboxes,
            },
        ]
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

/// Outputs of the get-mail stage.
#[derive(Debug, Clone, Serialize)]
pub struct Outs {
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub mail: PathBuf,
    #[serde(skip)]
    context: Context,
}

impl Outs {
    pub fn new(context: Context, paths: &Paths) -> jobpipe::Result<Self> {
        let mut outs = Self {
            mail: paths.mail.clone(),
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
            name: "mail",
            kind: Some(Kind::DataFile),
            path: &self.mail,
        }]
    }

    fn specs(&mut self) -> Vec<PathSpec<'_>> {
        vec![PathSpec {
            name: "mail",
            key: Key::Data,
            file: true,
            path: &mut self.mail,
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

    let mut alerts = std::collections::BTreeSet::new();
    let entries = fs::read_dir(&params.deps.mboxes)
        .with_context(|| format!("failed to list `{}`", params.deps.mboxes.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let messages = jobpipe_mail::read_mbox(&path)
            .with_context(|| format!("failed to read mbox `{}`", path.display()))?;
        alerts.extend(jobpipe_mail::job_alerts(messages));
    }

    let json = serde_json::to_string_pretty(&alerts)?;
    fs::write(&params.outs.mail, json)
        .with_context(|| format!("failed to write `{}`", params.outs.mail.display()))?;
    info!(
        alerts = alerts.len(),
        mail = %params.outs.mail.display(),
        "job alerts extracted"
    );
    Ok(())
}
