//! Canonical pipeline paths.
//!
//! Recorded once per run, unrooted and in recording mode, so the ledger
//! holds the category-relative form of every path the pipeline knows about.
//! Each stage then derives a checking context from here: rooted at the
//! project layout, inheriting the recorded ledger.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use jobpipe::contexts::{Context, Key, Roots};
use jobpipe::error::Result;
use jobpipe::resolve_path;
use serde::{Serialize, Serializer};

/// Notebook-bearing pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    GetMail,
    Convert,
    Example,
}

impl StageName {
    pub const ALL: [StageName; 3] = [StageName::GetMail, StageName::Convert, StageName::Example];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::GetMail => "get_mail",
            StageName::Convert => "convert",
            StageName::Example => "example",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical paths every stage validates against.
#[derive(Debug, Clone, Serialize)]
pub struct Paths {
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub mboxes: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub mail: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub reqs: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub example: PathBuf,
    #[serde(serialize_with = "jobpipe::path::ser::posix")]
    pub example_out: PathBuf,
    #[serde(serialize_with = "posix_map")]
    pub notebooks: BTreeMap<StageName, PathBuf>,
    #[serde(skip)]
    context: Context,
}

impl Paths {
    /// Record the canonical ledger.
    pub fn new() -> Result<Self> {
        let mut ctx = Context::recording(Roots::default());
        let mboxes = resolve_path("mboxes", &mut ctx, Key::Data, false)?;
        let mail = resolve_path("mail.json", &mut ctx, Key::Data, true)?;
        let reqs = resolve_path("reqs.json", &mut ctx, Key::Data, true)?;
        let example = resolve_path("example", &mut ctx, Key::Data, false)?;
        let example_out = resolve_path("example_out", &mut ctx, Key::Data, false)?;
        let mut notebooks = BTreeMap::new();
        for stage in StageName::ALL {
            let notebook =
                resolve_path(format!("notebooks/{stage}.ipynb"), &mut ctx, Key::Docs, true)?;
            notebooks.insert(stage, notebook);
        }
        Ok(Self {
            mboxes,
            mail,
            reqs,
            example,
            example_out,
            notebooks,
            context: ctx,
        })
    }

    /// The recording context whose ledger seeds every checking context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// A checking context rooted at the project layout under `root`.
    pub fn checking(&self, root: &Path) -> Context {
        Context::checking(jobpipe::config::rooted(root), &self.context)
    }

    pub fn notebook(&self, stage: StageName) -> &Path {
        &self.notebooks[&stage]
    }
}

fn posix_map<S: Serializer>(
    map: &BTreeMap<StageName, PathBuf>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(map.iter().map(|(stage, path)| (stage, jobpipe::path::posix(path))))
}
