//! Build-graph manifest for the external data-versioning tool.
//!
//! Each pipeline stage contributes its command, its classified dependency
//! and output paths, and its declared parameter values. The manifest is
//! rendered as YAML and synced to disk only when its content changed, so
//! repeated syncs leave the file's mtime alone.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use jobpipe::stage::{Role, StagePath};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ManifestError>;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "pipeline.yaml";

/// An output entry: a plain path, or a path with versioning flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Out {
    Plain(String),
    Flagged(BTreeMap<String, OutFlags>),
}

/// Per-output flags understood by the data-versioning tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutFlags {
    pub push: bool,
}

impl Out {
    pub fn plain(path: impl Into<String>) -> Self {
        Out::Plain(path.into())
    }

    /// An output kept out of remote storage.
    pub fn no_push(path: impl Into<String>) -> Self {
        Out::Flagged(BTreeMap::from([(path.into(), OutFlags { push: false })]))
    }

    pub fn path(&self) -> &str {
        match self {
            Out::Plain(path) => path,
            Out::Flagged(flags) => flags.keys().next().map(String::as_str).unwrap_or(""),
        }
    }
}

/// One stage of the build graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestStage {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outs: Vec<Out>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl ManifestStage {
    /// Build a stage entry from classified stage paths.
    pub fn new(cmd: impl Into<String>, paths: &[StagePath]) -> Self {
        let mut stage = Self {
            cmd: cmd.into(),
            ..Self::default()
        };
        for stage_path in paths {
            let posix = jobpipe::path::posix(&stage_path.path);
            match stage_path.role {
                Role::Deps => stage.deps.push(posix),
                Role::Outs => stage.outs.push(Out::plain(posix)),
            }
        }
        stage
    }

    /// Record a declared parameter value.
    pub fn with_param(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Keep every output of this stage out of remote storage.
    pub fn no_push(mut self) -> Self {
        self.outs = self
            .outs
            .into_iter()
            .map(|out| Out::no_push(out.path().to_owned()))
            .collect();
        self
    }
}

/// The whole build-graph manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub stages: BTreeMap<String, ManifestStage>,
}

impl Manifest {
    pub fn insert(&mut self, name: impl Into<String>, stage: ManifestStage) {
        self.stages.insert(name.into(), stage);
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write `path` when the rendered manifest differs; report whether it
    /// wrote.
    pub fn sync(&self, path: &Path) -> Result<bool> {
        let rendered = self.to_yaml()?;
        let current = fs::read_to_string(path).ok();
        if current.as_deref() == Some(rendered.as_str()) {
            return Ok(false);
        }
        fs::write(path, rendered)?;
        Ok(true)
    }
}
