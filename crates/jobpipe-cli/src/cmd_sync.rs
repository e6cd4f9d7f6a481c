//! Sync the build-graph manifest with the declared stages.
//!
//! Syncing constructs every stage's parameters, and validation resolves and
//! creates each declared path along the way: one sync gives a fresh checkout
//! its full layout.

use std::path::Path;

use anyhow::{Context as _, Result};
use jobpipe_manifest::{Manifest, ManifestStage};
use tracing::info;

use crate::nb::DEFAULT_MAX_WORKERS;
use crate::paths::Paths;
use crate::{cmd_convert, cmd_example, cmd_get_mail, cmd_skip_cloud};

pub fn run(root: &Path, manifest_file: &Path) -> Result<()> {
    let paths = Paths::new()?;
    let mut manifest = Manifest::default();

    let skip_cloud = cmd_skip_cloud::params(root, &paths)?;
    manifest.insert(
        "skip_cloud",
        ManifestStage::new("jobpipe stage skip-cloud", &skip_cloud.stage_paths()).no_push(),
    );

    let get_mail = cmd_get_mail::params(root, &paths)?;
    manifest.insert(
        "get_mail",
        ManifestStage::new("jobpipe stage get-mail", &get_mail.stage_paths()),
    );

    let convert = cmd_convert::params(root, &paths)?;
    manifest.insert(
        "convert",
        ManifestStage::new("jobpipe stage convert", &convert.stage_paths())
            .with_param("max_workers", DEFAULT_MAX_WORKERS.into()),
    );

    let example = cmd_example::params(root, &paths)?;
    manifest.insert(
        "example",
        ManifestStage::new("jobpipe stage example", &example.stage_paths()),
    );

    let target = if manifest_file.is_absolute() {
        manifest_file.to_path_buf()
    } else {
        root.join(manifest_file)
    };
    let wrote = manifest
        .sync(&target)
        .with_context(|| format!("failed to sync `{}`", target.display()))?;
    info!(manifest = %target.display(), wrote, "manifest synced");
    println!(
        "{}: {}",
        target.display(),
        if wrote { "updated" } else { "up to date" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn sync_lays_out_the_project_and_writes_the_manifest() {
        let temp = TempDir::new().unwrap();
        run(temp.path(), &PathBuf::from("pipeline.yaml")).unwrap();

        let rendered = fs::read_to_string(temp.path().join("pipeline.yaml")).unwrap();
        assert!(rendered.contains("skip_cloud:"));
        assert!(rendered.contains("get_mail:"));
        assert!(rendered.contains("convert:"));
        assert!(rendered.contains("example:"));
        assert!(rendered.contains("push: false"));
        assert!(rendered.contains("max_workers: 4"));

        assert!(temp.path().join("data/mboxes").is_dir());
        assert!(temp.path().join("docs/notebooks").is_dir());
    }

    #[test]
    fn second_sync_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let manifest = PathBuf::from("pipeline.yaml");
        run(temp.path(), &manifest).unwrap();
        let first = fs::read_to_string(temp.path().join("pipeline.yaml")).unwrap();
        run(temp.path(), &manifest).unwrap();
        let second = fs::read_to_string(temp.path().join("pipeline.yaml")).unwrap();
        assert_eq!(first, second);
    }
}
