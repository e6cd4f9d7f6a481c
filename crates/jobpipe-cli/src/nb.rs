//! Notebook worker processes.
//!
//! A stage hands its validated, serialized parameters to a notebook runner
//! in a child process; the JSON travels in the `PARAMS` environment
//! variable. Workers are plain processes fanned out over threads, capped at
//! `max_workers`, and the first failure wins.

use std::path::PathBuf;
use std::process::Command;
use std::thread;

use anyhow::{Context as _, Result, anyhow, bail};
use tracing::info;

/// Default worker process cap.
pub const DEFAULT_MAX_WORKERS: usize = 4;
/// Environment variable carrying the serialized stage parameters.
pub const PARAMS_ENV: &str = "PARAMS";
/// Environment variable overriding the notebook runner command.
pub const RUNNER_ENV: &str = "JOBPIPE_NB_RUNNER";

/// One notebook submission.
#[derive(Debug, Clone)]
pub struct Job {
    pub nb: PathBuf,
    pub params: String,
}

/// Executes notebooks in worker processes.
#[derive(Debug, Clone)]
pub struct Runner {
    program: String,
    args: Vec<String>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            program: "jupyter".into(),
            args: ["nbconvert", "--to", "notebook", "--execute", "--inplace"]
                .map(String::from)
                .into(),
        }
    }
}

impl Runner {
    /// Respect `JOBPIPE_NB_RUNNER` (`program arg arg ...`) when set.
    pub fn from_env() -> Self {
        let Ok(command) = std::env::var(RUNNER_ENV) else {
            return Self::default();
        };
        let mut parts = command.split_whitespace().map(String::from);
        match parts.next() {
            Some(program) => Self {
                program,
                args: parts.collect(),
            },
            None => Self::default(),
        }
    }

    /// Run one notebook to completion.
    pub fn submit(&self, job: &Job) -> Result<()> {
        info!(nb = %job.nb.display(), "running notebook");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&job.nb)
            .env(PARAMS_ENV, &job.params)
            .status()
            .with_context(|| format!("failed to launch `{}`", self.program))?;
        if !status.success() {
            bail!("notebook `{}` exited with {status}", job.nb.display());
        }
        Ok(())
    }

    /// Run every job, at most `max_workers` worker processes at a time.
    pub fn submit_all(&self, jobs: &[Job], max_workers: usize) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }
        let per_worker = jobs.len().div_ceil(max_workers.max(1));
        thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .chunks(per_worker)
                .map(|chunk| scope.spawn(move || chunk.iter().try_for_each(|job| self.submit(job))))
                .collect();
            for handle in handles {
                handle
                    .join()
                    .map_err(|_| anyhow!("notebook worker panicked"))??;
            }
            Ok(())
        })
    }
}
