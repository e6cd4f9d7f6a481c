//! Path roles, kind ledger, and validation contexts for the jobpipe
//! research-data pipeline.
//!
//! Every pipeline stage declares the paths it consumes and produces, each
//! tagged with a category ([`Key`]) and a file flag. Resolution happens
//! through a [`Context`]: the category's root from [`Roots`] is applied, the
//! path's [`Kind`] is recorded into or checked against the [`Kinds`] ledger,
//! and the target directory is created on disk. Stage descriptions implement
//! [`StagePaths`] so their declared fields can be validated together and
//! classified as dependencies or outputs for the build-graph manifest.
//!
//! The ledger has two modes. A recording context accepts every path and
//! remembers its kind; a checking context derived from it (the ledger is
//! copied at derivation) rejects any declaration that disagrees with what
//! was recorded. A structure clears its own ledger once validated, so stale
//! entries never leak into unrelated runs.

pub mod config;
pub mod contexts;
pub mod error;
pub mod params;
pub mod path;
pub mod stage;
pub mod times;

pub use contexts::{Context, Key, Kind, Kinds, Roots};
pub use error::{KindMismatch, PipelineError, Result};
pub use params::Params;
pub use path::resolve_path;
pub use stage::{ContextBearing, PathEntry, PathSpec, Role, StagePath, StagePaths};
