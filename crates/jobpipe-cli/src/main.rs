mod cmd_convert;
mod cmd_example;
mod cmd_get_mail;
mod cmd_skip_cloud;
mod cmd_sync;
mod logs;
mod nb;
mod paths;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobpipe")]
#[command(about = "Run the research-data pipeline and keep its build graph in sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding the data/ and docs/ directories
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a pipeline stage
    Stage {
        #[command(subcommand)]
        stage: StageCommand,
    },
    /// Sync the build-graph manifest with the declared stages
    Sync {
        /// Manifest file to write, relative to the project root
        #[arg(long, default_value = jobpipe_manifest::MANIFEST_FILE)]
        manifest: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum StageCommand {
    /// Keep mailbox outputs out of remote storage
    SkipCloud,
    /// Extract job-alert messages from the synced mailboxes
    GetMail,
    /// Convert job-alert mail into structured requisitions
    Convert {
        /// Worker processes for notebook execution
        #[arg(long, default_value_t = nb::DEFAULT_MAX_WORKERS)]
        max_workers: usize,
    },
    /// Run the example analysis stage
    Example,
}

fn main() -> Result<()> {
    logs::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stage { stage } => match stage {
            StageCommand::SkipCloud => cmd_skip_cloud::run(&cli.root),
            StageCommand::GetMail => cmd_get_mail::run(&cli.root),
            StageCommand::Convert { max_workers } => cmd_convert::run(&cli.root, max_workers),
            StageCommand::Example => cmd_example::run(&cli.root),
        },
        Commands::Sync { manifest } => cmd_sync::run(&cli.root, &manifest),
    }
}
