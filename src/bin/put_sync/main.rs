//! putsync - Sort a put.io remote into a local media library with rclone.
//!
//! Lists the remote once, classifies each top-level item as a movie, a TV show, or noise,
//! asks what to do with it, and runs the resulting download and delete queue after a final confirmation.

mod catalog;
mod classify;
mod config;
mod executor;
mod logger;
mod planner;
mod prompt;
mod put_sync;
mod rclone;
mod types;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::put_sync::PutSync;

/// Sort a put.io remote into a local media library.
///
/// Offers each top-level item on the remote for download into `Movies/<name>` or `TV Shows/<name>`
/// under the media root, or for deletion.
/// Nothing is transferred until the whole queue has been reviewed and confirmed.
#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Sort a put.io remote into a local media library with rclone"
)]
pub(crate) struct PutSyncArgs {
    /// rclone remote name
    #[arg(short = 'r', long, value_name = "REMOTE")]
    remote: Option<String>,

    /// Local media library root
    #[arg(short = 'm', long, value_name = "PATH", value_hint = clap::ValueHint::DirPath)]
    media_root: Option<PathBuf>,

    /// Skip top-level items with this name
    #[arg(short = 'b', long, num_args = 1, action = clap::ArgAction::Append, value_name = "NAME")]
    block: Vec<String>,

    /// Maximum remote listing depth
    #[arg(short = 'd', long, value_name = "DEPTH")]
    depth: Option<usize>,

    /// Only print actions without transferring or deleting anything
    #[arg(short = 'p', long)]
    print: bool,

    /// Do not write a log file
    #[arg(short = 'n', long)]
    no_log: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = PutSyncArgs::parse();
    if let Some(ref shell) = args.completion {
        media_tools::generate_shell_completion(*shell, PutSyncArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        PutSync::new(args).run()
    }
}
