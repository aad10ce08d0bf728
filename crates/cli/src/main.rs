use anyhow::Result;
use clap::{Parser, Subcommand};
use svcmap::commands::{check_command, info_command, merge_command, roots_command, scan_command};
use svcmap::init_logging;

/// Service map builder and incremental merger.
///
/// This CLI is a thin wrapper around `svcmap-core` (exposed in code as `svcmap_core`).
/// All substantive logic lives in the library.
#[derive(Parser, Debug)]
#[command(name = "svcmap", version, about = "Build and incrementally update a service map", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the service roots discovered in a repository.
    Roots {
        /// Repository root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        repo: String,

        /// Scan config file. Defaults to `svcmap.json` at the repository root if present.
        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan a repository and write a snapshot.
    Scan {
        /// Repository root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        repo: String,

        /// Commit id recorded in the snapshot.
        #[arg(long)]
        commit: String,

        /// Scan config file. Defaults to `svcmap.json` at the repository root if present.
        #[arg(long)]
        config: Option<String>,

        /// Where to write the snapshot.
        #[arg(long)]
        out: String,
    },

    /// Apply a change set to a snapshot.
    Merge {
        /// Snapshot to update.
        #[arg(long)]
        ir: String,

        /// Change set document.
        #[arg(long)]
        delta: String,

        /// Scan config file (only build descriptor names are used).
        #[arg(long)]
        config: Option<String>,

        /// Where to write the updated snapshot.
        #[arg(long)]
        out: String,

        /// Emit the merge report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Summarize a snapshot.
    Info {
        #[arg(long)]
        ir: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Verify the structural invariants of a snapshot.
    Check {
        #[arg(long)]
        ir: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Roots { repo, config, json } => roots_command(&repo, config.as_deref(), json)?,
        Command::Scan { repo, commit, config, out } => scan_command(&repo, &commit, config.as_deref(), &out)?,
        Command::Merge { ir, delta, config, out, json } => {
            merge_command(&ir, &delta, config.as_deref(), &out, json)?
        }
        Command::Info { ir, json } => info_command(&ir, json)?,
        Command::Check { ir } => check_command(&ir)?,
    }

    Ok(())
}
