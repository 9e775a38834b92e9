use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[clap(name = "launcher-meta", version, about = "Inspect Minecraft launcher metadata")]
pub struct Cli {
    /// Launcher data directory (defaults to the platform data dir).
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub subcommand: SubCommands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum SubCommands {
    /// Summarize a version manifest index.
    Index { file: PathBuf },

    /// Show the libraries and runtime a version manifest needs.
    Manifest {
        file: PathBuf,

        #[clap(long)]
        os: Option<String>,

        #[clap(long)]
        arch: Option<String>,

        #[clap(long)]
        os_version: Option<String>,
    },

    /// Summarize an asset index.
    Assets { file: PathBuf },

    /// List installed Java runtimes and their compatibility with this device.
    #[clap(visible_alias = "ls")]
    Runtimes {
        /// Runtime directory (defaults to `<data dir>/runtimes`).
        dir: Option<PathBuf>,

        /// Major version to pick a runtime for.
        #[clap(long, short)]
        major: Option<u32>,
    },

    /// Download a version's manifest and asset index into the data directory.
    Fetch {
        /// Version id; the latest release when omitted.
        version: Option<String>,
    },
}
