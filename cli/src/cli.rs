use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use renditioner_core::config::{
    ProcessingConfig, MEDIUM_DIR_VAR, ORIGINAL_DIR_VAR, SMALL_DIR_VAR, SOURCE_DIR_VAR,
};

/// Turn an uploaded image into small, medium and original renditions
#[derive(Debug, Parser)]
#[command(name = "renditioner", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process one image from disk into the output directory
    Process {
        /// Input image, relative to the working directory (e.g. ./uploads/my-image.jpg)
        file: String,

        /// Root directory for processed images
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Container name passed to storage (ignored by the local backend)
        #[arg(long, default_value = "local-bucket")]
        container: String,

        /// Delete the input file once every rendition is written
        #[arg(long)]
        delete: bool,

        /// Fail any single storage call that takes longer than this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Show the renditions that would be written without touching any file
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        prefixes: PrefixArgs,
    },

    /// Print the rendition plan for an object key
    Plan {
        /// Object key of the upload (e.g. uploads/gopher.png)
        key: String,

        #[command(flatten)]
        prefixes: PrefixArgs,
    },
}

/// Output and source directory prefixes
#[derive(Debug, Clone, Args)]
pub struct PrefixArgs {
    /// Directory prefix for the small rendition
    #[arg(long, env = SMALL_DIR_VAR, default_value = "small/")]
    pub small_dir: String,

    /// Directory prefix for the medium rendition
    #[arg(long, env = MEDIUM_DIR_VAR, default_value = "medium/")]
    pub medium_dir: String,

    /// Directory prefix for the copy of the original
    #[arg(long, env = ORIGINAL_DIR_VAR, default_value = "original/")]
    pub original_dir: String,

    /// Prefix every input must start with
    #[arg(long, env = SOURCE_DIR_VAR, default_value = "./uploads/")]
    pub source_dir: String,
}

impl PrefixArgs {
    pub fn to_config(&self) -> ProcessingConfig {
        ProcessingConfig::new(
            self.small_dir.clone(),
            self.medium_dir.clone(),
            self.original_dir.clone(),
            self.source_dir.clone(),
        )
    }
}
