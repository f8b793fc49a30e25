use std::path::PathBuf;

use clap::Parser;

use crate::{DEFAULT_BACKUP_FILE, DEFAULT_FETCH_LIMIT, DEFAULT_REPORT_FILE};

/// Main CLI application arguments
#[derive(Parser, Debug)]
#[clap(
    name = "redditsaved",
    version,
    about = "Finds, backs up and filters the saved posts of a Reddit account"
)]
pub struct Cli {
    /// Keep items whose title contains any of these terms
    #[clap(short = 's', long = "search", value_name = "TERM", num_args = 1..)]
    pub search: Option<Vec<String>>,

    /// Keep items posted in a community whose name contains any of these terms
    #[clap(short = 'r', long = "community", value_name = "NAME", num_args = 1..)]
    pub community: Option<Vec<String>>,

    /// Number of saved items to fetch (at most 1000)
    #[clap(
        short = 'n',
        long = "number",
        default_value_t = DEFAULT_FETCH_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub number: u32,

    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path of the HTML report
    #[clap(short = 'o', long, default_value = DEFAULT_REPORT_FILE)]
    pub output: PathBuf,

    /// Merge the items of a previously written backup into the results
    #[clap(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_BACKUP_FILE)]
    pub backup_read: Option<PathBuf>,

    /// Write the fetched items to a backup file
    #[clap(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_BACKUP_FILE)]
    pub backup_write: Option<PathBuf>,

    /// Remove the report file and exit
    #[clap(long)]
    pub clean: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            title_terms: self.search.clone(),
            community_terms: self.community.clone(),
            limit: self.number,
            output: self.output.clone(),
            backup_read: self.backup_read.clone(),
            backup_write: self.backup_write.clone(),
        }
    }
}

/// What a single fetch-and-report run should do.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub title_terms: Option<Vec<String>>,
    pub community_terms: Option<Vec<String>>,
    /// Requested fetch size, clamped before use
    pub limit: u32,
    pub output: PathBuf,
    pub backup_read: Option<PathBuf>,
    pub backup_write: Option<PathBuf>,
}
