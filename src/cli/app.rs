//! CLI module for the redditsaved application
//!
//! This module runs one fetch, merge, back up, filter and report pass on
//! behalf of the command line.
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use console::{style, Term};
use log::{error, info, warn};

use crate::{
    authenticate_with_retry, fetch, filter, merge, restore_backup, write_report, Config,
    FetchLimit, ProgressSupervisor, RemoteApi, Result, RunOptions, SavedError, SnapshotStore,
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Items obtained from the remote account
    pub fetched: usize,
    /// Items appended from the backup
    pub restored: usize,
    /// Items written to the report
    pub reported: usize,
    /// Where the report was written
    pub report_path: PathBuf,
    /// Where the backup was written, if one was requested
    pub backup_path: Option<PathBuf>,
}

/// CLI Application handler - drives a run against the remote account
pub struct App {
    /// The remote account provider
    api: Arc<dyn RemoteApi>,

    /// Application configuration
    config: Config,

    /// Snapshot persistence
    store: SnapshotStore,
}

impl App {
    /// Create a new CLI application for the given provider and config
    pub fn new(api: Arc<dyn RemoteApi>, config: Config) -> Self {
        Self {
            api,
            config,
            store: SnapshotStore::new(),
        }
    }

    /// Run one pass: log in, fetch, merge, optionally back up, filter and
    /// write the report.
    ///
    /// A failed backup write does not stop the report from being written,
    /// but it is still returned as the run's error.
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
        let (limit, clamped) = FetchLimit::clamped(options.limit);
        if clamped {
            warn!("Requested {} items, limiting to {}", options.limit, limit);
            println!(
                "{} the listing returns at most {} items, fetching {}",
                style("Note:").yellow(),
                limit,
                limit
            );
        }

        println!("Logging in");
        let session = authenticate_with_retry(
            self.api.as_ref(),
            &self.config.credentials(),
            self.config.retry,
        )
        .await?;
        println!("Logged in as {}", session.username());

        let api = Arc::clone(&self.api);
        let mut progress = ProgressSupervisor::new(io::stderr(), self.config.fetch_timeout())
            .with_animation(Term::stderr().is_term());
        let raw_items = progress
            .run("Grabbing saved links", async move {
                fetch(api.as_ref(), &session, limit).await
            })
            .await?;
        let fetched = raw_items.len();

        let backup = options.backup_read.as_deref().and_then(|path| {
            let restored = restore_backup(&self.store, path);
            if restored.is_none() {
                println!(
                    "{} could not read backup {}, continuing with fetched items only",
                    style("Note:").yellow(),
                    path.display()
                );
            }
            restored
        });
        let restored = backup.as_ref().map_or(0, Vec::len);

        let collection = merge(raw_items, backup);
        info!(
            "Collection holds {} items ({} fetched, {} restored)",
            collection.len(),
            fetched,
            restored
        );

        let mut backup_error: Option<SavedError> = None;
        let mut backup_path = None;
        if let Some(path) = options.backup_write.as_deref() {
            let announce = |target: &Path| {
                println!(
                    "{} already exists, backing up to {}",
                    path.display(),
                    target.display()
                );
            };
            match self.store.store_announcing(&collection, path, announce) {
                Ok(stored) => {
                    println!("Backed up {} items to {}", stored.items, stored.path.display());
                    backup_path = Some(stored.path);
                }
                Err(e) => {
                    // reported once the report is out
                    error!("Backup failed, continuing with the report: {}", e);
                    backup_error = Some(e);
                }
            }
        }

        let selected = filter(
            &collection,
            options.title_terms.as_deref(),
            options.community_terms.as_deref(),
        )?;

        let report_path = write_report(&selected, &options.output)?;
        println!(
            "Wrote {} items to {}",
            selected.len(),
            report_path.display()
        );

        if let Some(e) = backup_error {
            return Err(e);
        }

        Ok(RunSummary {
            fetched,
            restored,
            reported: selected.len(),
            report_path,
            backup_path,
        })
    }
}
