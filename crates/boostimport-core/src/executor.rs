//! Runs the import call for a deal whose data is on local disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::registry::Deduplicator;
use crate::rpc::DealImporter;

/// Result of one import attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    /// Dry run: logged only.
    Skipped,
    /// Import failed; the deal is now in the bad-deal set.
    Failed(String),
}

/// Import boundary. Never returns an error: failures are logged and recorded
/// in the bad-deal set so the scheduler loop keeps going.
#[derive(Clone)]
pub struct ImportExecutor {
    importer: Arc<dyn DealImporter>,
    registry: Arc<Deduplicator>,
    dry_run: bool,
}

impl ImportExecutor {
    pub fn new(importer: Arc<dyn DealImporter>, registry: Arc<Deduplicator>, dry_run: bool) -> Self {
        Self {
            importer,
            registry,
            dry_run,
        }
    }

    pub async fn execute(&self, deal_id: &str, path: &Path) -> ImportOutcome {
        let path = absolute(path);
        tracing::info!(deal_id, path = %path.display(), "importing");
        if self.dry_run {
            return ImportOutcome::Skipped;
        }

        match self.importer.import_offline_deal(deal_id, &path).await {
            Ok(()) => {
                tracing::info!(deal_id, "import accepted");
                ImportOutcome::Imported
            }
            Err(e) => {
                self.registry.mark_bad(deal_id);
                tracing::error!(deal_id, path = %path.display(), "import failed, will no longer handle this deal: {}", e);
                ImportOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Resolve against the working directory; falls back to the input path.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
