//! The name server's single coarse-grained state object (spec §5, §9:
//! "encapsulate as a singleton service object constructed at startup;
//! avoid ambient statics").

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::persistence::Checkpoint;
use crate::registry::SsRegistry;
use crate::sessions::ClientSessionTable;
use crate::store::MetadataStore;

/// Everything guarded by the one exclusive mutex: the metadata store and
/// the storage-server registry. Mutated together so that, e.g., a create
/// sees a consistent view of both.
pub struct NmState {
    pub store: MetadataStore,
    pub registry: SsRegistry,
}

pub struct NameServer {
    pub state: Mutex<NmState>,
    pub sessions: ClientSessionTable,
    pub checkpoint: Checkpoint,
    pub allow_exec: bool,
}

impl NameServer {
    pub async fn new(checkpoint_path: PathBuf, allow_exec: bool) -> std::io::Result<Arc<NameServer>> {
        let checkpoint = Checkpoint::new(checkpoint_path);
        let store = checkpoint.load().await?;
        Ok(Arc::new(NameServer {
            state: Mutex::new(NmState { store, registry: SsRegistry::new() }),
            sessions: ClientSessionTable::new(),
            checkpoint,
            allow_exec,
        }))
    }

    /// Persists the current store to disk. Called after every mutation
    /// (spec §4.2); failures are logged, not propagated, since persistence
    /// is a checkpoint, not a transaction log the operation depends on.
    pub async fn persist(&self) {
        let guard = self.state.lock().await;
        if let Err(e) = self.checkpoint.save(&guard.store).await {
            tracing::warn!(error = %e, "failed to persist metadata checkpoint");
        }
    }
}
