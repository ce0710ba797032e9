//! Serialized application of external change events.
//!
//! Source changes may be detected on many tasks at once, but the engine has a single
//! logical owner. Producers send [`ChangeEvent`]s into a bounded channel and one worker
//! task applies them in arrival order while holding the service lock: first the type
//! repository is updated, then the change is announced to the service.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use itdgen::metadata::{ChangeEvent, ChangePipeline, MetadataService};
//! use itdgen::model::{JavaType, LogicalPath, TypeDetails};
//! use itdgen::physical::TypeRepository;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = Arc::new(tokio::sync::Mutex::new(MetadataService::new()));
//! let repository = TypeRepository::shared();
//! let pipeline = ChangePipeline::spawn(service, repository, 64);
//!
//! let details = TypeDetails::class(JavaType::new("com.example.Customer"), LogicalPath::src_main_java());
//! pipeline.submit(ChangeEvent::TypeChanged(details)).await?;
//! let report = pipeline.finish().await?;
//! assert_eq!(report.events_applied, 1);
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, PoisonError};

use anyhow::{Context, Result, anyhow};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::identifier::MetadataId;
use super::service::MetadataService;
use crate::model::{JavaType, LogicalPath, TypeDetails};
use crate::physical::{SharedTypeRepository, physical_type_id};

/// A metadata service shared between tasks.
pub type SharedMetadataService = Arc<Mutex<MetadataService>>;

/// An externally observed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A physical type was created or modified.
    TypeChanged(TypeDetails),
    /// A physical type was deleted.
    TypeRemoved {
        name: JavaType,
        path: LogicalPath,
    },
    /// Some other metadata changed; propagate to its dependents.
    Notify(MetadataId),
}

/// What the worker did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Events taken off the channel.
    pub events_applied: usize,
    /// Total items invalidated across all events.
    pub invalidated: usize,
    /// Events whose notification failed, with the reason.
    pub failures: Vec<String>,
}

/// Single-consumer queue in front of a [`MetadataService`].
pub struct ChangePipeline {
    sender: mpsc::Sender<ChangeEvent>,
    worker: JoinHandle<PipelineReport>,
}

impl ChangePipeline {
    /// Start the worker task. `buffer` bounds the number of queued events.
    pub fn spawn(
        service: SharedMetadataService,
        repository: SharedTypeRepository,
        buffer: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let worker = tokio::spawn(run_worker(service, repository, receiver));
        Self {
            sender,
            worker,
        }
    }

    /// A handle producers can clone and send from other tasks.
    pub fn sender(&self) -> mpsc::Sender<ChangeEvent> {
        self.sender.clone()
    }

    /// Queue one event, waiting for room if the buffer is full.
    pub async fn submit(&self, event: ChangeEvent) -> Result<()> {
        self.sender.send(event).await.map_err(|_| anyhow!("change pipeline has shut down"))
    }

    /// Close the queue and wait until every queued event has been applied.
    ///
    /// Clones handed out by [`sender`](Self::sender) must be dropped as well, or this
    /// waits for them.
    pub async fn finish(self) -> Result<PipelineReport> {
        drop(self.sender);
        self.worker.await.context("change pipeline worker panicked")
    }
}

async fn run_worker(
    service: SharedMetadataService,
    repository: SharedTypeRepository,
    mut receiver: mpsc::Receiver<ChangeEvent>,
) -> PipelineReport {
    let mut report = PipelineReport::default();
    while let Some(event) = receiver.recv().await {
        let mut service = service.lock().await;
        report.events_applied += 1;
        for changed in apply_to_repository(&repository, event) {
            match service.notify_changed(&changed) {
                Ok(summary) => report.invalidated += summary.invalidated.len(),
                Err(e) => {
                    warn!("Change of {} could not be propagated: {}", changed, e);
                    report.failures.push(format!("{changed}: {e}"));
                }
            }
        }
    }
    debug!("Change pipeline stopped after {} event(s)", report.events_applied);
    report
}

/// Apply the repository side of `event`, returning the identifiers that changed.
///
/// A type that moved to another logical path changes at both its old and new location.
fn apply_to_repository(repository: &SharedTypeRepository, event: ChangeEvent) -> Vec<MetadataId> {
    match event {
        ChangeEvent::TypeChanged(details) => {
            let mut changed = vec![physical_type_id(&details.name, &details.path)];
            let previous = repository.write().unwrap_or_else(PoisonError::into_inner).upsert(details);
            if let Some(previous) = previous {
                let old = physical_type_id(&previous.name, &previous.path);
                if old != changed[0] {
                    debug!("{} moved away from {}", previous.name, previous.path);
                    changed.push(old);
                }
            }
            changed
        }
        ChangeEvent::TypeRemoved {
            name,
            path,
        } => {
            let mut changed = vec![physical_type_id(&name, &path)];
            let removed = repository.write().unwrap_or_else(PoisonError::into_inner).remove(&name);
            if let Some(removed) = removed {
                let actual = physical_type_id(&removed.name, &removed.path);
                if actual != changed[0] {
                    changed.push(actual);
                }
            }
            changed
        }
        ChangeEvent::Notify(id) => vec![id],
    }
}
