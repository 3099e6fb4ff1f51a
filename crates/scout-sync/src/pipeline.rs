//! Serialized import of received payloads.
//!
//! Payloads from any number of peers queue up here and are imported one at a
//! time, conflict dialogs included. The processed counter advances only after
//! an import succeeds; a store failure leaves the payload at the head of the
//! queue for a retry.

use std::collections::VecDeque;
use std::sync::Arc;

use scout_core::DataType;
use scout_merge::{ConflictResolver, MergeError};
use scout_session::{SessionError, SessionManager, SessionNotice};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{DataTypeRegistry, ImportContext, ImportError, ImportReport, SyncError};

/// A dataset waiting for import.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedPayload {
    pub peer_id: String,
    /// Display name of the sending scout.
    pub source: String,
    pub data_type: DataType,
    pub data: Value,
    /// Unrequested push, to be acknowledged after import.
    pub pushed: bool,
}

impl ReceivedPayload {
    /// Payload carried by a session notice, if any.
    #[must_use]
    pub fn from_notice(notice: &SessionNotice) -> Option<Self> {
        match notice {
            SessionNotice::Payload {
                peer_id,
                peer_name,
                data_type,
                data,
                pushed,
            } => Some(Self {
                peer_id: peer_id.clone(),
                source: peer_name.clone(),
                data_type: *data_type,
                data: data.clone(),
                pushed: *pushed,
            }),
            _ => None,
        }
    }
}

/// A finished import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    pub peer_id: String,
    pub pushed: bool,
    pub report: ImportReport,
}

impl ImportOutcome {
    /// Tell the sender a pushed dataset was imported. No-op for requested data.
    pub fn acknowledge(&self, manager: &SessionManager) -> Result<(), SessionError> {
        if self.pushed {
            manager.confirm_push(&self.peer_id, self.report.data_type)?;
        }
        Ok(())
    }
}

impl ImportError {
    /// Whether retrying the same payload can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Merge(MergeError::Store(_)))
    }
}

/// Queue of received payloads, imported strictly in arrival order.
pub struct ImportPipeline {
    registry: DataTypeRegistry,
    resolver: Arc<dyn ConflictResolver>,
    queue: VecDeque<ReceivedPayload>,
    processed: u64,
}

impl std::fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPipeline")
            .field("registry", &self.registry)
            .field("pending", &self.queue.len())
            .field("processed", &self.processed)
            .finish_non_exhaustive()
    }
}

impl ImportPipeline {
    #[must_use]
    pub fn new(registry: DataTypeRegistry, resolver: Arc<dyn ConflictResolver>) -> Self {
        Self {
            registry,
            resolver,
            queue: VecDeque::new(),
            processed: 0,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &DataTypeRegistry {
        &self.registry
    }

    /// Payloads imported so far.
    #[must_use]
    pub const fn processed(&self) -> u64 {
        self.processed
    }

    /// Payloads waiting, including one that failed and awaits a retry.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn enqueue(&mut self, payload: ReceivedPayload) {
        self.queue.push_back(payload);
    }

    /// Queue the payload carried by `notice`. Returns whether it carried one.
    pub fn offer(&mut self, notice: &SessionNotice) -> bool {
        match ReceivedPayload::from_notice(notice) {
            Some(payload) => {
                self.enqueue(payload);
                true
            }
            None => false,
        }
    }

    /// Import the payload at the head of the queue.
    ///
    /// `Ok(None)` when the queue is empty. A retryable failure keeps the
    /// payload queued; a malformed payload is discarded and its error returned.
    pub async fn process_next(&mut self) -> Result<Option<ImportOutcome>, ImportError> {
        let Some(head) = self.queue.front() else {
            return Ok(None);
        };
        let result = self.import(head).await;
        match result {
            Ok(report) => {
                let payload = self.queue.pop_front();
                self.processed += 1;
                info!(
                    data_type = %report.data_type,
                    records = report.records,
                    added = report.added,
                    replaced = report.replaced,
                    processed = self.processed,
                    "payload imported"
                );
                Ok(payload.map(|p| ImportOutcome {
                    peer_id: p.peer_id,
                    pushed: p.pushed,
                    report,
                }))
            }
            Err(err) if err.is_retryable() => {
                error!(error = %err, pending = self.queue.len(), "import failed, payload kept for retry");
                Err(err)
            }
            Err(err) => {
                if let Some(dropped) = self.queue.pop_front() {
                    warn!(
                        error = %err,
                        peer_id = %dropped.peer_id,
                        data_type = %dropped.data_type,
                        "discarding malformed payload"
                    );
                }
                Err(err)
            }
        }
    }

    /// Drain the queue, stopping at the first failure.
    pub async fn process_all(&mut self) -> Result<Vec<ImportOutcome>, ImportError> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.process_next().await? {
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn import(&self, payload: &ReceivedPayload) -> Result<ImportReport, ImportError> {
        let handler = self.registry.get(payload.data_type)?;
        let dataset = handler.deserialize(payload.data.clone())?;
        let ctx = ImportContext {
            source: &payload.source,
            resolver: self.resolver.as_ref(),
        };
        handler.import(dataset, ctx).await
    }
}

/// Answer a peer's request notice with local data. Returns `Ok(false)` for
/// any other notice.
///
/// Export failures decline the request before the error is returned.
pub async fn answer_request(
    registry: &DataTypeRegistry,
    manager: &SessionManager,
    notice: &SessionNotice,
) -> Result<bool, SyncError> {
    let SessionNotice::Request {
        peer_id,
        request_id,
        data_type,
        filters,
    } = notice
    else {
        return Ok(false);
    };
    match registry.serialize(*data_type, filters).await {
        Ok(data) => {
            manager.respond(peer_id, *data_type, data)?;
            info!(%peer_id, %request_id, %data_type, "request answered");
            Ok(true)
        }
        Err(err) => {
            warn!(%peer_id, %request_id, error = %err, "cannot answer request, declining");
            manager.decline(peer_id, request_id)?;
            Err(err.into())
        }
    }
}
