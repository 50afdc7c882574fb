use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::backend::ChatBackend;
use crate::metrics::UPSTREAM_ERRORS;
use crate::models::BatchedRequest;


// Background worker -> calls the LLM backend for queued chat requests one by one.
// Calls are strictly sequential: one slow upstream call (up to the 30s timeout)
// holds up every admitted caller queued behind it.
pub async fn chat_worker(mut rx: mpsc::Receiver<BatchedRequest>, backend: Arc<dyn ChatBackend>) {
    info!(provider = backend.provider(), model = backend.model(), "chat worker started");

    // keep receiving requests from the queue
    while let Some(batched_req) = rx.recv().await {
        let result = backend
            .complete(&batched_req.history, &batched_req.language)
            .await;

        if let Err(e) = &result {
            UPSTREAM_ERRORS.inc();
            warn!(error = %e, "[Worker] upstream call failed");
        }

        // handler may have gone away already
        let _ = batched_req.response_tx.send(result);
    }

    info!("chat worker stopped - queue closed");
}
