use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use crate::backend::ChatBackend;
use crate::conversation::ConversationStore;
use crate::models::BatchedRequest;
use crate::rate_limit::RequestLimiter;
use crate::worker::chat_worker;
// app's shared state

pub struct AppState {
    pub limiter: Arc<dyn RequestLimiter>,
    pub backend: Arc<dyn ChatBackend>,
    pub conversations: ConversationStore,
    pub batch_tx: mpsc::Sender<BatchedRequest>,
    pub started_at: Instant,
    pub started_at_utc: DateTime<Utc>,
}

impl AppState {
    // Builds the state and spawns the chat worker, so it needs a tokio runtime
    pub fn new(
        limiter: Arc<dyn RequestLimiter>,
        backend: Arc<dyn ChatBackend>,
        queue_size: usize,
        history_limit: usize,
    ) -> Arc<Self> {
        let (batch_tx, batch_rx) = mpsc::channel::<BatchedRequest>(queue_size.max(1));

        tokio::spawn(chat_worker(batch_rx, Arc::clone(&backend)));

        Arc::new(Self {
            limiter,
            backend,
            conversations: ConversationStore::new(history_limit),
            batch_tx,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        })
    }
}
