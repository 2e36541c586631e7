use std::sync::Arc;

use futures_util::Stream;
use tracing::debug;

use crate::anthropic::CompletionBackend;
use crate::errors::AppError;
use crate::models::{normalize_conversation, ChatRequest};
use crate::stream::encode_data_stream;

/// Glue between the HTTP route and the completion backend: normalizes the
/// inbound conversation, makes the single upstream attempt, and hands back
/// the translated frame stream. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct ChatService {
    backend: Arc<dyn CompletionBackend>,
}

impl ChatService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Runs one chat turn. Fails before any frame is produced when the
    /// upstream call cannot be initiated; afterwards, failures surface
    /// through the returned stream.
    pub async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<impl Stream<Item = Result<String, AppError>> + Send, AppError> {
        let messages = normalize_conversation(&request.messages);
        debug!(messages = messages.len(), "forwarding conversation upstream");

        let events = self.backend.stream_completion(&messages).await?;
        Ok(encode_data_stream(events))
    }
}
