use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use super::http::HttpTransport;
use crate::config::{ClientConfig, MEAL_PLAN_CREATE_PATH, RECIPE_RECOMMEND_PATH};
use crate::error::{Result, StreamError};
use crate::models::{ChatRequest, MealPlanItem, MealPlanRequest};
use crate::streaming::{FinalResult, ParserOptions, StreamingResultParser, Utf8ChunkDecoder};
use crate::transport::Transport;

/// Client for the recipe and meal-plan generation endpoints.
///
/// Each call sends one request and drives a fresh parser over the streamed
/// answer. `on_update` is invoked with the newest candidate whenever it
/// changes, so callers can render partial results while generation runs.
pub struct ChatClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.backend)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ask for recipes that use the ingredients in `query`
    pub async fn recommend_recipes<F>(&self, query: &str, on_update: F) -> Result<FinalResult>
    where
        F: FnMut(&[Value]),
    {
        let query = query.trim();
        if query.is_empty() {
            return Err(StreamError::InvalidRequest(
                "Search query is empty".to_string(),
            ));
        }

        let request = self.chat_request(query);
        let parser = StreamingResultParser::with_options(self.config.parser.clone());
        self.generate(RECIPE_RECOMMEND_PATH, &request, parser, on_update)
            .await
    }

    /// Generate a meal plan.
    ///
    /// The plan endpoint streams token deltas, so the parser also scans the
    /// concatenated text for an array when no single line parsed. Only arrays
    /// holding at least one meal-plan item count as a result.
    pub async fn create_meal_plan<F>(
        &self,
        plan: &MealPlanRequest,
        on_update: F,
    ) -> Result<FinalResult>
    where
        F: FnMut(&[Value]),
    {
        let request = self.chat_request(plan.to_message()?);
        let options = ParserOptions {
            recover_from_transcript: true,
            ..self.config.parser.clone()
        };
        let parser =
            StreamingResultParser::with_options(options).with_filter(MealPlanItem::is_meal_plan);
        self.generate(MEAL_PLAN_CREATE_PATH, &request, parser, on_update)
            .await
    }

    fn chat_request(&self, message: impl Into<String>) -> ChatRequest {
        ChatRequest::new(
            message,
            self.config.generation.max_tokens,
            self.config.generation.temperature,
        )
    }

    async fn generate<F>(
        &self,
        path: &str,
        request: &ChatRequest,
        parser: StreamingResultParser,
        on_update: F,
    ) -> Result<FinalResult>
    where
        F: FnMut(&[Value]),
    {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "generate",
            request_id = %request_id,
            path = path,
            transport = self.transport.name()
        );

        async move {
            let body = Bytes::from(serde_json::to_vec(request)?);
            let stream = self.transport.post_stream(path, body).await?;
            collect_stream(stream, parser, on_update).await
        }
        .instrument(span)
        .await
    }
}

/// Drive `parser` over a byte stream until the stream ends.
///
/// Chunks are decoded as UTF-8 incrementally and fed in arrival order. The
/// parser is finished when the stream closes, whether or not a `[DONE]`
/// sentinel was seen. A transport error aborts with that error.
pub async fn collect_stream<S, F>(
    stream: S,
    mut parser: StreamingResultParser,
    mut on_update: F,
) -> Result<FinalResult>
where
    S: Stream<Item = Result<Bytes>>,
    F: FnMut(&[Value]),
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = Utf8ChunkDecoder::new();
    let mut chunks = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        chunks += 1;

        let text = decoder.decode(&chunk);
        if parser.feed(&text)?
            && let Some(records) = parser.candidate()
        {
            debug!(records = records.len(), "candidate updated");
            on_update(records);
        }
    }

    let tail = decoder.flush();
    if !tail.is_empty() {
        parser.feed(&tail)?;
    }

    let stats = parser.stats();
    let result = parser.finish()?;
    info!(
        chunks,
        lines = stats.lines,
        skipped = stats.skipped_lines,
        updates = stats.candidate_updates,
        "stream complete"
    );

    Ok(result)
}
