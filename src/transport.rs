use bytes::Bytes;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Streaming response body as a sequence of byte chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Type alias for the future returned by post_stream
pub type StreamFuture<'a> = Pin<Box<dyn Future<Output = Result<ByteStream>> + Send + 'a>>;

/// Trait for backends that answer a JSON POST with a streamed body
pub trait Transport: Send + Sync {
    /// POST `body` to `path` and return the response body as a byte stream
    ///
    /// # Arguments
    /// * `path` - Endpoint path relative to the configured base URL
    /// * `body` - Serialized JSON request body
    ///
    /// # Returns
    /// The response body once a success status has been received
    fn post_stream(&self, path: &str, body: Bytes) -> StreamFuture<'_>;

    /// Get the transport name for logging
    fn name(&self) -> &str;
}
