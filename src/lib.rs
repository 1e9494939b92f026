//! # Recipe Stream
//!
//! Streaming client and incremental result parser for AI recipe
//! recommendation and meal-plan generation.
//!
//! ## Overview
//!
//! The generation service answers a chat-style request with a long-lived
//! response body of line-delimited envelopes such as
//! `data: {"message":"[{name:\"김치찌개\",time:30}]"}`. The payload inside
//! `message` is meant to be a JSON array but is often malformed while the
//! answer is still being generated (unquoted keys, truncated fragments).
//!
//! This crate provides:
//! - An incremental parser that keeps the newest array-shaped payload
//!   (last-valid-wins) and never fails the stream on bad input
//! - Key-quoting repair for payloads with bare object keys
//! - Typed recipe and meal-plan records
//! - An HTTP client that drives the parser over a streamed response
//!
//! ## Quick Start
//!
//! ```rust
//! use recipe_stream::streaming::{FinalResult, StreamingResultParser};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut parser = StreamingResultParser::new();
//! parser.feed("data: {\"message\":\"[{name:\\\"사과\\\"}]\"}\n")?;
//! parser.feed("data: [DONE]\n")?;
//!
//! let result = parser.finish()?;
//! assert_eq!(result.records().map(|r| r.len()), Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and handling
//! - [`models`] - Recipe, meal-plan and request types
//! - [`streaming`] - Line parser, key repair and UTF-8 chunk decoding
//! - [`client`] - HTTP streaming client
//! - [`transport`] - Seam between the client and the byte source

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod streaming;
pub mod transport;

pub use client::ChatClient;
pub use config::ClientConfig;
pub use error::{Result, StreamError};
pub use streaming::{FinalResult, StreamingResultParser};
