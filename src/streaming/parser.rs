use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{Message, decode_envelope, normalize_line};
use super::repair::parse_array;
use super::scan::last_array;
use crate::error::{Result, StreamError};

/// Tuning knobs for [`StreamingResultParser`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Only accept lines carrying the `data:` prefix
    pub require_data_prefix: bool,
    /// Recover the message text from `{"message":"..."}` lines whose string
    /// body is not properly escaped
    pub lenient_envelopes: bool,
    /// When no single line produced an array, scan the concatenated message
    /// text for the last balanced array before falling back to raw text
    pub recover_from_transcript: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            require_data_prefix: false,
            lenient_envelopes: true,
            recover_from_transcript: false,
        }
    }
}

/// Shape check a payload must pass before it becomes the candidate
pub type RecordFilter = fn(&[Value]) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    Feeding,
    Finished,
}

/// Diagnostic counters for one parsed stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub skipped_lines: usize,
    pub envelopes: usize,
    pub candidate_updates: usize,
}

/// Outcome of a finished stream
#[derive(Debug, Clone, PartialEq)]
pub enum FinalResult {
    /// The last array-shaped payload seen
    Records(Vec<Value>),
    /// No payload ever parsed; the concatenated message fragments
    RawText(String),
    /// Nothing usable arrived
    Empty,
}

impl FinalResult {
    pub fn records(&self) -> Option<&[Value]> {
        match self {
            FinalResult::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            FinalResult::RawText(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FinalResult::Empty)
    }

    /// Deserialize every record into `T`, failing on the first mismatch.
    /// Non-record outcomes yield an empty list.
    pub fn into_records<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        match self {
            FinalResult::Records(records) => records
                .into_iter()
                .map(|record| serde_json::from_value(record).map_err(StreamError::from))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }
}

/// Incremental parser for line-delimited `{"message": ...}` streams.
///
/// One instance per request: feed chunks in arrival order, read
/// [`candidate`](Self::candidate) for live results, then call
/// [`finish`](Self::finish) exactly once when the transport closes.
#[derive(Debug)]
pub struct StreamingResultParser {
    buffer: String,
    candidate: Option<Vec<Value>>,
    transcript: String,
    saw_fragment: bool,
    state: ParserState,
    options: ParserOptions,
    filter: Option<RecordFilter>,
    stats: ParseStats,
}

impl StreamingResultParser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            buffer: String::with_capacity(8192),
            candidate: None,
            transcript: String::new(),
            saw_fragment: false,
            state: ParserState::Idle,
            options,
            filter: None,
            stats: ParseStats::default(),
        }
    }

    /// Only accept payloads for which `filter` returns `true`.
    ///
    /// Applies to per-line payloads and to transcript recovery alike, so a
    /// stray array of the wrong shape never replaces a good result.
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append a chunk and process every complete line in it.
    ///
    /// Text after the last newline stays buffered for the next call.
    /// Returns `true` if the candidate result was replaced.
    pub fn feed(&mut self, chunk: &str) -> Result<bool> {
        if self.state == ParserState::Finished {
            return Err(StreamError::AlreadyFinished);
        }
        self.state = ParserState::Feeding;

        // Only the new chunk can hold a newline; the buffer never does
        let offset = self.buffer.len();
        self.buffer.push_str(chunk);
        let Some(last_newline) = chunk.rfind('\n').map(|i| offset + i) else {
            return Ok(false);
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut updated = false;
        for line in complete.lines() {
            updated |= self.process_line(line);
        }

        Ok(updated)
    }

    /// Process the buffered tail and produce the final result.
    pub fn finish(&mut self) -> Result<FinalResult> {
        if self.state == ParserState::Finished {
            return Err(StreamError::AlreadyFinished);
        }
        self.state = ParserState::Finished;

        let tail = std::mem::take(&mut self.buffer);
        if !tail.is_empty() {
            self.process_line(&tail);
        }

        if let Some(records) = self.candidate.take() {
            debug!(
                records = records.len(),
                updates = self.stats.candidate_updates,
                "stream finished with structured result"
            );
            return Ok(FinalResult::Records(records));
        }

        if self.options.recover_from_transcript
            && let Some(records) = last_array(&self.transcript, |records| self.accepts(records))
        {
            debug!(records = records.len(), "recovered result from transcript");
            return Ok(FinalResult::Records(records));
        }

        if self.saw_fragment {
            warn!(
                bytes = self.transcript.len(),
                "no structured result, falling back to raw text"
            );
            return Ok(FinalResult::RawText(std::mem::take(&mut self.transcript)));
        }

        debug!(lines = self.stats.lines, "stream finished without result");
        Ok(FinalResult::Empty)
    }

    /// Latest array-shaped payload, if any has parsed yet
    pub fn candidate(&self) -> Option<&[Value]> {
        self.candidate.as_deref()
    }

    /// Concatenated text of every string message seen so far
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn accepts(&self, records: &[Value]) -> bool {
        self.filter.is_none_or(|filter| filter(records))
    }

    fn process_line(&mut self, raw: &str) -> bool {
        self.stats.lines += 1;

        let Some(text) = normalize_line(raw, self.options.require_data_prefix) else {
            self.stats.skipped_lines += 1;
            return false;
        };

        let Some(message) = decode_envelope(text, self.options.lenient_envelopes) else {
            self.stats.skipped_lines += 1;
            return false;
        };
        self.stats.envelopes += 1;

        let parsed = match message {
            Message::Text(fragment) => {
                self.saw_fragment = true;
                self.transcript.push_str(&fragment);
                parse_array(&fragment)
            }
            Message::Array(items) => Some(items),
            Message::Other => {
                debug!("ignoring message that is neither text nor array");
                None
            }
        };

        match parsed {
            Some(records) if !self.accepts(&records) => {
                debug!(records = records.len(), "payload rejected by record filter");
                false
            }
            Some(records) => {
                self.stats.candidate_updates += 1;
                self.candidate = Some(records);
                true
            }
            None => false,
        }
    }
}

impl Default for StreamingResultParser {
    fn default() -> Self {
        Self::new()
    }
}
