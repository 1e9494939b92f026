pub mod decoder;
pub mod envelope;
pub mod parser;
pub mod repair;
pub mod scan;

pub use decoder::Utf8ChunkDecoder;
pub use envelope::{DATA_PREFIX, DONE_SENTINEL, Message};
pub use parser::{
    FinalResult, ParseStats, ParserOptions, ParserState, RecordFilter, StreamingResultParser,
};
pub use repair::quote_bare_keys;
