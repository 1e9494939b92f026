pub mod chat;
pub mod http;

pub use chat::{ChatClient, collect_stream};
pub use http::HttpTransport;
