use bytes::{Buf, BytesMut};

/// Incremental UTF-8 decoder for chunked byte streams.
///
/// A multi-byte character split across two chunks is held back until its
/// remaining bytes arrive. Invalid sequences decode to U+FFFD instead of
/// failing the stream.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: BytesMut,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` (plus any held-back bytes) as possible
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut text = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end, wait for more bytes
                        None => {
                            self.pending.advance(valid);
                            break;
                        }
                        Some(invalid) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.advance(valid + invalid);
                        }
                    }
                }
            }
        }

        text
    }

    /// Flush held-back bytes once the stream has ended
    pub fn flush(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }

    /// Number of bytes waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
