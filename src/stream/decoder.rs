//! Newline-delimited JSON line decoder
//!
//! Turns the raw byte chunks of a streamed HTTP response body into complete
//! text lines. Chunk boundaries may fall anywhere: inside a JSON record, or
//! inside a multi-byte UTF-8 sequence. Neither produces a partial line.

/// Incremental NDJSON line splitter
///
/// Holds a residual text buffer (the unterminated tail of the stream so far)
/// and any trailing bytes of an incomplete UTF-8 sequence.
///
/// # Examples
///
/// ```
/// use csvchat::stream::NdjsonDecoder;
///
/// let mut decoder = NdjsonDecoder::new();
/// assert!(decoder.next_lines(br#"{"type":"delta","#).is_empty());
/// let lines = decoder.next_lines(b"\"content\":\"hi\"}\n");
/// assert_eq!(lines, vec![r#"{"type":"delta","content":"hi"}"#.to_string()]);
/// assert_eq!(decoder.finish(), None);
/// ```
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: String,
    pending: Vec<u8>,
}

impl NdjsonDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes
    ///
    /// Lines are returned without their `\n` terminator (and without a
    /// preceding `\r`). Blank lines are returned too; callers skip them.
    pub fn next_lines(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode_into_buffer(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Bytes of text currently held back waiting for a newline
    pub fn residual(&self) -> &str {
        &self.buffer
    }

    /// End the stream and hand back the unterminated final record, if any
    ///
    /// Returns `None` when the stream ended cleanly on a newline (or the
    /// residual is only whitespace). What to do with a returned record is
    /// the caller's decision.
    pub fn finish(mut self) -> Option<String> {
        if !self.pending.is_empty() {
            // Truncated multi-byte sequence at end of stream
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }

        let tail = self.buffer.trim_end_matches(['\r', '\n']);
        if tail.trim().is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }

    fn decode_into_buffer(&mut self, chunk: &[u8]) {
        let owned;
        let mut bytes: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            owned = std::mem::take(&mut self.pending);
            &owned
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    // `valid` is guaranteed UTF-8 by `valid_up_to`
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            bytes = &rest[len..];
                        }
                        None => {
                            self.pending.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }
}
