//! Inbound framing
//!
//! One socket read is one chunk. Line-oriented clients may pack several
//! messages into a chunk, so chunks are split on newlines.

/// Turns raw reads into text without splitting a character in two.
///
/// A multi-byte UTF-8 sequence cut off at the end of one read is held back and
/// completed by the next. Bytes that can never form valid UTF-8 still decode
/// to U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let complete = self.pending.len() - incomplete_tail(&self.pending);
        let text = String::from_utf8_lossy(&self.pending[..complete]).into_owned();
        self.pending.drain(..complete);
        text
    }
}

/// Length of a truncated UTF-8 sequence at the end of `bytes`, or 0.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let width = match byte {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Splits a chunk into messages, dropping `\r` line endings and blank lines.
///
/// A chunk with no newline is exactly one message.
pub fn split_messages(chunk: &str) -> impl Iterator<Item = &str> {
    chunk
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

/// Normalises a handshake line into a display name.
///
/// Surrounding whitespace is trimmed and the name is cut to `max_len`
/// characters. Returns `None` for empty names or names with control characters.
pub fn parse_username(line: &str, max_len: usize) -> Option<String> {
    let name: String = line.trim().chars().take(max_len).collect();
    let name = name.trim_end();

    if name.is_empty() || name.chars().any(char::is_control) {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_without_newline_is_one_message() {
        let messages: Vec<_> = split_messages("hello world").collect();
        assert_eq!(messages, vec!["hello world"]);
    }

    #[test]
    fn crlf_lines_are_split_and_blank_lines_skipped() {
        let messages: Vec<_> = split_messages("hi\r\n\r\n@bob yo\n").collect();
        assert_eq!(messages, vec!["hi", "@bob yo"]);
    }

    #[test]
    fn character_split_across_reads_is_rejoined() {
        let mut decoder = ChunkDecoder::new();
        assert_eq!(decoder.decode(b"caf\xC3"), "caf");
        assert_eq!(decoder.decode(b"\xA9 ok"), "\u{e9} ok");

        // Four-byte sequence over three reads
        assert_eq!(decoder.decode(b"\xF0\x9F"), "");
        assert_eq!(decoder.decode(b"\x98"), "");
        assert_eq!(decoder.decode(b"\x80!"), "\u{1F600}!");
    }

    #[test]
    fn invalid_bytes_are_replaced_not_held() {
        let mut decoder = ChunkDecoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode(b"\x80"), "\u{FFFD}");
        assert_eq!(decoder.decode(b"plain"), "plain");
    }

    #[test]
    fn username_is_trimmed_and_truncated() {
        assert_eq!(parse_username("  alice \n", 31), Some("alice".to_string()));
        assert_eq!(parse_username("abcdefgh", 4), Some("abcd".to_string()));
    }

    #[test]
    fn blank_or_control_names_are_rejected() {
        assert_eq!(parse_username("   ", 31), None);
        assert_eq!(parse_username("al\u{7}ice", 31), None);
    }
}
