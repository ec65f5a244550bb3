//! Module `commands`
//!
//! Classifies a raw client message as public or private chat.

/// A client message after addressing has been parsed.
///
/// Private messages borrow their recipient and body from the raw input.
#[derive(Debug, PartialEq)]
pub enum Message<'a> {
    Public(&'a str),
    Private { recipient: &'a str, body: &'a str },
    Malformed,
}

/// Marks a message as private when it is the first character.
pub const PRIVATE_PREFIX: char = '@';

/// Parses a raw message received from a client into the `Message` enum.
///
/// `@name body` is private; the first space ends the recipient name. A private
/// prefix with no space, or with an empty name, is `Malformed`.
pub fn parse_message(raw: &str) -> Message<'_> {
    let Some(addressed) = raw.strip_prefix(PRIVATE_PREFIX) else {
        return Message::Public(raw);
    };

    match addressed.split_once(' ') {
        Some((recipient, body)) if !recipient.is_empty() => Message::Private { recipient, body },
        _ => Message::Malformed,
    }
}
