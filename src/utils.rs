//! Utility functions for buffer parsing.

use bytes::BytesMut;

use crate::error::{CacheError, CacheResult};

/// Consume a buffer and split it into whitespace-separated words.
///
/// This simple protocol doesn't handle quoted strings or escaping; runs of
/// whitespace count as a single separator.
///
/// # Example
/// ```
/// use bytes::BytesMut;
/// use membound::buffer_to_array;
///
/// let mut buf = BytesMut::from("set key value 60");
/// let parts = buffer_to_array(&mut buf);
/// assert_eq!(parts, vec!["set", "key", "value", "60"]);
/// ```
pub fn buffer_to_array(buf: &mut BytesMut) -> Vec<String> {
    let bytes = buf.split_to(buf.len());
    String::from_utf8_lossy(&bytes)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Parse a buffer into command parts with validation.
///
/// Returns an error if the buffer holds no words at all.
pub fn parse_command(buf: &mut BytesMut) -> CacheResult<Vec<String>> {
    let parts = buffer_to_array(buf);

    if parts.is_empty() {
        return Err(CacheError::ParseError("empty command".to_string()));
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_to_array_basic() {
        let mut buf = BytesMut::from("set key value");
        let result = buffer_to_array(&mut buf);
        assert_eq!(result, vec!["set", "key", "value"]);
    }

    #[test]
    fn test_buffer_to_array_empty() {
        let mut buf = BytesMut::new();
        let result = buffer_to_array(&mut buf);
        assert!(result.is_empty());
    }

    #[test]
    fn test_buffer_to_array_single_word() {
        let mut buf = BytesMut::from("ping");
        let result = buffer_to_array(&mut buf);
        assert_eq!(result, vec!["ping"]);
    }

    #[test]
    fn test_buffer_to_array_multiple_spaces() {
        let mut buf = BytesMut::from("set  key   value");
        let result = buffer_to_array(&mut buf);
        assert_eq!(result, vec!["set", "key", "value"]);
    }

    #[test]
    fn test_buffer_to_array_trailing_newline() {
        let mut buf = BytesMut::from("get key\n");
        let result = buffer_to_array(&mut buf);
        assert_eq!(result, vec!["get", "key"]);
    }

    #[test]
    fn test_parse_command_empty() {
        let mut buf = BytesMut::new();
        let result = parse_command(&mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_command_valid() {
        let mut buf = BytesMut::from("shrink 1024");
        let result = parse_command(&mut buf);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), vec!["shrink", "1024"]);
    }
}
