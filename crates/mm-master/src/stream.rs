//! Loading captured MIDI byte streams.
//!
//! Raw files are taken byte for byte. Hex dumps hold whitespace-separated
//! two-digit pairs (an optional `0x` prefix is allowed); `#` starts a
//! comment running to the end of the line.

use std::path::Path;

#[derive(Debug)]
pub enum StreamError {
    Io(std::io::Error),
    /// A token on `line` (1-based) is not a hex byte
    BadToken { line: usize, token: String },
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::Io(e) => write!(f, "Stream read error: {}", e),
            StreamError::BadToken { line, token } => {
                write!(f, "Bad hex byte {:?} on line {}", token, line)
            }
        }
    }
}

impl std::error::Error for StreamError {}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        StreamError::Io(e)
    }
}

/// Parse a hex dump.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, StreamError> {
    let mut bytes = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or("");
        for token in content.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            let mut decoded = [0u8; 1];
            hex::decode_to_slice(digits, &mut decoded).map_err(|_| StreamError::BadToken {
                line: i + 1,
                token: token.to_string(),
            })?;
            bytes.push(decoded[0]);
        }
    }
    Ok(bytes)
}

/// Load a stream file, as a hex dump if `hex` is set.
pub fn load_stream(path: impl AsRef<Path>, hex: bool) -> Result<Vec<u8>, StreamError> {
    let path = path.as_ref();
    let bytes = if hex {
        parse_hex(&std::fs::read_to_string(path)?)?
    } else {
        std::fs::read(path)?
    };
    log::debug!("loaded {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_comments() {
        let text = "90 3C 64   # note on\n0x80, 0x3c 00\n\n# only a comment\nf8";
        assert_eq!(parse_hex(text).unwrap(), [0x90, 0x3C, 0x64, 0x80, 0x3C, 0x00, 0xF8]);
    }

    #[test]
    fn rejects_odd_token() {
        let err = parse_hex("90 3C\n6").unwrap_err();
        match err {
            StreamError::BadToken { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "6");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn rejects_non_hex() {
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("123").is_err());
    }

    #[test]
    fn empty_text_is_empty_stream() {
        assert!(parse_hex("").unwrap().is_empty());
    }
}
