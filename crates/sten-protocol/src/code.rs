//! Station code wire format
//!
//! Exchange codes travel as 4-character tokens. Codes below 1000 are sent as
//! an `F` followed by three zero-padded digits, larger codes as four digits:
//!
//! - `F007` <-> 7
//! - `F089` <-> 89
//! - `1234` <-> 1234
//!
//! Decoding is lenient about padding (any number of leading `F`s is stripped,
//! so `FFF7` also decodes to 7) but strict about width and digits.

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Width of a code token on the wire
pub const TOKEN_WIDTH: usize = 4;

/// Padding character used in place of leading zeros
pub const PAD_CHAR: char = 'F';

/// Decoded station/code number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ProtocolCode(pub u32);

impl ProtocolCode {
    /// Largest code that fits in a wire token
    pub const MAX: ProtocolCode = ProtocolCode(9999);

    /// Get the raw code value
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Decode a wire token such as `F007`
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let len = token.chars().count();
        if len != TOKEN_WIDTH {
            return Err(DecodeError::Width {
                token: token.to_string(),
                len,
            });
        }

        let digits = token.trim_start_matches(PAD_CHAR);
        if digits.is_empty() {
            return Err(DecodeError::Empty(token.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecodeError::NonDigit(token.to_string()));
        }

        // At most four ASCII digits, cannot overflow
        digits
            .parse::<u32>()
            .map(ProtocolCode)
            .map_err(|_| DecodeError::NonDigit(token.to_string()))
    }

    /// Encode to a wire token, or `None` if the code is wider than a token
    pub fn encode(&self) -> Option<String> {
        match self.0 {
            n if n < 1000 => Some(format!("{PAD_CHAR}{n:03}")),
            n if n <= Self::MAX.0 => Some(format!("{n:04}")),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProtocolCode {
    fn from(value: u32) -> Self {
        ProtocolCode(value)
    }
}

impl FromStr for ProtocolCode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_padded_tokens() {
        assert_eq!(ProtocolCode::decode("F007"), Ok(ProtocolCode(7)));
        assert_eq!(ProtocolCode::decode("F023"), Ok(ProtocolCode(23)));
        assert_eq!(ProtocolCode::decode("FFF7"), Ok(ProtocolCode(7)));
        assert_eq!(ProtocolCode::decode("1234"), Ok(ProtocolCode(1234)));
        assert_eq!(ProtocolCode::decode("0000"), Ok(ProtocolCode(0)));
    }

    #[test]
    fn test_decode_rejects_wrong_width() {
        assert!(matches!(
            ProtocolCode::decode("F1000"),
            Err(DecodeError::Width { len: 5, .. })
        ));
        assert!(matches!(
            ProtocolCode::decode("F07"),
            Err(DecodeError::Width { len: 3, .. })
        ));
        assert!(matches!(
            ProtocolCode::decode(""),
            Err(DecodeError::Width { len: 0, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_digits() {
        assert_eq!(
            ProtocolCode::decode("FFFF"),
            Err(DecodeError::Empty("FFFF".into()))
        );
        assert_eq!(
            ProtocolCode::decode("F+12"),
            Err(DecodeError::NonDigit("F+12".into()))
        );
        assert_eq!(
            ProtocolCode::decode("F0F1"),
            Err(DecodeError::NonDigit("F0F1".into()))
        );
        assert_eq!(
            ProtocolCode::decode("F-01"),
            Err(DecodeError::NonDigit("F-01".into()))
        );
    }

    #[test]
    fn test_encode() {
        assert_eq!(ProtocolCode(7).encode().as_deref(), Some("F007"));
        assert_eq!(ProtocolCode(0).encode().as_deref(), Some("F000"));
        assert_eq!(ProtocolCode(999).encode().as_deref(), Some("F999"));
        assert_eq!(ProtocolCode(1000).encode().as_deref(), Some("1000"));
        assert_eq!(ProtocolCode(10_000).encode(), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn representable_codes_survive_the_wire(n in 0u32..=9999) {
                let code = ProtocolCode(n);
                let token = code.encode().unwrap();
                prop_assert_eq!(token.len(), TOKEN_WIDTH);
                prop_assert_eq!(ProtocolCode::decode(&token), Ok(code));
            }

            #[test]
            fn decode_never_panics(s in "\\PC{0,8}") {
                let _ = ProtocolCode::decode(&s);
            }
        }
    }
}
