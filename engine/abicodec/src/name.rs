use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{CodecError, CodecResult};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// A 64-bit account, action, or table name.
///
/// Up to twelve characters from `.1-5a-z` take five bits each, high bits
/// first; an optional thirteenth character fills the low four bits and so
/// is limited to `.1-5a-j`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(pub u64);

fn char_value(ch: u8) -> Option<u64> {
    match ch {
        b'.' => Some(0),
        b'1'..=b'5' => Some((ch - b'1') as u64 + 1),
        b'a'..=b'z' => Some((ch - b'a') as u64 + 6),
        _ => None,
    }
}

impl Name {
    pub const fn new(raw: u64) -> Self {
        Name(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for Name {
    type Err = CodecError;

    fn from_str(text: &str) -> CodecResult<Self> {
        let bytes = text.as_bytes();
        if bytes.len() > 13 {
            return Err(CodecError::invalid("name", format!("{text:?} is longer than 13 characters")));
        }
        let mut raw = 0u64;
        for (i, &ch) in bytes.iter().enumerate() {
            let value = char_value(ch).ok_or_else(|| {
                CodecError::invalid("name", format!("{text:?} contains {:?}", ch as char))
            })?;
            if i < 12 {
                raw |= value << (64 - 5 * (i + 1));
            } else if value > 0x0f {
                return Err(CodecError::invalid(
                    "name",
                    format!("thirteenth character of {text:?} must be in .1-5a-j"),
                ));
            } else {
                raw |= value;
            }
        }
        Ok(Name(raw))
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; 13];
        let mut tmp = self.0;
        for i in 0..13 {
            let mask = if i == 0 { 0x0f } else { 0x1f };
            out[12 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let len = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // every byte comes from CHARMAP
        f.write_str(std::str::from_utf8(&out[..len]).map_err(|_| fmt::Error)?)
    }
}

impl From<u64> for Name {
    fn from(raw: u64) -> Self {
        Name(raw)
    }
}

impl From<Name> for u64 {
    fn from(name: Name) -> Self {
        name.0
    }
}
