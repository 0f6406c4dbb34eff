use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{CodecError, CodecResult};

pub const MAX_PRECISION: u8 = 18;

/// Up to seven uppercase letters packed little-endian into a `u64`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolCode(pub u64);

impl FromStr for SymbolCode {
    type Err = CodecError;

    fn from_str(text: &str) -> CodecResult<Self> {
        if text.is_empty() || text.len() > 7 {
            return Err(CodecError::invalid(
                "symbol_code",
                format!("{text:?} must be 1 to 7 characters"),
            ));
        }
        let mut raw = 0u64;
        for (i, ch) in text.bytes().enumerate() {
            if !ch.is_ascii_uppercase() {
                return Err(CodecError::invalid(
                    "symbol_code",
                    format!("{text:?} may only contain A-Z"),
                ));
            }
            raw |= (ch as u64) << (8 * i);
        }
        Ok(SymbolCode(raw))
    }
}

impl Display for SymbolCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut tmp = self.0;
        while tmp & 0xff != 0 {
            write!(f, "{}", (tmp & 0xff) as u8 as char)?;
            tmp >>= 8;
        }
        Ok(())
    }
}

/// Precision in the low byte, code above it. Text form is `4,EOS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub u64);

impl Symbol {
    pub fn new(precision: u8, code: SymbolCode) -> Self {
        Symbol((code.0 << 8) | precision as u64)
    }

    pub fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn code(&self) -> SymbolCode {
        SymbolCode(self.0 >> 8)
    }
}

impl FromStr for Symbol {
    type Err = CodecError;

    fn from_str(text: &str) -> CodecResult<Self> {
        let (precision, code) = text
            .split_once(',')
            .ok_or_else(|| CodecError::invalid("symbol", format!("{text:?} is missing ','")))?;
        let precision: u8 = precision
            .parse()
            .map_err(|_| CodecError::invalid("symbol", format!("bad precision in {text:?}")))?;
        if precision > MAX_PRECISION {
            return Err(CodecError::invalid(
                "symbol",
                format!("precision {precision} exceeds {MAX_PRECISION}"),
            ));
        }
        Ok(Symbol::new(precision, code.parse()?))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision(), self.code())
    }
}

/// A signed fixed-point amount of a symbol, written `1.0000 EOS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl FromStr for Asset {
    type Err = CodecError;

    fn from_str(text: &str) -> CodecResult<Self> {
        let bad = |reason: &str| CodecError::invalid("asset", format!("{text:?}: {reason}"));
        let (number, code) = text.trim().split_once(' ').ok_or_else(|| bad("missing symbol"))?;
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if whole.is_empty() || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(bad("malformed amount"));
        }
        if fraction.len() > MAX_PRECISION as usize {
            return Err(bad("too many decimal places"));
        }
        let mut magnitude: i128 = 0;
        for b in whole.bytes().chain(fraction.bytes()) {
            magnitude = magnitude * 10 + (b - b'0') as i128;
            if magnitude > i64::MAX as i128 + 1 {
                return Err(bad("amount is out of range"));
            }
        }
        let amount = if negative { -magnitude } else { magnitude };
        let amount = i64::try_from(amount).map_err(|_| bad("amount is out of range"))?;
        let code: SymbolCode = code.trim().parse()?;
        Ok(Asset {
            amount,
            symbol: Symbol::new(fraction.len() as u8, code),
        })
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let digits = self.amount.unsigned_abs().to_string();
        let precision = self.symbol.precision() as usize;
        let sign = if self.amount < 0 { "-" } else { "" };
        if precision == 0 {
            return write!(f, "{sign}{digits} {}", self.symbol.code());
        }
        let padded = format!("{digits:0>width$}", width = precision + 1);
        let (whole, fraction) = padded.split_at(padded.len() - precision);
        write!(f, "{sign}{whole}.{fraction} {}", self.symbol.code())
    }
}
