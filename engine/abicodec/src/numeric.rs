//! Fixed-width base conversions.
//!
//! Decimal conversions work on little-endian arrays (the wire order of
//! `int128`/`uint128`); base-58 conversions work on big-endian arrays, the
//! order key material is written in. Overflowing the array is an error,
//! never a silent truncation.

use crate::error::{NumericError, NumericResult};

pub const BASE58_CHARS: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const fn base58_map() -> [i8; 256] {
    let mut map = [-1i8; 256];
    let mut i = 0;
    while i < BASE58_CHARS.len() {
        map[BASE58_CHARS[i] as usize] = i as i8;
        i += 1;
    }
    map
}

const BASE58_MAP: [i8; 256] = base58_map();

/// True when the little-endian two's-complement value is negative.
pub fn is_negative<const N: usize>(bytes: &[u8; N]) -> bool {
    bytes.last().map_or(false, |b| b & 0x80 != 0)
}

/// Two's-complement negation in place.
pub fn negate<const N: usize>(bytes: &mut [u8; N]) {
    let mut carry = 1u16;
    for byte in bytes.iter_mut() {
        let x = (!*byte) as u16 + carry;
        *byte = x as u8;
        carry = x >> 8;
    }
}

pub fn decimal_to_binary<const N: usize>(digits: &str) -> NumericResult<[u8; N]> {
    let mut result = [0u8; N];
    for ch in digits.chars() {
        let mut carry = ch
            .to_digit(10)
            .ok_or(NumericError::InvalidDecimalDigit(ch))? as u16;
        for byte in result.iter_mut() {
            let x = *byte as u16 * 10 + carry;
            *byte = x as u8;
            carry = x >> 8;
        }
        if carry != 0 {
            return Err(NumericError::OutOfRange);
        }
    }
    Ok(result)
}

pub fn binary_to_decimal<const N: usize>(bytes: &[u8; N]) -> String {
    // least significant decimal digit first
    let mut digits = vec![0u8];
    for &byte in bytes.iter().rev() {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let x = ((*digit as u32) << 8) + carry;
            *digit = (x % 10) as u8;
            carry = x / 10;
        }
        while carry != 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    digits.iter().rev().map(|d| char::from(b'0' + d)).collect()
}

/// Signed decimal text to a little-endian two's-complement array.
pub fn signed_decimal_to_binary<const N: usize>(text: &str) -> NumericResult<[u8; N]> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() {
        return Err(NumericError::InvalidDecimalDigit('-'));
    }
    let mut result = decimal_to_binary::<N>(digits)?;
    if negative {
        negate(&mut result);
        if !is_negative(&result) && result.iter().any(|&b| b != 0) {
            return Err(NumericError::OutOfRange);
        }
    } else if is_negative(&result) {
        return Err(NumericError::OutOfRange);
    }
    Ok(result)
}

pub fn signed_binary_to_decimal<const N: usize>(bytes: &[u8; N]) -> String {
    if is_negative(bytes) {
        let mut magnitude = *bytes;
        negate(&mut magnitude);
        format!("-{}", binary_to_decimal(&magnitude))
    } else {
        binary_to_decimal(bytes)
    }
}

/// Base-58 text to a big-endian array of exactly `N` bytes.
pub fn base58_to_binary<const N: usize>(text: &str) -> NumericResult<[u8; N]> {
    let mut result = [0u8; N];
    for ch in text.chars() {
        let digit = if ch.is_ascii() {
            BASE58_MAP[ch as usize]
        } else {
            -1
        };
        if digit < 0 {
            return Err(NumericError::InvalidBase58Char(ch));
        }
        let mut carry = digit as u32;
        for byte in result.iter_mut().rev() {
            let x = *byte as u32 * 58 + carry;
            *byte = x as u8;
            carry = x >> 8;
        }
        if carry != 0 {
            return Err(NumericError::OutOfRange);
        }
    }
    Ok(result)
}

pub fn binary_to_base58(bytes: &[u8]) -> String {
    // least significant base-58 digit first
    let mut digits: Vec<u8> = Vec::new();
    for &byte in bytes {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let x = ((*digit as u32) << 8) + carry;
            *digit = (x % 58) as u8;
            carry = x / 58;
        }
        while carry != 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();
    digits.extend(std::iter::repeat(0).take(zeros));
    digits
        .iter()
        .rev()
        .map(|&d| char::from(BASE58_CHARS[d as usize]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base58_known_vectors() {
        assert_eq!(binary_to_base58(&[0x61]), "2g");
        assert_eq!(binary_to_base58(&[0x62, 0x62, 0x62]), "a3gV");
        assert_eq!(binary_to_base58(&[0u8; 10]), "1111111111");
        let address = hex::decode("00eb15231dfceb60925886b67d065299925915aeb172c06647")
            .expect("hex");
        assert_eq!(binary_to_base58(&address), "1NS17iag9jJgTHD1VXjvLCEnZuQ3rJDE9L");

        assert_eq!(base58_to_binary::<1>("2g"), Ok([0x61]));
        assert_eq!(base58_to_binary::<3>("a3gV"), Ok([0x62, 0x62, 0x62]));
        let decoded = base58_to_binary::<25>("1NS17iag9jJgTHD1VXjvLCEnZuQ3rJDE9L").expect("decode");
        assert_eq!(decoded.to_vec(), address);
    }

    #[test]
    fn base58_rejects_lookalike_characters() {
        for bad in ["0", "O", "I", "l", "é"] {
            let ch = bad.chars().next().expect("char");
            assert_eq!(
                base58_to_binary::<4>(bad),
                Err(NumericError::InvalidBase58Char(ch))
            );
        }
    }

    #[test]
    fn base58_overflow_is_out_of_range() {
        assert_eq!(base58_to_binary::<1>("5R"), Err(NumericError::OutOfRange));
        assert_eq!(base58_to_binary::<1>("5Q"), Ok([255]));
    }

    #[test]
    fn decimal_roundtrip_u128_bounds() {
        let max = u128::MAX.to_string();
        let bytes = decimal_to_binary::<16>(&max).expect("max");
        assert_eq!(bytes, u128::MAX.to_le_bytes());
        assert_eq!(binary_to_decimal(&bytes), max);
        assert_eq!(binary_to_decimal(&[0u8; 16]), "0");
        assert_eq!(
            decimal_to_binary::<16>("340282366920938463463374607431768211456"),
            Err(NumericError::OutOfRange)
        );
        assert_eq!(
            decimal_to_binary::<16>("12a"),
            Err(NumericError::InvalidDecimalDigit('a'))
        );
    }

    #[test]
    fn signed_decimal_bounds() {
        let min = i128::MIN.to_string();
        let bytes = signed_decimal_to_binary::<16>(&min).expect("min");
        assert_eq!(bytes, i128::MIN.to_le_bytes());
        assert_eq!(signed_binary_to_decimal(&bytes), min);
        assert_eq!(
            signed_decimal_to_binary::<16>("170141183460469231731687303715884105728"),
            Err(NumericError::OutOfRange)
        );
        assert_eq!(
            signed_decimal_to_binary::<16>("-170141183460469231731687303715884105729"),
            Err(NumericError::OutOfRange)
        );
        assert_eq!(signed_decimal_to_binary::<16>("-0"), Ok([0u8; 16]));
        assert_eq!(signed_binary_to_decimal(&(-42i128).to_le_bytes()), "-42");
    }
}
