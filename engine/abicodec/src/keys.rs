//! Text and binary forms of public keys, private keys, and signatures.
//!
//! Text forms are `<prefix><base58(data ++ checksum)>`. The checksum is the
//! first four bytes of ripemd160 over the data followed by the curve tag
//! (`K1`/`R1`), except for legacy `EOS` public keys where it covers the
//! data alone.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{KeyError, KeyResult};
use crate::hash::{key_checksum, CHECKSUM_LEN};
use crate::numeric::{base58_to_binary, binary_to_base58};

pub const PUBLIC_KEY_SIZE: usize = 33;
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 65;

const LEGACY_PUBLIC_PREFIX: &str = "EOS";

/// Curve a key or signature belongs to; the discriminant is its wire tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    K1 = 0,
    R1 = 1,
}

impl KeyType {
    pub fn suffix(&self) -> &'static str {
        match self {
            KeyType::K1 => "K1",
            KeyType::R1 => "R1",
        }
    }

    pub fn from_u8(tag: u8) -> KeyResult<Self> {
        match tag {
            0 => Ok(KeyType::K1),
            1 => Ok(KeyType::R1),
            other => Err(KeyError::InvalidKeyType(other)),
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "K1" => Some(KeyType::K1),
            "R1" => Some(KeyType::R1),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub key_type: KeyType,
    pub data: [u8; PUBLIC_KEY_SIZE],
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrivateKey {
    pub key_type: KeyType,
    pub data: [u8; PRIVATE_KEY_SIZE],
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub key_type: KeyType,
    pub data: [u8; SIGNATURE_SIZE],
}

/// Split `<tag>_<curve>_<rest>` and return the curve and the base-58 body.
fn split_tagged<'a>(text: &'a str, tag: &str) -> Option<(KeyType, &'a str)> {
    let rest = text.strip_prefix(tag)?.strip_prefix('_')?;
    let curve = rest.get(..2)?;
    let body = rest.get(2..)?.strip_prefix('_')?;
    Some((KeyType::from_suffix(curve)?, body))
}

/// Decode `body` into `data ++ checksum` and verify the checksum.
fn decode_checked<const N: usize, const W: usize>(
    body: &str,
    suffix: &[u8],
    what: &'static str,
) -> KeyResult<[u8; N]> {
    let whole = base58_to_binary::<W>(body)?;
    let (data, checksum) = whole.split_at(N);
    if checksum != key_checksum(data, suffix) {
        return Err(KeyError::ChecksumMismatch(what));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(data);
    Ok(out)
}

fn encode_checked(prefix: &str, data: &[u8], suffix: &[u8]) -> String {
    let mut whole = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    whole.extend_from_slice(data);
    whole.extend_from_slice(&key_checksum(data, suffix));
    format!("{prefix}{}", binary_to_base58(&whole))
}

impl PublicKey {
    pub fn new(key_type: KeyType, data: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { key_type, data }
    }

    /// The pre-curve-tag `EOS…` form; only K1 keys have one.
    pub fn to_legacy_string(&self) -> Option<String> {
        match self.key_type {
            KeyType::K1 => Some(encode_checked(LEGACY_PUBLIC_PREFIX, &self.data, b"")),
            KeyType::R1 => None,
        }
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(text: &str) -> KeyResult<Self> {
        if let Some((key_type, body)) = split_tagged(text, "PUB") {
            let data = decode_checked::<PUBLIC_KEY_SIZE, 37>(
                body,
                key_type.suffix().as_bytes(),
                "public key",
            )?;
            return Ok(Self { key_type, data });
        }
        if let Some(body) = text.strip_prefix(LEGACY_PUBLIC_PREFIX) {
            let data = decode_checked::<PUBLIC_KEY_SIZE, 37>(body, b"", "public key")?;
            return Ok(Self {
                key_type: KeyType::K1,
                data,
            });
        }
        Err(KeyError::UnrecognizedFormat("public key"))
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let suffix = self.key_type.suffix();
        f.write_str(&encode_checked(
            &format!("PUB_{suffix}_"),
            &self.data,
            suffix.as_bytes(),
        ))
    }
}

impl PrivateKey {
    pub fn new(key_type: KeyType, data: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self { key_type, data }
    }
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    fn from_str(text: &str) -> KeyResult<Self> {
        let (key_type, body) =
            split_tagged(text, "PVT").ok_or(KeyError::UnrecognizedFormat("private key"))?;
        let data = decode_checked::<PRIVATE_KEY_SIZE, 36>(
            body,
            key_type.suffix().as_bytes(),
            "private key",
        )?;
        Ok(Self { key_type, data })
    }
}

impl Display for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let suffix = self.key_type.suffix();
        f.write_str(&encode_checked(
            &format!("PVT_{suffix}_"),
            &self.data,
            suffix.as_bytes(),
        ))
    }
}

impl Signature {
    pub fn new(key_type: KeyType, data: [u8; SIGNATURE_SIZE]) -> Self {
        Self { key_type, data }
    }
}

impl FromStr for Signature {
    type Err = KeyError;

    fn from_str(text: &str) -> KeyResult<Self> {
        let (key_type, body) =
            split_tagged(text, "SIG").ok_or(KeyError::UnrecognizedFormat("signature"))?;
        let data = decode_checked::<SIGNATURE_SIZE, 69>(
            body,
            key_type.suffix().as_bytes(),
            "signature",
        )?;
        Ok(Self { key_type, data })
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let suffix = self.key_type.suffix();
        f.write_str(&encode_checked(
            &format!("SIG_{suffix}_"),
            &self.data,
            suffix.as_bytes(),
        ))
    }
}

pub fn text_to_public_key(text: &str) -> KeyResult<PublicKey> {
    text.parse()
}

pub fn public_key_to_text(key: &PublicKey) -> String {
    key.to_string()
}

pub fn text_to_private_key(text: &str) -> KeyResult<PrivateKey> {
    text.parse()
}

pub fn private_key_to_text(key: &PrivateKey) -> String {
    key.to_string()
}

pub fn text_to_signature(text: &str) -> KeyResult<Signature> {
    text.parse()
}

pub fn signature_to_text(signature: &Signature) -> String {
    signature.to_string()
}
