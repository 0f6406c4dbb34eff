use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

pub const CHECKSUM_LEN: usize = 4;

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// ripemd160 over `data` followed by an algorithm tag such as `b"K1"`.
pub fn ripemd160_with_suffix(data: &[u8], suffix: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    hasher.finalize().into()
}

/// Four-byte key checksum; an empty suffix gives the legacy form.
pub fn key_checksum(data: &[u8], suffix: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = ripemd160_with_suffix(data, suffix);
    [digest[0], digest[1], digest[2], digest[3]]
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ripemd160_empty_input() {
        assert_eq!(
            hex::encode(ripemd160(b"")),
            "9c1185a5c5e9fc54612808977ee8f548b2258d31"
        );
        assert_eq!(ripemd160(b"abc"), ripemd160_with_suffix(b"a", b"bc"));
    }

    #[test]
    fn sha256_abc() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
