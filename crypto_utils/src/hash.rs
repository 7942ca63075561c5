use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Length of a HASH160 digest.
pub const HASH160_LEN: usize = 20;

pub fn sha256(input: &[u8]) -> [u8; 32] {
    Sha256::digest(input).into()
}

/// RIPEMD160(SHA256(input)), the identifier hash used for key fingerprints.
pub fn hash160(input: &[u8]) -> [u8; HASH160_LEN] {
    Ripemd160::digest(sha256(input)).into()
}
