use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// HMAC-SHA512 output split into its left (`IL`) and right (`IR`) halves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SplitOutput {
    pub left: [u8; 32],
    pub right: [u8; 32],
}

/// Computes HMAC-SHA512 over the concatenation of `parts` and splits the result.
pub fn hmac_sha512_split(key: &[u8], parts: &[&[u8]]) -> SplitOutput {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    let out = mac.finalize().into_bytes();
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&out[..32]);
    right.copy_from_slice(&out[32..]);
    SplitOutput { left, right }
}
