use crypto_utils::Base58Error;
use thiserror::Error;

/// Errors returned by extended key construction, derivation, encoding and signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Bip32Error {
    /// The curve provider failed its construction-time self-check.
    #[error("curve provider invalid: {0}")]
    InvalidProvider(&'static str),

    /// Seed length outside 16..=64 bytes, or the master scalar is out of range.
    #[error("invalid seed: {0}")]
    InvalidSeed(&'static str),

    #[error("missing private key")]
    MissingPrivateKey,

    /// An optional curve provider capability is absent.
    #[error("{0} not supported by curve provider")]
    Unsupported(&'static str),

    /// `IL` was out of range or the derived key was zero / the point at infinity.
    #[error("invalid child key derived at index {index:#010x}")]
    InvalidDerivation { index: u32 },

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("private key not in range [1, n)")]
    InvalidPrivateKey,

    #[error("invalid public key point")]
    InvalidPublicKey,

    /// Version bytes match neither the public nor the private version of the network.
    #[error("unknown network version {0:#010x}")]
    UnknownNetworkVersion(u32),

    #[error("expected master, got child at depth {depth}")]
    NotMaster { depth: u8 },

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("invalid base58check checksum")]
    Checksum,

    #[error("invalid base58 encoding: {0}")]
    InvalidBase58(String),

    /// A depth-0 serialized key with a non-zero parent fingerprint.
    #[error("invalid parent fingerprint for a root key")]
    InvalidParentFingerprint,

    /// A depth-0 serialized key with a non-zero child index.
    #[error("invalid index for a root key")]
    InvalidRootIndex,

    /// `derive_hardened` takes an unhardened index below 2^31.
    #[error("child index {0:#010x} out of range for hardened derivation")]
    InvalidChildIndex(u32),

    #[error("maximum derivation depth exceeded")]
    MaxDepthExceeded,

    #[error("tweak produced an invalid key")]
    InvalidTweak,

    #[error("invalid WIF compression flag {0:#04x}")]
    InvalidCompressionFlag(u8),
}

impl From<Base58Error> for Bip32Error {
    fn from(err: Base58Error) -> Self {
        match err {
            Base58Error::Checksum => Bip32Error::Checksum,
            other => Bip32Error::InvalidBase58(other.to_string()),
        }
    }
}
