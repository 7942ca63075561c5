//! Extended key and WIF serialization.
//!
//! Extended keys serialize to 78 bytes before Base58Check:
//!
//! ```text
//! version(4) | depth(1) | parent fingerprint(4) | index(4, BE) | chain code(32) | key data(33)
//! ```
//!
//! where key data is `0x00 || private key` or the compressed public key.

use crypto_utils::base58;
use tracing::trace;

use crate::extended_key::TreePosition;
use crate::{Bip32, Bip32Error, CurveProvider, ExtendedKey, Network};

pub const EXTENDED_KEY_LEN: usize = 78;

const WIF_LEN: usize = 34;
const WIF_COMPRESSED: u8 = 0x01;

impl ExtendedKey {
    /// Raw 78-byte serialization.
    pub fn to_bytes(&self) -> [u8; EXTENDED_KEY_LEN] {
        let mut out = [0u8; EXTENDED_KEY_LEN];
        let version = self.network().version(!self.is_neutered());
        out[0..4].copy_from_slice(&version.to_be_bytes());
        out[4] = self.depth();
        out[5..9].copy_from_slice(&self.parent_fingerprint());
        out[9..13].copy_from_slice(&self.index().to_be_bytes());
        out[13..45].copy_from_slice(self.chain_code());
        match self.private_key() {
            Some(private_key) => out[46..78].copy_from_slice(private_key),
            None => out[45..78].copy_from_slice(self.public_key()),
        }
        out
    }

    /// Base58Check `xprv`/`xpub` style string; private if the key holds private material.
    pub fn to_base58(&self) -> String {
        base58::check_encode(&self.to_bytes())
    }

    /// Parses a Base58Check extended key against the context's network.
    pub fn from_base58<P: CurveProvider>(ctx: &Bip32<P>, s: &str) -> Result<Self, Bip32Error> {
        let data = base58::check_decode(s)?;
        Self::from_bytes(ctx, &data)
    }

    /// Parses a raw 78-byte serialization against the context's network.
    pub fn from_bytes<P: CurveProvider>(ctx: &Bip32<P>, data: &[u8]) -> Result<Self, Bip32Error> {
        let data: &[u8; EXTENDED_KEY_LEN] =
            data.try_into().map_err(|_| Bip32Error::InvalidLength {
                expected: EXTENDED_KEY_LEN,
                actual: data.len(),
            })?;

        let network = *ctx.network();
        let version = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let private = if version == network.bip32.private {
            true
        } else if version == network.bip32.public {
            false
        } else {
            return Err(Bip32Error::UnknownNetworkVersion(version));
        };

        let position = TreePosition {
            depth: data[4],
            parent_fingerprint: [data[5], data[6], data[7], data[8]],
            index: u32::from_be_bytes([data[9], data[10], data[11], data[12]]),
        };
        if position.depth == 0 {
            if position.parent_fingerprint != [0u8; 4] {
                return Err(Bip32Error::InvalidParentFingerprint);
            }
            if position.index != 0 {
                return Err(Bip32Error::InvalidRootIndex);
            }
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        trace!(
            depth = position.depth,
            index = position.index,
            private,
            "decoded extended key"
        );
        if private {
            if data[45] != 0x00 {
                return Err(Bip32Error::InvalidPrivateKey);
            }
            let mut private_key = [0u8; 32];
            private_key.copy_from_slice(&data[46..78]);
            Self::from_private_parts(ctx.provider(), network, position, chain_code, private_key)
        } else {
            let mut public_key = [0u8; 33];
            public_key.copy_from_slice(&data[45..78]);
            Self::from_public_parts(ctx.provider(), network, position, chain_code, public_key)
        }
    }

    /// Compressed WIF encoding of the private key, using the key's network prefix.
    pub fn to_wif(&self) -> Result<String, Bip32Error> {
        let private_key = self.private_key().ok_or(Bip32Error::MissingPrivateKey)?;
        Ok(encode_wif(self.network().wif, private_key))
    }
}

/// `version || private key || 0x01` in Base58Check.
pub fn encode_wif(version: u8, private_key: &[u8; 32]) -> String {
    let mut payload = [0u8; WIF_LEN];
    payload[0] = version;
    payload[1..33].copy_from_slice(private_key);
    payload[33] = WIF_COMPRESSED;
    base58::check_encode(&payload)
}

/// Decodes a compressed WIF private key for `network`.
pub fn decode_wif(network: &Network, s: &str) -> Result<[u8; 32], Bip32Error> {
    let data = base58::check_decode(s)?;
    if data.len() != WIF_LEN {
        return Err(Bip32Error::InvalidLength {
            expected: WIF_LEN,
            actual: data.len(),
        });
    }
    if data[0] != network.wif {
        return Err(Bip32Error::UnknownNetworkVersion(u32::from(data[0])));
    }
    if data[33] != WIF_COMPRESSED {
        return Err(Bip32Error::InvalidCompressionFlag(data[33]));
    }
    let mut private_key = [0u8; 32];
    private_key.copy_from_slice(&data[1..33]);
    Ok(private_key)
}
