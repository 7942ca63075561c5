use std::fmt;

use crypto_utils::{
    hash::{HASH160_LEN, hash160},
    hmac::hmac_sha512_split,
};
use tracing::{debug, trace};

use crate::{Bip32, Bip32Error, CurveProvider, Network};

/// First hardened child index (2³¹).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

pub const MIN_SEED_LEN: usize = 16;
pub const MAX_SEED_LEN: usize = 64;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Where a key sits in the derivation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreePosition {
    pub(crate) depth: u8,
    pub(crate) parent_fingerprint: [u8; 4],
    pub(crate) index: u32,
}

impl TreePosition {
    pub(crate) const ROOT: TreePosition = TreePosition {
        depth: 0,
        parent_fingerprint: [0u8; 4],
        index: 0,
    };
}

/// A BIP32 extended key: a key pair (or a lone public key) with its chain code
/// and position in the derivation tree.
///
/// Keys are immutable. Neutering, tweaking and derivation return new keys and
/// leave the receiver untouched; a child refers to its parent only through the
/// parent fingerprint.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ExtendedKey {
    network: Network,
    position: TreePosition,
    chain_code: [u8; 32],
    private_key: Option<[u8; 32]>,
    public_key: [u8; 33],
}

impl ExtendedKey {
    /// Master key from a 16 to 64 byte seed.
    pub fn from_seed<P: CurveProvider>(ctx: &Bip32<P>, seed: &[u8]) -> Result<Self, Bip32Error> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(Bip32Error::InvalidSeed(
                "seed length must be between 16 and 64 bytes",
            ));
        }
        let i = hmac_sha512_split(MASTER_HMAC_KEY, &[seed]);
        if !ctx.provider().is_private_key_in_range(&i.left) {
            return Err(Bip32Error::InvalidSeed("master key not in range [1, n)"));
        }
        let master = Self::from_private_parts(
            ctx.provider(),
            *ctx.network(),
            TreePosition::ROOT,
            i.right,
            i.left,
        )
        .map_err(|_| Bip32Error::InvalidSeed("master key not in range [1, n)"))?;
        debug!(
            fingerprint = %hex::encode(master.fingerprint()),
            "derived master key from seed"
        );
        Ok(master)
    }

    /// Root key from a raw 32-byte private key and chain code.
    pub fn from_private_key<P: CurveProvider>(
        ctx: &Bip32<P>,
        private_key: &[u8],
        chain_code: [u8; 32],
    ) -> Result<Self, Bip32Error> {
        let private_key: [u8; 32] =
            private_key
                .try_into()
                .map_err(|_| Bip32Error::InvalidLength {
                    expected: 32,
                    actual: private_key.len(),
                })?;
        Self::from_private_parts(
            ctx.provider(),
            *ctx.network(),
            TreePosition::ROOT,
            chain_code,
            private_key,
        )
    }

    /// Watch-only root key from a compressed public key and chain code.
    pub fn from_public_key<P: CurveProvider>(
        ctx: &Bip32<P>,
        public_key: &[u8],
        chain_code: [u8; 32],
    ) -> Result<Self, Bip32Error> {
        let public_key: [u8; 33] =
            public_key
                .try_into()
                .map_err(|_| Bip32Error::InvalidLength {
                    expected: 33,
                    actual: public_key.len(),
                })?;
        Self::from_public_parts(
            ctx.provider(),
            *ctx.network(),
            TreePosition::ROOT,
            chain_code,
            public_key,
        )
    }

    pub(crate) fn from_private_parts<P: CurveProvider + ?Sized>(
        provider: &P,
        network: Network,
        position: TreePosition,
        chain_code: [u8; 32],
        private_key: [u8; 32],
    ) -> Result<Self, Bip32Error> {
        if !provider.is_private_key_in_range(&private_key) {
            return Err(Bip32Error::InvalidPrivateKey);
        }
        let public_key = provider
            .derive_public_key(&private_key)
            .ok_or(Bip32Error::InvalidPrivateKey)?;
        Ok(ExtendedKey {
            network,
            position,
            chain_code,
            private_key: Some(private_key),
            public_key,
        })
    }

    pub(crate) fn from_public_parts<P: CurveProvider + ?Sized>(
        provider: &P,
        network: Network,
        position: TreePosition,
        chain_code: [u8; 32],
        public_key: [u8; 33],
    ) -> Result<Self, Bip32Error> {
        if !provider.is_valid_point(&public_key) {
            return Err(Bip32Error::InvalidPublicKey);
        }
        Ok(ExtendedKey {
            network,
            position,
            chain_code,
            private_key: None,
            public_key,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn depth(&self) -> u8 {
        self.position.depth
    }

    /// Full child index, hardened bit included.
    pub fn index(&self) -> u32 {
        self.position.index
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.position.parent_fingerprint
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn private_key(&self) -> Option<&[u8; 32]> {
        self.private_key.as_ref()
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> TreePosition {
        self.position
    }

    /// HASH160 of the public key.
    pub fn identifier(&self) -> [u8; HASH160_LEN] {
        hash160(&self.public_key)
    }

    /// First four bytes of the identifier.
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    pub fn is_neutered(&self) -> bool {
        self.private_key.is_none()
    }

    /// The same key without its private half.
    pub fn neutered(&self) -> Self {
        ExtendedKey {
            private_key: None,
            ..self.clone()
        }
    }

    /// Child key derivation (CKDpriv for keys with private material, CKDpub otherwise).
    ///
    /// `index` is the full 32-bit child number; values with the top bit set
    /// request hardened derivation, which needs the private key. An invalid
    /// intermediate value fails the derivation rather than moving to the next
    /// index.
    pub fn derive<P: CurveProvider>(&self, ctx: &Bip32<P>, index: u32) -> Result<Self, Bip32Error> {
        let hardened = index >= HARDENED_OFFSET;
        if hardened && self.private_key.is_none() {
            return Err(Bip32Error::MissingPrivateKey);
        }
        let depth = self
            .position
            .depth
            .checked_add(1)
            .ok_or(Bip32Error::MaxDepthExceeded)?;

        let index_bytes = index.to_be_bytes();
        let i = match &self.private_key {
            Some(private_key) if hardened => {
                hmac_sha512_split(
                    &self.chain_code,
                    &[[0u8].as_slice(), private_key.as_slice(), index_bytes.as_slice()],
                )
            }
            _ => hmac_sha512_split(
                &self.chain_code,
                &[self.public_key.as_slice(), index_bytes.as_slice()],
            ),
        };

        let provider = ctx.provider();
        if !provider.is_private_key_in_range(&i.left) {
            return Err(Bip32Error::InvalidDerivation { index });
        }

        let position = TreePosition {
            depth,
            parent_fingerprint: self.fingerprint(),
            index,
        };
        let child = match &self.private_key {
            Some(private_key) => {
                let child_key = provider
                    .private_key_tweak_add(private_key, &i.left)
                    .ok_or(Bip32Error::InvalidDerivation { index })?;
                Self::from_private_parts(provider, self.network, position, i.right, child_key)
            }
            None => {
                let child_point = provider
                    .point_tweak_add(&self.public_key, &i.left)
                    .ok_or(Bip32Error::InvalidDerivation { index })?;
                Self::from_public_parts(provider, self.network, position, i.right, child_point)
            }
        }
        .map_err(|_| Bip32Error::InvalidDerivation { index })?;

        trace!(
            depth,
            index = index & !HARDENED_OFFSET,
            hardened,
            parent = %hex::encode(position.parent_fingerprint),
            "derived child key"
        );
        Ok(child)
    }

    /// Hardened child `index + 2³¹`; `index` must be below 2³¹.
    pub fn derive_hardened<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        index: u32,
    ) -> Result<Self, Bip32Error> {
        if self.private_key.is_none() {
            return Err(Bip32Error::MissingPrivateKey);
        }
        if index >= HARDENED_OFFSET {
            return Err(Bip32Error::InvalidChildIndex(index));
        }
        self.derive(ctx, index | HARDENED_OFFSET)
    }

    /// Adds a 32-byte tweak to the key pair, x-only (BIP341) style.
    ///
    /// A private key whose public point has odd Y is negated before the tweak
    /// is added; a neutered key tweaks its x-only public key. Both paths give
    /// the same public key. Chain code and tree position are carried over
    /// unchanged.
    pub fn tweak<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        tweak: &[u8; 32],
    ) -> Result<Self, Bip32Error> {
        let provider = ctx.provider();
        let ops = provider.tweak_ops();
        match &self.private_key {
            Some(private_key) => {
                let even_key = if self.public_key[0] == 0x03 {
                    ops.ok_or(Bip32Error::Unsupported("private_negate"))?
                        .private_negate(private_key)
                        .ok_or(Bip32Error::InvalidTweak)?
                } else {
                    *private_key
                };
                let tweaked = provider
                    .private_key_tweak_add(&even_key, tweak)
                    .ok_or(Bip32Error::InvalidTweak)?;
                Self::from_private_parts(
                    provider,
                    self.network,
                    self.position,
                    self.chain_code,
                    tweaked,
                )
                .map_err(|_| Bip32Error::InvalidTweak)
            }
            None => {
                let ops = ops.ok_or(Bip32Error::Unsupported("x_only_point_add_tweak"))?;
                let mut x_only = [0u8; 32];
                x_only.copy_from_slice(&self.public_key[1..]);
                let tweaked = ops
                    .x_only_point_add_tweak(&x_only, tweak)
                    .ok_or(Bip32Error::InvalidTweak)?;
                let mut public_key = [0u8; 33];
                public_key[0] = if tweaked.odd_y { 0x03 } else { 0x02 };
                public_key[1..].copy_from_slice(&tweaked.x_only);
                Self::from_public_parts(
                    provider,
                    self.network,
                    self.position,
                    self.chain_code,
                    public_key,
                )
                .map_err(|_| Bip32Error::InvalidTweak)
            }
        }
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.position.depth)
            .field("index", &self.position.index)
            .field(
                "parent_fingerprint",
                &hex::encode(self.position.parent_fingerprint),
            )
            .field("public_key", &hex::encode(self.public_key))
            .field("neutered", &self.is_neutered())
            .finish_non_exhaustive()
    }
}
