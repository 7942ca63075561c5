//! Elliptic curve capabilities consumed by the derivation engine.
//!
//! The engine never performs curve arithmetic itself. It works on raw byte
//! encodings (32-byte scalars, 33-byte compressed points, 64-byte compact
//! signatures) and asks a [`CurveProvider`] for every check and operation.
//! Schnorr and x-only tweaking are optional capability groups, probed only
//! when an operation needs them.

use secp256k1::{
    KeyPair, Message, Parity, PublicKey, Scalar, Secp256k1, SecretKey, XOnlyPublicKey, ecdsa,
    schnorr,
};

use crate::Bip32Error;

/// Result of tweaking an x-only public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XOnlyTweak {
    /// Whether the tweaked point has an odd Y coordinate.
    pub odd_y: bool,
    pub x_only: [u8; 32],
}

/// Mandatory curve operations.
pub trait CurveProvider: Send + Sync {
    /// Whether `point` encodes a valid curve point.
    fn is_valid_point(&self, point: &[u8]) -> bool;

    /// Whether `scalar` lies in `[1, n - 1]`.
    fn is_private_key_in_range(&self, scalar: &[u8; 32]) -> bool;

    /// Compressed public key `scalar * G`.
    fn derive_public_key(&self, scalar: &[u8; 32]) -> Option<[u8; 33]>;

    /// `(scalar + tweak) mod n`; `None` if the tweak is out of range or the sum is zero.
    fn private_key_tweak_add(&self, scalar: &[u8; 32], tweak: &[u8; 32]) -> Option<[u8; 32]>;

    /// `point + tweak * G`; `None` if the tweak is out of range or the sum is infinity.
    fn point_tweak_add(&self, point: &[u8; 33], tweak: &[u8; 32]) -> Option<[u8; 33]>;

    /// Deterministic ECDSA signature in compact `r || s` form.
    ///
    /// With `low_r` set, nonces are ground until `r` fits in 255 bits.
    fn sign(&self, hash: &[u8; 32], scalar: &[u8; 32], low_r: bool) -> Option<[u8; 64]>;

    fn verify(&self, hash: &[u8; 32], point: &[u8; 33], signature: &[u8; 64]) -> bool;

    fn schnorr(&self) -> Option<&dyn SchnorrOps> {
        None
    }

    fn tweak_ops(&self) -> Option<&dyn TweakOps> {
        None
    }
}

/// Optional BIP340 Schnorr capability.
pub trait SchnorrOps {
    fn sign_schnorr(&self, hash: &[u8; 32], scalar: &[u8; 32]) -> Option<[u8; 64]>;

    fn verify_schnorr(&self, hash: &[u8; 32], x_only: &[u8; 32], signature: &[u8; 64]) -> bool;
}

/// Optional capability used by taproot-style key tweaking.
pub trait TweakOps {
    /// `n - scalar`.
    fn private_negate(&self, scalar: &[u8; 32]) -> Option<[u8; 32]>;

    fn x_only_point_add_tweak(&self, x_only: &[u8; 32], tweak: &[u8; 32]) -> Option<XOnlyTweak>;
}

const GENERATOR: [u8; 33] = [
    0x02, 0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b,
    0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17,
    0x98,
];

// x = 7 has no square root on secp256k1.
const NOT_ON_CURVE: [u8; 33] = {
    let mut point = [0u8; 33];
    point[0] = 0x02;
    point[32] = 0x07;
    point
};

const ONE: [u8; 32] = {
    let mut scalar = [0u8; 32];
    scalar[31] = 1;
    scalar
};

/// Checks the mandatory capability group against known secp256k1 values.
pub(crate) fn self_check<P: CurveProvider + ?Sized>(provider: &P) -> Result<(), Bip32Error> {
    if !provider.is_valid_point(&GENERATOR) {
        return Err(Bip32Error::InvalidProvider("generator rejected as a point"));
    }
    if provider.is_valid_point(&NOT_ON_CURVE) {
        return Err(Bip32Error::InvalidProvider("off-curve point accepted"));
    }
    if provider.is_private_key_in_range(&[0u8; 32]) {
        return Err(Bip32Error::InvalidProvider("zero scalar accepted"));
    }
    if !provider.is_private_key_in_range(&ONE) {
        return Err(Bip32Error::InvalidProvider("scalar one rejected"));
    }
    if provider.derive_public_key(&ONE) != Some(GENERATOR) {
        return Err(Bip32Error::InvalidProvider("1 * G is not the generator"));
    }
    Ok(())
}

/// [`CurveProvider`] backed by libsecp256k1, supporting every capability.
#[derive(Debug, Clone)]
pub struct Secp256k1Provider {
    secp: Secp256k1<secp256k1::All>,
}

impl Secp256k1Provider {
    pub fn new() -> Self {
        Secp256k1Provider {
            secp: Secp256k1::new(),
        }
    }
}

impl Default for Secp256k1Provider {
    fn default() -> Self {
        Self::new()
    }
}

fn message(hash: &[u8; 32]) -> Option<Message> {
    Message::from_slice(hash).ok()
}

impl CurveProvider for Secp256k1Provider {
    fn is_valid_point(&self, point: &[u8]) -> bool {
        PublicKey::from_slice(point).is_ok()
    }

    fn is_private_key_in_range(&self, scalar: &[u8; 32]) -> bool {
        SecretKey::from_slice(scalar).is_ok()
    }

    fn derive_public_key(&self, scalar: &[u8; 32]) -> Option<[u8; 33]> {
        let secret = SecretKey::from_slice(scalar).ok()?;
        Some(PublicKey::from_secret_key(&self.secp, &secret).serialize())
    }

    fn private_key_tweak_add(&self, scalar: &[u8; 32], tweak: &[u8; 32]) -> Option<[u8; 32]> {
        let secret = SecretKey::from_slice(scalar).ok()?;
        let tweak = Scalar::from_be_bytes(*tweak).ok()?;
        secret.add_tweak(&tweak).ok().map(|sk| sk.secret_bytes())
    }

    fn point_tweak_add(&self, point: &[u8; 33], tweak: &[u8; 32]) -> Option<[u8; 33]> {
        let public = PublicKey::from_slice(point).ok()?;
        let tweak = Scalar::from_be_bytes(*tweak).ok()?;
        public
            .add_exp_tweak(&self.secp, &tweak)
            .ok()
            .map(|pk| pk.serialize())
    }

    fn sign(&self, hash: &[u8; 32], scalar: &[u8; 32], low_r: bool) -> Option<[u8; 64]> {
        let msg = message(hash)?;
        let secret = SecretKey::from_slice(scalar).ok()?;
        let sig = if low_r {
            self.secp.sign_ecdsa_low_r(&msg, &secret)
        } else {
            self.secp.sign_ecdsa(&msg, &secret)
        };
        Some(sig.serialize_compact())
    }

    fn verify(&self, hash: &[u8; 32], point: &[u8; 33], signature: &[u8; 64]) -> bool {
        let (Some(msg), Ok(public), Ok(sig)) = (
            message(hash),
            PublicKey::from_slice(point),
            ecdsa::Signature::from_compact(signature),
        ) else {
            return false;
        };
        self.secp.verify_ecdsa(&msg, &sig, &public).is_ok()
    }

    fn schnorr(&self) -> Option<&dyn SchnorrOps> {
        Some(self)
    }

    fn tweak_ops(&self) -> Option<&dyn TweakOps> {
        Some(self)
    }
}

impl SchnorrOps for Secp256k1Provider {
    fn sign_schnorr(&self, hash: &[u8; 32], scalar: &[u8; 32]) -> Option<[u8; 64]> {
        let msg = message(hash)?;
        let secret = SecretKey::from_slice(scalar).ok()?;
        let keypair = KeyPair::from_secret_key(&self.secp, &secret);
        let sig = self.secp.sign_schnorr_no_aux_rand(&msg, &keypair);
        let mut out = [0u8; 64];
        out.copy_from_slice(&sig[..]);
        Some(out)
    }

    fn verify_schnorr(&self, hash: &[u8; 32], x_only: &[u8; 32], signature: &[u8; 64]) -> bool {
        let (Some(msg), Ok(public), Ok(sig)) = (
            message(hash),
            XOnlyPublicKey::from_slice(x_only),
            schnorr::Signature::from_slice(signature),
        ) else {
            return false;
        };
        self.secp.verify_schnorr(&sig, &msg, &public).is_ok()
    }
}

impl TweakOps for Secp256k1Provider {
    fn private_negate(&self, scalar: &[u8; 32]) -> Option<[u8; 32]> {
        let secret = SecretKey::from_slice(scalar).ok()?;
        Some(secret.negate().secret_bytes())
    }

    fn x_only_point_add_tweak(&self, x_only: &[u8; 32], tweak: &[u8; 32]) -> Option<XOnlyTweak> {
        let public = XOnlyPublicKey::from_slice(x_only).ok()?;
        let tweak = Scalar::from_be_bytes(*tweak).ok()?;
        let (tweaked, parity) = public.add_tweak(&self.secp, &tweak).ok()?;
        Some(XOnlyTweak {
            odd_y: parity == Parity::Odd,
            x_only: tweaked.serialize(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::BrokenPoints;
    use super::*;
    use hex_literal::hex;

    #[test]
    fn secp256k1_provider_passes_self_check() {
        assert_eq!(self_check(&Secp256k1Provider::new()), Ok(()));
    }

    #[test]
    fn provider_rejecting_generator_is_invalid() {
        assert!(matches!(
            self_check(&BrokenPoints(Secp256k1Provider::new())),
            Err(Bip32Error::InvalidProvider(_))
        ));
    }

    #[test]
    fn scalar_range_bounds() {
        let provider = Secp256k1Provider::new();
        let n = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");
        let n_minus_one = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140");
        assert!(!provider.is_private_key_in_range(&[0u8; 32]));
        assert!(!provider.is_private_key_in_range(&n));
        assert!(provider.is_private_key_in_range(&n_minus_one));
    }

    #[test]
    fn point_tweak_matches_scalar_tweak() {
        let provider = Secp256k1Provider::new();
        let scalar = [0x11u8; 32];
        let tweak = [0x22u8; 32];
        let point = provider.derive_public_key(&scalar).unwrap();
        let via_scalar = provider
            .private_key_tweak_add(&scalar, &tweak)
            .and_then(|sk| provider.derive_public_key(&sk));
        assert_eq!(provider.point_tweak_add(&point, &tweak), via_scalar);
    }

    #[test]
    fn tweak_to_zero_is_rejected() {
        let provider = Secp256k1Provider::new();
        let negated = provider.private_negate(&ONE).unwrap();
        assert_eq!(provider.private_key_tweak_add(&ONE, &negated), None);
    }

    #[test]
    fn low_r_signature_has_small_r() {
        let provider = Secp256k1Provider::new();
        for byte in 1..=16u8 {
            let sig = provider.sign(&[byte; 32], &[0x01; 32], true).unwrap();
            assert!(sig[0] < 0x80);
        }
    }
}
