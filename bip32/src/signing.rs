use tracing::trace;

use crate::{Bip32, Bip32Error, CurveProvider, ExtendedKey};

impl ExtendedKey {
    /// Compact (r || s) ECDSA signature over a 32-byte message hash.
    ///
    /// With `low_r` the nonce is ground until `r` fits in 32 bytes of DER,
    /// saving a byte on the wire.
    pub fn sign<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        hash: &[u8; 32],
        low_r: bool,
    ) -> Result<[u8; 64], Bip32Error> {
        let private_key = self.private_key().ok_or(Bip32Error::MissingPrivateKey)?;
        trace!(low_r, depth = self.depth(), "ecdsa sign");
        ctx.provider()
            .sign(hash, private_key, low_r)
            .ok_or(Bip32Error::InvalidPrivateKey)
    }

    pub fn verify<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        hash: &[u8; 32],
        signature: &[u8; 64],
    ) -> bool {
        ctx.provider().verify(hash, self.public_key(), signature)
    }

    /// BIP340 Schnorr signature. Fails with [`Bip32Error::Unsupported`] when the
    /// provider has no Schnorr support.
    pub fn sign_schnorr<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        hash: &[u8; 32],
    ) -> Result<[u8; 64], Bip32Error> {
        let private_key = self.private_key().ok_or(Bip32Error::MissingPrivateKey)?;
        let schnorr = ctx
            .provider()
            .schnorr()
            .ok_or(Bip32Error::Unsupported("sign_schnorr"))?;
        trace!(depth = self.depth(), "schnorr sign");
        schnorr
            .sign_schnorr(hash, private_key)
            .ok_or(Bip32Error::InvalidPrivateKey)
    }

    /// Verifies against the x-only form of this key's public key.
    pub fn verify_schnorr<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        hash: &[u8; 32],
        signature: &[u8; 64],
    ) -> Result<bool, Bip32Error> {
        let schnorr = ctx
            .provider()
            .schnorr()
            .ok_or(Bip32Error::Unsupported("verify_schnorr"))?;
        let mut x_only = [0u8; 32];
        x_only.copy_from_slice(&self.public_key()[1..]);
        Ok(schnorr.verify_schnorr(hash, &x_only, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::Restricted;
    use crate::{Network, Secp256k1Provider};
    use hex_literal::hex;

    const SEED: [u8; 32] = [1u8; 32];
    const HASH: [u8; 32] = [2u8; 32];
    const TWEAK: [u8; 32] = [3u8; 32];

    fn ctx() -> Bip32<Secp256k1Provider> {
        Bip32::secp256k1().unwrap()
    }

    #[test]
    fn ecdsa_signatures_are_deterministic() {
        let ctx = ctx();
        let node = ExtendedKey::from_seed(&ctx, &SEED).unwrap();
        assert_eq!(
            node.public_key(),
            &hex!("039822622cf330b98e52e7357135bc93e1e5606a57a9819408734598fe5677b134")
        );

        let signature = node.sign(&ctx, &HASH, false).unwrap();
        assert_eq!(
            signature,
            hex!("9636ee2fac31b795a308856b821ebe297dda7b28220fb46ea1fbbd7285977cc04c82b734956246a0f15a9698f03f546d8d96fe006c8e7bd2256ca7c8229e6f5c")
        );
        assert!(node.verify(&ctx, &HASH, &signature));

        let low_r = node.sign(&ctx, &HASH, true).unwrap();
        assert_eq!(
            low_r,
            hex!("0587a40b391b76596c257bf59565b24eaff2cc42b45caa2640902e73fb97a6e702c3402ab89348a7dae1bf171c3e172fa60353d7b01621a94cb7caca59b995db")
        );
        assert!(low_r[0] < 0x80);
        assert!(node.verify(&ctx, &HASH, &low_r));
        assert!(!node.verify(&ctx, &[0u8; 32], &low_r));
    }

    #[test]
    fn tweaked_key_signs_and_watch_only_verifies() {
        let ctx = ctx();
        let node = ExtendedKey::from_seed(&ctx, &SEED).unwrap();
        let tweaked = node.tweak(&ctx, &TWEAK).unwrap();
        let expected = hex!("5a38c6652feb5166c9c91cfa5fa4a4c7cec27445d4619499df8afdd05ebc823246d644b0c7d3b960625393df537f900528ec4b14e6ddab8fd0c7e87c98cfe9d0");
        assert_eq!(tweaked.sign(&ctx, &HASH, false).unwrap(), expected);
        assert_eq!(tweaked.sign(&ctx, &HASH, true).unwrap(), expected);

        let watch_only = node.neutered().tweak(&ctx, &TWEAK).unwrap();
        assert!(watch_only.verify(&ctx, &HASH, &expected));
        assert_eq!(
            watch_only.sign(&ctx, &HASH, false).unwrap_err(),
            Bip32Error::MissingPrivateKey
        );
    }

    #[test]
    fn public_only_key_verifies_but_cannot_sign() {
        let ctx = ctx();
        let node = ExtendedKey::from_seed(&ctx, &SEED).unwrap();
        let signature = node.sign(&ctx, &HASH, false).unwrap();
        let watch_only =
            ExtendedKey::from_public_key(&ctx, node.public_key(), *node.chain_code()).unwrap();
        assert!(watch_only.verify(&ctx, &HASH, &signature));
        assert_eq!(
            watch_only.sign(&ctx, &HASH, true).unwrap_err(),
            Bip32Error::MissingPrivateKey
        );
        assert_eq!(
            watch_only.sign_schnorr(&ctx, &HASH).unwrap_err(),
            Bip32Error::MissingPrivateKey
        );
    }

    #[test]
    fn schnorr_known_signatures_verify() {
        let ctx = ctx();
        let node = ExtendedKey::from_seed(&ctx, &SEED).unwrap();
        let untweaked = hex!("2fae8b517cb0e7302ca48a4109d1819e3d75af96bd58d297023e3058c4e98ff812fe6ae32a2b2bc4abab10f88f7fe56efbafc8a4e4fa437af78926f528b0585e");
        assert!(node.verify_schnorr(&ctx, &HASH, &untweaked).unwrap());
        assert!(node.neutered().verify_schnorr(&ctx, &HASH, &untweaked).unwrap());

        let tweaked = node.tweak(&ctx, &TWEAK).unwrap();
        let signature = hex!("20506478d341d0ab1afd32671eb1550b1c5329ad5179a19712212b857f06b3210d949964cd513ff25719e2e9b0087d5a9745afd5d38641ce0dfa86f67c86de63");
        assert!(tweaked.verify_schnorr(&ctx, &HASH, &signature).unwrap());
        assert!(!node.verify_schnorr(&ctx, &HASH, &signature).unwrap());
    }

    /// Nonces come from the key and message only (zero auxiliary randomness).
    #[test]
    fn schnorr_signatures_are_deterministic() {
        let ctx = ctx();
        let node = ExtendedKey::from_seed(&ctx, &SEED).unwrap();
        let signature = node.sign_schnorr(&ctx, &HASH).unwrap();
        assert_eq!(
            signature,
            hex!("17179c75363d03a9948b2738bbbf91c1eaf257bb6ef72c440419dee16e2777b74bb4fe5387579cb868fa1ace009b1f3db3f0ba7449aa3bd7a64d2868a2f603f1")
        );
        assert_eq!(node.sign_schnorr(&ctx, &HASH).unwrap(), signature);
        assert!(node.verify_schnorr(&ctx, &HASH, &signature).unwrap());
    }

    #[test]
    fn schnorr_sign_then_verify() {
        let ctx = ctx();
        let node = ExtendedKey::from_seed(&ctx, &SEED)
            .unwrap()
            .derive_path(&ctx, "m/86'/0'/0'/0/0")
            .unwrap();
        let signature = node.sign_schnorr(&ctx, &HASH).unwrap();
        assert!(node.verify_schnorr(&ctx, &HASH, &signature).unwrap());
        assert!(!node.verify_schnorr(&ctx, &[0u8; 32], &signature).unwrap());

        let tweaked = node.tweak(&ctx, &TWEAK).unwrap();
        let signature = tweaked.sign_schnorr(&ctx, &HASH).unwrap();
        assert!(tweaked.verify_schnorr(&ctx, &HASH, &signature).unwrap());
        assert!(node
            .neutered()
            .tweak(&ctx, &TWEAK)
            .unwrap()
            .verify_schnorr(&ctx, &HASH, &signature)
            .unwrap());
    }

    #[test]
    fn schnorr_requires_provider_support() {
        let ctx = Bip32::new(Restricted::without_schnorr()).unwrap();
        let node = ExtendedKey::from_seed(&ctx, &SEED).unwrap();
        assert_eq!(
            node.sign_schnorr(&ctx, &HASH).unwrap_err(),
            Bip32Error::Unsupported("sign_schnorr")
        );
        assert_eq!(
            node.verify_schnorr(&ctx, &HASH, &[0u8; 64]).unwrap_err(),
            Bip32Error::Unsupported("verify_schnorr")
        );
        assert_eq!(
            Bip32Error::Unsupported("sign_schnorr").to_string(),
            "sign_schnorr not supported by curve provider"
        );

        // ECDSA stays available.
        let signature = node.sign(&ctx, &HASH, false).unwrap();
        assert!(node.verify(&ctx, &HASH, &signature));
        assert_eq!(node.network(), &Network::BITCOIN);
    }
}
