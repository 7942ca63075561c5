use tracing::debug;

use crate::provider::{self, CurveProvider, Secp256k1Provider};
use crate::{Bip32Error, Network};

/// A validated curve provider together with the default network for new keys.
///
/// Every operation that needs curve arithmetic borrows a `Bip32` context,
/// the same way `secp256k1` operations borrow a `Secp256k1` context.
#[derive(Debug, Clone)]
pub struct Bip32<P> {
    provider: P,
    network: Network,
}

impl<P: CurveProvider> Bip32<P> {
    /// Validates the provider's mandatory capabilities and defaults to Bitcoin mainnet.
    pub fn new(provider: P) -> Result<Self, Bip32Error> {
        provider::self_check(&provider)?;
        debug!(
            schnorr = provider.schnorr().is_some(),
            tweak = provider.tweak_ops().is_some(),
            "curve provider validated"
        );
        Ok(Bip32 {
            provider,
            network: Network::default(),
        })
    }

    /// Uses `network` for keys created from seeds, raw keys and Base58 strings.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(provider: P, network: Network) -> Self {
        Bip32 { provider, network }
    }
}

impl Bip32<Secp256k1Provider> {
    /// Context backed by libsecp256k1.
    pub fn secp256k1() -> Result<Self, Bip32Error> {
        Self::new(Secp256k1Provider::new())
    }
}
