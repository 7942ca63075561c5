use serde::{Deserialize, Serialize};

/// BIP32 version words placed at the start of a serialized extended key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip32Versions {
    pub public: u32,
    pub private: u32,
}

/// Version bytes of a chain: the WIF prefix and the extended key version words.
///
/// Alternative chains are described by value and can be loaded from configuration:
///
/// ```
/// use bip32::Network;
///
/// let litecoin: Network = serde_json::from_str(
///     r#"{ "wif": 176, "bip32": { "public": 27108450, "private": 27106558 } }"#,
/// )
/// .unwrap();
/// assert_eq!(litecoin.bip32.private, 0x019d_9cfe);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    pub wif: u8,
    pub bip32: Bip32Versions,
}

impl Network {
    /// Bitcoin mainnet (`xprv` / `xpub`).
    pub const BITCOIN: Network = Network {
        wif: 0x80,
        bip32: Bip32Versions {
            public: 0x0488_b21e,
            private: 0x0488_ade4,
        },
    };

    /// Bitcoin testnet (`tprv` / `tpub`).
    pub const TESTNET: Network = Network {
        wif: 0xef,
        bip32: Bip32Versions {
            public: 0x0435_87cf,
            private: 0x0435_8394,
        },
    };

    /// Version word for a key with (`true`) or without private material.
    pub fn version(&self, private: bool) -> u32 {
        if private {
            self.bip32.private
        } else {
            self.bip32.public
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::BITCOIN
    }
}
