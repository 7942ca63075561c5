//! BIP32 hierarchical deterministic keys over a pluggable curve provider.
//!
//! ```
//! use bip32::{Bip32, ExtendedKey};
//!
//! let ctx = Bip32::secp256k1().unwrap();
//! let seed = [0x42u8; 32];
//! let account = ExtendedKey::from_seed(&ctx, &seed)
//!     .unwrap()
//!     .derive_path(&ctx, "m/44'/0'/0'")
//!     .unwrap();
//! assert!(account.neutered().to_base58().starts_with("xpub"));
//! ```

pub mod codec;
pub mod context;
pub mod derivation;
pub mod error;
pub mod extended_key;
pub mod network;
pub mod provider;
pub mod signing;

pub use codec::{EXTENDED_KEY_LEN, decode_wif, encode_wif};
pub use context::Bip32;
pub use derivation::DerivationPath;
pub use error::Bip32Error;
pub use extended_key::{ExtendedKey, HARDENED_OFFSET, MAX_SEED_LEN, MIN_SEED_LEN};
pub use network::{Bip32Versions, Network};
pub use provider::{CurveProvider, SchnorrOps, Secp256k1Provider, TweakOps, XOnlyTweak};
