//! Hashing, HMAC and Base58Check helpers shared by the HD key crates.

pub mod base58;
pub mod hash;
pub mod hmac;

pub use base58::Base58Error;
