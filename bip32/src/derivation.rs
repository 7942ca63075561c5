use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::{Bip32, Bip32Error, CurveProvider, ExtendedKey, HARDENED_OFFSET};

/// A BIP-32 derivation path (e.g., "m/44'/0'/0'/0/1").
///
/// A leading `m/` anchors the path at a master key; without it the path is
/// relative to whichever key it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    from_master: bool,
    steps: Vec<u32>,
}

impl DerivationPath {
    /// Full child indices in order, hardened bit included.
    pub fn steps(&self) -> &[u32] {
        &self.steps
    }

    pub fn is_from_master(&self) -> bool {
        self.from_master
    }

    /// Applies each step to `start` in turn.
    ///
    /// Fails with [`Bip32Error::NotMaster`] if the path starts with `m/` and
    /// `start` is not a depth-0 key.
    pub fn derive<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        start: &ExtendedKey,
    ) -> Result<ExtendedKey, Bip32Error> {
        if self.from_master && start.depth() != 0 {
            return Err(Bip32Error::NotMaster {
                depth: start.depth(),
            });
        }
        debug!(path = %self, depth = start.depth(), "deriving along path");
        let mut key = start.clone();
        for &index in &self.steps {
            key = key.derive(ctx, index)?;
        }
        Ok(key)
    }
}

fn parse_step(part: &str) -> Result<u32, Bip32Error> {
    let (digits, hardened) = match part.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (part, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Bip32Error::InvalidPath(format!(
            "malformed component {part:?}"
        )));
    }
    let index = digits
        .parse::<u32>()
        .ok()
        .filter(|&index| index < HARDENED_OFFSET)
        .ok_or_else(|| Bip32Error::InvalidPath(format!("index {digits} out of range")))?;
    Ok(if hardened {
        index | HARDENED_OFFSET
    } else {
        index
    })
}

impl FromStr for DerivationPath {
    type Err = Bip32Error;

    /// Parses `(m/)?N('?)(/N('?))*`, e.g. "m/44'/0'/0'/0/0" or "0/1".
    fn from_str(s: &str) -> Result<Self, Bip32Error> {
        let (from_master, rest) = match s.strip_prefix("m/") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if rest.is_empty() {
            return Err(Bip32Error::InvalidPath(format!(
                "{s:?} has no components"
            )));
        }
        let steps = rest
            .split('/')
            .map(parse_step)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DerivationPath { from_master, steps })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from_master {
            write!(f, "m/")?;
        }
        for (i, &index) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            if index >= HARDENED_OFFSET {
                write!(f, "{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "{index}")?;
            }
        }
        Ok(())
    }
}

impl ExtendedKey {
    /// Parses `path` and derives along it starting from this key.
    pub fn derive_path<P: CurveProvider>(
        &self,
        ctx: &Bip32<P>,
        path: &str,
    ) -> Result<ExtendedKey, Bip32Error> {
        path.parse::<DerivationPath>()?.derive(ctx, self)
    }
}
