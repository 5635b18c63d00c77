//! Blockchain families understood by the protocol core
//!
//! A family fixes how addresses are laid out on the wire and which hashing and
//! execution-report layouts apply when a chain is the source or destination
//! of a message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of chain families a lane can start or end on.
///
/// # Example
///
/// ```rust
/// use ccip_rs::ChainFamily;
///
/// assert_eq!(ChainFamily::Evm.address_width(), Some(20));
/// assert_eq!(ChainFamily::Ton.address_width(), None);
/// assert_eq!("aptos".parse::<ChainFamily>().unwrap(), ChainFamily::Aptos);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Account-based EVM chains (20-byte addresses)
    Evm,
    /// Move-based Aptos (32-byte addresses)
    Aptos,
    /// Solana virtual machine (32-byte base58 public keys)
    Solana,
    /// Move-based Sui (32-byte addresses)
    Sui,
    /// TON (variable width raw addresses)
    Ton,
}

impl ChainFamily {
    /// All families, in declaration order.
    pub const ALL: [Self; 5] = [Self::Evm, Self::Aptos, Self::Solana, Self::Sui, Self::Ton];

    /// Returns the family name
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Evm => "EVM",
            Self::Aptos => "Aptos",
            Self::Solana => "Solana",
            Self::Sui => "Sui",
            Self::Ton => "TON",
        }
    }

    /// Byte width of a native address, `None` when the width is not fixed.
    #[inline]
    pub const fn address_width(self) -> Option<usize> {
        match self {
            Self::Evm => Some(20),
            Self::Aptos | Self::Solana | Self::Sui => Some(32),
            Self::Ton => None,
        }
    }

    /// Move-based families encode extra args with BCS rather than ABI.
    #[inline]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Aptos | Self::Sui)
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known chain family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidChainFamily(pub String);

impl fmt::Display for InvalidChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid chain family: {}", self.0)
    }
}

impl std::error::Error for InvalidChainFamily {}

impl FromStr for ChainFamily {
    type Err = InvalidChainFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evm" => Ok(Self::Evm),
            "aptos" => Ok(Self::Aptos),
            "solana" | "svm" => Ok(Self::Solana),
            "sui" => Ok(Self::Sui),
            "ton" => Ok(Self::Ton),
            _ => Err(InvalidChainFamily(s.to_string())),
        }
    }
}
