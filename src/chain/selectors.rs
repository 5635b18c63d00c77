//! CCIP chain selectors and family resolution
//!
//! CCIP identifies chains by 64-bit chain selectors rather than EVM chain ids.
//! Decoders need to know which [`ChainFamily`] a selector belongs to in order to
//! render addresses, so every decoder takes a [`FamilyResolver`]. The full
//! selector registry lives outside this crate; [`KnownChains`] covers the
//! well-known networks and a `HashMap<u64, ChainFamily>` covers everything else.

use std::collections::HashMap;
use std::fmt;

use super::ChainFamily;
use crate::error::{CcipError, Result};

/// Well-known CCIP chain selectors.
///
/// # Example
///
/// ```rust
/// use ccip_rs::{ChainFamily, KnownChain};
///
/// let chain = KnownChain::from_selector(5009297550715157269).unwrap();
/// assert_eq!(chain, KnownChain::EthereumMainnet);
/// assert_eq!(chain.family(), ChainFamily::Evm);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
#[non_exhaustive]
pub enum KnownChain {
    EthereumMainnet = 5009297550715157269,
    EthereumSepolia = 16015286601757825753,
    ArbitrumOne = 4949039107694359620,
    ArbitrumSepolia = 3478487238524512106,
    Avalanche = 6433500567565415381,
    AvalancheFuji = 14767482510784806043,
    Base = 15971525489660198786,
    BaseSepolia = 10344971235874465080,
    Optimism = 3734403246176062136,
    OptimismSepolia = 5224473277236331295,
    Polygon = 4051577828743386545,
    BnbSmartChain = 11344663589394136015,
    SolanaMainnet = 124615329519749607,
    SolanaDevnet = 16423721717087811551,
    AptosMainnet = 4741433654826277614,
    AptosTestnet = 743186221051783445,
}

impl KnownChain {
    const ALL: [Self; 16] = [
        Self::EthereumMainnet,
        Self::EthereumSepolia,
        Self::ArbitrumOne,
        Self::ArbitrumSepolia,
        Self::Avalanche,
        Self::AvalancheFuji,
        Self::Base,
        Self::BaseSepolia,
        Self::Optimism,
        Self::OptimismSepolia,
        Self::Polygon,
        Self::BnbSmartChain,
        Self::SolanaMainnet,
        Self::SolanaDevnet,
        Self::AptosMainnet,
        Self::AptosTestnet,
    ];

    #[inline]
    pub const fn selector(self) -> u64 {
        self as u64
    }

    pub fn from_selector(selector: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|chain| chain.selector() == selector)
    }

    pub const fn family(self) -> ChainFamily {
        match self {
            Self::SolanaMainnet | Self::SolanaDevnet => ChainFamily::Solana,
            Self::AptosMainnet | Self::AptosTestnet => ChainFamily::Aptos,
            _ => ChainFamily::Evm,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::EthereumMainnet => "ethereum-mainnet",
            Self::EthereumSepolia => "ethereum-testnet-sepolia",
            Self::ArbitrumOne => "ethereum-mainnet-arbitrum-1",
            Self::ArbitrumSepolia => "ethereum-testnet-sepolia-arbitrum-1",
            Self::Avalanche => "avalanche-mainnet",
            Self::AvalancheFuji => "avalanche-testnet-fuji",
            Self::Base => "ethereum-mainnet-base-1",
            Self::BaseSepolia => "ethereum-testnet-sepolia-base-1",
            Self::Optimism => "ethereum-mainnet-optimism-1",
            Self::OptimismSepolia => "ethereum-testnet-sepolia-optimism-1",
            Self::Polygon => "polygon-mainnet",
            Self::BnbSmartChain => "binance_smart_chain-mainnet",
            Self::SolanaMainnet => "solana-mainnet",
            Self::SolanaDevnet => "solana-devnet",
            Self::AptosMainnet => "aptos-mainnet",
            Self::AptosTestnet => "aptos-testnet",
        }
    }
}

impl fmt::Display for KnownChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.selector())
    }
}

/// Maps a chain selector to the family of the chain it identifies.
pub trait FamilyResolver: Send + Sync {
    /// Returns the family, or `None` for selectors this resolver does not know.
    fn family_of(&self, selector: u64) -> Option<ChainFamily>;

    /// Like [`family_of`](Self::family_of) but fails with
    /// [`CcipError::UnknownChainSelector`].
    fn require_family(&self, selector: u64) -> Result<ChainFamily> {
        self.family_of(selector)
            .ok_or(CcipError::UnknownChainSelector { selector })
    }
}

/// Resolver backed by the built-in [`KnownChain`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownChains;

impl FamilyResolver for KnownChains {
    fn family_of(&self, selector: u64) -> Option<ChainFamily> {
        KnownChain::from_selector(selector).map(KnownChain::family)
    }
}

impl FamilyResolver for HashMap<u64, ChainFamily> {
    fn family_of(&self, selector: u64) -> Option<ChainFamily> {
        self.get(&selector).copied()
    }
}

impl<T: FamilyResolver + ?Sized> FamilyResolver for &T {
    fn family_of(&self, selector: u64) -> Option<ChainFamily> {
        (**self).family_of(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors_roundtrip() {
        for chain in KnownChain::ALL {
            assert_eq!(KnownChain::from_selector(chain.selector()), Some(chain));
        }
    }

    #[test]
    fn test_known_families() {
        assert_eq!(KnownChains.family_of(124615329519749607), Some(ChainFamily::Solana));
        assert_eq!(KnownChains.family_of(4741433654826277614), Some(ChainFamily::Aptos));
        assert_eq!(KnownChains.family_of(4949039107694359620), Some(ChainFamily::Evm));
        assert_eq!(KnownChains.family_of(42), None);
    }

    #[test]
    fn test_require_family_unknown() {
        let err = KnownChains.require_family(42).unwrap_err();
        assert!(matches!(
            err,
            CcipError::UnknownChainSelector { selector: 42 }
        ));
    }

    #[test]
    fn test_map_resolver() {
        let map = HashMap::from([(7u64, ChainFamily::Sui), (8u64, ChainFamily::Ton)]);
        assert_eq!(map.family_of(7), Some(ChainFamily::Sui));
        assert_eq!((&map).family_of(8), Some(ChainFamily::Ton));
        assert_eq!(map.family_of(9), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            KnownChain::AptosMainnet.to_string(),
            "aptos-mainnet (4741433654826277614)"
        );
    }
}
