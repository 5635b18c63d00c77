//! Chain families, protocol versions, lanes and chain selectors
//!
//! These are the small value types every other module is keyed on.

mod family;
mod lane;
mod selectors;
mod version;

pub use family::{ChainFamily, InvalidChainFamily};
pub use lane::Lane;
pub use selectors::{FamilyResolver, KnownChain, KnownChains};
pub use version::{InvalidProtocolVersion, ProtocolVersion};
