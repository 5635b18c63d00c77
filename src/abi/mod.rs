//! Solidity bindings for the CCIP contracts
//!
//! Events and structs are grouped by the contract generation that emits them.
//! Several generations reuse event and struct names with different layouts,
//! so each generation lives in its own module.
//!
//! - [`evm2evm`]: v1.2 / v1.5 `EVM2EVMOnRamp`, `EVM2EVMOffRamp` and `CommitStore`
//! - [`ramp`]: v1.6 `OnRamp` and `OffRamp`
//! - [`v2`]: v2.0 `OnRamp`

pub mod evm2evm;
pub mod ramp;
pub mod v2;
