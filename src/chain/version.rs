//! CCIP protocol generations
//!
//! The on-ramp and off-ramp contracts have gone through several wire-incompatible
//! generations. The total order of [`ProtocolVersion`] is meaningful: decode and
//! hashing paths are selected with comparisons such as `version >= V1_6`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protocol generation of a lane's on-ramp.
///
/// # Example
///
/// ```rust
/// use ccip_rs::ProtocolVersion;
///
/// assert!(ProtocolVersion::V1_6 > ProtocolVersion::V1_5);
/// assert_eq!("1.5.0".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::V1_5);
/// assert_eq!(ProtocolVersion::V2_0.to_string(), "2.0.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "1.2.0")]
    V1_2,
    #[serde(rename = "1.5.0")]
    V1_5,
    #[serde(rename = "1.6.0")]
    V1_6,
    #[serde(rename = "2.0.0")]
    V2_0,
}

impl ProtocolVersion {
    /// Semver string as reported by the contracts' `typeAndVersion`
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_2 => "1.2.0",
            Self::V1_5 => "1.5.0",
            Self::V1_6 => "1.6.0",
            Self::V2_0 => "2.0.0",
        }
    }

    /// Versions before 1.6 only support EVM-to-EVM lanes.
    #[inline]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::V1_2 | Self::V1_5)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a version string matches no supported generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProtocolVersion(pub String);

impl fmt::Display for InvalidProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported CCIP version: {}", self.0)
    }
}

impl std::error::Error for InvalidProtocolVersion {}

impl FromStr for ProtocolVersion {
    type Err = InvalidProtocolVersion;

    /// Accepts `"1.5"`, `"1.5.0"` and `typeAndVersion` strings like `"EVM2EVMOnRamp 1.5.0"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.rsplit(' ').next().unwrap_or(s);
        let mut parts = version.split('.');
        let major = parts.next();
        let minor = parts.next();
        match (major, minor) {
            (Some("1"), Some("2")) => Ok(Self::V1_2),
            (Some("1"), Some("5")) => Ok(Self::V1_5),
            (Some("1"), Some("6")) => Ok(Self::V1_6),
            (Some("2"), Some("0")) => Ok(Self::V2_0),
            _ => Err(InvalidProtocolVersion(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_total_order() {
        assert!(ProtocolVersion::V1_2 < ProtocolVersion::V1_5);
        assert!(ProtocolVersion::V1_5 < ProtocolVersion::V1_6);
        assert!(ProtocolVersion::V1_6 < ProtocolVersion::V2_0);
    }

    #[rstest]
    #[case("1.2.0", ProtocolVersion::V1_2)]
    #[case("1.5", ProtocolVersion::V1_5)]
    #[case("EVM2EVMOnRamp 1.5.0", ProtocolVersion::V1_5)]
    #[case("OnRamp 1.6.0-dev", ProtocolVersion::V1_6)]
    #[case("2.0.0", ProtocolVersion::V2_0)]
    fn test_parse(#[case] input: &str, #[case] expected: ProtocolVersion) {
        assert_eq!(input.parse::<ProtocolVersion>().unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("1.0.0".parse::<ProtocolVersion>().is_err());
        assert!("banana".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn test_legacy() {
        assert!(ProtocolVersion::V1_2.is_legacy());
        assert!(ProtocolVersion::V1_5.is_legacy());
        assert!(!ProtocolVersion::V1_6.is_legacy());
        assert!(!ProtocolVersion::V2_0.is_legacy());
    }
}
