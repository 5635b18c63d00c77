//! Production implementations of [`LogSource`](crate::LogSource).
//!
//! Applications wrap their RPC clients here; test code uses
//! [`FakeLogSource`](crate::testing::FakeLogSource) instead.

mod alloy;

pub use self::alloy::AlloyLogSource;
