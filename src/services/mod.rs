//! Services module
//!
//! The backup codec/merge engine and the privacy gate sit above the
//! repository and never touch the store directly.

pub mod backup;
pub mod privacy;

pub use privacy::PrivacyGate;
