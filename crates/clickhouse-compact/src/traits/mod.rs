//! Trait definitions.
//!
//! - [`sealed`] - Sealed [`FromValue`] trait for typed extraction

pub mod sealed;

pub use sealed::FromValue;
