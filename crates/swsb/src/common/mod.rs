//! Common utilities and types shared across the resolver.
//!
//! This module provides the fundamental building blocks used by the
//! instruction model and the analysis pass. It includes:
//! 1. **Bit Sets:** Fixed-capacity register footprints.
//! 2. **Geometry:** Register-file layout and dependency-bucket mapping.
//! 3. **Error Handling:** Fatal diagnostic types for invariant violations.

/// Fixed-capacity bit set for register footprints.
pub mod bits;

/// Register-file geometry and bucket mapping constants.
pub mod regs;

/// Fatal diagnostic types.
pub mod error;

pub use bits::BitSet;
pub use error::PassError;
