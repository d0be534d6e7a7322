//! Software-scoreboard dependency resolver.
//!
//! This crate annotates already-scheduled GPU instruction streams with the
//! synchronization each instruction must encode. It implements the following:
//! 1. **IR:** Instructions, operands, basic blocks, and the synchronization
//!    descriptor (in-order wait distance, scoreboard token).
//! 2. **Analysis:** Hazard reconstruction over register footprints, token
//!    pool management, the in-order latency window, and standalone `sync`
//!    insertion, followed by redundant-sync elimination.
//! 3. **Configuration:** Platform parameters (token count, maximum encodable
//!    distance, latency window, combined-encoding capability).

/// Common utilities (bit sets, register map constants, errors).
pub mod common;
/// Platform configuration (defaults, hierarchical config structures).
pub mod config;
/// Dependency-resolution passes and their supporting state.
pub mod analysis;
/// Instruction representation consumed and annotated by the resolver.
pub mod ir;

/// Fatal bookkeeping error; any occurrence invalidates the annotated kernel.
pub use crate::common::error::PassError;
/// Platform description; use `Platform::default()` or deserialize from JSON.
pub use crate::config::Platform;
/// Kernel container; annotate with [`resolve`].
pub use crate::ir::Kernel;

pub use crate::analysis::resolve;
