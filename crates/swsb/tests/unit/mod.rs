//! # Resolution Pass Tests
//!
//! End-to-end tests driving whole blocks through resolution. Each module
//! covers one slice of the behavior:
//! - In-order distance synchronization and its forwarding exemptions.
//! - Scoreboard token lifecycle for out-of-order producers.
//! - The conservative unknown-access path.
//! - Block-boundary and branch flushing.
//! - The math-erratum shadow dependency.
//! - Randomized structural properties.

/// In-order pipe hazards resolved by wait distance.
pub mod in_order;


/// Indirect and untrackable register accesses.
pub mod unknown_access;

/// Draining at branches, block exits, and end-of-thread.
pub mod flush;


/// Randomized invariants over generated instruction streams.
pub mod properties;
