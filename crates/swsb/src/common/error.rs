//! Fatal diagnostics for the dependency resolver.
//!
//! Every variant here is an internal invariant violation: the input stream or
//! the resolver's own bookkeeping is inconsistent, and emitting annotations
//! anyway could silently under-synchronize. Callers must abort compilation.
//! Encodability conflicts are not errors; they are repaired in place by
//! splitting the descriptor across a standalone `sync` instruction.

use thiserror::Error;

use crate::ir::{InstId, SbId};

/// A fatal inconsistency detected while resolving dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    /// An out-of-order producer was found in a bucket carrying a scoreboard
    /// id the pool no longer maps to a live owner.
    #[error("instruction {inst}: scoreboard token {sbid} has no live producer mapping")]
    UnmappedToken {
        /// Instruction whose hazard search hit the stale token.
        inst: InstId,
        /// The unmapped scoreboard id.
        sbid: SbId,
    },

    /// An out-of-order producer was found in a bucket without ever having
    /// been assigned a scoreboard id.
    #[error("instruction {inst}: out-of-order producer {producer} carries no scoreboard token")]
    MissingToken {
        /// Instruction whose hazard search found the producer.
        inst: InstId,
        /// The tokenless producer.
        producer: InstId,
    },

    /// A bucket still referenced a dependency set whose footprint was already
    /// cleared. Cleared sets must be unreachable from every bucket.
    #[error("instruction {inst}: bucket {bucket} holds a cleared dependency set")]
    StaleBucketEntry {
        /// Instruction whose hazard search found the stale entry.
        inst: InstId,
        /// Bucket index holding the dangling reference.
        bucket: usize,
    },

    /// An in-order wait distance computed to zero, meaning a producer and a
    /// consumer share an issue slot. The upstream scheduler broke program
    /// order.
    #[error("instruction {inst}: in-order wait distance is zero")]
    ZeroDistance {
        /// The consumer instruction.
        inst: InstId,
    },

    /// The scoreboard pool reported no free id and no evictable owner. The
    /// pool was constructed empty.
    #[error("instruction {inst}: scoreboard pool has no id to allocate or evict")]
    PoolExhausted {
        /// Instruction requesting an id.
        inst: InstId,
    },
}
