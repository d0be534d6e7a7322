//! Execution-pipe classification.
//!
//! Fixed, opcode-driven mapping from instruction to dependency class. The
//! classification is immutable input to the rest of the pass: in-order
//! instructions synchronize by wait distance, out-of-order instructions by
//! scoreboard token, and standalone sync instructions are untracked.

use crate::ir::{Op, Sfid};

/// Sub-class of an out-of-order instruction. Distinct sub-classes complete
/// independently, so write-write and write-read pairs across them need
/// explicit synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OooClass {
    /// Message send, sub-classed by shared-function target.
    Send(Sfid),
    /// Extended math unit.
    Math,
}

/// Dependency class of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepClass {
    /// Fixed-latency instruction retiring in issue order on `pipe`.
    InOrder {
        /// In-order pipe identity.
        pipe: u8,
    },
    /// Variable-latency instruction tracked by scoreboard token.
    OutOfOrder(OooClass),
    /// Synchronization-only instruction; not tracked.
    Other,
}

impl DepClass {
    /// Returns `true` for token-tracked instructions.
    pub fn is_out_of_order(&self) -> bool {
        matches!(self, Self::OutOfOrder(_))
    }

    /// Returns `true` for distance-tracked instructions.
    pub fn is_in_order(&self) -> bool {
        matches!(self, Self::InOrder { .. })
    }
}

/// Classifies an opcode. Total over the closed opcode set.
///
/// Branches classify in-order: they read flag state through the same pipe and
/// the analyzer flushes outstanding hazards before them anyway.
pub fn classify(op: &Op) -> DepClass {
    match op {
        Op::Mov | Op::Add | Op::Mul | Op::Mad | Op::Cmp | Op::Sel | Op::Shl | Op::Asr => {
            DepClass::InOrder { pipe: 0 }
        }
        Op::Branch(_) => DepClass::InOrder { pipe: 0 },
        Op::Math(_) => DepClass::OutOfOrder(OooClass::Math),
        Op::Send { sfid } => DepClass::OutOfOrder(OooClass::Send(*sfid)),
        Op::Sync(_) => DepClass::Other,
    }
}
