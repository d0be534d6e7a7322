//! Instruction stream model handed in by the upstream scheduler.
//!
//! This module defines the input/output surface of the resolver. It includes:
//! 1. **Operands:** Decoded register references, regions, and indirect shapes.
//! 2. **Instructions:** The closed opcode union, predication, and exec size.
//! 3. **Descriptors:** The per-instruction synchronization annotation.
//! 4. **Blocks:** Basic blocks and the kernel container.

/// Basic blocks and the kernel container.
pub mod block;

/// Instruction and opcode definitions.
pub mod instruction;

/// Operand and register-reference model.
pub mod operand;

/// Synchronization descriptor types.
pub mod swsb;

pub use block::{BasicBlock, Kernel};
pub use instruction::{BranchOp, InstId, Instruction, MathFn, Op, Predicate, Sfid, SyncFn};
pub use operand::{Access, Operand, RegFile, RegRef};
pub use swsb::{SbId, SwsbInfo, Token, TokenKind};
