//! Instruction model.
//!
//! The opcode space is a closed tagged union: the resolver only ever sees
//! already-scheduled, already-register-allocated instructions, so the shape
//! set is fixed and matched exhaustively. Only the synchronization descriptor
//! (and, for inserted standalone `sync` instructions, the whole instruction)
//! is produced by this crate; everything else arrives from upstream.

use std::fmt;

use smallvec::SmallVec;

use super::operand::Operand;
use super::swsb::SwsbInfo;

/// Dense instruction id, unique within one kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstId(pub u32);

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Extended math functions; variable latency, token-tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    /// Reciprocal.
    Inv,
    /// Base-2 logarithm.
    Log,
    /// Base-2 exponent.
    Exp,
    /// Square root.
    Sqrt,
    /// Reciprocal square root.
    Rsqrt,
    /// Power.
    Pow,
    /// Float divide.
    Fdiv,
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
}

/// Shared-function id a message is routed to. Distinct targets complete
/// independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sfid {
    /// Texture sampler.
    Sampler,
    /// Data port (memory loads/stores).
    Dataport,
    /// Unified return buffer.
    Urb,
    /// Message gateway.
    Gateway,
}

/// Standalone synchronization functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFn {
    /// Carries only its descriptor; no other effect.
    Nop,
    /// Drains every outstanding read obligation.
    AllRd,
    /// Drains every outstanding write obligation.
    AllWr,
}

/// Control-flow opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    /// Unconditional jump.
    Jmp,
    /// Structured if.
    If,
    /// Structured else.
    Else,
    /// Structured endif.
    EndIf,
    /// Loop back-edge.
    While,
    /// Subroutine call.
    Call,
    /// Subroutine return.
    Ret,
}

/// The closed opcode set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Register move.
    Mov,
    /// Integer/float add.
    Add,
    /// Multiply.
    Mul,
    /// Multiply-accumulate.
    Mad,
    /// Compare, writing a flag register.
    Cmp,
    /// Conditional select.
    Sel,
    /// Shift left.
    Shl,
    /// Arithmetic shift right.
    Asr,
    /// Extended math, routed to the shared math unit.
    Math(MathFn),
    /// Message send to a shared function.
    Send {
        /// Destination shared function.
        sfid: Sfid,
    },
    /// Standalone synchronization instruction.
    Sync(SyncFn),
    /// Control flow.
    Branch(BranchOp),
}

/// Predicate control: which flag register gates the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    /// Flag register number.
    pub flag: u8,
    /// Inverted sense.
    pub inverse: bool,
}

/// One decoded instruction plus its synchronization output slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Kernel-unique id.
    pub id: InstId,
    /// Opcode.
    pub op: Op,
    /// Predicate control, if predicated.
    pub pred: Option<Predicate>,
    /// Flag register written by a conditional modifier (e.g. `cmp`).
    pub flag_mod: Option<u8>,
    /// Execution size in channels.
    pub exec_size: u8,
    /// Destination operand.
    pub dst: Operand,
    /// Source operands.
    pub srcs: SmallVec<[Operand; 3]>,
    /// End-of-thread marker; the hardware drains the thread, so no token is
    /// allocated for an EOT send.
    pub eot: bool,
    /// Synchronization descriptor, written by the resolver.
    pub swsb: SwsbInfo,
    /// Marks an inserted standalone sync that must survive post-processing
    /// because a predicated or shape-mismatched consumer may be skipped.
    pub preserve: bool,
}

impl Instruction {
    /// Creates an instruction with empty operands and no annotations.
    pub fn new(id: InstId, op: Op, exec_size: u8) -> Self {
        Self {
            id,
            op,
            pred: None,
            flag_mod: None,
            exec_size,
            dst: Operand::Null,
            srcs: SmallVec::new(),
            eot: false,
            swsb: SwsbInfo::default(),
            preserve: false,
        }
    }

    /// Creates a standalone `sync` instruction carrying `swsb`.
    pub fn sync(id: InstId, func: SyncFn, swsb: SwsbInfo) -> Self {
        Self {
            swsb,
            ..Self::new(id, Op::Sync(func), 1)
        }
    }

    /// Returns `true` for control-flow opcodes.
    pub fn is_branch(&self) -> bool {
        matches!(self.op, Op::Branch(_))
    }

    /// Returns `true` for standalone synchronization opcodes.
    pub fn is_sync(&self) -> bool {
        matches!(self.op, Op::Sync(_))
    }

    /// Returns `true` for a send that terminates the thread.
    pub fn is_eot_send(&self) -> bool {
        self.eot && matches!(self.op, Op::Send { .. })
    }
}
