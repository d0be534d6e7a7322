//! Dependency sets and their register footprints.
//!
//! A dependency set is the register-bit footprint of one instruction's
//! accesses in one direction (read or write). Sets live in an arena and are
//! addressed by dense ids; companion links, bucket membership, and token
//! assignment are plain index fields, so "is this set still live" is a
//! tombstone check on its bit membership rather than a dangling pointer.
//!
//! Footprint construction covers explicit operand ranges scaled by execution
//! size and access pattern, the implicit architectural registers an opcode is
//! known to touch, and a conservative fallback: indirect addressing and
//! unknown-valued special registers produce an always-interfere footprint
//! that conflicts with everything overlapping it. Unrecognized register
//! references take the same conservative path rather than erroring.

use smallvec::SmallVec;

use super::pipes::DepClass;
use crate::common::bits::BitSet;
use crate::common::regs::{bucket_base, FLAG_BYTES, REG_BYTES, TOTAL_BITS, TOTAL_BUCKETS};
use crate::ir::{InstId, Instruction, Op, Operand, RegRef, SbId};

/// Dense handle of a dependency set in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepSetId(pub u32);

/// Direction of the access a set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Source-operand footprint.
    Read,
    /// Destination footprint.
    Write,
}

/// One direction of one instruction's register accesses.
#[derive(Debug, Clone)]
pub struct DepSet {
    /// Owning instruction.
    pub inst: InstId,
    /// Access direction.
    pub kind: AccessKind,
    /// Conservative unknown-access marker; conflicts with anything it
    /// overlaps and is never optimized into a selective dependency.
    pub always_interfere: bool,
    /// Dependency class of the owning instruction.
    pub class: DepClass,
    /// Global instruction counter at production.
    pub global_seq: u64,
    /// In-order pipe-local counter at production.
    pub inorder_seq: u64,
    /// Scoreboard id, once the owning out-of-order instruction has one.
    pub sbid: Option<SbId>,
    /// The same instruction's opposite-direction set.
    pub companion: Option<DepSetId>,
    /// Whether the owning instruction is predicated.
    pub predicated: bool,
    /// Owning instruction's execution size.
    pub exec_size: u8,
    /// Byte-granular footprint over all buckets.
    pub bits: BitSet,
    /// Buckets this set currently belongs to.
    pub buckets: SmallVec<[u16; 8]>,
}

impl DepSet {
    /// A set is live while any footprint bit remains.
    pub fn is_live(&self) -> bool {
        !self.bits.is_empty()
    }
}

/// Arena of dependency sets for one kernel.
#[derive(Debug, Default)]
pub struct DepSetArena {
    sets: Vec<DepSet>,
}

impl DepSetArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sets ever allocated.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no set was ever allocated.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Shared access to a set.
    pub fn get(&self, id: DepSetId) -> &DepSet {
        &self.sets[id.0 as usize]
    }

    /// Mutable access to a set.
    pub fn get_mut(&mut self, id: DepSetId) -> &mut DepSet {
        &mut self.sets[id.0 as usize]
    }

    /// Allocates a set and returns its handle.
    pub fn alloc(&mut self, set: DepSet) -> DepSetId {
        let id = DepSetId(self.sets.len() as u32);
        self.sets.push(set);
        id
    }

    /// Builds the read and write sets for `inst` and cross-links them as
    /// companions.
    pub fn build_for_instruction(
        &mut self,
        inst: &Instruction,
        class: DepClass,
        global_seq: u64,
        inorder_seq: u64,
    ) -> (DepSetId, DepSetId) {
        let mut read = FootprintBuilder::new();
        let mut write = FootprintBuilder::new();

        for src in &inst.srcs {
            read.operand(src, inst.exec_size);
        }
        write.operand(&inst.dst, inst.exec_size);
        // An indirect destination still reads the address register.
        if let Operand::Indirect { addr_subreg } = inst.dst {
            read.reg_bytes(RegRef::addr(addr_subreg), 2);
        }

        // Implicit architectural accesses.
        if let Some(pred) = inst.pred {
            read.reg_bytes(RegRef::flag(pred.flag), FLAG_BYTES);
        }
        if let Some(flag) = inst.flag_mod {
            write.reg_bytes(RegRef::flag(flag), FLAG_BYTES);
        }
        if matches!(inst.op, Op::Mad) {
            // Wide multiply-accumulate stages partial products through the
            // accumulator.
            read.reg_bytes(RegRef::acc(0), REG_BYTES);
            write.reg_bytes(RegRef::acc(0), REG_BYTES);
        }

        let rd = self.alloc(read.finish(inst, AccessKind::Read, class, global_seq, inorder_seq));
        let wr = self.alloc(write.finish(inst, AccessKind::Write, class, global_seq, inorder_seq));
        self.get_mut(rd).companion = Some(wr);
        self.get_mut(wr).companion = Some(rd);
        (rd, wr)
    }

    /// Builds a standalone one-shot write set covering the full destination
    /// footprint of `inst`, ignoring execution mask. Used for the math
    /// erratum shadow; the caller injects it into the buckets for one hazard
    /// search and discards it afterwards.
    pub fn build_full_dst_shadow(
        &mut self,
        inst: &Instruction,
        class: DepClass,
        sbid: Option<SbId>,
        global_seq: u64,
        inorder_seq: u64,
    ) -> DepSetId {
        let mut write = FootprintBuilder::new();
        if let Operand::Reg { reg, access } = inst.dst {
            // Full registers, not just the enabled channels.
            let end = usize::from(reg.subreg) + Operand::span_bytes(access, inst.exec_size);
            let regs = end.div_ceil(REG_BYTES).max(1);
            write.reg_bytes(
                RegRef {
                    subreg: 0,
                    ..reg
                },
                regs * REG_BYTES,
            );
        } else {
            write.operand(&inst.dst, inst.exec_size);
        }
        let mut set = write.finish(inst, AccessKind::Write, class, global_seq, inorder_seq);
        set.sbid = sbid;
        self.alloc(set)
    }
}

/// Accumulates one direction's footprint for one instruction.
struct FootprintBuilder {
    bits: BitSet,
    always_interfere: bool,
}

impl FootprintBuilder {
    fn new() -> Self {
        Self {
            bits: BitSet::new(TOTAL_BITS),
            always_interfere: false,
        }
    }

    /// Adds one operand's footprint.
    fn operand(&mut self, op: &Operand, exec_size: u8) {
        match *op {
            Operand::Null | Operand::Imm => {}
            Operand::Reg { reg, access } => {
                let span = Operand::span_bytes(access, exec_size);
                self.reg_bytes(reg, span);
            }
            Operand::Indirect { addr_subreg } => {
                // The pointer register is a known read; the pointed-to range
                // is not.
                self.reg_bytes(RegRef::addr(addr_subreg), 2);
                self.mark_always_interfere();
            }
            Operand::Special => self.mark_always_interfere(),
        }
    }

    /// Adds `len` bytes starting at a register reference. Untrackable
    /// references degrade to the conservative path.
    fn reg_bytes(&mut self, reg: RegRef, len: usize) {
        match reg.start_bit() {
            Some(start) => self.bits.set_range(start, len),
            None => self.mark_always_interfere(),
        }
    }

    /// Switches this footprint to conflict with everything, including the
    /// reserved sentinel bucket.
    fn mark_always_interfere(&mut self) {
        self.always_interfere = true;
        self.bits.set_all();
    }

    fn finish(
        self,
        inst: &Instruction,
        kind: AccessKind,
        class: DepClass,
        global_seq: u64,
        inorder_seq: u64,
    ) -> DepSet {
        let mut buckets = SmallVec::new();
        for bucket in 0..TOTAL_BUCKETS {
            if self.bits.any_in_range(bucket_base(bucket), REG_BYTES) {
                buckets.push(bucket as u16);
            }
        }
        DepSet {
            inst: inst.id,
            kind,
            always_interfere: self.always_interfere,
            class,
            global_seq,
            inorder_seq,
            sbid: None,
            companion: None,
            predicated: inst.pred.is_some(),
            exec_size: inst.exec_size,
            bits: self.bits,
            buckets,
        }
    }
}
