//! The per-block, per-instruction dependency resolution loop.
//!
//! Processes every basic block in program order, never reordering anything.
//! For each instruction it reconstructs the data hazards against the live
//! dependency sets, writes the minimal synchronization onto the instruction's
//! descriptor, inserts standalone `sync` instructions where one descriptor
//! cannot carry everything, and tracks its own footprints for downstream
//! consumers. Hazards that survive to a block boundary are flushed
//! unconditionally, so all tracking state is block-scoped.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::buckets::BucketTable;
use super::depset::{AccessKind, DepSetArena, DepSetId};
use super::distance::DistanceTracker;
use super::pipes::{classify, DepClass};
use super::sbid::SbidPool;
use crate::common::error::PassError;
use crate::common::regs::{SPECIAL_RANGE_END, SPECIAL_RANGE_START};
use crate::config::Platform;
use crate::ir::{
    BasicBlock, InstId, Instruction, Op, Predicate, SbId, SwsbInfo, SyncFn, Token, TokenKind,
};

/// Hazard kinds between a current access and a prior one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hazard {
    /// Current read over a prior write.
    Raw,
    /// Current write over a prior write.
    Waw,
    /// Current write over a prior read.
    War,
}

/// One token obligation collected during the hazard search.
#[derive(Debug, Clone, Copy)]
struct TokenNeed {
    id: SbId,
    kind: TokenKind,
    /// A predicated or shape-mismatched consumer resolves this dependency;
    /// the wait must survive post-processing on a standalone sync.
    preserve: bool,
}

/// Snapshot of the previous instruction when it was a math op, kept for the
/// erratum workaround: a math op followed by a differently-predicated
/// instruction needs a conservative dependency over the math op's whole
/// destination.
struct PrevMath {
    inst: Instruction,
    pred: Option<Predicate>,
    sbid: Option<SbId>,
}

/// The orchestrating state of one resolution run.
pub struct DependencyAnalyzer<'a> {
    platform: &'a Platform,
    arena: DepSetArena,
    buckets: BucketTable,
    window: DistanceTracker,
    pool: SbidPool,
    /// Global instruction counter.
    global_seq: u64,
    /// In-order pipe-local counter.
    inorder_seq: u64,
    /// Next id for inserted standalone syncs.
    next_id: u32,
}

impl<'a> DependencyAnalyzer<'a> {
    /// Creates an analyzer; `next_id` must be above every existing
    /// instruction id in the kernel.
    pub fn new(platform: &'a Platform, next_id: u32) -> Self {
        Self {
            platform,
            arena: DepSetArena::new(),
            buckets: BucketTable::new(),
            window: DistanceTracker::new(platform.pipes.latency_window),
            pool: SbidPool::new(platform.tokens.count),
            global_seq: 0,
            inorder_seq: 0,
            next_id,
        }
    }

    /// Resolves one basic block in place.
    ///
    /// # Errors
    ///
    /// Fatal bookkeeping inconsistencies; see [`PassError`].
    pub fn process_block(&mut self, block: &mut BasicBlock) -> Result<(), PassError> {
        self.hard_reset();
        let instrs = std::mem::take(&mut block.instrs);
        let mut out = Vec::with_capacity(instrs.len() + 4);
        let mut prev_math: Option<PrevMath> = None;

        for mut inst in instrs {
            let class = classify(&inst.op);

            if inst.is_branch() {
                // Outstanding hazards may be consumed on either side of the
                // edge; drain them before control leaves. The drained state
                // leaves nothing for the branch itself to wait on, so it is
                // not tracked.
                self.flush_into(&mut out);
                prev_math = None;
                out.push(inst);
                continue;
            }
            if matches!(class, DepClass::Other) {
                // Pre-existing standalone syncs pass through untouched.
                out.push(inst);
                continue;
            }

            // Math erratum: a differently-predicated successor needs a
            // conservative one-shot dependency on the math op's full
            // destination, searched alongside the real hazards below.
            let shadow = match prev_math.take() {
                Some(pm) if pm.pred != inst.pred => self.inject_math_shadow(&pm),
                _ => None,
            };

            let (rd, wr) =
                self.arena
                    .build_for_instruction(&inst, class, self.global_seq, self.inorder_seq);

            if self.arena.get(rd).always_interfere || self.arena.get(wr).always_interfere {
                self.resolve_unknown_access(&mut inst, rd, wr, class, &mut out)?;
            } else {
                self.resolve_selective(&mut inst, rd, wr, class, &mut out)?;
            }

            if let Some(sh) = shadow {
                self.buckets.clear(&mut self.arena, sh);
            }

            self.commit(&inst, rd, wr, class);
            prev_math = match inst.op {
                Op::Math(_) => Some(PrevMath {
                    pred: inst.pred,
                    sbid: inst.swsb.token.map(|t| t.id),
                    inst: inst.clone(),
                }),
                _ => None,
            };
            out.push(inst);
        }

        if out.last().is_some_and(Instruction::is_eot_send) {
            // The hardware drains the thread at EOT; nothing to flush.
            self.hard_reset();
        } else {
            self.flush_into(&mut out);
        }
        block.instrs = out;
        Ok(())
    }

    /// The indirect/unknown fast path: a full drain before the instruction,
    /// then a blanket one-instruction wait on its own descriptor.
    fn resolve_unknown_access(
        &mut self,
        inst: &mut Instruction,
        rd: DepSetId,
        wr: DepSetId,
        class: DepClass,
        out: &mut Vec<Instruction>,
    ) -> Result<(), PassError> {
        debug!(id = %inst.id, "unknown register access; draining all pipes");
        out.push(Instruction::sync(
            self.fresh_id(),
            SyncFn::AllRd,
            SwsbInfo::default(),
        ));
        out.push(Instruction::sync(
            self.fresh_id(),
            SyncFn::AllWr,
            SwsbInfo::default(),
        ));
        self.hard_reset();

        // The blanket one-instruction wait covers whatever the in-order pipe
        // still has in flight.
        if class.is_out_of_order() && !inst.is_eot_send() {
            let sbid = self.alloc_token(inst.id)?;
            inst.swsb.token = Some(Token::set(sbid));
            self.bind_token(sbid, rd, wr);
            if self.platform.jointly_encodable(&inst.op, TokenKind::Set) {
                inst.swsb.distance = Some(1);
            } else {
                self.spill_distance(out, 1);
            }
        } else {
            inst.swsb.distance = Some(1);
        }
        Ok(())
    }

    /// The selective path: probe the buckets with both footprints, classify
    /// each overlap, and encode the minimal synchronization.
    fn resolve_selective(
        &mut self,
        inst: &mut Instruction,
        rd: DepSetId,
        wr: DepSetId,
        class: DepClass,
        out: &mut Vec<Instruction>,
    ) -> Result<(), PassError> {
        let mut min_dist: Option<u64> = None;
        let mut tokens: SmallVec<[TokenNeed; 4]> = SmallVec::new();

        for (probe, my_kind) in [(rd, AccessKind::Read), (wr, AccessKind::Write)] {
            if !self.arena.get(probe).is_live() {
                continue;
            }
            let found = self.buckets.find_overlapping(&self.arena, probe)?;
            for other_id in found {
                let other = self.arena.get(other_id);
                if !other.is_live() {
                    // Cleared earlier in this same search (companion of a
                    // producer both probes overlapped).
                    continue;
                }
                let hazard = match (my_kind, other.kind) {
                    (AccessKind::Read, AccessKind::Write) => Hazard::Raw,
                    (AccessKind::Write, AccessKind::Write) => Hazard::Waw,
                    (AccessKind::Write, AccessKind::Read) => Hazard::War,
                    (AccessKind::Read, AccessKind::Read) => {
                        if other.always_interfere {
                            Hazard::Raw
                        } else {
                            continue;
                        }
                    }
                };
                if !needs_sync(
                    hazard,
                    other,
                    self.arena.get(probe),
                    class,
                ) {
                    continue;
                }
                trace!(
                    id = %inst.id,
                    producer = %other.inst,
                    ?hazard,
                    "hazard found"
                );

                match other.class {
                    DepClass::InOrder { .. } => {
                        let dist = self.inorder_seq - other.inorder_seq;
                        if dist == 0 {
                            return Err(PassError::ZeroDistance { inst: inst.id });
                        }
                        min_dist = Some(min_dist.map_or(dist, |d| d.min(dist)));
                        let companion = other.companion;
                        self.buckets.clear(&mut self.arena, other_id);
                        if let Some(c) = companion {
                            // An always-interfere companion must keep
                            // conflicting until it is synchronized itself.
                            if !self.arena.get(c).always_interfere {
                                self.buckets.clear(&mut self.arena, c);
                            }
                        }
                    }
                    DepClass::OutOfOrder(_) => {
                        let Some(sbid) = other.sbid else {
                            return Err(PassError::MissingToken {
                                inst: inst.id,
                                producer: other.inst,
                            });
                        };
                        let kind = match my_kind {
                            AccessKind::Read => TokenKind::Src,
                            AccessKind::Write => TokenKind::Dst,
                        };
                        let preserve = other.predicated != inst.pred.is_some()
                            || other.exec_size != inst.exec_size;
                        // A second hit on an id already resolved by this
                        // instruction (its erratum shadow, or the companion
                        // direction) only upgrades the obligation.
                        let resolved = tokens.iter().any(|t| t.id == sbid);
                        push_token(&mut tokens, sbid, kind, preserve);
                        if !resolved {
                            self.clear_ooo_producer(inst.id, sbid)?;
                        }
                    }
                    DepClass::Other => {
                        debug_assert!(false, "sync instructions never own dependency sets");
                    }
                }
            }
        }

        let own = if class.is_out_of_order() && !inst.is_eot_send() {
            let sbid = self.alloc_token(inst.id)?;
            self.bind_token(sbid, rd, wr);
            Some(sbid)
        } else {
            None
        };

        self.encode(inst, min_dist, tokens, own, out);
        Ok(())
    }

    /// Writes the collected synchronization onto the instruction, splitting
    /// whatever the descriptor cannot jointly carry onto standalone syncs
    /// inserted before it.
    fn encode(
        &mut self,
        inst: &mut Instruction,
        min_dist: Option<u64>,
        mut tokens: SmallVec<[TokenNeed; 4]>,
        own: Option<SbId>,
        out: &mut Vec<Instruction>,
    ) {
        let dist = min_dist.map(|d| self.platform.clamp_distance(d));

        // Preserved waits first: a predicated-off copy of this instruction
        // must not silently drop a dependency another consumer relies on.
        let mut i = 0;
        while i < tokens.len() {
            if tokens[i].preserve {
                let need = tokens.remove(i);
                let mut sync = Instruction::sync(
                    self.fresh_id(),
                    SyncFn::Nop,
                    SwsbInfo {
                        distance: None,
                        token: Some(Token {
                            kind: need.kind,
                            id: need.id,
                        }),
                    },
                );
                sync.preserve = true;
                out.push(sync);
            } else {
                i += 1;
            }
        }

        if let Some(sbid) = own {
            // The instruction's own allocation claims the token slot; every
            // remaining dependency wait moves to a standalone sync.
            for need in tokens.drain(..) {
                out.push(Instruction::sync(
                    self.fresh_id(),
                    SyncFn::Nop,
                    SwsbInfo {
                        distance: None,
                        token: Some(Token {
                            kind: need.kind,
                            id: need.id,
                        }),
                    },
                ));
            }
            inst.swsb.token = Some(Token::set(sbid));
            if let Some(d) = dist {
                if self.platform.jointly_encodable(&inst.op, TokenKind::Set) {
                    inst.swsb.distance = Some(d);
                } else {
                    self.spill_distance(out, d);
                }
            }
        } else if let Some(first) = tokens.first().copied() {
            for need in tokens.drain(..).skip(1) {
                out.push(Instruction::sync(
                    self.fresh_id(),
                    SyncFn::Nop,
                    SwsbInfo {
                        distance: None,
                        token: Some(Token {
                            kind: need.kind,
                            id: need.id,
                        }),
                    },
                ));
            }
            inst.swsb.token = Some(Token {
                kind: first.kind,
                id: first.id,
            });
            if let Some(d) = dist {
                if self.platform.jointly_encodable(&inst.op, first.kind) {
                    inst.swsb.distance = Some(d);
                } else {
                    self.spill_distance(out, d);
                }
            }
        } else {
            inst.swsb.distance = dist;
        }
    }

    /// Moves an in-order wait that cannot share the descriptor onto a
    /// standalone sync.
    fn spill_distance(&mut self, out: &mut Vec<Instruction>, d: u8) {
        out.push(Instruction::sync(
            self.fresh_id(),
            SyncFn::Nop,
            SwsbInfo {
                distance: Some(d),
                token: None,
            },
        ));
    }

    /// Adds the instruction's footprints to the tracking state and advances
    /// the counters.
    fn commit(&mut self, inst: &Instruction, rd: DepSetId, wr: DepSetId, class: DepClass) {
        if !inst.is_eot_send() {
            self.buckets.add(&self.arena, rd);
            self.buckets.add(&self.arena, wr);
        }
        if class.is_in_order() {
            self.window.record(rd, wr, self.inorder_seq);
            self.inorder_seq += 1;
            self.window
                .retire(self.inorder_seq, &mut self.buckets, &mut self.arena);
        }
        self.global_seq += 1;
    }

    /// Builds and registers the math-erratum shadow set, if the math op's
    /// token is still outstanding. A resolved token means the math op is
    /// already ordered before us.
    fn inject_math_shadow(&mut self, pm: &PrevMath) -> Option<DepSetId> {
        let sbid = pm.sbid?;
        self.pool.owner(sbid)?;
        let shadow = self.arena.build_full_dst_shadow(
            &pm.inst,
            classify(&pm.inst.op),
            Some(sbid),
            self.global_seq,
            self.inorder_seq,
        );
        self.buckets.add(&self.arena, shadow);
        trace!(producer = %pm.inst.id, "math erratum shadow injected");
        Some(shadow)
    }

    /// Allocates a scoreboard id, force-evicting round-robin when the pool
    /// is dry. The evicted owner's sets are cleared from all buckets before
    /// the id is handed out; reuse resolves the dependency in hardware.
    fn alloc_token(&mut self, inst: InstId) -> Result<SbId, PassError> {
        if let Some(id) = self.pool.try_alloc() {
            return Ok(id);
        }
        let Some((id, (rd, wr))) = self.pool.evict() else {
            return Err(PassError::PoolExhausted { inst });
        };
        debug!(%inst, %id, "token pool dry; force-evicting owner");
        self.buckets.clear(&mut self.arena, rd);
        self.buckets.clear(&mut self.arena, wr);
        Ok(id)
    }

    /// Records token ownership on both the pool and the dependency sets.
    fn bind_token(&mut self, sbid: SbId, rd: DepSetId, wr: DepSetId) {
        self.arena.get_mut(rd).sbid = Some(sbid);
        self.arena.get_mut(wr).sbid = Some(sbid);
        self.pool.assign(sbid, rd, wr);
    }

    /// Clears every set owned by `sbid` from the buckets and returns the id
    /// to the free pool.
    fn clear_ooo_producer(&mut self, inst: InstId, sbid: SbId) -> Result<(), PassError> {
        let Some((rd, wr)) = self.pool.owner(sbid) else {
            return Err(PassError::UnmappedToken { inst, sbid });
        };
        self.buckets.clear(&mut self.arena, rd);
        self.buckets.clear(&mut self.arena, wr);
        self.pool.release(sbid);
        trace!(%sbid, "token resolved and returned to pool");
        Ok(())
    }

    /// Emits the block-boundary drain: the sync-all pair when tokens are
    /// outstanding, a one-instruction wait when in-order producers are still
    /// inside the latency window, then a full state reset.
    fn flush_into(&mut self, out: &mut Vec<Instruction>) {
        let tokens_out = self.pool.has_outstanding();
        let inorder_out = !self.window.is_empty();
        if tokens_out {
            debug!(outstanding = self.pool.outstanding(), "block flush: draining tokens");
            out.push(Instruction::sync(
                self.fresh_id(),
                SyncFn::AllRd,
                SwsbInfo::default(),
            ));
            out.push(Instruction::sync(
                self.fresh_id(),
                SyncFn::AllWr,
                SwsbInfo::default(),
            ));
        }
        if inorder_out {
            // Waiting on the youngest in-order instruction drains the whole
            // pipe; it retires in issue order.
            out.push(Instruction::sync(
                self.fresh_id(),
                SyncFn::Nop,
                SwsbInfo {
                    distance: Some(1),
                    token: None,
                },
            ));
        }
        self.hard_reset();
    }

    /// Drops all tracking state: bucket entries, the distance window, and
    /// the token pool.
    fn hard_reset(&mut self) {
        self.buckets.reset();
        self.window.reset();
        self.pool.reset();
    }

    fn fresh_id(&mut self) -> InstId {
        let id = InstId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Whether a classified hazard pair actually requires synchronization.
///
/// In-order producers on the same pipe are ordered by the hardware for
/// write-write and write-read pairs; a same-pipe read-after-write still needs
/// a wait unless it is confined to the accumulator/flag range, which the pipe
/// forwards internally. Always-interfere sets conflict unconditionally.
fn needs_sync(
    hazard: Hazard,
    prior: &crate::analysis::depset::DepSet,
    probe: &crate::analysis::depset::DepSet,
    curr_class: DepClass,
) -> bool {
    if prior.always_interfere || probe.always_interfere {
        return true;
    }
    match prior.class {
        DepClass::Other => false,
        DepClass::OutOfOrder(_) => true,
        DepClass::InOrder { pipe } => {
            let same_pipe = matches!(curr_class, DepClass::InOrder { pipe: p } if p == pipe);
            match hazard {
                Hazard::Raw => {
                    !(same_pipe
                        && prior.bits.intersection_within(
                            &probe.bits,
                            SPECIAL_RANGE_START,
                            SPECIAL_RANGE_END,
                        ))
                }
                Hazard::Waw | Hazard::War => !same_pipe,
            }
        }
    }
}

/// Adds a token obligation, upgrading an existing read obligation on the
/// same id to a write obligation.
fn push_token(list: &mut SmallVec<[TokenNeed; 4]>, id: SbId, kind: TokenKind, preserve: bool) {
    if let Some(existing) = list.iter_mut().find(|e| e.id == id) {
        if kind > existing.kind {
            existing.kind = kind;
        }
        existing.preserve |= preserve;
    } else {
        list.push(TokenNeed { id, kind, preserve });
    }
}
