//! Redundant-sync elimination.
//!
//! The resolution loop inserts standalone `sync.nop` instructions freely and
//! leaves cleanup to this pass. A standalone token wait is redundant when the
//! next real instruction re-acquires the same scoreboard id with a full set:
//! acquiring an in-use id already stalls until its previous use resolves.
//! Empty `sync.nop` carriers (no wait at all) are dropped outright.
//!
//! Preserved syncs are never touched; they exist precisely because the
//! consumer that would otherwise carry the wait can be predicated off.
//! `sync.allrd`/`sync.allwr` drains are never touched either. The pass is
//! idempotent.

use crate::ir::{BasicBlock, Instruction, Kernel, Op, SyncFn, TokenKind};

/// Removes redundant standalone syncs from every block.
pub fn run(kernel: &mut Kernel) {
    for block in &mut kernel.blocks {
        run_block(block);
    }
}

fn run_block(block: &mut BasicBlock) {
    let instrs = &mut block.instrs;
    let mut keep = vec![true; instrs.len()];

    for i in 0..instrs.len() {
        let inst = &instrs[i];
        if !is_candidate(inst) {
            continue;
        }
        if inst.swsb.is_empty() {
            keep[i] = false;
            continue;
        }
        let Some(token) = inst.swsb.token else {
            continue;
        };
        if token.kind == TokenKind::Set || inst.swsb.distance.is_some() {
            continue;
        }
        // Other standalone syncs between the wait and its shadowing set do
        // not consume the token.
        let mut j = i + 1;
        while j < instrs.len() && instrs[j].is_sync() {
            j += 1;
        }
        let shadowed = instrs.get(j).and_then(|next| next.swsb.token).is_some_and(
            |next_token| next_token.kind == TokenKind::Set && next_token.id == token.id,
        );
        if shadowed {
            keep[i] = false;
        }
    }

    let mut decisions = keep.into_iter();
    instrs.retain(|_| decisions.next().unwrap_or(true));
}

/// Only non-preserved standalone `sync.nop` instructions are ever removed.
fn is_candidate(inst: &Instruction) -> bool {
    matches!(inst.op, Op::Sync(SyncFn::Nop)) && !inst.preserve
}
