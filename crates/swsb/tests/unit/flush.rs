//! Draining at branches, block exits, and end-of-thread.

use pretty_assertions::assert_eq;
use swsb_core::ir::{BasicBlock, Op, Operand, Sfid, SyncFn};
use swsb_core::{resolve, Kernel, Platform};

use crate::common::builder::{add, jmp, mov, send, InstructionBuilder};
use crate::common::{by_id, position, resolve_block, sync_instrs};

#[test]
fn test_outstanding_token_drains_at_block_exit() {
    let kernel = resolve_block(vec![send(0, 10, 1, 5)]);
    let instrs = &kernel.blocks[0].instrs;
    assert_eq!(instrs.len(), 3);
    assert!(matches!(instrs[1].op, Op::Sync(SyncFn::AllRd)));
    assert!(matches!(instrs[2].op, Op::Sync(SyncFn::AllWr)));
}

#[test]
fn test_eot_send_needs_no_flush_and_no_token() {
    let eot = InstructionBuilder::new(0, Op::Send { sfid: Sfid::Gateway })
        .exec(16)
        .dst(Operand::Null)
        .src(Operand::grf_block(5, 1))
        .eot()
        .build();
    let kernel = resolve_block(vec![eot]);
    assert_eq!(kernel.blocks[0].instrs.len(), 1);
    assert!(by_id(&kernel, 0).swsb.is_empty());
}

#[test]
fn test_eot_send_still_waits_for_its_inputs() {
    let eot = InstructionBuilder::new(1, Op::Send { sfid: Sfid::Gateway })
        .exec(16)
        .dst(Operand::Null)
        .src(Operand::grf_block(10, 1))
        .eot()
        .build();
    let kernel = resolve_block(vec![mov(0, 10, 1), eot]);
    assert_eq!(kernel.blocks[0].instrs.len(), 2);
    let last = by_id(&kernel, 1);
    assert_eq!(last.swsb.distance, Some(1));
    assert_eq!(last.swsb.token, None);
}

#[test]
fn test_branch_flushes_outstanding_token_before_the_edge() {
    let kernel = resolve_block(vec![send(0, 10, 1, 5), jmp(1), mov(2, 20, 10)]);

    let branch_pos = position(&kernel, 0, 1);
    assert!(matches!(
        kernel.blocks[0].instrs[branch_pos - 2].op,
        Op::Sync(SyncFn::AllRd)
    ));
    assert!(matches!(
        kernel.blocks[0].instrs[branch_pos - 1].op,
        Op::Sync(SyncFn::AllWr)
    ));
    // The reader after the edge was covered by the drain.
    assert!(by_id(&kernel, 2).swsb.is_empty());
}

#[test]
fn test_branch_with_clean_state_inserts_nothing() {
    let kernel = resolve_block(vec![jmp(0)]);
    assert_eq!(kernel.blocks[0].instrs.len(), 1);
}

#[test]
fn test_tracking_does_not_cross_blocks() {
    let mut kernel = Kernel::new(vec![
        BasicBlock::new(vec![mov(0, 10, 1)]),
        BasicBlock::new(vec![add(1, 20, 10, 30)]),
    ]);
    resolve(&mut kernel, &Platform::default()).expect("resolution failed");

    // The first block drained its in-order window on exit; the consumer in
    // the second block starts from clean state.
    let trailing = sync_instrs(&kernel, 0);
    assert_eq!(trailing.len(), 1);
    assert_eq!(trailing[0].swsb.distance, Some(1));
    assert!(by_id(&kernel, 1).swsb.is_empty());
}

#[test]
fn test_flush_emits_both_drains_when_tokens_and_window_are_live() {
    let kernel = resolve_block(vec![send(0, 10, 1, 5), mov(1, 20, 2)]);
    let instrs = &kernel.blocks[0].instrs;
    let n = instrs.len();
    assert!(matches!(instrs[n - 3].op, Op::Sync(SyncFn::AllRd)));
    assert!(matches!(instrs[n - 2].op, Op::Sync(SyncFn::AllWr)));
    assert!(matches!(instrs[n - 1].op, Op::Sync(SyncFn::Nop)));
    assert_eq!(instrs[n - 1].swsb.distance, Some(1));
}
