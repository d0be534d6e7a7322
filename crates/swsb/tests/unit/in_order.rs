//! In-order pipe hazards resolved by wait distance.

use pretty_assertions::assert_eq;
use swsb_core::ir::{Op, Operand, SyncFn};

use crate::common::builder::{add, grf, mov, InstructionBuilder};
use crate::common::{by_id, resolve_block, sync_instrs};

#[test]
fn test_disjoint_alu_needs_no_sync() {
    let kernel = resolve_block(vec![mov(0, 1, 2), mov(1, 3, 4)]);
    assert!(by_id(&kernel, 0).swsb.is_empty());
    assert!(by_id(&kernel, 1).swsb.is_empty());
}

#[test]
fn test_adjacent_raw_gets_distance_one() {
    let kernel = resolve_block(vec![mov(0, 10, 1), add(1, 20, 10, 30)]);
    let consumer = by_id(&kernel, 1);
    assert_eq!(consumer.swsb.distance, Some(1));
    assert_eq!(consumer.swsb.token, None);
}

#[test]
fn test_distance_counts_intervening_instructions() {
    let kernel = resolve_block(vec![
        mov(0, 10, 1),
        mov(1, 30, 2),
        mov(2, 31, 2),
        add(3, 20, 10, 29),
    ]);
    assert_eq!(by_id(&kernel, 3).swsb.distance, Some(3));
}

#[test]
fn test_distance_clamps_to_platform_maximum() {
    let mut instrs = vec![mov(0, 10, 1)];
    for i in 1..=8 {
        instrs.push(mov(i, 30 + i as u8, 2));
    }
    instrs.push(add(9, 20, 10, 29));
    let kernel = resolve_block(instrs);
    // Raw distance 9, clamped down; in-order retirement makes the shorter
    // wait subsume the real one.
    assert_eq!(by_id(&kernel, 9).swsb.distance, Some(7));
}

#[test]
fn test_producer_expires_past_latency_window() {
    let mut instrs = vec![mov(0, 10, 1)];
    for i in 1..=10 {
        instrs.push(mov(i, 30 + i as u8, 2));
    }
    instrs.push(add(11, 20, 10, 29));
    let kernel = resolve_block(instrs);
    assert!(by_id(&kernel, 11).swsb.is_empty());
}

#[test]
fn test_same_pipe_waw_needs_no_sync() {
    let kernel = resolve_block(vec![mov(0, 10, 1), mov(1, 10, 2)]);
    assert!(by_id(&kernel, 1).swsb.is_empty());
}

#[test]
fn test_same_pipe_war_needs_no_sync() {
    let kernel = resolve_block(vec![mov(0, 20, 10), mov(1, 10, 2)]);
    assert!(by_id(&kernel, 1).swsb.is_empty());
}

#[test]
fn test_flag_raw_is_forwarded_in_pipe() {
    let cmp = InstructionBuilder::new(0, Op::Cmp)
        .src(grf(1))
        .flag_mod(0)
        .build();
    let sel = InstructionBuilder::new(1, Op::Sel)
        .pred(0)
        .dst(grf(3))
        .src(grf(2))
        .build();
    let kernel = resolve_block(vec![cmp, sel]);
    assert!(by_id(&kernel, 1).swsb.is_empty());
}

#[test]
fn test_accumulator_raw_is_forwarded_in_pipe() {
    let mad_a = InstructionBuilder::new(0, Op::Mad)
        .dst(grf(1))
        .src(grf(2))
        .src(grf(3))
        .src(grf(4))
        .build();
    let mad_b = InstructionBuilder::new(1, Op::Mad)
        .dst(grf(5))
        .src(grf(6))
        .src(grf(7))
        .src(grf(8))
        .build();
    let kernel = resolve_block(vec![mad_a, mad_b]);
    // The only shared footprint is the accumulator staging range.
    assert!(by_id(&kernel, 1).swsb.is_empty());
}

#[test]
fn test_flag_raw_mixed_with_grf_still_syncs() {
    // The intersection is not confined to the special range: r4 overlaps too.
    let cmp = InstructionBuilder::new(0, Op::Cmp)
        .dst(grf(4))
        .src(grf(1))
        .flag_mod(0)
        .build();
    let sel = InstructionBuilder::new(1, Op::Sel)
        .pred(0)
        .dst(grf(3))
        .src(grf(4))
        .build();
    let kernel = resolve_block(vec![cmp, sel]);
    assert_eq!(by_id(&kernel, 1).swsb.distance, Some(1));
}

#[test]
fn test_partial_register_overlap_is_a_hazard() {
    let producer = InstructionBuilder::new(0, Op::Mov)
        .dst(Operand::grf_region(10, 16, 4, 1))
        .src(grf(1))
        .build();
    // Reads r10.20..r10.23, inside the producer's written range.
    let consumer = InstructionBuilder::new(1, Op::Add)
        .exec(1)
        .dst(grf(20))
        .src(Operand::grf_region(10, 20, 4, 1))
        .src(grf(2))
        .build();
    let kernel = resolve_block(vec![producer, consumer]);
    assert_eq!(by_id(&kernel, 1).swsb.distance, Some(1));
}

#[test]
fn test_block_exit_drains_in_order_window() {
    let kernel = resolve_block(vec![mov(0, 1, 2)]);
    let syncs = sync_instrs(&kernel, 0);
    assert_eq!(syncs.len(), 1);
    assert!(matches!(syncs[0].op, Op::Sync(SyncFn::Nop)));
    assert_eq!(syncs[0].swsb.distance, Some(1));
}
