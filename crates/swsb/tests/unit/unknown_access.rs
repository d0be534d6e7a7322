//! Indirect and untrackable register accesses.

use pretty_assertions::assert_eq;
use swsb_core::ir::{MathFn, Op, Operand, SbId, Sfid, SyncFn, Token};
use swsb_core::Platform;

use crate::common::builder::{grf, mov, InstructionBuilder};
use crate::common::{by_id, position, resolve_block, resolve_block_on};

fn indirect_mov(id: u32, dst: u8) -> swsb_core::ir::Instruction {
    InstructionBuilder::new(id, Op::Mov)
        .dst(grf(dst))
        .src(Operand::Indirect { addr_subreg: 0 })
        .build()
}

#[test]
fn test_indirect_source_forces_full_drain_before_it() {
    let kernel = resolve_block(vec![mov(0, 1, 2), indirect_mov(1, 3)]);

    let pos = position(&kernel, 0, 1);
    assert!(matches!(
        kernel.blocks[0].instrs[pos - 2].op,
        Op::Sync(SyncFn::AllRd)
    ));
    assert!(matches!(
        kernel.blocks[0].instrs[pos - 1].op,
        Op::Sync(SyncFn::AllWr)
    ));

    let inst = by_id(&kernel, 1);
    assert_eq!(inst.swsb.distance, Some(1));
    assert_eq!(inst.swsb.token, None);
}

#[test]
fn test_indirect_send_still_owns_a_token() {
    let send = InstructionBuilder::new(
        0,
        Op::Send {
            sfid: swsb_core::ir::Sfid::Dataport,
        },
    )
    .exec(16)
    .dst(Operand::grf_block(10, 1))
    .src(Operand::Indirect { addr_subreg: 0 })
    .build();
    let kernel = resolve_block(vec![send]);

    let instrs = &kernel.blocks[0].instrs;
    assert!(matches!(instrs[0].op, Op::Sync(SyncFn::AllRd)));
    assert!(matches!(instrs[1].op, Op::Sync(SyncFn::AllWr)));
    let inst = by_id(&kernel, 0);
    assert_eq!(inst.swsb.distance, Some(1));
    assert_eq!(inst.swsb.token, Some(Token::set(SbId(0))));
    // Its token is still outstanding at block exit.
    assert!(matches!(
        instrs[instrs.len() - 2].op,
        Op::Sync(SyncFn::AllRd)
    ));
    assert!(matches!(
        instrs[instrs.len() - 1].op,
        Op::Sync(SyncFn::AllWr)
    ));
}

#[test]
fn test_indirect_math_splits_the_blanket_wait_off_its_descriptor() {
    // Math descriptors never encode a distance next to a token; the blanket
    // wait lands on a standalone sync between the drain pair and the op.
    let m = InstructionBuilder::new(0, Op::Math(MathFn::Inv))
        .dst(grf(3))
        .src(Operand::Indirect { addr_subreg: 0 })
        .build();
    let kernel = resolve_block(vec![m]);

    let inst = by_id(&kernel, 0);
    assert_eq!(inst.swsb.token, Some(Token::set(SbId(0))));
    assert_eq!(inst.swsb.distance, None);

    let pos = position(&kernel, 0, 0);
    let instrs = &kernel.blocks[0].instrs;
    assert!(matches!(instrs[pos - 3].op, Op::Sync(SyncFn::AllRd)));
    assert!(matches!(instrs[pos - 2].op, Op::Sync(SyncFn::AllWr)));
    let spill = &instrs[pos - 1];
    assert!(matches!(spill.op, Op::Sync(SyncFn::Nop)));
    assert_eq!(spill.swsb.distance, Some(1));
    assert_eq!(spill.swsb.token, None);
}

#[test]
fn test_indirect_send_splits_when_joint_encoding_is_disabled() {
    let mut platform = Platform::default();
    platform.encoding.combined_send_set = false;
    let send = InstructionBuilder::new(
        0,
        Op::Send {
            sfid: Sfid::Dataport,
        },
    )
    .exec(16)
    .dst(Operand::grf_block(10, 1))
    .src(Operand::Indirect { addr_subreg: 0 })
    .build();
    let kernel = resolve_block_on(vec![send], &platform);

    let inst = by_id(&kernel, 0);
    assert_eq!(inst.swsb.token, Some(Token::set(SbId(0))));
    assert_eq!(inst.swsb.distance, None);
    let spill = &kernel.blocks[0].instrs[position(&kernel, 0, 0) - 1];
    assert!(matches!(spill.op, Op::Sync(SyncFn::Nop)));
    assert_eq!(spill.swsb.distance, Some(1));
    assert_eq!(spill.swsb.token, None);
}

#[test]
fn test_everything_after_an_unknown_access_conflicts_with_it() {
    let kernel = resolve_block(vec![indirect_mov(0, 3), mov(1, 5, 6)]);
    // The conservative footprint overlaps any register at all.
    assert_eq!(by_id(&kernel, 1).swsb.distance, Some(1));
}

#[test]
fn test_unknown_access_resets_earlier_tracking() {
    let kernel = resolve_block(vec![
        mov(0, 10, 1),
        indirect_mov(1, 3),
        InstructionBuilder::new(2, Op::Add)
            .dst(grf(20))
            .src(grf(10))
            .src(grf(30))
            .build(),
    ]);
    // r10's producer was drained by the forced sync-all pair; the only
    // hazard left for the consumer is the unknown access itself.
    assert_eq!(by_id(&kernel, 2).swsb.distance, Some(1));
}
