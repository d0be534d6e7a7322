//! Randomized invariants over generated instruction streams.

use proptest::prelude::*;
use swsb_core::analysis::postprocess;
use swsb_core::ir::{Instruction, Kernel, Op, Operand, SyncFn};
use swsb_core::{resolve, Platform};

use crate::common::builder::{add, grf, math, mov, send, InstructionBuilder};

/// Straight-line streams over a small register set, dense enough to force
/// real hazards, token reuse, pool eviction, and the conservative
/// unknown-access path.
fn arb_stream() -> impl Strategy<Value = Vec<Instruction>> {
    prop::collection::vec((0u8..5, 0u8..8, 0u8..8, 0u8..8), 1..32).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (kind, d, a, b))| {
                let id = i as u32;
                match kind {
                    0 => mov(id, d, a),
                    1 => add(id, d, a, b),
                    2 => send(id, d, 1, a),
                    3 => math(id, d, a),
                    _ => InstructionBuilder::new(id, Op::Mov)
                        .dst(grf(d))
                        .src(Operand::Indirect { addr_subreg: 0 })
                        .build(),
                }
            })
            .collect()
    })
}

fn resolved(instrs: Vec<Instruction>) -> Kernel {
    let mut kernel = Kernel::single_block(instrs);
    resolve(&mut kernel, &Platform::default()).expect("resolution failed");
    kernel
}

proptest! {
    #[test]
    fn test_annotations_stay_within_platform_bounds(instrs in arb_stream()) {
        let platform = Platform::default();
        let kernel = resolved(instrs);
        for inst in kernel.blocks.iter().flat_map(|b| b.instrs.iter()) {
            if let Some(d) = inst.swsb.distance {
                prop_assert!(d >= 1, "distance below 1 on {}", inst.id);
                prop_assert!(
                    d <= platform.encoding.max_distance,
                    "distance {d} above maximum on {}",
                    inst.id
                );
            }
            if let Some(token) = inst.swsb.token {
                prop_assert!(
                    usize::from(token.id.0) < platform.tokens.count,
                    "token id {} out of pool on {}",
                    token.id,
                    inst.id
                );
            }
            if inst.swsb.distance.is_some() {
                if let Some(token) = inst.swsb.token {
                    prop_assert!(
                        platform.jointly_encodable(&inst.op, token.kind),
                        "unencodable distance and token pair on {}",
                        inst.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic(instrs in arb_stream()) {
        let a = resolved(instrs.clone());
        let b = resolved(instrs);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_postprocessing_is_idempotent(instrs in arb_stream()) {
        let mut kernel = resolved(instrs);
        let once = kernel.clone();
        postprocess::run(&mut kernel);
        prop_assert_eq!(kernel, once);
    }

    #[test]
    fn test_original_instructions_all_survive(instrs in arb_stream()) {
        let ids: Vec<u32> = instrs.iter().map(|i| i.id.0).collect();
        let kernel = resolved(instrs);
        for id in ids {
            prop_assert!(
                kernel.blocks[0].instrs.iter().any(|i| i.id.0 == id),
                "instruction i{id} disappeared"
            );
        }
    }

    #[test]
    fn test_inserted_instructions_are_all_syncs(instrs in arb_stream()) {
        let original: Vec<u32> = instrs.iter().map(|i| i.id.0).collect();
        let kernel = resolved(instrs);
        for inst in &kernel.blocks[0].instrs {
            if !original.contains(&inst.id.0) {
                prop_assert!(
                    matches!(inst.op, Op::Sync(SyncFn::Nop | SyncFn::AllRd | SyncFn::AllWr)),
                    "inserted instruction {} is not a sync",
                    inst.id
                );
            }
        }
    }
}
