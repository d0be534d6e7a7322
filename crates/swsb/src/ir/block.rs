//! Basic blocks and the kernel container.
//!
//! Block boundaries are fixed by the upstream scheduler; the resolver only
//! inserts standalone `sync` instructions inside blocks and never reorders
//! anything.

use super::instruction::{InstId, Instruction};

/// A straight-line run of instructions ending at a control-flow edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    /// Instructions in program order.
    pub instrs: Vec<Instruction>,
}

impl BasicBlock {
    /// Creates a block from an instruction sequence.
    pub fn new(instrs: Vec<Instruction>) -> Self {
        Self { instrs }
    }
}

/// A kernel: basic blocks in layout order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kernel {
    /// Blocks in the order the encoder will serialize them.
    pub blocks: Vec<BasicBlock>,
}

impl Kernel {
    /// Creates a kernel from its blocks.
    pub fn new(blocks: Vec<BasicBlock>) -> Self {
        Self { blocks }
    }

    /// Wraps a single instruction sequence as a one-block kernel.
    pub fn single_block(instrs: Vec<Instruction>) -> Self {
        Self {
            blocks: vec![BasicBlock::new(instrs)],
        }
    }

    /// Highest instruction id in use, for allocating inserted-sync ids.
    pub fn max_inst_id(&self) -> InstId {
        let max = self
            .blocks
            .iter()
            .flat_map(|b| b.instrs.iter())
            .map(|i| i.id.0)
            .max()
            .unwrap_or(0);
        InstId(max)
    }

    /// Total instruction count across all blocks.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.instrs.len()).sum()
    }

    /// Returns `true` if the kernel has no instructions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
