//! The dependency-resolution passes.
//!
//! Resolution runs in two phases over an already-scheduled kernel:
//!
//! 1. [`analyzer`] walks each block in program order, reconstructs every
//!    read/write hazard against the live dependency sets, and writes the
//!    minimal synchronization onto each instruction, inserting standalone
//!    `sync` instructions where one descriptor cannot carry everything.
//! 2. [`postprocess`] deletes the standalone syncs the first phase made
//!    redundant.
//!
//! Supporting state lives in its own modules: [`depset`] (register
//! footprints), [`buckets`] (the per-register-row overlap index),
//! [`distance`] (the in-order latency window), [`sbid`] (the scoreboard
//! token pool), and [`pipes`] (opcode classification).

pub mod analyzer;
pub mod buckets;
pub mod depset;
pub mod distance;
pub mod pipes;
pub mod postprocess;
pub mod sbid;

use crate::common::error::PassError;
use crate::config::Platform;
use crate::ir::Kernel;

pub use analyzer::DependencyAnalyzer;

/// Annotates every instruction of `kernel` with its synchronization
/// requirements and strips redundant standalone syncs.
///
/// # Errors
///
/// Returns a [`PassError`] on internal bookkeeping inconsistencies; the
/// kernel may be partially annotated afterwards and must be discarded.
pub fn resolve(kernel: &mut Kernel, platform: &Platform) -> Result<(), PassError> {
    let mut analyzer = DependencyAnalyzer::new(platform, kernel.max_inst_id().0 + 1);
    for block in &mut kernel.blocks {
        analyzer.process_block(block)?;
    }
    postprocess::run(kernel);
    Ok(())
}
