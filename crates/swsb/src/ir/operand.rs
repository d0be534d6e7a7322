//! Operand and register-reference model.
//!
//! Operands arrive fully decoded from the upstream scheduler: register file,
//! register number, sub-register byte offset, and either an ALU region
//! (element size × stride, scaled by execution size) or a whole-register
//! block span (message payloads). Indirect and unknown-valued special
//! register accesses are kept as distinct shapes so the footprint builder can
//! route them to the conservative path.

use crate::common::regs::{
    bucket_base, ACC_BASE, ACC_COUNT, ADDR_BUCKET, FLAG_BASE, FLAG_COUNT, GRF_COUNT, REG_BYTES,
};

/// Directly addressable register files tracked for dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegFile {
    /// General register file.
    Grf,
    /// Accumulator registers.
    Acc,
    /// Flag (predication) registers.
    Flag,
    /// The address register used for indirect addressing.
    Addr,
}

/// A direct register reference: file, register number, sub-register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegRef {
    /// Register file.
    pub file: RegFile,
    /// Register number within the file.
    pub reg: u8,
    /// Byte offset within the register.
    pub subreg: u8,
}

impl RegRef {
    /// General register `r{reg}.{subreg}` (subreg in bytes).
    pub fn grf(reg: u8, subreg: u8) -> Self {
        Self {
            file: RegFile::Grf,
            reg,
            subreg,
        }
    }

    /// Accumulator register `acc{reg}`.
    pub fn acc(reg: u8) -> Self {
        Self {
            file: RegFile::Acc,
            reg,
            subreg: 0,
        }
    }

    /// Flag register `f{reg}`.
    pub fn flag(reg: u8) -> Self {
        Self {
            file: RegFile::Flag,
            reg,
            subreg: 0,
        }
    }

    /// The address register `a0.{subreg}`.
    pub fn addr(subreg: u8) -> Self {
        Self {
            file: RegFile::Addr,
            reg: 0,
            subreg,
        }
    }

    /// Footprint bit offset of the first byte this reference names, or `None`
    /// if the register number is outside the tracked file. Callers treat an
    /// untrackable reference as an unknown access.
    pub fn start_bit(&self) -> Option<usize> {
        let reg = usize::from(self.reg);
        let sub = usize::from(self.subreg);
        if sub >= REG_BYTES {
            return None;
        }
        let bucket = match self.file {
            RegFile::Grf if reg < GRF_COUNT => reg,
            RegFile::Acc if reg < ACC_COUNT => ACC_BASE + reg,
            RegFile::Flag if reg < FLAG_COUNT => FLAG_BASE + reg,
            RegFile::Addr if reg == 0 => ADDR_BUCKET,
            _ => return None,
        };
        Some(bucket_base(bucket) + sub)
    }
}

/// How a direct operand walks the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// ALU region: `elem_bytes`-sized elements, `stride` elements apart,
    /// one per execution channel. A stride of zero broadcasts a scalar.
    Region {
        /// Element size in bytes.
        elem_bytes: u8,
        /// Horizontal stride in elements.
        stride: u8,
    },
    /// Whole-register block span, e.g. a message payload or response.
    Block {
        /// Number of consecutive registers.
        regs: u8,
    },
}

/// One decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand in this slot.
    Null,
    /// Immediate value; contributes no register footprint.
    Imm,
    /// Direct register access.
    Reg {
        /// The register this operand names.
        reg: RegRef,
        /// Access pattern over the file.
        access: Access,
    },
    /// Register-indirect access through the address register. The touched
    /// range is unknown at compile time.
    Indirect {
        /// Byte offset of the address sub-register holding the pointer.
        addr_subreg: u8,
    },
    /// An unknown-valued architectural register (state, control). Treated as
    /// interfering with everything.
    Special,
}

impl Operand {
    /// Direct GRF region operand.
    pub fn grf_region(reg: u8, subreg: u8, elem_bytes: u8, stride: u8) -> Self {
        Self::Reg {
            reg: RegRef::grf(reg, subreg),
            access: Access::Region { elem_bytes, stride },
        }
    }

    /// Whole-register GRF block operand (send payloads and responses).
    pub fn grf_block(reg: u8, regs: u8) -> Self {
        Self::Reg {
            reg: RegRef::grf(reg, 0),
            access: Access::Block { regs },
        }
    }

    /// Accumulator region operand.
    pub fn acc_region(reg: u8, elem_bytes: u8) -> Self {
        Self::Reg {
            reg: RegRef::acc(reg),
            access: Access::Region {
                elem_bytes,
                stride: 1,
            },
        }
    }

    /// Number of footprint bytes a direct access covers for `exec_size`
    /// channels.
    pub fn span_bytes(access: Access, exec_size: u8) -> usize {
        match access {
            Access::Region { elem_bytes, stride } => {
                let elem = usize::from(elem_bytes);
                if stride == 0 || exec_size <= 1 {
                    elem
                } else {
                    ((usize::from(exec_size) - 1) * usize::from(stride) + 1) * elem
                }
            }
            Access::Block { regs } => usize::from(regs) * REG_BYTES,
        }
    }
}
