//! Execution trace rows and their columnar field encoding
//!
//! A trace producer (the debugger driver, or the built-in VM) emits
//! [`TraceRow`]s in execution order: `pc` counts *recorded* steps, not host
//! program counters, so consecutive non-halt rows satisfy
//! `pc[i+1] = pc[i] + 1`. [`TraceTables`] expands the rows into six
//! parallel columns over the scalar field, zero-padded to the next power of
//! two, ready for interpolation on `{0, 1, …, T₂−1}`.

#![forbid(unsafe_code)]

use ark_ff::{One, PrimeField, Zero};

use crate::error::{Error, Result};
use crate::F;

/// The fixed instruction subset covered by the proof system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Load an immediate; no operand constraint.
    Push,
    /// `z = x + y`, wrapping 64-bit.
    Add,
    /// `z = x · y`, wrapping 64-bit.
    Mul,
    /// `z = x − y`, wrapping 64-bit.
    Sub,
    /// `z & 0xF = (x & 0xF) & (y & 0xF)` — 4-bit masked.
    And,
    /// `z & 0xF = (x & 0xF) | (y & 0xF)` — 4-bit masked.
    Or,
    /// Terminal marker; no operand constraint.
    Halt,
}

impl Opcode {
    /// Every allowed opcode, in tag order.
    pub const ALL: [Opcode; 7] = [
        Opcode::Push,
        Opcode::Add,
        Opcode::Mul,
        Opcode::Sub,
        Opcode::And,
        Opcode::Or,
        Opcode::Halt,
    ];

    /// Numeric wire tag for this opcode.
    pub fn tag(self) -> u64 {
        match self {
            Opcode::Push => 0,
            Opcode::Add => 1,
            Opcode::Mul => 2,
            Opcode::Sub => 3,
            Opcode::And => 4,
            Opcode::Or => 5,
            Opcode::Halt => 255,
        }
    }

    /// Reverse of [`Opcode::tag`]; `None` for tags outside the set.
    pub fn from_tag(tag: u64) -> Option<Self> {
        Opcode::ALL.into_iter().find(|op| op.tag() == tag)
    }

    /// The tag lifted into the scalar field, as stored in the `op` column.
    pub fn field(self) -> F {
        F::from(self.tag())
    }
}

/// One recorded execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRow {
    /// Recorded-step index, dense from zero.
    pub pc: u32,
    /// Instruction tag for this step.
    pub opcode: Opcode,
    /// First operand.
    pub x: u64,
    /// Second operand.
    pub y: u64,
    /// Result value.
    pub z: u64,
    /// Terminal marker; set on the final row of a completed run.
    pub is_halt: bool,
}

/// The six trace columns, padded to a power-of-two length.
#[derive(Debug, Clone)]
pub struct TraceTables {
    /// Number of real rows `T`.
    pub len: u32,
    /// Padded length `T₂` (next power of two, ≥ `T`).
    pub padded_len: u32,
    /// Step-index column.
    pub pc: Vec<F>,
    /// Opcode-tag column.
    pub op: Vec<F>,
    /// First-operand column.
    pub x: Vec<F>,
    /// Second-operand column.
    pub y: Vec<F>,
    /// Result column.
    pub z: Vec<F>,
    /// Halt-flag column (1 on halt rows).
    pub h: Vec<F>,
    /// Result value of the last recorded row.
    pub final_output: u64,
}

impl TraceTables {
    /// Expand rows into padded columns. Rejects an empty trace.
    pub fn from_rows(rows: &[TraceRow]) -> Result<Self> {
        let last = rows.last().ok_or(Error::Sizing("empty trace"))?;
        let len = rows.len();
        let padded = len.next_power_of_two();

        let mut tables = TraceTables {
            len: len as u32,
            padded_len: padded as u32,
            pc: vec![F::zero(); padded],
            op: vec![F::zero(); padded],
            x: vec![F::zero(); padded],
            y: vec![F::zero(); padded],
            z: vec![F::zero(); padded],
            h: vec![F::zero(); padded],
            final_output: last.z,
        };
        for (i, row) in rows.iter().enumerate() {
            tables.pc[i] = F::from(u64::from(row.pc));
            tables.op[i] = row.opcode.field();
            tables.x[i] = F::from(row.x);
            tables.y[i] = F::from(row.y);
            tables.z[i] = F::from(row.z);
            tables.h[i] = if row.is_halt { F::one() } else { F::zero() };
        }
        Ok(tables)
    }

    /// The global transition-constraint table over the padded domain:
    ///
    /// ```text
    ///   f[i] = (pc[i+1] − pc[i] − 1)·(1 − h[i])   for i ∈ [0, T−2]
    ///   f[i] = 0                                   otherwise
    /// ```
    ///
    /// Sums to zero exactly when `pc` is a strict successor chain away from
    /// halt-tagged rows.
    pub fn transition_table(&self) -> Vec<F> {
        let mut f = vec![F::zero(); self.padded_len as usize];
        for i in 0..(self.len as usize).saturating_sub(1) {
            let step = self.pc[i + 1] - self.pc[i] - F::one();
            f[i] = step * (F::one() - self.h[i]);
        }
        f
    }
}

/// Low 64 bits of a scalar's canonical representation.
///
/// Recovers the `u64` a column value encodes; the 4-bit masked semantic
/// checks for `AND`/`OR` operate on this decoding.
pub fn scalar_to_u64(x: &F) -> u64 {
    x.into_bigint().0[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pc: u32, opcode: Opcode, x: u64, y: u64, z: u64, is_halt: bool) -> TraceRow {
        TraceRow { pc, opcode, x, y, z, is_halt }
    }

    #[test]
    fn columns_are_padded_to_power_of_two() {
        let rows = [
            row(0, Opcode::Push, 0, 0, 5, false),
            row(1, Opcode::Add, 5, 7, 12, false),
            row(2, Opcode::Halt, 0, 0, 12, true),
        ];
        let t = TraceTables::from_rows(&rows).unwrap();
        assert_eq!(t.len, 3);
        assert_eq!(t.padded_len, 4);
        assert_eq!(t.op[2], Opcode::Halt.field());
        assert_eq!(t.op[3], F::zero());
        assert_eq!(t.final_output, 12);
    }

    #[test]
    fn transition_table_sums_to_zero_on_a_dense_chain() {
        let rows = [
            row(0, Opcode::Push, 0, 0, 1, false),
            row(1, Opcode::Push, 0, 0, 2, false),
            row(2, Opcode::Halt, 0, 0, 2, true),
        ];
        let f = TraceTables::from_rows(&rows).unwrap().transition_table();
        assert!(f.iter().all(|v| v.is_zero()));
    }

    #[test]
    fn transition_table_flags_a_pc_gap() {
        let rows = [
            row(0, Opcode::Push, 0, 0, 1, false),
            row(2, Opcode::Halt, 0, 0, 1, true),
        ];
        let f = TraceTables::from_rows(&rows).unwrap().transition_table();
        let sum: F = f.iter().sum();
        assert_eq!(sum, F::one());
    }

    #[test]
    fn halt_rows_suppress_the_constraint() {
        // A gap after a halt-tagged row is not a violation.
        let rows = [
            row(0, Opcode::Halt, 0, 0, 0, true),
            row(5, Opcode::Halt, 0, 0, 0, true),
        ];
        let f = TraceTables::from_rows(&rows).unwrap().transition_table();
        assert!(f.iter().all(|v| v.is_zero()));
    }

    #[test]
    fn empty_trace_is_rejected() {
        assert_eq!(TraceTables::from_rows(&[]).unwrap_err(), Error::Sizing("empty trace"));
    }

    #[test]
    fn opcode_tags_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_tag(op.tag()), Some(op));
            assert_eq!(scalar_to_u64(&op.field()), op.tag());
        }
        assert_eq!(Opcode::from_tag(6), None);
        assert_eq!(Opcode::from_tag(254), None);
    }
}
