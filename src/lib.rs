//! Public surface & core types
//!
//! A commit–prove–verify pipeline for instruction-traced program execution:
//! a publisher commits to a program's source bytes, a prover turns an
//! execution trace into committed column polynomials and a transcript-bound
//! argument, and a verifier checks the proof against the commitment and its
//! own public instance — without the program or the machine.
//!
//! ## Transcript & Ordering (Public Contract)
//!
//! Prover and verifier drive one Fiat–Shamir transcript in this exact order:
//!
//! 1. `domain_tag` (32 bytes).
//! 2. `input_sha` (32 bytes).
//! 3. `code_sha` (32 bytes).
//! 4. `code_kzg_sess` (compressed `G1`).
//! 5. Column commitments, fixed order: `pc, op, z, x, y, h`.
//! 6. Sum-check rounds; each round absorbs `g(0)` then `g(1)` **before**
//!    squeezing that round's challenge.
//! 7. One squeeze after the last round yields the **index seed**.
//! 8. Opcode sample indices derive from the index seed.
//! 9. Row sample indices derive from `SHA-256(index_seed ‖ 0x52)`.
//!
//! Any deviation in step order, element count, or serialization breaks
//! prover/verifier agreement or soundness. The schedule is implemented
//! once, in [`engine`], and replayed bit-for-bit on the verify side.
//!
//! ## Ownership
//!
//! The SRS is shared read-only (`&Srs`); the transcript is an owned value
//! threaded through each run, so independent proofs can execute
//! concurrently in one process. Commitments and proofs are plain value
//! objects exchanged through the text codecs in [`codec`].

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Code commitment, public instance, and per-session blinding.
pub mod binding;
/// Text file formats for commitments and proofs.
pub mod codec;
/// Prover/verifier orchestrators implementing the transcript schedule.
pub mod engine;
/// Failure taxonomy shared across the pipeline.
pub mod error;
/// KZG commitments, openings, and the structured reference string.
pub mod kzg;
/// Dense univariate polynomial arithmetic.
pub mod poly;
/// Sum-check argument over MLE value tables.
pub mod sumcheck;
/// Trace rows, opcodes, and columnar field encoding.
pub mod trace;
/// Fiat–Shamir transcript and index derivation.
pub mod transcript;
/// Mini-ISA assembler and stack VM producing trace rows.
pub mod vm;

pub use engine::{ProtocolParams, Prover, Verifier};
pub use error::{Error, Result};

/// Scalar field of BN254.
pub type F = ark_bn254::Fr;

/// `G1` group element (affine), used for all commitments and witnesses.
pub type G1 = ark_bn254::G1Affine;

/// `G2` group element (affine), used for the verification key.
pub type G2 = ark_bn254::G2Affine;

/// One opcode-stream spot check: the `op` column opened at `Fr(idx)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeOpening {
    /// Sampled index in `[0, T−1]`.
    pub idx: u64,
    /// Opened value; must be an allowed opcode tag.
    pub value: F,
    /// KZG witness for the opening.
    pub witness: G1,
}

/// One row-stream spot check: six columns opened at `i`, plus `pc` at `i+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOpening {
    /// Sampled index in `[0, T−2]`.
    pub idx: u64,
    /// `pc` opened at `i`.
    pub pc_i: kzg::Opening,
    /// `pc` opened at `i+1`.
    pub pc_next: kzg::Opening,
    /// `op` opened at `i`.
    pub op: kzg::Opening,
    /// `x` opened at `i`.
    pub x: kzg::Opening,
    /// `y` opened at `i`.
    pub y: kzg::Opening,
    /// `z` opened at `i`.
    pub z: kzg::Opening,
    /// `h` opened at `i`.
    pub h: kzg::Opening,
}

/// The proof object, as produced by [`Prover::prove`] and serialized by
/// [`codec::serialize_proof`].
///
/// Everything the verifier needs to replay the transcript is carried here;
/// the SRS is reconstructed from sizes alone in the deterministic setup
/// mode, so no reference-string bytes appear in the proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// SHA-256 of the committed code (must match the commitment).
    pub code_sha: [u8; 32],
    /// Verification-context nonce the proof binds to.
    pub domain_tag: [u8; 32],
    /// Public-input digest the proof binds to.
    pub input_sha: [u8; 32],
    /// Session code commitment `C_base + Commit(b(domain_tag))`.
    pub code_kzg_sess: G1,
    /// Commitment to the `pc` column polynomial.
    pub pc_comm: G1,
    /// Commitment to the `op` column polynomial.
    pub op_comm: G1,
    /// Commitment to the `z` column polynomial.
    pub z_comm: G1,
    /// Commitment to the `x` column polynomial.
    pub x_comm: G1,
    /// Commitment to the `y` column polynomial.
    pub y_comm: G1,
    /// Commitment to the `h` column polynomial.
    pub h_comm: G1,
    /// Number of recorded trace rows `T`.
    pub trace_len: u32,
    /// Padded column length `T₂` (power of two).
    pub trace_pow2: u32,
    /// Sum-check transcript for the global transition constraint.
    pub sumcheck: sumcheck::SumcheckProof,
    /// Opcode-stream spot checks.
    pub opcode_openings: Vec<OpcodeOpening>,
    /// Row-stream spot checks (empty when `T < 2`).
    pub row_openings: Vec<RowOpening>,
    /// Result value of the final recorded row.
    pub final_output: u64,
}
