//! Proof engine — prover and verifier orchestrators
//!
//! This module wires the Fiat–Shamir–ordered schedule end to end and is the
//! only place that sequences transcript absorption. The prover runs
//! column commitment → transcript binding → sum-check → index derivation →
//! openings; the verifier replays exactly that schedule and enforces the
//! checks in taxonomy order (binding, sizing, protocol, cryptographic,
//! semantic), stopping at the first failure.
//!
//! Cryptographic internals are delegated to `kzg`, `sumcheck`, and
//! `binding`; this file focuses on orchestration and ordering.

#![forbid(unsafe_code)]

use ark_ff::{One, Zero};
use tracing::debug;

use crate::binding::{self, CodeCommitment, PublicInstance};
use crate::error::{Error, Result};
use crate::kzg::{self, Opening, Srs};
use crate::poly::Poly;
use crate::sumcheck;
use crate::trace::{scalar_to_u64, Opcode, TraceRow, TraceTables};
use crate::transcript::{derive_indices, row_index_seed, Transcript};
use crate::{OpcodeOpening, Proof, RowOpening, F};

/// Spot-check sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolParams {
    /// Opcode-stream samples over `[0, T−1]`.
    pub k_opcode: usize,
    /// Row-stream samples over `[0, T−2]`.
    pub k_row: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self { k_opcode: 4, k_row: 4 }
    }
}

/// Prover orchestrator. Holds the shared SRS by reference; every other
/// piece of state lives on the stack of [`Prover::prove`].
pub struct Prover<'a> {
    /// Shared reference string (must cover `T₂ − 1` plus blinding degree).
    pub srs: &'a Srs,
    /// Sample counts; must match the verifier's.
    pub params: ProtocolParams,
}

/// Verifier orchestrator (replays the prover's schedule, checks everything).
pub struct Verifier<'a> {
    /// Shared reference string, identical to the prover's.
    pub srs: &'a Srs,
    /// Sample counts; must match the prover's.
    pub params: ProtocolParams,
}

/// Absorb the public values in the canonical order: instance digests,
/// code digest, session commitment, then the six column commitments.
fn bind_transcript(
    tr: &mut Transcript,
    domain_tag: &[u8; 32],
    input_sha: &[u8; 32],
    code_sha: &[u8; 32],
    code_kzg_sess: &crate::G1,
    columns: [&crate::G1; 6],
) {
    tr.absorb_digest(domain_tag);
    tr.absorb_digest(input_sha);
    tr.absorb_digest(code_sha);
    tr.absorb_g1(code_kzg_sess);
    for comm in columns {
        tr.absorb_g1(comm);
    }
}

impl Prover<'_> {
    /// Produce a proof that `rows` is a well-formed execution of the
    /// committed program within the verifier's instance.
    pub fn prove(
        &self,
        commitment: &CodeCommitment,
        instance: &PublicInstance,
        rows: &[TraceRow],
    ) -> Result<Proof> {
        let tables = TraceTables::from_rows(rows)?;
        debug!(
            trace_len = tables.len,
            trace_pow2 = tables.padded_len,
            "encoding trace columns"
        );

        // Interpolate each column on {0, …, T₂−1} and commit.
        let pc_poly = Poly::interpolate(&tables.pc);
        let op_poly = Poly::interpolate(&tables.op);
        let x_poly = Poly::interpolate(&tables.x);
        let y_poly = Poly::interpolate(&tables.y);
        let z_poly = Poly::interpolate(&tables.z);
        let h_poly = Poly::interpolate(&tables.h);

        let pc_comm = kzg::commit(self.srs, &pc_poly)?;
        let op_comm = kzg::commit(self.srs, &op_poly)?;
        let x_comm = kzg::commit(self.srs, &x_poly)?;
        let y_comm = kzg::commit(self.srs, &y_poly)?;
        let z_comm = kzg::commit(self.srs, &z_poly)?;
        let h_comm = kzg::commit(self.srs, &h_poly)?;

        let code_kzg_sess =
            binding::session_commitment(self.srs, &commitment.code_kzg_base, &instance.domain_tag)?;

        let mut tr = Transcript::new();
        bind_transcript(
            &mut tr,
            &instance.domain_tag,
            &instance.input_sha,
            &commitment.code_sha,
            &code_kzg_sess,
            [&pc_comm, &op_comm, &z_comm, &x_comm, &y_comm, &h_comm],
        );

        let sumcheck = sumcheck::prove(&tables.transition_table(), &mut tr)?;

        // One squeeze after sum-check seeds both index streams.
        let seed = tr.squeeze();
        let opcode_indices = derive_indices(&seed, u64::from(tables.len), self.params.k_opcode);
        let mut opcode_openings = Vec::with_capacity(opcode_indices.len());
        for idx in opcode_indices {
            let opened = kzg::open(self.srs, &op_poly, F::from(idx))?;
            opcode_openings.push(OpcodeOpening { idx, value: opened.value, witness: opened.witness });
        }

        let mut row_openings = Vec::new();
        if tables.len >= 2 {
            let row_seed = row_index_seed(&seed);
            for idx in derive_indices(&row_seed, u64::from(tables.len) - 1, self.params.k_row) {
                let at_i = F::from(idx);
                let at_next = F::from(idx + 1);
                row_openings.push(RowOpening {
                    idx,
                    pc_i: kzg::open(self.srs, &pc_poly, at_i)?,
                    pc_next: kzg::open(self.srs, &pc_poly, at_next)?,
                    op: kzg::open(self.srs, &op_poly, at_i)?,
                    x: kzg::open(self.srs, &x_poly, at_i)?,
                    y: kzg::open(self.srs, &y_poly, at_i)?,
                    z: kzg::open(self.srs, &z_poly, at_i)?,
                    h: kzg::open(self.srs, &h_poly, at_i)?,
                });
            }
        }
        debug!(
            opcode_openings = opcode_openings.len(),
            row_openings = row_openings.len(),
            "assembled spot-check openings"
        );

        Ok(Proof {
            code_sha: commitment.code_sha,
            domain_tag: instance.domain_tag,
            input_sha: instance.input_sha,
            code_kzg_sess,
            pc_comm,
            op_comm,
            z_comm,
            x_comm,
            y_comm,
            h_comm,
            trace_len: tables.len,
            trace_pow2: tables.padded_len,
            sumcheck,
            opcode_openings,
            row_openings,
            final_output: tables.final_output,
        })
    }
}

impl Verifier<'_> {
    /// Check a proof against a commitment and the verifier's own instance.
    ///
    /// Returns `Ok(())` on accept; the error carries the taxonomy class and
    /// reason of the first failed check.
    pub fn verify(
        &self,
        commitment: &CodeCommitment,
        instance: &PublicInstance,
        proof: &Proof,
    ) -> Result<()> {
        // --- Binding: tie the proof to this commitment and instance ---
        let expected_sess =
            binding::session_commitment(self.srs, &commitment.code_kzg_base, &instance.domain_tag)?;
        if proof.code_sha != commitment.code_sha {
            return Err(Error::Binding("code sha mismatch"));
        }
        if proof.code_kzg_sess != expected_sess {
            return Err(Error::Binding("code session commitment mismatch"));
        }
        if proof.domain_tag != instance.domain_tag {
            return Err(Error::Binding("domain tag mismatch"));
        }
        if proof.input_sha != instance.input_sha {
            return Err(Error::Binding("input hash mismatch"));
        }

        // --- Sizing ---
        if proof.trace_len == 0 {
            return Err(Error::Sizing("trace length is zero"));
        }
        if !proof.trace_pow2.is_power_of_two() {
            return Err(Error::Sizing("padded length not a power of two"));
        }
        if proof.trace_len > proof.trace_pow2 {
            return Err(Error::Sizing("trace length exceeds padded length"));
        }

        // --- Replay the transcript in the prover's order ---
        let mut tr = Transcript::new();
        bind_transcript(
            &mut tr,
            &proof.domain_tag,
            &proof.input_sha,
            &proof.code_sha,
            &proof.code_kzg_sess,
            [
                &proof.pc_comm,
                &proof.op_comm,
                &proof.z_comm,
                &proof.x_comm,
                &proof.y_comm,
                &proof.h_comm,
            ],
        );

        if proof.sumcheck.num_vars >= 32
            || (1u32 << proof.sumcheck.num_vars) != proof.trace_pow2
        {
            return Err(Error::Protocol("sumcheck arity mismatch"));
        }
        sumcheck::verify(&proof.sumcheck, &mut tr, proof.sumcheck.claim)?;
        debug!("sum-check replay complete");

        // --- Opcode spot checks over [0, T−1] ---
        let seed = tr.squeeze();
        let opcode_indices =
            derive_indices(&seed, u64::from(proof.trace_len), self.params.k_opcode);
        if opcode_indices.len() != proof.opcode_openings.len() {
            return Err(Error::Structural("opcode opening count mismatch"));
        }
        for (expected, opening) in opcode_indices.iter().zip(&proof.opcode_openings) {
            if opening.idx != *expected {
                return Err(Error::Protocol("opcode opening index mismatch"));
            }
            if !kzg::verify(
                self.srs,
                &proof.op_comm,
                F::from(opening.idx),
                opening.value,
                &opening.witness,
            ) {
                return Err(Error::Cryptographic("opcode opening pairing fail"));
            }
            if !Opcode::ALL.iter().any(|op| op.field() == opening.value) {
                return Err(Error::Semantic("opcode not allowed"));
            }
        }

        // --- Row spot checks over [0, T−2] (need at least one row pair) ---
        if proof.trace_len < 2 {
            if !proof.row_openings.is_empty() {
                return Err(Error::Structural("row opening count mismatch"));
            }
            return Ok(());
        }
        let row_seed = row_index_seed(&seed);
        let row_indices =
            derive_indices(&row_seed, u64::from(proof.trace_len) - 1, self.params.k_row);
        if row_indices.len() != proof.row_openings.len() {
            return Err(Error::Structural("row opening count mismatch"));
        }
        for (expected, ro) in row_indices.iter().zip(&proof.row_openings) {
            if ro.idx != *expected {
                return Err(Error::Protocol("row opening index mismatch"));
            }
            self.check_row(proof, ro)?;
        }
        debug!("all spot checks passed");
        Ok(())
    }

    fn check_row(&self, proof: &Proof, ro: &RowOpening) -> Result<()> {
        let at_i = F::from(ro.idx);
        let at_next = F::from(ro.idx + 1);

        let pairings: [(&crate::G1, F, &Opening, &'static str); 7] = [
            (&proof.pc_comm, at_i, &ro.pc_i, "pc[i] opening fail"),
            (&proof.pc_comm, at_next, &ro.pc_next, "pc[i+1] opening fail"),
            (&proof.op_comm, at_i, &ro.op, "op[i] opening fail"),
            (&proof.x_comm, at_i, &ro.x, "x[i] opening fail"),
            (&proof.y_comm, at_i, &ro.y, "y[i] opening fail"),
            (&proof.z_comm, at_i, &ro.z, "z[i] opening fail"),
            (&proof.h_comm, at_i, &ro.h, "h[i] opening fail"),
        ];
        for (comm, point, opening, reason) in pairings {
            if !kzg::verify(self.srs, comm, point, opening.value, &opening.witness) {
                return Err(Error::Cryptographic(reason));
            }
        }

        if ro.h.value.is_zero() && ro.pc_next.value != ro.pc_i.value + F::one() {
            return Err(Error::Semantic("pc local transition fail"));
        }

        // Operand relations hold over the low 64 bits of the opened values,
        // with wrapping arithmetic — the same decoding the trace producer
        // used to build the columns.
        match Opcode::from_tag(scalar_to_u64(&ro.op.value)) {
            None => Err(Error::Semantic("unexpected opcode in row check")),
            Some(Opcode::Push) | Some(Opcode::Halt) => Ok(()),
            Some(Opcode::Add) => {
                let (x, y, z) = opened_u64s(ro);
                if z != x.wrapping_add(y) {
                    return Err(Error::Semantic("ADD semantics"));
                }
                Ok(())
            }
            Some(Opcode::Sub) => {
                let (x, y, z) = opened_u64s(ro);
                if z != x.wrapping_sub(y) {
                    return Err(Error::Semantic("SUB semantics"));
                }
                Ok(())
            }
            Some(Opcode::Mul) => {
                let (x, y, z) = opened_u64s(ro);
                if z != x.wrapping_mul(y) {
                    return Err(Error::Semantic("MUL semantics"));
                }
                Ok(())
            }
            Some(Opcode::And) => {
                let (x, y, z) = opened_u64s(ro);
                if z & 0xF != (x & 0xF) & (y & 0xF) {
                    return Err(Error::Semantic("AND semantics"));
                }
                Ok(())
            }
            Some(Opcode::Or) => {
                let (x, y, z) = opened_u64s(ro);
                if z & 0xF != (x & 0xF) | (y & 0xF) {
                    return Err(Error::Semantic("OR semantics"));
                }
                Ok(())
            }
        }
    }
}

fn opened_u64s(ro: &RowOpening) -> (u64, u64, u64) {
    (
        scalar_to_u64(&ro.x.value),
        scalar_to_u64(&ro.y.value),
        scalar_to_u64(&ro.z.value),
    )
}
