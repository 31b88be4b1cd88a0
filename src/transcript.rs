//! Fiat–Shamir transcript
//!
//! The transcript is an **owned** append-only byte buffer; it is threaded by
//! value through the prover and verifier so two proofs can run concurrently
//! in one process. Absorption appends the canonical fixed-size serialization
//! of each value (32-byte digests raw, `Fr` as 32 bytes little-endian, `G1`
//! compressed), with no length prefixes. Squeezing hashes the whole buffer
//! with SHA-256; a field challenge lifts the **top 8 digest bytes** (big
//! endian) into `Fr`. The narrow reduction is part of the wire protocol and
//! must match on both sides — do not widen it unilaterally.

#![forbid(unsafe_code)]

use ark_serialize::CanonicalSerialize;
use sha2::{Digest, Sha256};

use crate::{F, G1};

/// Domain-separation byte appended to the index seed before deriving the
/// row-sample index stream (the opcode stream uses the seed directly).
const ROW_STREAM_TAG: u8 = 0x52;

/// SHA-256 convenience wrapper used throughout the crate.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(data);
    h.finalize().into()
}

/// Lift the top 8 bytes of a digest into a field element (big-endian u64).
pub(crate) fn fr_from_digest(digest: &[u8; 32]) -> F {
    let mut top = [0u8; 8];
    top.copy_from_slice(&digest[..8]);
    F::from(u64::from_be_bytes(top))
}

/// Append-only Fiat–Shamir state.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    buf: Vec<u8>,
}

impl Transcript {
    /// Fresh transcript with an empty buffer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Absorb a 32-byte digest verbatim.
    pub fn absorb_digest(&mut self, digest: &[u8; 32]) {
        self.buf.extend_from_slice(digest);
    }

    /// Absorb a scalar in its canonical 32-byte little-endian form.
    pub fn absorb_fr(&mut self, x: &F) {
        x.serialize_compressed(&mut self.buf)
            .expect("field serialization into a Vec cannot fail");
    }

    /// Absorb a `G1` point in compressed form.
    pub fn absorb_g1(&mut self, p: &G1) {
        p.serialize_compressed(&mut self.buf)
            .expect("group serialization into a Vec cannot fail");
    }

    /// Hash the accumulated buffer into a 32-byte digest.
    ///
    /// Squeezing does not mutate the transcript; the state advances only
    /// through absorption.
    pub fn squeeze(&self) -> [u8; 32] {
        sha256(&self.buf)
    }

    /// Derive a field challenge from the current state.
    pub fn challenge(&self) -> F {
        fr_from_digest(&self.squeeze())
    }
}

/// Derive `count` indices in `[0, domain)` from a 32-byte seed.
///
/// Each step hashes `state ‖ counter` (32-bit big-endian counter cycling
/// through 0..4 per batch), takes the top 8 digest bytes modulo `domain`,
/// and advances the state to the latest digest.
pub fn derive_indices(seed: &[u8; 32], domain: u64, count: usize) -> Vec<u64> {
    let modulus = domain.max(1);
    let mut out = Vec::with_capacity(count);
    let mut state = *seed;
    while out.len() < count {
        for counter in 0u32..4 {
            if out.len() == count {
                break;
            }
            let mut h = Sha256::new();
            h.update(state);
            h.update(counter.to_be_bytes());
            let digest: [u8; 32] = h.finalize().into();
            let mut top = [0u8; 8];
            top.copy_from_slice(&digest[..8]);
            out.push(u64::from_be_bytes(top) % modulus);
            state = digest;
        }
    }
    out
}

/// Seed for the row-sample index stream: `SHA-256(seed ‖ 0x52)`.
pub fn row_index_seed(seed: &[u8; 32]) -> [u8; 32] {
    let mut bytes = [0u8; 33];
    bytes[..32].copy_from_slice(seed);
    bytes[32] = ROW_STREAM_TAG;
    sha256(&bytes)
}
