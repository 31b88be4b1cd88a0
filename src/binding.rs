//! Code commitment and per-session binding
//!
//! The publisher commits once to a program's source bytes: a SHA-256 digest
//! plus a KZG commitment to the byte polynomial `P_code(X) = Σ byte_i·X^i`.
//! Every proving run then blinds that base with a polynomial derived only
//! from the verifier-chosen `domain_tag`, giving the session commitment
//! `C_sess = C_base + Commit(b)`. The verifier recomputes `Commit(b)` on
//! its side, so a proof issued under one `domain_tag` cannot be replayed
//! under another even though the base commitment is identical.

#![forbid(unsafe_code)]

use ark_ec::{AffineRepr, CurveGroup};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::kzg::{self, Srs};
use crate::poly::Poly;
use crate::transcript::{fr_from_digest, sha256};
use crate::{F, G1};

/// Degree of the session blinding polynomial.
pub const BLINDING_DEGREE: usize = 8;

/// What kind of source bytes were committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Assembly text.
    Asm,
    /// A raw binary.
    Bin,
}

impl SourceKind {
    /// Wire name used in commitment files.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Asm => "asm",
            SourceKind::Bin => "bin",
        }
    }

    /// Reverse of [`SourceKind::as_str`].
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asm" => Some(SourceKind::Asm),
            "bin" => Some(SourceKind::Bin),
            _ => None,
        }
    }
}

/// Publisher-side commitment to a program, immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeCommitment {
    /// SHA-256 of the committed bytes.
    pub code_sha: [u8; 32],
    /// Length of the committed bytes.
    pub code_size: u64,
    /// `Commit(P_code)` under the shared SRS.
    pub code_kzg_base: G1,
    /// Kind of the committed source.
    pub source_kind: SourceKind,
}

/// Verifier-chosen context a proof must bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicInstance {
    /// 32-byte verification-context nonce.
    pub domain_tag: [u8; 32],
    /// SHA-256 of the public inputs.
    pub input_sha: [u8; 32],
}

impl PublicInstance {
    /// Build an instance from a context string and public inputs.
    pub fn for_context(context: &str, inputs: &[i64]) -> Self {
        PublicInstance {
            domain_tag: sha256(context.as_bytes()),
            input_sha: hash_inputs(inputs),
        }
    }
}

/// SHA-256 over the big-endian byte stream of the public inputs.
pub fn hash_inputs(inputs: &[i64]) -> [u8; 32] {
    let mut h = Sha256::new();
    for &v in inputs {
        h.update((v as u64).to_be_bytes());
    }
    h.finalize().into()
}

/// Commit to a program's source bytes.
pub fn commit_code(srs: &Srs, bytes: &[u8], source_kind: SourceKind) -> Result<CodeCommitment> {
    let poly = Poly::from_coeffs(bytes.iter().map(|&b| F::from(u64::from(b))).collect());
    Ok(CodeCommitment {
        code_sha: sha256(bytes),
        code_size: bytes.len() as u64,
        code_kzg_base: kzg::commit(srs, &poly)?,
        source_kind,
    })
}

/// The public blinding polynomial for a session.
///
/// Coefficient `i` is the top-8-byte reduction of
/// `SHA-256("code-blind" ‖ domain_tag ‖ byte(i))`, for `i ∈ [0, 8]`.
pub fn blinding_poly(domain_tag: &[u8; 32]) -> Poly {
    let mut coeffs = Vec::with_capacity(BLINDING_DEGREE + 1);
    for i in 0..=BLINDING_DEGREE {
        let mut h = Sha256::new();
        h.update(b"code-blind");
        h.update(domain_tag);
        h.update([i as u8]);
        let digest: [u8; 32] = h.finalize().into();
        coeffs.push(fr_from_digest(&digest));
    }
    Poly::from_coeffs(coeffs)
}

/// Session code commitment `C_sess = C_base + Commit(b(domain_tag))`.
pub fn session_commitment(srs: &Srs, base: &G1, domain_tag: &[u8; 32]) -> Result<G1> {
    let blind = kzg::commit(srs, &blinding_poly(domain_tag))?;
    Ok((base.into_group() + blind.into_group()).into_affine())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blinding_is_deterministic_per_tag() {
        let tag_a = sha256(b"ctx-1");
        let tag_b = sha256(b"ctx-2");
        assert_eq!(blinding_poly(&tag_a), blinding_poly(&tag_a));
        assert_ne!(blinding_poly(&tag_a), blinding_poly(&tag_b));
        assert_eq!(blinding_poly(&tag_a).len(), BLINDING_DEGREE + 1);
    }

    #[test]
    fn session_commitment_shifts_with_the_tag() {
        let srs = Srs::deterministic(16);
        let cc = commit_code(&srs, b"mov x0, #5", SourceKind::Asm).unwrap();
        let sess_a = session_commitment(&srs, &cc.code_kzg_base, &sha256(b"ctx-1")).unwrap();
        let sess_b = session_commitment(&srs, &cc.code_kzg_base, &sha256(b"ctx-2")).unwrap();
        assert_ne!(sess_a, sess_b);
        assert_ne!(sess_a, cc.code_kzg_base);
        // Recomputation on the verifier side lands on the same point.
        let again = session_commitment(&srs, &cc.code_kzg_base, &sha256(b"ctx-1")).unwrap();
        assert_eq!(sess_a, again);
    }

    #[test]
    fn code_commitment_records_size_and_digest() {
        let srs = Srs::deterministic(16);
        let bytes = b"add x1, x2, x3";
        let cc = commit_code(&srs, bytes, SourceKind::Asm).unwrap();
        assert_eq!(cc.code_size, bytes.len() as u64);
        assert_eq!(cc.code_sha, sha256(bytes));
        let other = commit_code(&srs, b"add x1, x2, x4", SourceKind::Asm).unwrap();
        assert_ne!(cc.code_kzg_base, other.code_kzg_base);
    }

    #[test]
    fn input_hash_of_empty_inputs_matches_empty_string() {
        assert_eq!(hash_inputs(&[]), sha256(b""));
    }
}
