//! KZG polynomial commitments on BN254
//!
//! Monomial-basis commitments against a structured reference string of
//! `G1` powers, with single-point openings checked by one pairing equation:
//!
//! ```text
//!   e(C − y·G1, [1]G2)  ==  e(π, [τ]G2 − z·[1]G2)
//! ```
//!
//! The `G1` on the left is always `srs.g1_powers[0]` — the same hashed
//! generator the commitment was built from, never an arbitrary one.
//!
//! Generators are derived by hashing fixed domain-separation strings to the
//! curve, so prover and verifier agree on them without exchanging a setup
//! file. The SRS itself comes in two flavors: a CSPRNG `τ` for throwaway
//! per-proof setups, and a `τ` derived from a published seed so that both
//! sides can reconstruct an identical SRS from sizes alone.

#![forbid(unsafe_code)]

use ark_bn254::{Bn254, Fq, Fq2, G1Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, Group};
use ark_ff::{One, PrimeField, UniformRand, Zero};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::poly::Poly;
use crate::{F, G1, G2};

/// Domain-separation string hashed to the `G1` generator.
const G1_GENERATOR_TAG: &[u8] = b"fidesinnova-g1";
/// Domain-separation string hashed to the `G2` generator.
const G2_GENERATOR_TAG: &[u8] = b"fidesinnova-g2";
/// Seed for the deterministic trusted-setup secret.
const SRS_TAU_SEED: &[u8] = b"fidesinnova_srs";

/// Degree headroom added on top of the committed sizes when choosing the
/// SRS length (covers the session-blinding polynomial and quotients).
pub const SRS_DEGREE_SLACK: u64 = 64;

/// Structured reference string shared read-only by prover and verifier.
///
/// Invariant: `g1_powers[i] = τ^i · g1_powers[0]` and `g2_tau = τ · g2_one`
/// for a secret `τ` that is discarded after construction.
#[derive(Debug, Clone)]
pub struct Srs {
    /// `[τ^0]G1, [τ^1]G1, …` — index 0 is the hashed generator.
    pub g1_powers: Vec<G1>,
    /// `[1]G2`, the hashed `G2` generator.
    pub g2_one: G2,
    /// `[τ]G2`, the verification key for the pairing check.
    pub g2_tau: G2,
}

impl Srs {
    /// Deterministic setup: `τ = SHA-256("fidesinnova_srs")` reduced into
    /// the scalar field. Both sides rebuild the same SRS from `len` alone,
    /// so no SRS bytes ever travel inside a proof.
    pub fn deterministic(len: usize) -> Self {
        let tau = F::from_le_bytes_mod_order(&crate::transcript::sha256(SRS_TAU_SEED));
        Self::from_tau(len, tau)
    }

    /// Sampled setup: `τ` drawn from the caller's CSPRNG. Suitable for
    /// self-contained demo proofs only; the verifier must receive this SRS
    /// out of band.
    pub fn generate<R: rand::Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        Self::from_tau(len, F::rand(rng))
    }

    /// Number of `G1` powers needed for a code of `code_size` bytes and a
    /// trace padded to `trace_pow2` rows: `max(code_size−1, T₂−1) + 64 + 1`.
    pub fn recommended_len(code_size: u64, trace_pow2: u64) -> usize {
        let max_degree = code_size.saturating_sub(1).max(trace_pow2.saturating_sub(1));
        (max_degree + SRS_DEGREE_SLACK + 1) as usize
    }

    fn from_tau(len: usize, tau: F) -> Self {
        let g1 = hash_to_g1(G1_GENERATOR_TAG);
        let g2 = hash_to_g2(G2_GENERATOR_TAG);
        let len = len.max(1);
        let mut powers = Vec::with_capacity(len);
        let mut pow = F::one();
        for _ in 0..len {
            powers.push(g1.into_group().mul_bigint(pow.into_bigint()).into_affine());
            pow *= tau;
        }
        let g2_tau = g2.into_group().mul_bigint(tau.into_bigint()).into_affine();
        Srs { g1_powers: powers, g2_one: g2, g2_tau }
    }
}

/// A single-point opening: the claimed value `P(z)` and the witness
/// commitment to `(P(X) − P(z)) / (X − z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opening {
    /// Claimed evaluation `P(z)`.
    pub value: F,
    /// Commitment to the quotient polynomial.
    pub witness: G1,
}

/// Commit to a polynomial: `Σ coeffs[i] · [τ^i]G1`, skipping zero scalars.
pub fn commit(srs: &Srs, poly: &Poly) -> Result<G1> {
    if poly.coeffs.len() > srs.g1_powers.len() {
        return Err(Error::Internal("polynomial degree exceeds SRS"));
    }
    let mut acc = G1Projective::zero();
    for (i, c) in poly.coeffs.iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        acc += srs.g1_powers[i].into_group().mul_bigint(c.into_bigint());
    }
    Ok(acc.into_affine())
}

/// Open `poly` at `z`: evaluate, divide by `(X − z)`, commit the quotient.
pub fn open(srs: &Srs, poly: &Poly, z: F) -> Result<Opening> {
    let (quotient, value) = poly.divide_by_linear(z);
    let witness = commit(srs, &quotient)?;
    Ok(Opening { value, witness })
}

/// Check one opening with the pairing equation. Returns `true` on success.
pub fn verify(srs: &Srs, commitment: &G1, z: F, value: F, witness: &G1) -> bool {
    let g1 = srs.g1_powers[0];
    let c_minus_y = (commitment.into_group() - g1.into_group().mul_bigint(value.into_bigint()))
        .into_affine();
    let tau_minus_z = (srs.g2_tau.into_group()
        - srs.g2_one.into_group().mul_bigint(z.into_bigint()))
    .into_affine();
    Bn254::pairing(c_minus_y, srs.g2_one) == Bn254::pairing(*witness, tau_minus_z)
}

/// Hash a tag to a `G1` point by SHA-256 try-and-increment on the
/// x-coordinate. BN254's `G1` has cofactor one, so any curve point is
/// already in the prime-order subgroup.
pub fn hash_to_g1(tag: &[u8]) -> G1 {
    let mut counter: u32 = 0;
    loop {
        let mut h = Sha256::new();
        h.update(tag);
        h.update(counter.to_be_bytes());
        let digest: [u8; 32] = h.finalize().into();
        let x = Fq::from_le_bytes_mod_order(&digest);
        if let Some(p) = G1::get_point_from_x_unchecked(x, digest[0] & 1 == 1) {
            let p = p.clear_cofactor();
            if !p.is_zero() {
                return p;
            }
        }
        counter += 1;
    }
}

/// Hash a tag to a `G2` point. The quadratic-extension x-coordinate takes
/// one digest per component; cofactor clearing moves the candidate into the
/// prime-order subgroup.
pub fn hash_to_g2(tag: &[u8]) -> G2 {
    let mut counter: u32 = 0;
    loop {
        let mut h0 = Sha256::new();
        h0.update(tag);
        h0.update(counter.to_be_bytes());
        h0.update([0u8]);
        let d0: [u8; 32] = h0.finalize().into();
        let mut h1 = Sha256::new();
        h1.update(tag);
        h1.update(counter.to_be_bytes());
        h1.update([1u8]);
        let d1: [u8; 32] = h1.finalize().into();
        let x = Fq2::new(Fq::from_le_bytes_mod_order(&d0), Fq::from_le_bytes_mod_order(&d1));
        if let Some(p) = G2::get_point_from_x_unchecked(x, d0[0] & 1 == 1) {
            let p = p.clear_cofactor();
            if !p.is_zero() && p.is_in_correct_subgroup_assuming_on_curve() {
                return p;
            }
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use rand::{rngs::StdRng, SeedableRng};

    const SRS_LEN: usize = 33; // supports degree 32

    fn rand_poly(rng: &mut StdRng, len: usize) -> Poly {
        let mut coeffs: Vec<F> = (0..len).map(|_| F::rand(rng)).collect();
        if let Some(top) = coeffs.last_mut() {
            if top.is_zero() {
                *top = F::one();
            }
        }
        Poly::from_coeffs(coeffs)
    }

    #[test]
    fn generators_are_deterministic_and_distinct() {
        assert_eq!(hash_to_g1(G1_GENERATOR_TAG), hash_to_g1(G1_GENERATOR_TAG));
        assert_ne!(hash_to_g1(G1_GENERATOR_TAG), hash_to_g1(b"some-other-tag"));
        assert_eq!(hash_to_g2(G2_GENERATOR_TAG), hash_to_g2(G2_GENERATOR_TAG));
    }

    #[test]
    fn deterministic_srs_is_reproducible() {
        let a = Srs::deterministic(8);
        let b = Srs::deterministic(12);
        assert_eq!(a.g1_powers[..8], b.g1_powers[..8]);
        assert_eq!(a.g2_tau, b.g2_tau);
    }

    #[test]
    fn opens_verify_across_degrees() {
        // d ∈ {0, 1, N/2, N} with random (P, z) pairs for each degree.
        let srs = Srs::deterministic(SRS_LEN);
        let mut rng = StdRng::from_seed([21u8; 32]);
        for len in [1usize, 2, SRS_LEN / 2 + 1, SRS_LEN] {
            for _ in 0..25 {
                let p = rand_poly(&mut rng, len);
                let z = F::rand(&mut rng);
                let c = commit(&srs, &p).unwrap();
                let o = open(&srs, &p, z).unwrap();
                assert_eq!(o.value, p.eval(z));
                assert!(verify(&srs, &c, z, o.value, &o.witness));
            }
        }
    }

    #[test]
    fn tampered_openings_fail() {
        let srs = Srs::deterministic(SRS_LEN);
        let mut rng = StdRng::from_seed([22u8; 32]);
        let p = rand_poly(&mut rng, 9);
        let z = F::rand(&mut rng);
        let c = commit(&srs, &p).unwrap();
        let o = open(&srs, &p, z).unwrap();
        assert!(!verify(&srs, &c, z, o.value + F::one(), &o.witness));
        assert!(!verify(&srs, &c, z + F::one(), o.value, &o.witness));
        let bad_witness = srs.g1_powers[1];
        assert!(!verify(&srs, &c, z, o.value, &bad_witness));
    }

    #[test]
    fn oversized_polynomial_is_rejected() {
        let srs = Srs::deterministic(4);
        let p = Poly::from_coeffs((0..5).map(|i| F::from(i as u64 + 1)).collect());
        assert!(matches!(commit(&srs, &p), Err(Error::Internal(_))));
    }

    #[test]
    fn sampled_srs_also_verifies() {
        let mut rng = StdRng::from_seed([23u8; 32]);
        let srs = Srs::generate(9, &mut rng);
        let p = rand_poly(&mut rng, 6);
        let z = F::rand(&mut rng);
        let c = commit(&srs, &p).unwrap();
        let o = open(&srs, &p, z).unwrap();
        assert!(verify(&srs, &c, z, o.value, &o.witness));
    }
}
