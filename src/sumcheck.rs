//! Sum-check argument over an MLE value table
//!
//! Proves `Σ_{x ∈ {0,1}^n} f(x) = claim` for a function given as its value
//! table of length `2^n`. Round `k` sends the two values `(g(0), g(1))` of
//! the univariate restriction; both are absorbed into the transcript before
//! that round's challenge is squeezed, and the table is folded as
//! `t'[j] = t[2j]·(1−r) + t[2j+1]·r`.
//!
//! After the final round the surviving scalar is accepted as the claimed
//! evaluation of the MLE at the challenge point; no oracle query follows.
//! A rigorous construction would open the committed columns at
//! `(r_0, …, r_{n−1})` and check the constraint identity there — the row
//! spot checks carry that weight instead.

#![forbid(unsafe_code)]

use ark_ff::{One, Zero};

use crate::error::{Error, Result};
use crate::transcript::Transcript;
use crate::F;

/// One round message: the univariate restriction at 0 and at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumcheckRound {
    /// `g(0)` — sum of the even-indexed half of the current table.
    pub g0: F,
    /// `g(1)` — sum of the odd-indexed half.
    pub g1: F,
}

/// Complete sum-check transcript: arity, claimed sum, round messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumcheckProof {
    /// Number of variables `n`; the table has `2^n` entries.
    pub num_vars: u32,
    /// Claimed value of the full sum.
    pub claim: F,
    /// One message per round, in round order.
    pub rounds: Vec<SumcheckRound>,
}

fn fold(table: &[F], r: F) -> Vec<F> {
    let one_minus_r = F::one() - r;
    table
        .chunks(2)
        .map(|pair| pair[0] * one_minus_r + pair[1] * r)
        .collect()
}

/// Run the prover side over `table`, absorbing round messages into `tr`.
///
/// The table length must be a power of two (a length-1 table yields zero
/// rounds and a bare claim).
pub fn prove(table: &[F], tr: &mut Transcript) -> Result<SumcheckProof> {
    if table.is_empty() || !table.len().is_power_of_two() {
        return Err(Error::Internal("sum-check table length must be a power of two"));
    }
    let num_vars = table.len().trailing_zeros();
    let claim: F = table.iter().sum();

    let mut cur = table.to_vec();
    let mut rounds = Vec::with_capacity(num_vars as usize);
    for _ in 0..num_vars {
        let mut g0 = F::zero();
        let mut g1 = F::zero();
        for pair in cur.chunks(2) {
            g0 += pair[0];
            g1 += pair[1];
        }
        tr.absorb_fr(&g0);
        tr.absorb_fr(&g1);
        let r = tr.challenge();
        cur = fold(&cur, r);
        rounds.push(SumcheckRound { g0, g1 });
    }
    Ok(SumcheckProof { num_vars, claim, rounds })
}

/// Replay the verifier side against `claimed_sum`.
///
/// Checks the round identity `g(0) + g(1) = current_sum`, absorbs the
/// messages in the prover's order, and folds the running sum with each
/// squeezed challenge. The value surviving the last round is accepted
/// as-is (see the module doc).
pub fn verify(proof: &SumcheckProof, tr: &mut Transcript, claimed_sum: F) -> Result<()> {
    if proof.rounds.len() != proof.num_vars as usize {
        return Err(Error::Protocol("sumcheck round count mismatch"));
    }
    let mut cur = claimed_sum;
    for round in &proof.rounds {
        if round.g0 + round.g1 != cur {
            return Err(Error::Protocol("sumcheck round identity fail"));
        }
        tr.absorb_fr(&round.g0);
        tr.absorb_fr(&round.g1);
        let r = tr.challenge();
        cur = round.g0 + (round.g1 - round.g0) * r;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use rand::{rngs::StdRng, SeedableRng};

    fn table(rng: &mut StdRng, n: usize) -> Vec<F> {
        (0..1usize << n).map(|_| F::rand(rng)).collect()
    }

    #[test]
    fn honest_prover_verifies_for_all_arities() {
        let mut rng = StdRng::from_seed([31u8; 32]);
        for n in 0..6 {
            let t = table(&mut rng, n);
            let sum: F = t.iter().sum();
            let mut tr_p = Transcript::new();
            let proof = prove(&t, &mut tr_p).unwrap();
            assert_eq!(proof.claim, sum);
            assert_eq!(proof.rounds.len(), n);
            let mut tr_v = Transcript::new();
            verify(&proof, &mut tr_v, sum).unwrap();
            // Both sides must leave the transcript in the same state.
            assert_eq!(tr_p.squeeze(), tr_v.squeeze());
        }
    }

    #[test]
    fn wrong_claim_is_rejected() {
        let mut rng = StdRng::from_seed([32u8; 32]);
        let t = table(&mut rng, 4);
        let sum: F = t.iter().sum();
        let proof = prove(&t, &mut Transcript::new()).unwrap();
        let err = verify(&proof, &mut Transcript::new(), sum + F::one()).unwrap_err();
        assert_eq!(err, Error::Protocol("sumcheck round identity fail"));
    }

    #[test]
    fn tampered_round_is_rejected() {
        let mut rng = StdRng::from_seed([33u8; 32]);
        let t = table(&mut rng, 3);
        let sum: F = t.iter().sum();
        let mut proof = prove(&t, &mut Transcript::new()).unwrap();
        proof.rounds[1].g1 += F::one();
        assert!(verify(&proof, &mut Transcript::new(), sum).is_err());
    }

    #[test]
    fn round_count_must_match_arity() {
        let mut rng = StdRng::from_seed([34u8; 32]);
        let t = table(&mut rng, 2);
        let sum: F = t.iter().sum();
        let mut proof = prove(&t, &mut Transcript::new()).unwrap();
        proof.rounds.pop();
        let err = verify(&proof, &mut Transcript::new(), sum).unwrap_err();
        assert_eq!(err, Error::Protocol("sumcheck round count mismatch"));
    }

    #[test]
    fn non_power_of_two_table_is_refused() {
        let t = vec![F::one(); 3];
        assert!(prove(&t, &mut Transcript::new()).is_err());
    }
}
