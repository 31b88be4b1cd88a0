//! End-to-end pipeline scenarios: honest acceptance, boundary sizes,
//! forced semantic violations, and binding/replay rejections.

use ark_ec::{AffineRepr, CurveGroup};

use fideszk::binding::{self, PublicInstance, SourceKind};
use fideszk::kzg::Srs;
use fideszk::trace::{Opcode, TraceRow};
use fideszk::transcript::sha256;
use fideszk::{vm, Error, ProtocolParams, Prover, Verifier};

const CODE: &[u8] = b"push 5\npush 7\nadd\nhalt\n";

fn row(pc: u32, opcode: Opcode, x: u64, y: u64, z: u64, is_halt: bool) -> TraceRow {
    TraceRow { pc, opcode, x, y, z, is_halt }
}

fn setup(rows_len: usize) -> (Srs, binding::CodeCommitment, PublicInstance) {
    let trace_pow2 = rows_len.next_power_of_two() as u64;
    let srs = Srs::deterministic(Srs::recommended_len(CODE.len() as u64, trace_pow2));
    let cc = binding::commit_code(&srs, CODE, SourceKind::Asm).unwrap();
    let instance = PublicInstance::for_context("ctx-1", &[]);
    (srs, cc, instance)
}

#[test]
fn smallest_accepting_trace() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 5, false),
        row(1, Opcode::Add, 5, 7, 12, false),
        row(2, Opcode::Halt, 0, 0, 12, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    assert_eq!(instance.domain_tag, sha256(b"ctx-1"));
    assert_eq!(instance.input_sha, sha256(b""));

    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();
    assert_eq!(proof.final_output, 12);
    assert_eq!(proof.trace_len, 3);
    assert_eq!(proof.trace_pow2, 4);
    assert_eq!(proof.opcode_openings.len(), 4);
    assert_eq!(proof.row_openings.len(), 4);

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    verifier.verify(&cc, &instance, &proof).unwrap();
}

#[test]
fn single_row_trace_accepts_without_row_openings() {
    let rows = [row(0, Opcode::Halt, 0, 0, 0, true)];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();

    assert_eq!(proof.sumcheck.rounds.len(), 0);
    assert!(proof.row_openings.is_empty());
    assert_eq!(proof.opcode_openings.len(), 4);
    assert!(proof.opcode_openings.iter().all(|o| o.idx == 0));

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    verifier.verify(&cc, &instance, &proof).unwrap();
}

#[test]
fn two_row_trace_samples_the_only_row_pair() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 9, false),
        row(1, Opcode::Halt, 0, 0, 9, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();
    assert!(proof.row_openings.iter().all(|ro| ro.idx == 0));

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    verifier.verify(&cc, &instance, &proof).unwrap();
}

#[test]
fn broken_add_semantics_are_rejected() {
    // With T = 2 the row-index domain is {0}, so the bad row is always
    // sampled and rejection is deterministic.
    let rows = [
        row(0, Opcode::Add, 5, 7, 13, false),
        row(1, Opcode::Halt, 0, 0, 13, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance, &proof).unwrap_err();
    assert_eq!(err, Error::Semantic("ADD semantics"));
}

#[test]
fn underflowing_sub_program_verifies() {
    // push 3; push 5; sub wraps to 2^64 − 2; the verifier decodes the
    // opened operands the same way and must accept.
    let rows = vm::run(&vm::parse_program("push 3\npush 5\nsub\nhalt\n").unwrap(), 1 << 16);
    assert_eq!(rows[2].x, 3);
    assert_eq!(rows[2].y, 5);
    assert_eq!(rows[2].z, 3u64.wrapping_sub(5));

    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();
    assert_eq!(proof.final_output, u64::MAX - 1);

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    verifier.verify(&cc, &instance, &proof).unwrap();
}

#[test]
fn broken_sub_semantics_are_rejected() {
    // As with the ADD case, T = 2 forces the bad row to be sampled.
    let rows = [
        row(0, Opcode::Sub, 3, 5, 1, false),
        row(1, Opcode::Halt, 0, 0, 1, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance, &proof).unwrap_err();
    assert_eq!(err, Error::Semantic("SUB semantics"));
}

#[test]
fn pc_gap_is_rejected_as_local_transition_failure() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 1, false),
        row(2, Opcode::Halt, 0, 0, 1, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance, &proof).unwrap_err();
    assert_eq!(err, Error::Semantic("pc local transition fail"));
}

#[test]
fn repeated_pc_is_rejected() {
    let rows = [
        row(3, Opcode::Push, 0, 0, 1, false),
        row(3, Opcode::Halt, 0, 0, 1, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance, &proof).unwrap_err();
    assert_eq!(err, Error::Semantic("pc local transition fail"));
}

#[test]
fn proof_does_not_replay_across_domain_tags() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 5, false),
        row(1, Opcode::Halt, 0, 0, 5, true),
    ];
    let (srs, cc, instance_a) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance_a, &rows).unwrap();

    let instance_b = PublicInstance::for_context("ctx-2", &[]);
    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance_b, &proof).unwrap_err();
    assert!(matches!(err, Error::Binding(_)), "got {err:?}");
}

#[test]
fn bit_flips_in_public_values_are_rejected() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 5, false),
        row(1, Opcode::Add, 5, 5, 10, false),
        row(2, Opcode::Halt, 0, 0, 10, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();
    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };

    let mut bad = proof.clone();
    bad.code_sha[0] ^= 1;
    assert_eq!(
        verifier.verify(&cc, &instance, &bad).unwrap_err(),
        Error::Binding("code sha mismatch")
    );

    let mut bad = proof.clone();
    bad.domain_tag[31] ^= 0x80;
    assert_eq!(
        verifier.verify(&cc, &instance, &bad).unwrap_err(),
        Error::Binding("domain tag mismatch")
    );

    let mut bad = proof.clone();
    bad.input_sha[7] ^= 1;
    assert_eq!(
        verifier.verify(&cc, &instance, &bad).unwrap_err(),
        Error::Binding("input hash mismatch")
    );

    // Column commitments feed the transcript; any drift must reject.
    let bump = |p: &fideszk::G1| (p.into_group() + srs.g1_powers[0].into_group()).into_affine();
    let mutations: [fn(&mut fideszk::Proof, fideszk::G1); 3] = [
        |p, g| p.pc_comm = g,
        |p, g| p.op_comm = g,
        |p, g| p.h_comm = g,
    ];
    for mutate in mutations {
        let mut bad = proof.clone();
        let bumped = bump(&bad.pc_comm);
        mutate(&mut bad, bumped);
        assert!(verifier.verify(&cc, &instance, &bad).is_err());
    }

    // Tampered opening values and witnesses.
    let mut bad = proof.clone();
    bad.opcode_openings[0].value += fideszk::F::from(1u64);
    assert!(verifier.verify(&cc, &instance, &bad).is_err());

    let mut bad = proof.clone();
    bad.row_openings[0].z.witness = bump(&bad.row_openings[0].z.witness);
    assert!(verifier.verify(&cc, &instance, &bad).is_err());
}

#[test]
fn zeroed_opcode_witness_fails_the_pairing() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 5, false),
        row(1, Opcode::Halt, 0, 0, 5, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let mut proof = prover.prove(&cc, &instance, &rows).unwrap();
    proof.opcode_openings[0].witness = fideszk::G1::identity();

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance, &proof).unwrap_err();
    assert_eq!(err, Error::Cryptographic("opcode opening pairing fail"));
}

#[test]
fn tampered_sumcheck_claim_breaks_the_round_identity() {
    let rows = [
        row(0, Opcode::Push, 0, 0, 5, false),
        row(1, Opcode::Push, 0, 0, 6, false),
        row(2, Opcode::Halt, 0, 0, 6, true),
    ];
    let (srs, cc, instance) = setup(rows.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let mut proof = prover.prove(&cc, &instance, &rows).unwrap();
    proof.sumcheck.claim += fideszk::F::from(1u64);

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    let err = verifier.verify(&cc, &instance, &proof).unwrap_err();
    assert_eq!(err, Error::Protocol("sumcheck round identity fail"));
}

#[test]
fn vm_program_proves_and_verifies() {
    let text = std::str::from_utf8(CODE).unwrap();
    let rows = vm::run(&vm::parse_program(text).unwrap(), 1 << 16);
    let (srs, cc, instance) = setup(rows.len());

    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).unwrap();
    assert_eq!(proof.final_output, 12);

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    verifier.verify(&cc, &instance, &proof).unwrap();
}

#[test]
fn two_sessions_can_run_concurrently() {
    // The transcript and SRS are plain values; interleaving two proofs in
    // one process must not perturb either result.
    let rows_a = [
        row(0, Opcode::Push, 0, 0, 1, false),
        row(1, Opcode::Halt, 0, 0, 1, true),
    ];
    let rows_b = [
        row(0, Opcode::Push, 0, 0, 2, false),
        row(1, Opcode::Push, 0, 0, 3, false),
        row(2, Opcode::Mul, 2, 3, 6, false),
        row(3, Opcode::Halt, 0, 0, 6, true),
    ];
    let (srs, cc, instance) = setup(rows_b.len());
    let prover = Prover { srs: &srs, params: ProtocolParams::default() };

    let handle = std::thread::scope(|scope| {
        let srs_ref = &srs;
        let cc_ref = &cc;
        let inst = instance;
        let t = scope.spawn(move || {
            let p = Prover { srs: srs_ref, params: ProtocolParams::default() };
            p.prove(cc_ref, &inst, &rows_a).unwrap()
        });
        let proof_b = prover.prove(&cc, &instance, &rows_b).unwrap();
        (t.join().unwrap(), proof_b)
    });
    let (proof_a, proof_b) = handle;

    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };
    verifier.verify(&cc, &instance, &proof_a).unwrap();
    verifier.verify(&cc, &instance, &proof_b).unwrap();
    assert_eq!(proof_a.final_output, 1);
    assert_eq!(proof_b.final_output, 6);
}
