//! Text codecs for commitment and proof files
//!
//! Both formats are newline-separated `key:value` lines in a fixed order,
//! with section sizes declared up front (`sc_rounds`, `op_openings`,
//! `row_openings`). Parsing is a strict line-oriented state machine: every
//! key must appear exactly where the format says, sections are read to
//! their declared sizes, and trailing data is an error. Group elements are
//! the compressed arkworks form, scalars the 32-byte little-endian form,
//! both printed as lowercase unprefixed hex.

#![forbid(unsafe_code)]

use std::fmt::Write as _;

use ark_ec::AffineRepr;
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::binding::{CodeCommitment, SourceKind};
use crate::error::{Error, Result};
use crate::kzg::Opening;
use crate::sumcheck::{SumcheckProof, SumcheckRound};
use crate::{F, G1, OpcodeOpening, Proof, RowOpening};

// ----------------------------- hex helpers -----------------------------

/// Lowercase unprefixed hex of arbitrary bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Strict inverse of [`to_hex`]; accepts upper- and lowercase digits.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::Internal("bad hex"));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for pair in bytes.chunks(2) {
        let hi = hex_nibble(pair[0])?;
        let lo = hex_nibble(pair[1])?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::Internal("bad hex")),
    }
}

/// A 32-byte digest from hex, rejecting any other length.
pub fn digest_from_hex(s: &str) -> Result<[u8; 32]> {
    let bytes = from_hex(s)?;
    bytes
        .try_into()
        .map_err(|_| Error::Internal("digest must be 32 bytes"))
}

/// Compressed `G1` hex.
pub fn g1_to_hex(p: &G1) -> String {
    let mut bytes = Vec::new();
    p.serialize_compressed(&mut bytes)
        .expect("group serialization into a Vec cannot fail");
    to_hex(&bytes)
}

/// Inverse of [`g1_to_hex`].
pub fn g1_from_hex(s: &str) -> Result<G1> {
    let bytes = from_hex(s)?;
    G1::deserialize_compressed(bytes.as_slice())
        .map_err(|_| Error::Internal("group deserialization failed"))
}

/// 32-byte little-endian `Fr` hex.
pub fn fr_to_hex(x: &F) -> String {
    let mut bytes = Vec::new();
    x.serialize_compressed(&mut bytes)
        .expect("field serialization into a Vec cannot fail");
    to_hex(&bytes)
}

/// Inverse of [`fr_to_hex`].
pub fn fr_from_hex(s: &str) -> Result<F> {
    let bytes = from_hex(s)?;
    F::deserialize_compressed(bytes.as_slice())
        .map_err(|_| Error::Internal("field deserialization failed"))
}

// ----------------------------- line reader -----------------------------

struct Reader<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self { lines: text.lines() }
    }

    /// Consume the next line, requiring exactly `key`.
    fn expect(&mut self, key: &str) -> Result<&'a str> {
        let line = self
            .lines
            .next()
            .ok_or(Error::Structural("unexpected end of file"))?;
        let (k, v) = line
            .split_once(':')
            .ok_or(Error::Structural("missing key separator"))?;
        if k != key {
            return Err(Error::Structural("unknown key"));
        }
        Ok(v)
    }

    fn expect_u64(&mut self, key: &str) -> Result<u64> {
        self.expect(key)?
            .parse::<u64>()
            .map_err(|_| Error::Structural("invalid integer"))
    }

    fn expect_u32(&mut self, key: &str) -> Result<u32> {
        self.expect(key)?
            .parse::<u32>()
            .map_err(|_| Error::Structural("invalid integer"))
    }

    fn finish(mut self) -> Result<()> {
        if self.lines.next().is_some() {
            return Err(Error::Structural("trailing data"));
        }
        Ok(())
    }
}

// ----------------------------- commitment -----------------------------

/// Render a commitment in the `.com` text format.
pub fn serialize_commitment(cc: &CodeCommitment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "version:1");
    let _ = writeln!(out, "source:{}", cc.source_kind.as_str());
    let _ = writeln!(out, "code_size:{}", cc.code_size);
    let _ = writeln!(out, "code_sha:{}", to_hex(&cc.code_sha));
    let _ = writeln!(out, "code_kzg_base:{}", g1_to_hex(&cc.code_kzg_base));
    out
}

/// Parse a `.com` file produced by [`serialize_commitment`].
pub fn parse_commitment(text: &str) -> Result<CodeCommitment> {
    let mut r = Reader::new(text);
    if r.expect("version")? != "1" {
        return Err(Error::Structural("unsupported version"));
    }
    let source_kind = SourceKind::from_str(r.expect("source")?)
        .ok_or(Error::Structural("unknown source kind"))?;
    let code_size = r.expect_u64("code_size")?;
    let code_sha = digest_from_hex(r.expect("code_sha")?)?;
    let code_kzg_base = g1_from_hex(r.expect("code_kzg_base")?)?;
    r.finish()?;
    Ok(CodeCommitment { code_sha, code_size, code_kzg_base, source_kind })
}

// ------------------------------- proof ---------------------------------

/// Render a proof in the `.prf` text format.
pub fn serialize_proof(proof: &Proof) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "version:1");
    let _ = writeln!(out, "code_sha:{}", to_hex(&proof.code_sha));
    let _ = writeln!(out, "domain_tag:{}", to_hex(&proof.domain_tag));
    let _ = writeln!(out, "input_sha:{}", to_hex(&proof.input_sha));
    let _ = writeln!(out, "code_kzg_sess:{}", g1_to_hex(&proof.code_kzg_sess));
    let _ = writeln!(out, "pc_comm:{}", g1_to_hex(&proof.pc_comm));
    let _ = writeln!(out, "op_comm:{}", g1_to_hex(&proof.op_comm));
    let _ = writeln!(out, "z_comm:{}", g1_to_hex(&proof.z_comm));
    let _ = writeln!(out, "x_comm:{}", g1_to_hex(&proof.x_comm));
    let _ = writeln!(out, "y_comm:{}", g1_to_hex(&proof.y_comm));
    let _ = writeln!(out, "h_comm:{}", g1_to_hex(&proof.h_comm));
    let _ = writeln!(out, "trace_len:{}", proof.trace_len);
    let _ = writeln!(out, "trace_pow2:{}", proof.trace_pow2);

    let _ = writeln!(out, "sc_n:{}", proof.sumcheck.num_vars);
    let _ = writeln!(out, "sc_claim:{}", fr_to_hex(&proof.sumcheck.claim));
    let _ = writeln!(out, "sc_rounds:{}", proof.sumcheck.rounds.len());
    for (i, round) in proof.sumcheck.rounds.iter().enumerate() {
        let _ = writeln!(out, "sc_r{i}_g0:{}", fr_to_hex(&round.g0));
        let _ = writeln!(out, "sc_r{i}_g1:{}", fr_to_hex(&round.g1));
    }

    let _ = writeln!(out, "op_openings:{}", proof.opcode_openings.len());
    for opening in &proof.opcode_openings {
        let _ = writeln!(out, "op_idx:{}", opening.idx);
        let _ = writeln!(out, "op_val:{}", fr_to_hex(&opening.value));
        let _ = writeln!(out, "op_wit:{}", g1_to_hex(&opening.witness));
    }

    let _ = writeln!(out, "row_openings:{}", proof.row_openings.len());
    for ro in &proof.row_openings {
        let _ = writeln!(out, "row_idx:{}", ro.idx);
        for (name, opening) in row_opening_fields(ro) {
            let _ = writeln!(out, "{name}_val:{}", fr_to_hex(&opening.value));
            let _ = writeln!(out, "{name}_wit:{}", g1_to_hex(&opening.witness));
        }
    }

    let _ = writeln!(out, "final_output:{}", proof.final_output);
    out
}

const ROW_FIELD_NAMES: [&str; 7] = ["pc_i", "pc_ip1", "op_i", "x_i", "y_i", "z_i", "h_i"];

fn row_opening_fields(ro: &RowOpening) -> [(&'static str, &Opening); 7] {
    [
        ("pc_i", &ro.pc_i),
        ("pc_ip1", &ro.pc_next),
        ("op_i", &ro.op),
        ("x_i", &ro.x),
        ("y_i", &ro.y),
        ("z_i", &ro.z),
        ("h_i", &ro.h),
    ]
}

/// Parse a `.prf` file produced by [`serialize_proof`].
pub fn parse_proof(text: &str) -> Result<Proof> {
    let mut r = Reader::new(text);
    if r.expect("version")? != "1" {
        return Err(Error::Structural("unsupported version"));
    }
    let code_sha = digest_from_hex(r.expect("code_sha")?)?;
    let domain_tag = digest_from_hex(r.expect("domain_tag")?)?;
    let input_sha = digest_from_hex(r.expect("input_sha")?)?;
    let code_kzg_sess = g1_from_hex(r.expect("code_kzg_sess")?)?;
    let pc_comm = g1_from_hex(r.expect("pc_comm")?)?;
    let op_comm = g1_from_hex(r.expect("op_comm")?)?;
    let z_comm = g1_from_hex(r.expect("z_comm")?)?;
    let x_comm = g1_from_hex(r.expect("x_comm")?)?;
    let y_comm = g1_from_hex(r.expect("y_comm")?)?;
    let h_comm = g1_from_hex(r.expect("h_comm")?)?;
    let trace_len = r.expect_u32("trace_len")?;
    let trace_pow2 = r.expect_u32("trace_pow2")?;

    let num_vars = r.expect_u32("sc_n")?;
    let claim = fr_from_hex(r.expect("sc_claim")?)?;
    let round_count = r.expect_u64("sc_rounds")?;
    if round_count > 32 {
        return Err(Error::Structural("sumcheck section too large"));
    }
    let mut rounds = Vec::new();
    for i in 0..round_count {
        let g0 = fr_from_hex(r.expect(&format!("sc_r{i}_g0"))?)?;
        let g1 = fr_from_hex(r.expect(&format!("sc_r{i}_g1"))?)?;
        rounds.push(SumcheckRound { g0, g1 });
    }
    let sumcheck = SumcheckProof { num_vars, claim, rounds };

    let opcode_count = r.expect_u64("op_openings")?;
    let mut opcode_openings = Vec::new();
    for _ in 0..opcode_count {
        let idx = r.expect_u64("op_idx")?;
        let value = fr_from_hex(r.expect("op_val")?)?;
        let witness = g1_from_hex(r.expect("op_wit")?)?;
        opcode_openings.push(OpcodeOpening { idx, value, witness });
    }

    let row_count = r.expect_u64("row_openings")?;
    let mut row_openings = Vec::new();
    for _ in 0..row_count {
        let idx = r.expect_u64("row_idx")?;
        let mut opened = [Opening { value: F::zero(), witness: G1::identity() }; 7];
        for (slot, name) in opened.iter_mut().zip(ROW_FIELD_NAMES) {
            let value = fr_from_hex(r.expect(&format!("{name}_val"))?)?;
            let witness = g1_from_hex(r.expect(&format!("{name}_wit"))?)?;
            *slot = Opening { value, witness };
        }
        let [pc_i, pc_next, op, x, y, z, h] = opened;
        row_openings.push(RowOpening { idx, pc_i, pc_next, op, x, y, z, h });
    }

    let final_output = r.expect_u64("final_output")?;
    r.finish()?;

    Ok(Proof {
        code_sha,
        domain_tag,
        input_sha,
        code_kzg_sess,
        pc_comm,
        op_comm,
        z_comm,
        x_comm,
        y_comm,
        h_comm,
        trace_len,
        trace_pow2,
        sumcheck,
        opcode_openings,
        row_openings,
        final_output,
    })
}
