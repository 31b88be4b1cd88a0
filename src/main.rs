//! Command-line pipeline driver
//!
//! Usage:
//!   fideszk commit <program.s>
//!   fideszk prove  <program.s> [--domain TAG] [--steps N]
//!   fideszk verify <program.com> <program.prf> [--domain TAG]
//!
//! `commit` writes `<base>.com` next to the source. `prove` reads
//! `<base>.com`, executes the program on the built-in VM, and writes
//! `<base>.prf`. `verify` exits 0 on accept and 1 on reject with the reason
//! printed; exit code 2 is reserved for internal errors (unreadable or
//! malformed files, bad hex).
//!
//! The `--domain` tag names the verification context; its SHA-256 becomes
//! the instance `domain_tag`, so prover and verifier must agree on it.

#![forbid(unsafe_code)]

use std::{env, fs, path::Path};

use anyhow::{anyhow, bail, Context};

use fideszk::binding::{self, PublicInstance, SourceKind};
use fideszk::kzg::Srs;
use fideszk::transcript::sha256;
use fideszk::{codec, vm, ProtocolParams, Prover, Verifier};

const DEFAULT_DOMAIN: &str = "default-domain";
// Interpolation is cubic in the padded trace length, so the default step
// bound keeps a full prove run in the seconds range.
const DEFAULT_MAX_STEPS: usize = 256;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn positional(args: &[String], n: usize) -> Option<&String> {
    let mut seen = 0;
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a.starts_with("--") {
            it.next(); // skip the flag's value
            continue;
        }
        if seen == n {
            return Some(a);
        }
        seen += 1;
    }
    None
}

fn usage() -> i32 {
    eprintln!(
        "Usage:\n  fideszk commit <program.s>\n  fideszk prove  <program.s> [--domain TAG] [--steps N]\n  fideszk verify <program.com> <program.prf> [--domain TAG]"
    );
    1
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<i32> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("commit") => cmd_commit(&args[1..]),
        Some("prove") => cmd_prove(&args[1..]),
        Some("verify") => cmd_verify(&args[1..]),
        _ => Ok(usage()),
    }
}

fn source_kind_of(path: &Path) -> SourceKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some("s") | Some("asm") => SourceKind::Asm,
        _ => SourceKind::Bin,
    }
}

fn cmd_commit(args: &[String]) -> anyhow::Result<i32> {
    let Some(path) = positional(args, 0) else {
        return Ok(usage());
    };
    let path = Path::new(path);
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if bytes.is_empty() {
        bail!("empty code file: {}", path.display());
    }

    let srs = Srs::deterministic(Srs::recommended_len(bytes.len() as u64, 0));
    let cc = binding::commit_code(&srs, &bytes, source_kind_of(path)).map_err(|e| anyhow!(e))?;

    let out = path.with_extension("com");
    fs::write(&out, codec::serialize_commitment(&cc))
        .with_context(|| format!("writing {}", out.display()))?;

    println!("Commitment written to {}", out.display());
    println!("  source       : {}", cc.source_kind.as_str());
    println!("  code_size    : {}", cc.code_size);
    println!("  code_sha     : {}", codec::to_hex(&cc.code_sha));
    println!("  code_kzg_base: {}", codec::g1_to_hex(&cc.code_kzg_base));
    Ok(0)
}

fn cmd_prove(args: &[String]) -> anyhow::Result<i32> {
    let Some(path) = positional(args, 0) else {
        return Ok(usage());
    };
    let path = Path::new(path);
    let domain = parse_flag(args, "--domain").unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
    let max_steps: usize = match parse_flag(args, "--steps") {
        Some(s) => s.parse().context("--steps must be a positive integer")?,
        None => DEFAULT_MAX_STEPS,
    };

    let com_path = path.with_extension("com");
    let cc = codec::parse_commitment(
        &fs::read_to_string(&com_path)
            .with_context(|| format!("reading {}", com_path.display()))?,
    )
    .map_err(|e| anyhow!(e))?;

    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if sha256(&bytes) != cc.code_sha {
        bail!("program does not match its commitment: {}", com_path.display());
    }

    let program = vm::parse_program(std::str::from_utf8(&bytes).context("program is not UTF-8")?)
        .map_err(|e| anyhow!(e))?;
    let rows = vm::run(&program, max_steps);

    let trace_pow2 = rows.len().next_power_of_two() as u64;
    let srs = Srs::deterministic(Srs::recommended_len(cc.code_size, trace_pow2));
    let instance = PublicInstance::for_context(&domain, &[]);

    let prover = Prover { srs: &srs, params: ProtocolParams::default() };
    let proof = prover.prove(&cc, &instance, &rows).map_err(|e| anyhow!(e))?;

    let out = path.with_extension("prf");
    fs::write(&out, codec::serialize_proof(&proof))
        .with_context(|| format!("writing {}", out.display()))?;

    println!("Proof written to {}", out.display());
    println!("  domain        : {domain}");
    println!("  trace_len     : {}", proof.trace_len);
    println!("  trace_pow2    : {}", proof.trace_pow2);
    println!("  code_kzg_sess : {}", codec::g1_to_hex(&proof.code_kzg_sess));
    println!("  final_output  : {}", proof.final_output);
    Ok(0)
}

fn cmd_verify(args: &[String]) -> anyhow::Result<i32> {
    let (Some(com_path), Some(prf_path)) = (positional(args, 0), positional(args, 1)) else {
        return Ok(usage());
    };
    let domain = parse_flag(args, "--domain").unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

    let cc = codec::parse_commitment(
        &fs::read_to_string(com_path).with_context(|| format!("reading {com_path}"))?,
    )
    .map_err(|e| anyhow!(e))?;
    let proof = codec::parse_proof(
        &fs::read_to_string(prf_path).with_context(|| format!("reading {prf_path}"))?,
    )
    .map_err(|e| anyhow!(e))?;

    let instance = PublicInstance::for_context(&domain, &[]);
    let srs = Srs::deterministic(Srs::recommended_len(cc.code_size, u64::from(proof.trace_pow2)));
    let verifier = Verifier { srs: &srs, params: ProtocolParams::default() };

    match verifier.verify(&cc, &instance, &proof) {
        Ok(()) => {
            println!("Verify: ACCEPT");
            println!("Claimed output: {}", proof.final_output);
            Ok(0)
        }
        Err(e) if e.is_internal() => Err(anyhow!(e)),
        Err(e) => {
            println!("Verify: REJECT ({e})");
            Ok(1)
        }
    }
}
