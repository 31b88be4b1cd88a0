//! Failure taxonomy
//!
//! Every rejection in the pipeline is reported as a single [`Error`] whose
//! variant names the failure class and whose payload is a short reason tag.
//! The verifier stops at the first failed check; there is no partial
//! acceptance and no retry.

#![forbid(unsafe_code)]

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection classes, verifier-facing.
///
/// The payload is a static reason tag (e.g. `"code sha mismatch"`,
/// `"pc local transition fail"`) printed verbatim by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed file, unknown key, wrong version, or a declared section
    /// size that does not match the actual content.
    #[error("structural: {0}")]
    Structural(&'static str),

    /// The proof does not bind to the commitment or to the verifier's
    /// public instance (code hash, session commitment, domain tag, input hash).
    #[error("binding: {0}")]
    Binding(&'static str),

    /// Declared trace sizes are impossible (zero length, non-power-of-two
    /// padding, length exceeding the padded size).
    #[error("sizing: {0}")]
    Sizing(&'static str),

    /// A transcript-driven protocol identity failed (sum-check round
    /// equation, derived index disagreement).
    #[error("protocol: {0}")]
    Protocol(&'static str),

    /// A KZG pairing check failed for some opening.
    #[error("cryptographic: {0}")]
    Cryptographic(&'static str),

    /// An opened value violates the instruction-set semantics (opcode not
    /// in the allowed set, broken pc transition, operand relation).
    #[error("semantic: {0}")]
    Semantic(&'static str),

    /// Hex decoding or group/field deserialization failed, or a prover-side
    /// precondition (e.g. SRS too small) was violated.
    #[error("internal: {0}")]
    Internal(&'static str),
}

impl Error {
    /// True for failures that indicate a broken input rather than an
    /// unsound proof (the CLI maps these to exit code 2).
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_) | Error::Structural(_))
    }
}
