//! Types shared between proving and verifying.

/// Groth16 proof size in bytes (2 G1 points + 1 G2 point = 2*48 + 96 = 192).
pub const GROTH_PROOF_SIZE: usize = 192;

/// Groth16 proof bytes.
pub type GrothProofBytes = [u8; GROTH_PROOF_SIZE];

/// A membership proof together with the root it was made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipProofOutput {
    /// The encoded Groth16 proof.
    pub zkproof: GrothProofBytes,
    /// Encoding of the public tree root.
    pub root: [u8; 32],
}
