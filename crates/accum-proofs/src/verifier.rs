//! Verification for the membership circuit.
//!
//! This module provides functions for verifying Groth16 membership proofs
//! against a public tree root.

use std::path::Path;

use accum_circuit::CircuitNode;
use accum_core::Node;
use bellman::groth16::{
    PreparedVerifyingKey, Proof, VerifyingKey, prepare_verifying_key, verify_proof,
};
use bls12_381::Bls12;
use tracing::debug;

use crate::MembershipProofError;
use crate::types::{GrothProofBytes, MembershipProofOutput};

/// Errors that can occur during membership proof verification.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// Invalid root value
    #[error("Invalid root: not a canonical node encoding")]
    InvalidRoot,
    /// Verifying key could not be read
    #[error("Verifying key loading failed")]
    KeyLoading(#[source] std::io::Error),
    /// Proof decoding failed
    #[error("Proof decoding failed: {0}")]
    ProofDecoding(String),
    /// Verification failed
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

/// Verify a membership proof against `root`.
///
/// # Errors
/// Returns an error if the root cannot be exposed as public input or the
/// proof does not verify.
pub fn verify_membership_proof<N: CircuitNode>(
    pvk: &PreparedVerifyingKey<Bls12>,
    proof: &Proof<Bls12>,
    root: &N,
) -> Result<(), VerificationError> {
    let inputs = root.public_inputs().ok_or(VerificationError::InvalidRoot)?;
    debug!(inputs = inputs.len(), "Verifying membership proof");
    verify_proof(pvk, proof, &inputs)
        .map_err(|e| VerificationError::VerificationFailed(e.to_string()))
}

/// Decodes a Groth16 proof from bytes.
///
/// # Errors
/// Returns an error if the bytes are not a valid proof.
pub fn decode_proof(bytes: &GrothProofBytes) -> Result<Proof<Bls12>, MembershipProofError> {
    Proof::read(bytes.as_slice()).map_err(MembershipProofError::ProofDecoding)
}

/// Verify a membership proof from raw bytes.
///
/// # Arguments
/// * `pvk` - The prepared verifying key
/// * `zkproof` - The proof bytes (192 bytes)
/// * `root` - The tree root bytes (32 bytes)
///
/// # Errors
/// Returns an error if decoding or verification fails.
pub fn verify_membership_proof_bytes<N: CircuitNode>(
    pvk: &PreparedVerifyingKey<Bls12>,
    zkproof: &GrothProofBytes,
    root: &[u8; 32],
) -> Result<(), VerificationError> {
    let proof =
        decode_proof(zkproof).map_err(|e| VerificationError::ProofDecoding(e.to_string()))?;
    let root = <N as Node>::from_bytes(*root).ok_or(VerificationError::InvalidRoot)?;
    verify_membership_proof(pvk, &proof, &root)
}

/// Verify a membership proof from a [`MembershipProofOutput`].
///
/// # Errors
/// Returns an error if verification fails.
pub fn verify_membership_proof_output<N: CircuitNode>(
    proof_output: &MembershipProofOutput,
    pvk: &PreparedVerifyingKey<Bls12>,
) -> Result<(), VerificationError> {
    verify_membership_proof_bytes::<N>(pvk, &proof_output.zkproof, &proof_output.root)
}

/// Load and prepare a verifying key written by `save_parameters`.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a verifying key.
pub fn load_verifying_key(
    verifying_key_path: &Path,
) -> Result<PreparedVerifyingKey<Bls12>, VerificationError> {
    let file = std::fs::File::open(verifying_key_path).map_err(VerificationError::KeyLoading)?;
    let vk = VerifyingKey::<Bls12>::read(std::io::BufReader::new(file))
        .map_err(VerificationError::KeyLoading)?;
    Ok(prepare_verifying_key(&vk))
}
