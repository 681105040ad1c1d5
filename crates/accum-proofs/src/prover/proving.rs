//! Proof creation and encoding for the membership circuit.

use accum_circuit::MembershipCircuit;
use bellman::Circuit;
use bellman::groth16::{
    Parameters, PreparedVerifyingKey, Proof, VerifyingKey, create_random_proof,
    prepare_verifying_key,
};
use bls12_381::{Bls12, Scalar};
use rand::RngCore;

use crate::error::MembershipProofError;
use crate::types::{GROTH_PROOF_SIZE, GrothProofBytes};

/// Parameters for the membership circuit.
pub struct MembershipParameters(pub Parameters<Bls12>);

impl MembershipParameters {
    /// Returns the verifying key.
    #[must_use]
    pub const fn verifying_key(&self) -> &VerifyingKey<Bls12> {
        &self.0.vk
    }

    /// Returns a prepared verifying key for efficient verification.
    #[must_use]
    pub fn prepared_verifying_key(&self) -> PreparedVerifyingKey<Bls12> {
        prepare_verifying_key(&self.0.vk)
    }
}

/// Create the Groth16 proof for a membership circuit.
///
/// An invalid witness still yields a proof; it just fails verification.
///
/// # Errors
/// Returns an error if the circuit is missing an assignment or cannot be synthesized.
pub fn create_proof<N, R>(
    params: &MembershipParameters,
    circuit: MembershipCircuit<N>,
    rng: &mut R,
) -> Result<Proof<Bls12>, MembershipProofError>
where
    MembershipCircuit<N>: Circuit<Scalar>,
    R: RngCore,
{
    create_random_proof(circuit, &params.0, rng).map_err(MembershipProofError::ProofCreation)
}

/// Encodes a Groth16 proof to bytes.
///
/// # Errors
/// Returns an error if the proof cannot be serialized.
pub fn encode_proof(proof: &Proof<Bls12>) -> Result<GrothProofBytes, MembershipProofError> {
    let mut zkproof = [0u8; GROTH_PROOF_SIZE];
    proof
        .write(zkproof.as_mut_slice())
        .map_err(MembershipProofError::ProofEncoding)?;
    Ok(zkproof)
}
