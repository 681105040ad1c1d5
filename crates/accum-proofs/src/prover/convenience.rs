//! Convenience API proving membership of a leaf retained by a bundle.

use accum_circuit::MembershipCircuit;
use accum_core::{Bundle, Node};
use bellman::Circuit;
use bls12_381::Scalar;
use rand::RngCore;
use tracing::{debug, info};

use crate::error::MembershipProofError;
use crate::prover::proving::{MembershipParameters, create_proof, encode_proof};
use crate::types::MembershipProofOutput;

/// Prove that `leaf` is in the tree of `bundle`, against its current root.
///
/// The bundle must have retained the leaf's authentication path.
///
/// # Errors
/// Returns an error if the bundle is empty, the leaf was not retained, or
/// proving fails.
pub fn generate_membership_proof<N, R>(
    params: &MembershipParameters,
    bundle: &Bundle<N>,
    leaf: &N,
    rng: &mut R,
) -> Result<MembershipProofOutput, MembershipProofError>
where
    N: Node,
    MembershipCircuit<N>: Circuit<Scalar>,
    R: RngCore,
{
    let root = *bundle.root_hash().ok_or(MembershipProofError::EmptyBundle)?;
    let circuit =
        MembershipCircuit::from_bundle(bundle, leaf).ok_or(MembershipProofError::MissingWitness)?;
    debug!(
        depth = bundle.depth(),
        tree_size = bundle.tree_size(),
        "Proving membership of retained leaf"
    );

    let proof = create_proof(params, circuit, rng)?;
    let zkproof = encode_proof(&proof)?;
    info!(root = %hex::encode(root.to_bytes()), "Membership proof created");

    Ok(MembershipProofOutput {
        zkproof,
        root: root.to_bytes(),
    })
}
