//! Parameter generation for the membership circuit.

use std::path::Path;

use accum_circuit::MembershipCircuit;
use accum_core::Node;
use bellman::Circuit;
use bellman::groth16::{Parameters, generate_random_parameters};
use bls12_381::{Bls12, Scalar};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::info;

use crate::prover::proving::MembershipParameters;

/// Errors that can occur during parameter operations.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    /// I/O error (file creation/opening)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Parameter generation failed
    #[error("Parameter generation failed")]
    Generation(#[source] bellman::SynthesisError),
    /// Parameter serialization failed
    #[error("Parameter serialization failed")]
    Serialization(#[source] std::io::Error),
    /// Parameter deserialization failed
    #[error("Parameter deserialization failed")]
    Deserialization(#[source] std::io::Error),
}

/// Generate new Groth16 parameters for trees of `depth` with node type `N`.
///
/// This is a computationally expensive operation that should only be done
/// once per depth and hash function.
///
/// # Errors
/// Returns an error if parameter generation fails.
pub fn generate_parameters<N>(depth: usize) -> Result<MembershipParameters, ParameterError>
where
    N: Node,
    MembershipCircuit<N>: Circuit<Scalar>,
{
    let mut rng = OsRng;
    generate_parameters_with_rng::<N, _>(depth, &mut rng)
}

/// Generate parameters drawing the toxic waste from `rng`.
///
/// # Errors
/// Returns an error if parameter generation fails.
pub fn generate_parameters_with_rng<N, R>(
    depth: usize,
    rng: &mut R,
) -> Result<MembershipParameters, ParameterError>
where
    N: Node,
    MembershipCircuit<N>: Circuit<Scalar>,
    R: RngCore,
{
    info!(depth, hash = ?N::HASH_FUNCTION, "Generating membership circuit parameters");

    // Create empty circuit for parameter generation
    let empty_circuit = MembershipCircuit::<N>::blank(depth);

    let params = generate_random_parameters::<Bls12, _, _>(empty_circuit, rng)
        .map_err(ParameterError::Generation)?;

    Ok(MembershipParameters(params))
}

/// Save parameters to files.
///
/// # Arguments
/// * `params` - The parameters to save
/// * `proving_key_path` - Path for the proving key file
/// * `verifying_key_path` - Path for the verifying key file
///
/// # Errors
/// Returns an error if writing fails.
pub fn save_parameters(
    params: &MembershipParameters,
    proving_key_path: &Path,
    verifying_key_path: &Path,
) -> Result<(), ParameterError> {
    let mut proving_file = std::fs::File::create(proving_key_path)?;
    params
        .0
        .write(&mut proving_file)
        .map_err(ParameterError::Serialization)?;

    let mut verifying_file = std::fs::File::create(verifying_key_path)?;
    params
        .verifying_key()
        .write(&mut verifying_file)
        .map_err(ParameterError::Serialization)?;

    info!(
        proving_key = %proving_key_path.display(),
        verifying_key = %verifying_key_path.display(),
        "Saved membership circuit parameters"
    );
    Ok(())
}

/// Load parameters from a proving key file.
///
/// # Arguments
/// * `proving_key_path` - Path to the proving key file
/// * `checked` - If true, verify the parameters (slower but safer)
///
/// # Errors
/// Returns an error if reading or parsing fails.
pub fn load_parameters(
    proving_key_path: &Path,
    checked: bool,
) -> Result<MembershipParameters, ParameterError> {
    let file = std::fs::File::open(proving_key_path)?;
    let reader = std::io::BufReader::new(file);

    let params = Parameters::read(reader, checked).map_err(ParameterError::Deserialization)?;

    Ok(MembershipParameters(params))
}
