//! Proving for the membership circuit.
//!
//! This module provides functions for creating Groth16 proofs for the membership circuit.
mod builder;
mod convenience;
mod proving;

pub use builder::{
    ParameterError, generate_parameters, generate_parameters_with_rng, load_parameters,
    save_parameters,
};
pub use convenience::generate_membership_proof;
pub use proving::{MembershipParameters, create_proof, encode_proof};
