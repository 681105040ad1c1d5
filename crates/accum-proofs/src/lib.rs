//! Groth16 membership proving and verification.
//!
//! A proof shows that some leaf retained by a bundle hashes up to a public
//! tree root, without revealing the leaf or its authentication path.

mod error;
mod types;

#[cfg(feature = "prove")]
pub mod prover;

#[cfg(feature = "verify")]
pub mod verifier;

pub use error::MembershipProofError;
pub use types::{GROTH_PROOF_SIZE, GrothProofBytes, MembershipProofOutput};
