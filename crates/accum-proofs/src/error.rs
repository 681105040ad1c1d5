//! Error types for membership proofs.

/// Errors that can occur during membership proof generation or decoding.
#[derive(Debug, thiserror::Error)]
pub enum MembershipProofError {
    /// The leaf has no retained authentication path
    #[error("Leaf is not retained by the bundle")]
    MissingWitness,
    /// The bundle has no root yet
    #[error("Bundle is empty")]
    EmptyBundle,
    /// Proof creation failed
    #[error("Proof creation failed")]
    ProofCreation(#[source] bellman::SynthesisError),
    /// Proof encoding failed
    #[error("Proof encoding failed")]
    ProofEncoding(#[source] std::io::Error),
    /// Proof decoding failed
    #[error("Proof decoding failed")]
    ProofDecoding(#[source] std::io::Error),
}
