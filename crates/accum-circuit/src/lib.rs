//! Accumulator membership circuit.
//!
//! The path update from `accum-core` is replayed over circuit variables, so a
//! retained authentication path can be checked against a public root without
//! revealing the leaf or its siblings.

pub mod circuit;
pub mod context;
pub mod gadgets;

pub use circuit::{MembershipCircuit, witness_path};
pub use context::CircuitContext;
pub use gadgets::{BitVar, CircuitDigest, CircuitNode, PedersenVar, Sha256Var};
