//! Concrete tree node types.
//!
//! Both node types are 32-byte digests whose empty leaf is all zeros. The
//! Pedersen node is the circuit-friendly choice: it wraps a canonical
//! BLS12-381 scalar and combines children with Sapling's level-personalized
//! Pedersen hash. The SHA-256 node combines children as `SHA-256(lhs || rhs)`
//! and ignores the level.

use std::fmt;

use incrementalmerkletree::{Hashable, Level};
use sha2::{Digest as _, Sha256};

use crate::schema::config::HashFunction;

/// Deepest supported tree.
///
/// With 32 levels a tree holds up to 2^32 leaves, matching the Sapling note
/// commitment tree depth. Pedersen personalizations are only defined for
/// levels below 63, so this also keeps every level hashable in-circuit.
pub const MAX_TREE_DEPTH: u8 = 32;

/// Size in bytes of a serialized node.
pub const NODE_SIZE: usize = 32;

/// A concrete digest usable as a leaf or internal node.
pub trait Node: Hashable + Copy + Eq + Ord + fmt::Debug {
    /// Hash function this node type combines with.
    const HASH_FUNCTION: HashFunction;

    /// Parses a node, returning `None` for a non-canonical encoding.
    fn from_bytes(bytes: [u8; NODE_SIZE]) -> Option<Self>;

    /// Returns the canonical encoding.
    fn to_bytes(&self) -> [u8; NODE_SIZE];

    /// Encodes a small integer as a node (little-endian in the low bytes).
    fn from_u64(value: u64) -> Self;
}

/// A node combined with Sapling's Pedersen `merkle_hash`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PedersenNode([u8; NODE_SIZE]);

impl PedersenNode {
    /// The zero node (all zeros).
    pub const ZERO: Self = Self([0u8; NODE_SIZE]);

    /// The node as a field element.
    #[must_use]
    pub fn to_scalar(&self) -> Option<bls12_381::Scalar> {
        bls12_381::Scalar::from_bytes(&self.0).into_option()
    }
}

impl From<bls12_381::Scalar> for PedersenNode {
    fn from(scalar: bls12_381::Scalar) -> Self {
        Self(scalar.to_bytes())
    }
}

impl fmt::Debug for PedersenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PedersenNode({})", hex::encode(self.0))
    }
}

impl Node for PedersenNode {
    const HASH_FUNCTION: HashFunction = HashFunction::Pedersen;

    fn from_bytes(bytes: [u8; NODE_SIZE]) -> Option<Self> {
        bls12_381::Scalar::from_bytes(&bytes)
            .into_option()
            .map(Self::from)
    }

    fn to_bytes(&self) -> [u8; NODE_SIZE] {
        self.0
    }

    fn from_u64(value: u64) -> Self {
        Self::from(bls12_381::Scalar::from(value))
    }
}

impl Hashable for PedersenNode {
    fn empty_leaf() -> Self {
        Self::ZERO
    }

    /// Combines two nodes using Sapling's `merkle_hash`, personalized by level.
    fn combine(level: Level, lhs: &Self, rhs: &Self) -> Self {
        Self(sapling::merkle_hash(
            usize::from(u8::from(level)),
            &lhs.0,
            &rhs.0,
        ))
    }
}

/// A node combined with SHA-256 over the concatenated children.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sha256Node([u8; NODE_SIZE]);

impl Sha256Node {
    /// The zero node (all zeros).
    pub const ZERO: Self = Self([0u8; NODE_SIZE]);

    /// Create a node from raw digest bytes.
    #[must_use]
    pub const fn new(bytes: [u8; NODE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Sha256Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Node({})", hex::encode(self.0))
    }
}

impl Node for Sha256Node {
    const HASH_FUNCTION: HashFunction = HashFunction::Sha256;

    fn from_bytes(bytes: [u8; NODE_SIZE]) -> Option<Self> {
        Some(Self(bytes))
    }

    fn to_bytes(&self) -> [u8; NODE_SIZE] {
        self.0
    }

    fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; NODE_SIZE];
        if let Some(low) = bytes.first_chunk_mut::<8>() {
            *low = value.to_le_bytes();
        }
        Self(bytes)
    }
}

impl Hashable for Sha256Node {
    fn empty_leaf() -> Self {
        Self::ZERO
    }

    fn combine(_level: Level, lhs: &Self, rhs: &Self) -> Self {
        let digest = Sha256::new()
            .chain_update(lhs.0)
            .chain_update(rhs.0)
            .finalize();
        let mut out = [0u8; NODE_SIZE];
        out.copy_from_slice(&digest);
        Self(out)
    }
}

impl From<[u8; NODE_SIZE]> for Sha256Node {
    fn from(bytes: [u8; NODE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Sha256Node> for [u8; NODE_SIZE] {
    fn from(node: Sha256Node) -> Self {
        node.0
    }
}
