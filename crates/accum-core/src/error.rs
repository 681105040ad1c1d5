//! Error types for the accumulator.

use thiserror::Error;

use crate::schema::config::HashFunction;

/// Errors raised while growing or configuring a tree.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The tree already holds all `2^depth` leaves.
    #[error("Tree is full: all {capacity} leaves are occupied")]
    Full {
        /// Number of leaves the tree can hold.
        capacity: u64,
    },

    /// The requested depth exceeds the supported maximum.
    #[error("Tree depth {depth} exceeds maximum supported depth {max}")]
    DepthTooLarge {
        /// Requested depth.
        depth: usize,
        /// Maximum supported depth.
        max: u8,
    },

    /// Sibling and child-bit vectors of a path have different lengths.
    #[error("Path has {siblings} siblings but {child_bits} child bits")]
    PathLengthMismatch {
        /// Number of siblings supplied.
        siblings: usize,
        /// Number of child bits supplied.
        child_bits: usize,
    },

    /// The configured hash function does not match the node type.
    #[error("Configured hash function {configured:?} does not match node type {node:?}")]
    HashMismatch {
        /// Hash function named in the configuration.
        configured: HashFunction,
        /// Hash function of the bundle's node type.
        node: HashFunction,
    },

    /// A tree must have at least one level.
    #[error("Tree depth must be greater than zero")]
    ZeroDepth,
}

/// Errors raised while decoding the text persistence format.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before the named field.
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEnd(&'static str),

    /// A numeric field did not parse.
    #[error("Malformed number for {field}: {token:?}")]
    InvalidNumber {
        /// Field being read.
        field: &'static str,
        /// Offending token.
        token: String,
    },

    /// A child bit was neither `0` nor `1`.
    #[error("Malformed child bit: {0:?}")]
    InvalidBit(String),

    /// The full flag was neither `0` nor `1`.
    #[error("Malformed full flag: {0:?}")]
    InvalidFlag(String),

    /// A digest was not 64 hex characters or not a canonical node encoding.
    #[error("Malformed digest: {0:?}")]
    InvalidDigest(String),

    /// An authentication path declared depth zero.
    #[error("Authentication path depth must be greater than zero")]
    ZeroDepth,

    /// An authentication path declared a depth above the supported maximum.
    #[error("Authentication path depth {depth} exceeds maximum {max}")]
    DepthTooLarge {
        /// Declared depth.
        depth: usize,
        /// Maximum supported depth.
        max: u8,
    },

    /// A digest vector's declared length differs from the path depth.
    #[error("Vector {field} has length {found}, expected {expected}")]
    LengthMismatch {
        /// Field being read.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Declared length.
        found: usize,
    },

    /// A retained path's depth differs from the tree depth.
    #[error("Retained path depth {found} differs from tree depth {expected}")]
    DepthMismatch {
        /// Tree depth.
        expected: usize,
        /// Retained path depth.
        found: usize,
    },

    /// A tree flagged full has a frontier counter that did not wrap to zero.
    #[error("Full tree has frontier position {position}, expected 0")]
    FullTreeFrontier {
        /// Frontier position encoded by the child bits.
        position: u64,
    },

    /// The leaf counter disagrees with the tree's frontier.
    #[error("Tree size {tree_size} is inconsistent with the tree frontier")]
    InconsistentSize {
        /// Declared tree size.
        tree_size: u64,
    },

    /// Tokens remained after a complete value was read.
    #[error("Unexpected trailing data: {0:?}")]
    TrailingData(String),
}
