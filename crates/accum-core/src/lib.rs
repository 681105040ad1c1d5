//! Incremental binary Merkle accumulator.
//!
//! A [`Bundle`] appends commitments to a fixed-depth [`Tree`] and keeps the
//! authentication paths of selected leaves valid against the current root. The
//! path update algorithm in [`AuthPath`] is written against the [`Digest`] and
//! [`Bit`] traits, so the same ascent runs over plain values (the [`Native`]
//! context) and over circuit variables (see the `accum-circuit` crate).

mod auth_path;
mod bundle;
mod codec;
mod digest;
mod error;
mod node;
mod tree;

/// Serialized/public schema models.
pub mod schema;

pub use auth_path::{AuthPath, Patch, PatchKind};
pub use bundle::Bundle;
pub use codec::{TextCodec, Tokens};
pub use digest::{Bit, Digest, Native};
pub use error::{CodecError, TreeError};
pub use node::{MAX_TREE_DEPTH, Node, PedersenNode, Sha256Node};
pub use tree::Tree;
