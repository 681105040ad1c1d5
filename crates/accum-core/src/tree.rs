//! Append-only binary Merkle tree tracked through its frontier path.

use tracing::{info, warn};

use crate::auth_path::AuthPath;
use crate::error::TreeError;
use crate::node::Node;

/// A binary Merkle tree that only remembers the path of its next leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree<N> {
    is_full: bool,
    auth_path: AuthPath<N>,
    root: Option<N>,
}

impl<N: Node> Tree<N> {
    /// An empty tree of the given depth.
    ///
    /// # Errors
    /// Returns an error if `depth` is zero or exceeds [`crate::MAX_TREE_DEPTH`].
    pub fn new(depth: usize) -> Result<Self, TreeError> {
        if depth == 0 {
            return Err(TreeError::ZeroDepth);
        }
        Ok(Self {
            is_full: false,
            auth_path: AuthPath::new(depth)?,
            root: None,
        })
    }

    /// Restore a decoded tree.
    pub(crate) fn from_decoded(is_full: bool, auth_path: AuthPath<N>) -> Self {
        let has_leaves = is_full || auth_path.child_bits().iter().any(|&bit| bit);
        let root = if has_leaves {
            auth_path.root_hash().copied()
        } else {
            None
        };
        Self {
            is_full,
            auth_path,
            root,
        }
    }

    /// True once `2^depth` leaves have been inserted.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.is_full
    }

    /// Tree depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.auth_path.depth()
    }

    /// Number of leaves the tree can hold.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        1u64.checked_shl(u32::try_from(self.depth()).unwrap_or(u32::MAX))
            .unwrap_or(u64::MAX)
    }

    /// The frontier: the path template for the next leaf.
    #[must_use]
    pub const fn auth_path(&self) -> &AuthPath<N> {
        &self.auth_path
    }

    /// Root after the latest insertion, or `None` for an empty tree.
    #[must_use]
    pub const fn root_hash(&self) -> Option<&N> {
        self.root.as_ref()
    }

    /// Recompute the frontier for `leaf` and patch the retained `old_paths`.
    ///
    /// # Errors
    /// Returns [`TreeError::Full`] without touching any state if the tree is full.
    pub fn update_path(&mut self, leaf: N, old_paths: &mut [AuthPath<N>]) -> Result<N, TreeError> {
        self.ensure_not_full()?;
        let root = self.auth_path.update_path(leaf, old_paths);
        self.root = Some(root);
        Ok(root)
    }

    /// Prepare the frontier for the leaf after `leaf`.
    ///
    /// # Errors
    /// Returns [`TreeError::Full`] without touching any state if the tree is full.
    pub fn update_siblings(&mut self, leaf: N) -> Result<(), TreeError> {
        self.ensure_not_full()?;

        // counter for next leaf element
        match self.auth_path.inc_child_bits() {
            None => {
                info!(capacity = self.capacity(), "Merkle tree is full");
                self.is_full = true;
            }
            // next leaf is a right child
            Some(0) => self.auth_path.leaf_sibling(leaf),
            // left sibling of a new branch in the tree
            Some(first_bit) => self.auth_path.hash_sibling(first_bit),
        }

        Ok(())
    }

    fn ensure_not_full(&self) -> Result<(), TreeError> {
        if self.is_full {
            let capacity = self.capacity();
            warn!(capacity, "Rejected insertion into a full Merkle tree");
            return Err(TreeError::Full { capacity });
        }
        Ok(())
    }
}
