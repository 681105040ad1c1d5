//! A tree together with the authentication paths of retained leaves.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::auth_path::AuthPath;
use crate::error::TreeError;
use crate::node::Node;
use crate::schema::config::TreeConfiguration;
use crate::tree::Tree;

/// Append-only accumulator that keeps selected witnesses valid.
///
/// `auth_leaf[i]` and `auth_path[i]` always describe the same retained leaf,
/// and every retained path authenticates against the current tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle<N> {
    tree: Tree<N>,
    tree_size: u64,
    auth_leaf: Vec<N>,
    auth_path: Vec<AuthPath<N>>,
}

impl<N: Node> Bundle<N> {
    /// An empty bundle over a tree of the given depth.
    ///
    /// # Errors
    /// Returns an error if `depth` is zero or exceeds [`crate::MAX_TREE_DEPTH`].
    pub fn new(depth: usize) -> Result<Self, TreeError> {
        Ok(Self {
            tree: Tree::new(depth)?,
            tree_size: 0,
            auth_leaf: Vec::new(),
            auth_path: Vec::new(),
        })
    }

    /// An empty bundle built from a configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or names a different
    /// hash function than `N` combines with.
    pub fn from_config(config: &TreeConfiguration) -> Result<Self, TreeError> {
        config.validate()?;
        if config.hash != N::HASH_FUNCTION {
            return Err(TreeError::HashMismatch {
                configured: config.hash,
                node: N::HASH_FUNCTION,
            });
        }
        Self::new(usize::from(config.depth))
    }

    /// Restore a decoded bundle.
    pub(crate) const fn from_decoded(
        tree: Tree<N>,
        tree_size: u64,
        auth_leaf: Vec<N>,
        auth_path: Vec<AuthPath<N>>,
    ) -> Self {
        Self {
            tree,
            tree_size,
            auth_leaf,
            auth_path,
        }
    }

    /// Append `commitment`, retaining its authentication path if `keep` is set.
    ///
    /// Every previously retained path is patched to authenticate against the
    /// new root.
    ///
    /// # Errors
    /// Returns [`TreeError::Full`] without touching any state if the tree is full.
    pub fn add_leaf(&mut self, commitment: N, keep: bool) -> Result<(), TreeError> {
        if self.tree.is_full() {
            let capacity = self.tree.capacity();
            warn!(capacity, "Bundle is full, commitment rejected");
            return Err(TreeError::Full { capacity });
        }

        self.tree.update_path(commitment, &mut self.auth_path)?;
        if keep {
            self.auth_leaf.push(commitment);
            self.auth_path.push(self.tree.auth_path().clone());
        }
        self.tree.update_siblings(commitment)?;
        self.tree_size = self.tree_size.saturating_add(1);

        debug!(
            position = self.tree_size.saturating_sub(1),
            keep,
            retained = self.auth_path.len(),
            "Added leaf to bundle"
        );
        Ok(())
    }

    /// Drop every retained witness whose leaf is not in `keep`.
    ///
    /// Retained order is preserved.
    pub fn auth_garbage_collect(&mut self, keep: &BTreeSet<N>) {
        let before = self.auth_leaf.len();

        let (auth_leaf, auth_path): (Vec<_>, Vec<_>) = self
            .auth_leaf
            .drain(..)
            .zip(self.auth_path.drain(..))
            .filter(|(leaf, _)| keep.contains(leaf))
            .unzip();
        self.auth_leaf = auth_leaf;
        self.auth_path = auth_path;

        debug!(
            before,
            after = self.auth_leaf.len(),
            "Garbage collected retained witnesses"
        );
    }

    /// Root after the latest insertion, or `None` for an empty bundle.
    #[must_use]
    pub const fn root_hash(&self) -> Option<&N> {
        self.tree.root_hash()
    }

    /// True once the tree holds `2^depth` leaves.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.tree.is_full()
    }

    /// Number of leaves inserted so far.
    #[must_use]
    pub const fn tree_size(&self) -> u64 {
        self.tree_size
    }

    /// Retained commitments, in insertion order.
    #[must_use]
    pub fn auth_leaf(&self) -> &[N] {
        &self.auth_leaf
    }

    /// Retained authentication paths, aligned with [`Bundle::auth_leaf`].
    #[must_use]
    pub fn auth_path(&self) -> &[AuthPath<N>] {
        &self.auth_path
    }

    /// Tree depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &Tree<N> {
        &self.tree
    }

    /// The retained authentication path for `leaf`, if any.
    ///
    /// When the same commitment was retained more than once the earliest
    /// insertion wins.
    #[must_use]
    pub fn witness(&self, leaf: &N) -> Option<&AuthPath<N>> {
        self.auth_leaf
            .iter()
            .position(|retained| retained == leaf)
            .and_then(|index| self.auth_path.get(index))
    }
}
