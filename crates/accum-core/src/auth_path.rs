//! Authentication paths and their incremental update.
//!
//! Indices start from 0 at the leaves and increase up to the root. The child
//! bits form a little-endian counter whose value is the leaf position, which is
//! what lets the tree use the same path as the template for its next leaf.

#![allow(
    clippy::arithmetic_side_effects,
    reason = "Level arithmetic is bounded by the path depth, which is at most MAX_TREE_DEPTH"
)]

use incrementalmerkletree::Level;

use crate::digest::{Bit, Digest, Native};
use crate::error::TreeError;
use crate::node::{MAX_TREE_DEPTH, Node};

/// Which vector of a retained path a [`Patch`] rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// The level lies on the shared ancestor path: overwrite `root_path[level]`.
    RootPath,
    /// The new subtree root becomes a sibling: overwrite `siblings[level]`.
    Sibling,
}

/// One rewrite of a retained path caused by inserting a new leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch<D> {
    /// Level being rewritten.
    pub level: usize,
    /// Vector being rewritten.
    pub kind: PatchKind,
    /// New digest at that level.
    pub digest: D,
}

/// Authentication path from a leaf of a binary Merkle tree up to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPath<D, B = bool> {
    root_path: Vec<D>,
    siblings: Vec<D>,
    child_bits: Vec<B>,
}

impl<D, B> AuthPath<D, B> {
    /// Assemble a path from its siblings and child bits.
    ///
    /// The root path stays empty until the first [`AuthPath::ascend`].
    ///
    /// # Errors
    /// Returns an error if the vectors differ in length or exceed the maximum depth.
    pub fn from_parts(siblings: Vec<D>, child_bits: Vec<B>) -> Result<Self, TreeError> {
        if siblings.len() != child_bits.len() {
            return Err(TreeError::PathLengthMismatch {
                siblings: siblings.len(),
                child_bits: child_bits.len(),
            });
        }
        check_depth(siblings.len())?;
        Ok(Self {
            root_path: Vec::with_capacity(siblings.len()),
            siblings,
            child_bits,
        })
    }

    /// Restore a path whose three vectors are already known to be `depth` long.
    pub(crate) const fn from_vectors(
        root_path: Vec<D>,
        siblings: Vec<D>,
        child_bits: Vec<B>,
    ) -> Self {
        Self {
            root_path,
            siblings,
            child_bits,
        }
    }

    /// Number of levels between the leaf and the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// The tree root, once the path has been updated.
    #[must_use]
    pub fn root_hash(&self) -> Option<&D> {
        self.root_path.last()
    }

    /// Digests produced at each level, bottom-up.
    #[must_use]
    pub fn root_path(&self) -> &[D] {
        &self.root_path
    }

    /// Sibling digests at each level, bottom-up.
    #[must_use]
    pub fn siblings(&self) -> &[D] {
        &self.siblings
    }

    /// Direction bits at each level, bottom-up. A set bit means right child.
    #[must_use]
    pub fn child_bits(&self) -> &[B] {
        &self.child_bits
    }
}

impl<D: Clone, B: Bit> AuthPath<D, B> {
    /// Ascend from `leaf` to the root, recomputing the root path.
    ///
    /// This is the part of the update that runs unchanged over plain values and
    /// over circuit variables. Returns the root; for a depth-0 path the root is
    /// the leaf itself. On error the stored root path is left untouched.
    ///
    /// # Errors
    /// Returns the realization's error if a selection or hash fails.
    pub fn ascend<C>(&mut self, cx: &mut C, leaf: &D) -> Result<D, D::Error>
    where
        D: Digest<C, Bit = B>,
    {
        let mut root_path = Vec::with_capacity(self.siblings.len());
        let mut dig = leaf.clone();

        for (level, (sibling, is_right)) in (0u8..).zip(self.siblings.iter().zip(&self.child_bits))
        {
            let (lhs, rhs) = D::order(cx, is_right, &dig, sibling)?;
            dig = D::mix(cx, Level::from(level), &lhs, &rhs)?;
            root_path.push(dig.clone());
        }

        self.root_path = root_path;
        Ok(dig)
    }
}

impl<N: Node> AuthPath<N, bool> {
    /// An empty path: all siblings zero, all child bits clear.
    ///
    /// # Errors
    /// Returns an error if `depth` exceeds [`MAX_TREE_DEPTH`].
    pub fn new(depth: usize) -> Result<Self, TreeError> {
        check_depth(depth)?;
        Ok(Self {
            // first update initializes the hash digests
            root_path: vec![N::empty_leaf(); depth],
            siblings: vec![N::empty_leaf(); depth],
            child_bits: vec![false; depth],
        })
    }

    /// Leaf position encoded by the child bits.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.child_bits
            .iter()
            .rev()
            .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
    }

    /// Number of leading root-end child bits shared with `other`.
    ///
    /// A value of `k` means both leaves sit under the same node `k` levels below
    /// the root and diverge immediately beneath it.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> usize {
        self.child_bits
            .iter()
            .rev()
            .zip(other.child_bits.iter().rev())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Update the path for `leaf` and patch every retained path in `old_paths`.
    ///
    /// `old_paths` must belong to the same tree and sit at earlier positions.
    /// Returns the new root.
    pub fn update_path(&mut self, leaf: N, old_paths: &mut [Self]) -> N {
        // root path overlap, taken before the ascent rewrites anything
        let overlaps: Vec<usize> = old_paths.iter().map(|old| self.overlap(old)).collect();

        let Ok(root) = self.ascend(&mut Native, &leaf);

        for (old, overlap) in old_paths.iter_mut().zip(overlaps) {
            for patch in self.patches(leaf, overlap) {
                old.apply(&patch);
            }
        }

        root
    }

    /// Rewrites that an older path sharing `overlap` root-end bits needs after
    /// this path was updated for `leaf`.
    #[must_use]
    pub fn patches(&self, leaf: N, overlap: usize) -> Vec<Patch<N>> {
        let depth = self.root_path.len();
        let mut patches = Vec::new();

        for (level, digest) in self.root_path.iter().enumerate() {
            // path length from root to node with the new hash
            let path_len = depth - 1 - level;

            if path_len <= overlap {
                patches.push(Patch {
                    level,
                    kind: PatchKind::RootPath,
                    digest: *digest,
                });
            } else if path_len == overlap + 1 {
                patches.push(Patch {
                    level: level + 1,
                    kind: PatchKind::Sibling,
                    digest: *digest,
                });
            }
        }

        // differ in the last bit only, so the new leaf is the right sibling
        if depth > 0 && overlap == depth - 1 {
            patches.push(Patch {
                level: 0,
                kind: PatchKind::Sibling,
                digest: leaf,
            });
        }

        patches
    }

    /// Apply a single rewrite. Patches outside the path depth are ignored.
    pub fn apply(&mut self, patch: &Patch<N>) {
        let slot = match patch.kind {
            PatchKind::RootPath => self.root_path.get_mut(patch.level),
            PatchKind::Sibling => self.siblings.get_mut(patch.level),
        };
        if let Some(slot) = slot {
            *slot = patch.digest;
        }
    }

    /// The just-added leaf becomes the left sibling of the next leaf.
    pub fn leaf_sibling(&mut self, leaf: N) {
        if let Some(first) = self.siblings.first_mut() {
            *first = leaf;
        }
    }

    /// Open a new branch at `index`: the completed left subtree becomes its
    /// sibling and everything below starts empty again.
    pub fn hash_sibling(&mut self, index: usize) {
        let Some(completed) = index
            .checked_sub(1)
            .and_then(|below| self.root_path.get(below))
            .copied()
        else {
            return;
        };

        if let Some(slot) = self.siblings.get_mut(index) {
            *slot = completed;
        }
        for slot in self.siblings.iter_mut().take(index) {
            *slot = N::empty_leaf();
        }
    }

    /// Increment the child-bit counter.
    ///
    /// Returns the index of the bit that flipped from 0 to 1, or `None` when
    /// every bit was set and the counter wrapped back to zero.
    pub fn inc_child_bits(&mut self) -> Option<usize> {
        for (index, bit) in self.child_bits.iter_mut().enumerate() {
            if *bit {
                // bit is one, increment to zero and carry
                *bit = false;
            } else {
                *bit = true;
                return Some(index);
            }
        }

        None
    }

    /// Recompute the root bottom-up from `leaf` without touching the path.
    #[must_use]
    pub fn recompute_root(&self, leaf: &N) -> N {
        (0u8..)
            .zip(self.siblings.iter().zip(&self.child_bits))
            .fold(*leaf, |dig, (level, (sibling, &is_right))| {
                let (lhs, rhs) = if is_right {
                    (*sibling, dig)
                } else {
                    (dig, *sibling)
                };
                N::combine(Level::from(level), &lhs, &rhs)
            })
    }

    /// Whether `leaf` recomputes to this path's stored root.
    #[must_use]
    pub fn verifies(&self, leaf: &N) -> bool {
        self.root_hash()
            .is_some_and(|root| *root == self.recompute_root(leaf))
    }
}

fn check_depth(depth: usize) -> Result<(), TreeError> {
    if depth > usize::from(MAX_TREE_DEPTH) {
        return Err(TreeError::DepthTooLarge {
            depth,
            max: MAX_TREE_DEPTH,
        });
    }
    Ok(())
}
