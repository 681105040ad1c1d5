//! Digest and bit capabilities consumed by the path update algorithm.

use std::convert::Infallible;

use incrementalmerkletree::Level;

use crate::node::Node;

/// A boolean direction bit: a plain `bool` or a circuit-bound boolean.
pub trait Bit: Clone {
    /// The concrete value, if one is assigned.
    fn value(&self) -> Option<bool>;
}

impl Bit for bool {
    fn value(&self) -> Option<bool> {
        Some(*self)
    }
}

/// A fixed-width digest that can be mixed and selected within context `C`.
///
/// The context carries whatever side effects the realization needs. For plain
/// evaluation it is [`Native`]; for circuit synthesis it holds the constraint
/// system.
pub trait Digest<C>: Clone {
    /// Direction bit type paired with this digest.
    type Bit: Bit;
    /// Failure raised by the realization.
    type Error;

    /// The placeholder for a not-yet-populated subtree.
    ///
    /// # Errors
    /// Returns an error if the realization fails to produce the constant.
    fn zero(cx: &mut C) -> Result<Self, Self::Error>;

    /// Combines two children into their parent at `level`.
    ///
    /// # Errors
    /// Returns an error if the realization fails to compute the hash.
    fn mix(cx: &mut C, level: Level, lhs: &Self, rhs: &Self) -> Result<Self, Self::Error>;

    /// Returns `when_set` if `bit` is set and `when_clear` otherwise.
    ///
    /// Circuit realizations must not branch on the bit's value.
    ///
    /// # Errors
    /// Returns an error if the realization fails to constrain the selection.
    fn select(
        cx: &mut C,
        bit: &Self::Bit,
        when_set: &Self,
        when_clear: &Self,
    ) -> Result<Self, Self::Error>;

    /// Orders `(running, sibling)` into `(left, right)` for the parent hash.
    ///
    /// A set bit means the running digest is the right child.
    ///
    /// # Errors
    /// Returns an error if either selection fails.
    fn order(
        cx: &mut C,
        is_right: &Self::Bit,
        running: &Self,
        sibling: &Self,
    ) -> Result<(Self, Self), Self::Error> {
        let left = Self::select(cx, is_right, sibling, running)?;
        let right = Self::select(cx, is_right, running, sibling)?;
        Ok((left, right))
    }
}

/// Context for plain evaluation over concrete [`Node`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl<N: Node> Digest<Native> for N {
    type Bit = bool;
    type Error = Infallible;

    fn zero(_cx: &mut Native) -> Result<Self, Self::Error> {
        Ok(N::empty_leaf())
    }

    fn mix(_cx: &mut Native, level: Level, lhs: &Self, rhs: &Self) -> Result<Self, Self::Error> {
        Ok(N::combine(level, lhs, rhs))
    }

    fn select(
        _cx: &mut Native,
        bit: &bool,
        when_set: &Self,
        when_clear: &Self,
    ) -> Result<Self, Self::Error> {
        Ok(if *bit { *when_set } else { *when_clear })
    }
}
