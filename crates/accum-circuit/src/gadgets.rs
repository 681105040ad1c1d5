//! Circuit variables implementing the accumulator digest capabilities.
//!
//! [`PedersenVar`] mirrors [`PedersenNode`]: a field element hashed with the
//! Sapling Pedersen gadget personalized by tree level. [`Sha256Var`] mirrors
//! [`Sha256Node`]: 256 booleans, big-endian within each byte, hashed with the
//! `bellman` SHA-256 gadget.

#![allow(
    clippy::arithmetic_side_effects,
    reason = "R1CS constraint building uses +/- operators for linear combinations"
)]

use accum_core::{Bit, Digest, Node, PedersenNode, Sha256Node};
use bellman::gadgets::boolean::{AllocatedBit, Boolean};
use bellman::gadgets::multipack;
use bellman::gadgets::num::AllocatedNum;
use bellman::gadgets::sha256::sha256;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;
use incrementalmerkletree::Level;
use sapling::circuit::pedersen_hash;

use crate::context::CircuitContext;

/// Bits in a SHA-256 digest.
const DIGEST_BITS: usize = 256;

/// A circuit-bound direction bit.
#[derive(Clone)]
pub struct BitVar(pub Boolean);

impl Bit for BitVar {
    fn value(&self) -> Option<bool> {
        self.0.get_value()
    }
}

impl BitVar {
    /// Allocate a private bit.
    ///
    /// # Errors
    /// Returns an error if the allocation fails.
    pub fn witness<CS: ConstraintSystem<Scalar>>(
        cs: CS,
        value: Option<bool>,
    ) -> Result<Self, SynthesisError> {
        Ok(Self(Boolean::from(AllocatedBit::alloc(cs, value)?)))
    }
}

/// Binding between a concrete node type and its circuit variable.
pub trait CircuitDigest: Clone {
    /// Concrete node this variable mirrors.
    type Node: Node;

    /// Allocate a private variable, optionally assigned.
    ///
    /// # Errors
    /// Returns an error if the allocation fails.
    fn witness<CS: ConstraintSystem<Scalar>>(
        cs: CS,
        value: Option<&Self::Node>,
    ) -> Result<Self, SynthesisError>;

    /// Constrain two variables to be equal.
    ///
    /// # Errors
    /// Returns an error if a constraint cannot be added.
    fn enforce_equal<CS: ConstraintSystem<Scalar>>(
        cs: CS,
        lhs: &Self,
        rhs: &Self,
    ) -> Result<(), SynthesisError>;

    /// Expose the variable as public input.
    ///
    /// # Errors
    /// Returns an error if the input cannot be allocated.
    fn inputize<CS: ConstraintSystem<Scalar>>(&self, cs: CS) -> Result<(), SynthesisError>;

    /// The public inputs [`CircuitDigest::inputize`] produces for `node`.
    fn public_inputs(node: &Self::Node) -> Option<Vec<Scalar>>;

    /// The assigned value, if any.
    fn value(&self) -> Option<Self::Node>;
}

/// A concrete node type with a circuit counterpart.
pub trait CircuitNode: Node {
    /// Circuit variable mirroring this node.
    type Var: CircuitDigest<Node = Self>;

    /// Public inputs exposing `self` as the tree root.
    fn public_inputs(&self) -> Option<Vec<Scalar>> {
        Self::Var::public_inputs(self)
    }
}

impl CircuitNode for PedersenNode {
    type Var = PedersenVar;
}

impl CircuitNode for Sha256Node {
    type Var = Sha256Var;
}

/// A Pedersen tree node as an allocated field element.
#[derive(Clone)]
pub struct PedersenVar(pub AllocatedNum<Scalar>);

impl CircuitDigest for PedersenVar {
    type Node = PedersenNode;

    fn witness<CS: ConstraintSystem<Scalar>>(
        cs: CS,
        value: Option<&PedersenNode>,
    ) -> Result<Self, SynthesisError> {
        AllocatedNum::alloc(cs, || {
            value
                .and_then(PedersenNode::to_scalar)
                .ok_or(SynthesisError::AssignmentMissing)
        })
        .map(Self)
    }

    fn enforce_equal<CS: ConstraintSystem<Scalar>>(
        mut cs: CS,
        lhs: &Self,
        rhs: &Self,
    ) -> Result<(), SynthesisError> {
        cs.enforce(
            || "enforce equal",
            |lc| lc + lhs.0.get_variable() - rhs.0.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc,
        );
        Ok(())
    }

    fn inputize<CS: ConstraintSystem<Scalar>>(&self, cs: CS) -> Result<(), SynthesisError> {
        self.0.inputize(cs)
    }

    fn public_inputs(node: &PedersenNode) -> Option<Vec<Scalar>> {
        node.to_scalar().map(|scalar| vec![scalar])
    }

    fn value(&self) -> Option<PedersenNode> {
        self.0.get_value().map(PedersenNode::from)
    }
}

impl<CS: ConstraintSystem<Scalar>> Digest<CircuitContext<'_, CS>> for PedersenVar {
    type Bit = BitVar;
    type Error = SynthesisError;

    fn zero(cx: &mut CircuitContext<'_, CS>) -> Result<Self, SynthesisError> {
        let mut cs = cx.namespace("zero");
        let num = AllocatedNum::alloc(cs.namespace(|| "value"), || Ok(Scalar::ZERO))?;
        cs.enforce(
            || "value is zero",
            |lc| lc + num.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc,
        );
        Ok(Self(num))
    }

    fn mix(
        cx: &mut CircuitContext<'_, CS>,
        level: Level,
        lhs: &Self,
        rhs: &Self,
    ) -> Result<Self, SynthesisError> {
        let mut cs = cx.namespace("mix");

        let mut preimage = vec![];
        preimage.extend(lhs.0.to_bits_le(cs.namespace(|| "lhs into bits"))?);
        preimage.extend(rhs.0.to_bits_le(cs.namespace(|| "rhs into bits"))?);

        let hash = pedersen_hash::pedersen_hash(
            cs.namespace(|| "computation of pedersen hash"),
            pedersen_hash::Personalization::MerkleTree(usize::from(u8::from(level))),
            &preimage,
        )?;
        Ok(Self(hash.get_u().clone()))
    }

    fn select(
        cx: &mut CircuitContext<'_, CS>,
        bit: &BitVar,
        when_set: &Self,
        when_clear: &Self,
    ) -> Result<Self, SynthesisError> {
        let (selected, _) = AllocatedNum::conditionally_reverse(
            cx.namespace("select"),
            &when_clear.0,
            &when_set.0,
            &bit.0,
        )?;
        Ok(Self(selected))
    }

    /// One conditional swap instead of two selections.
    fn order(
        cx: &mut CircuitContext<'_, CS>,
        is_right: &BitVar,
        running: &Self,
        sibling: &Self,
    ) -> Result<(Self, Self), SynthesisError> {
        let (left, right) = AllocatedNum::conditionally_reverse(
            cx.namespace("conditional reversal of preimage"),
            &running.0,
            &sibling.0,
            &is_right.0,
        )?;
        Ok((Self(left), Self(right)))
    }
}

/// A SHA-256 tree node as 256 booleans, big-endian within each byte.
#[derive(Clone)]
pub struct Sha256Var(pub Vec<Boolean>);

impl CircuitDigest for Sha256Var {
    type Node = Sha256Node;

    fn witness<CS: ConstraintSystem<Scalar>>(
        mut cs: CS,
        value: Option<&Sha256Node>,
    ) -> Result<Self, SynthesisError> {
        let values = value.map(|node| multipack::bytes_to_bits(&node.to_bytes()));
        (0..DIGEST_BITS)
            .map(|i| {
                let bit = values.as_ref().and_then(|bits| bits.get(i).copied());
                AllocatedBit::alloc(cs.namespace(|| format!("bit {i}")), bit).map(Boolean::from)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    fn enforce_equal<CS: ConstraintSystem<Scalar>>(
        mut cs: CS,
        lhs: &Self,
        rhs: &Self,
    ) -> Result<(), SynthesisError> {
        for (i, (a, b)) in lhs.0.iter().zip(&rhs.0).enumerate() {
            Boolean::enforce_equal(cs.namespace(|| format!("bit {i}")), a, b)?;
        }
        Ok(())
    }

    fn inputize<CS: ConstraintSystem<Scalar>>(&self, cs: CS) -> Result<(), SynthesisError> {
        multipack::pack_into_inputs(cs, &self.0)
    }

    fn public_inputs(node: &Sha256Node) -> Option<Vec<Scalar>> {
        let bits = multipack::bytes_to_bits(&node.to_bytes());
        Some(multipack::compute_multipacking(&bits))
    }

    fn value(&self) -> Option<Sha256Node> {
        let mut bytes = [0u8; 32];
        for (byte, bits) in bytes.iter_mut().zip(self.0.chunks(8)) {
            for bit in bits {
                *byte = (*byte << 1) | u8::from(bit.get_value()?);
            }
        }
        Some(Sha256Node::new(bytes))
    }
}

impl<CS: ConstraintSystem<Scalar>> Digest<CircuitContext<'_, CS>> for Sha256Var {
    type Bit = BitVar;
    type Error = SynthesisError;

    fn zero(_cx: &mut CircuitContext<'_, CS>) -> Result<Self, SynthesisError> {
        Ok(Self(vec![Boolean::constant(false); DIGEST_BITS]))
    }

    fn mix(
        cx: &mut CircuitContext<'_, CS>,
        _level: Level,
        lhs: &Self,
        rhs: &Self,
    ) -> Result<Self, SynthesisError> {
        let mut preimage = Vec::with_capacity(2 * DIGEST_BITS);
        preimage.extend(lhs.0.iter().cloned());
        preimage.extend(rhs.0.iter().cloned());
        sha256(cx.namespace("sha256(lhs || rhs)"), &preimage).map(Self)
    }

    fn select(
        cx: &mut CircuitContext<'_, CS>,
        bit: &BitVar,
        when_set: &Self,
        when_clear: &Self,
    ) -> Result<Self, SynthesisError> {
        let mut cs = cx.namespace("select");
        when_set
            .0
            .iter()
            .zip(&when_clear.0)
            .enumerate()
            .map(|(i, (a, b))| {
                Boolean::sha256_ch(cs.namespace(|| format!("bit {i}")), &bit.0, a, b)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "unit-test")]

    use bellman::gadgets::test::TestConstraintSystem;
    use incrementalmerkletree::Hashable;

    use super::*;

    fn mix_both_ways<V>(lhs: V::Node, rhs: V::Node, level: u8)
    where
        V: CircuitDigest
            + for<'a> Digest<
                CircuitContext<'a, TestConstraintSystem<Scalar>>,
                Bit = BitVar,
                Error = SynthesisError,
            >,
    {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let mut cx = CircuitContext::new(&mut cs);

        let a = V::witness(cx.namespace("lhs"), Some(&lhs)).unwrap();
        let b = V::witness(cx.namespace("rhs"), Some(&rhs)).unwrap();
        let parent = V::mix(&mut cx, Level::from(level), &a, &b).unwrap();

        assert_eq!(
            parent.value(),
            Some(V::Node::combine(Level::from(level), &lhs, &rhs))
        );
        assert!(cs.is_satisfied());
    }

    #[test]
    fn pedersen_mix_matches_the_concrete_hash() {
        mix_both_ways::<PedersenVar>(PedersenNode::from_u64(3), PedersenNode::from_u64(4), 0);
        mix_both_ways::<PedersenVar>(PedersenNode::from_u64(3), PedersenNode::from_u64(4), 7);
    }

    #[test]
    fn sha256_mix_matches_the_concrete_hash() {
        mix_both_ways::<Sha256Var>(Sha256Node::from_u64(3), Sha256Node::from_u64(4), 0);
    }

    #[test]
    fn select_follows_the_bit() {
        for set in [false, true] {
            let mut cs = TestConstraintSystem::<Scalar>::new();
            let mut cx = CircuitContext::new(&mut cs);

            let bit = BitVar::witness(cx.namespace("bit"), Some(set)).unwrap();
            let a = Sha256Var::witness(cx.namespace("a"), Some(&Sha256Node::from_u64(1))).unwrap();
            let b = Sha256Var::witness(cx.namespace("b"), Some(&Sha256Node::from_u64(2))).unwrap();
            let picked = Sha256Var::select(&mut cx, &bit, &a, &b).unwrap();

            let x = PedersenVar::witness(cx.namespace("x"), Some(&PedersenNode::from_u64(1)))
                .unwrap();
            let y = PedersenVar::witness(cx.namespace("y"), Some(&PedersenNode::from_u64(2)))
                .unwrap();
            let chosen = PedersenVar::select(&mut cx, &bit, &x, &y).unwrap();

            let expected = if set { 1 } else { 2 };
            assert_eq!(picked.value(), Some(Sha256Node::from_u64(expected)));
            assert_eq!(chosen.value(), Some(PedersenNode::from_u64(expected)));
            assert!(cs.is_satisfied());
        }
    }

    #[test]
    fn zero_matches_the_empty_leaf() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let mut cx = CircuitContext::new(&mut cs);

        let pedersen = PedersenVar::zero(&mut cx).unwrap();
        let sha = Sha256Var::zero(&mut cx).unwrap();

        assert_eq!(pedersen.value(), Some(PedersenNode::empty_leaf()));
        assert_eq!(sha.value(), Some(Sha256Node::empty_leaf()));
        assert!(cs.is_satisfied());
    }

    #[test]
    fn enforce_equal_rejects_different_values() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let mut cx = CircuitContext::new(&mut cs);

        let a = Sha256Var::witness(cx.namespace("a"), Some(&Sha256Node::from_u64(1))).unwrap();
        let b = Sha256Var::witness(cx.namespace("b"), Some(&Sha256Node::from_u64(2))).unwrap();
        Sha256Var::enforce_equal(cx.namespace("equal"), &a, &b).unwrap();

        assert!(!cs.is_satisfied());
    }

    #[test]
    fn sha256_public_inputs_match_packing() {
        let node = Sha256Node::from_u64(0xabcd);
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let mut cx = CircuitContext::new(&mut cs);

        let var = Sha256Var::witness(cx.namespace("node"), Some(&node)).unwrap();
        var.inputize(cx.namespace("input")).unwrap();

        assert!(cs.verify(&Sha256Var::public_inputs(&node).unwrap()));
    }
}
