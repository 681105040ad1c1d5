//! Membership circuit: a private leaf and path hash up to a public root.

use accum_core::{AuthPath, Bundle, Digest, Node, PedersenNode, Sha256Node};
use bellman::{Circuit, ConstraintSystem, SynthesisError};
use bls12_381::Scalar;

use crate::context::CircuitContext;
use crate::gadgets::{BitVar, CircuitDigest, PedersenVar, Sha256Var};

/// Proves that `leaf` authenticates against `root` through `path`.
///
/// Only the root is public. Every field is optional so the same circuit
/// shape can be synthesized without a witness for parameter generation.
#[derive(Clone, Debug)]
pub struct MembershipCircuit<N> {
    /// Tree depth; fixes the circuit shape.
    pub depth: usize,
    /// The committed leaf.
    pub leaf: Option<N>,
    /// Authentication path of `leaf`.
    pub path: Option<AuthPath<N>>,
    /// The public tree root.
    pub root: Option<N>,
}

impl<N: Node> MembershipCircuit<N> {
    /// A circuit without a witness.
    #[must_use]
    pub const fn blank(depth: usize) -> Self {
        Self {
            depth,
            leaf: None,
            path: None,
            root: None,
        }
    }

    /// A circuit for `leaf` proven through `path` against `root`.
    #[must_use]
    pub fn new(leaf: N, path: AuthPath<N>, root: N) -> Self {
        Self {
            depth: path.depth(),
            leaf: Some(leaf),
            path: Some(path),
            root: Some(root),
        }
    }

    /// A circuit for a leaf retained by `bundle`, proven against its current root.
    ///
    /// Returns `None` if the leaf is not retained or the bundle is empty.
    #[must_use]
    pub fn from_bundle(bundle: &Bundle<N>, leaf: &N) -> Option<Self> {
        let path = bundle.witness(leaf)?;
        let root = bundle.root_hash()?;
        Some(Self::new(*leaf, path.clone(), *root))
    }
}

/// Bind a concrete path into fresh circuit variables.
///
/// With `path` set to `None` every variable is left unassigned.
///
/// # Errors
/// Returns an error if an allocation fails or `depth` is unsupported.
pub fn witness_path<V, CS>(
    cx: &mut CircuitContext<'_, CS>,
    depth: usize,
    path: Option<&AuthPath<V::Node>>,
) -> Result<AuthPath<V, BitVar>, SynthesisError>
where
    V: CircuitDigest,
    CS: ConstraintSystem<Scalar>,
{
    let mut siblings = Vec::with_capacity(depth);
    let mut child_bits = Vec::with_capacity(depth);

    for level in 0..depth {
        let sibling = path.and_then(|path| path.siblings().get(level));
        siblings.push(V::witness(cx.namespace("sibling"), sibling)?);

        let is_right = path.and_then(|path| path.child_bits().get(level).copied());
        child_bits.push(BitVar::witness(cx.namespace("child bit"), is_right)?);
    }

    AuthPath::from_parts(siblings, child_bits).map_err(|_| SynthesisError::Unsatisfiable)
}

fn synthesize_membership<'a, V, CS>(
    cx: &mut CircuitContext<'a, CS>,
    circuit: MembershipCircuit<V::Node>,
) -> Result<(), SynthesisError>
where
    V: CircuitDigest + Digest<CircuitContext<'a, CS>, Bit = BitVar, Error = SynthesisError>,
    CS: ConstraintSystem<Scalar>,
{
    let leaf = V::witness(cx.namespace("leaf"), circuit.leaf.as_ref())?;
    let mut path = witness_path::<V, CS>(cx, circuit.depth, circuit.path.as_ref())?;

    // a depth-0 tree has the leaf as its root
    let cur = path.ascend(cx, &leaf)?;

    let rt = V::witness(cx.namespace("root"), circuit.root.as_ref())?;
    V::enforce_equal(cx.namespace("enforce correct root"), &cur, &rt)?;
    rt.inputize(cx.namespace("anchor"))
}

macro_rules! membership_circuit {
    ($($node:ty => $var:ty),+ $(,)?) => {
        $(
            impl Circuit<Scalar> for MembershipCircuit<$node> {
                fn synthesize<CS: ConstraintSystem<Scalar>>(
                    self,
                    cs: &mut CS,
                ) -> Result<(), SynthesisError> {
                    let mut cx = CircuitContext::new(cs);
                    synthesize_membership::<$var, CS>(&mut cx, self)
                }
            }
        )+
    };
}

membership_circuit!(PedersenNode => PedersenVar, Sha256Node => Sha256Var);
