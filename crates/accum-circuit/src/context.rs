//! Explicit constraint-system context threaded through symbolic digests.

use bellman::{ConstraintSystem, Namespace};
use bls12_381::Scalar;

/// Constraint system handle plus a counter for unique namespace names.
pub struct CircuitContext<'a, CS> {
    cs: &'a mut CS,
    next_id: u64,
}

impl<'a, CS: ConstraintSystem<Scalar>> CircuitContext<'a, CS> {
    /// Wrap a constraint system.
    pub const fn new(cs: &'a mut CS) -> Self {
        Self { cs, next_id: 0 }
    }

    /// A fresh namespace named `label` plus a sequence number.
    pub fn namespace(&mut self, label: &str) -> Namespace<'_, Scalar, CS::Root> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.cs.namespace(|| format!("{label} {id}"))
    }

    /// The wrapped constraint system.
    pub const fn cs(&mut self) -> &mut CS {
        self.cs
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "unit-test")]

    use bellman::gadgets::boolean::AllocatedBit;
    use bellman::gadgets::test::TestConstraintSystem;

    use super::*;

    #[test]
    fn namespaces_never_collide() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let mut cx = CircuitContext::new(&mut cs);

        // the test system panics on a duplicate path
        AllocatedBit::alloc(cx.namespace("bit"), Some(true)).unwrap();
        AllocatedBit::alloc(cx.namespace("bit"), Some(false)).unwrap();

        assert_eq!(cx.cs().num_constraints(), 2);
        assert!(cs.is_satisfied());
    }
}
