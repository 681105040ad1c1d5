#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "integration-test"
)]
//! Property tests for bundles grown with random retention choices.

use std::collections::BTreeSet;

use accum_core::{
    AuthPath, Bundle, CodecError, Node, PedersenNode, Sha256Node, TextCodec, TreeError,
};
use incrementalmerkletree::{Hashable, Level};
use rand_core::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

const SEED: [u8; 16] = [
    0x59, 0x62, 0xbe, 0x3d, 0x76, 0x3d, 0x31, 0x8d, 0x17, 0xdb, 0x37, 0x32, 0x54, 0x06, 0xbc, 0xe5,
];

/// Grow a bundle with distinct leaves `1..=count`. The first and last leaves
/// are always kept, the others with probability 1/2.
fn random_bundle<N: Node>(depth: usize, count: u64, rng: &mut XorShiftRng) -> Bundle<N> {
    let mut bundle = Bundle::new(depth).unwrap();
    for i in 1..=count {
        let keep = i == 1 || i == count || rng.next_u32() % 2 == 0;
        bundle.add_leaf(N::from_u64(i), keep).unwrap();
    }
    bundle
}

fn assert_witnesses_valid<N: Node>(bundle: &Bundle<N>) {
    let root = bundle.root_hash().unwrap();
    for (leaf, path) in bundle.auth_leaf().iter().zip(bundle.auth_path()) {
        assert_eq!(path.root_hash(), Some(root));
        assert_eq!(path.recompute_root(leaf), *root);
    }
}

fn mix<N: Node>(level: u8, lhs: N, rhs: N) -> N {
    N::combine(Level::from(level), &lhs, &rhs)
}

#[test]
fn fills_exactly_at_capacity() {
    for depth in 1..=4 {
        let mut bundle = Bundle::<Sha256Node>::new(depth).unwrap();
        let capacity = 1u64 << depth;
        for i in 0..capacity {
            assert!(!bundle.is_full());
            bundle.add_leaf(Sha256Node::from_u64(i), i == 0).unwrap();
        }
        assert!(bundle.is_full());
        assert_eq!(bundle.tree_size(), capacity);

        let before = bundle.clone();
        assert_eq!(
            bundle.add_leaf(Sha256Node::from_u64(capacity), true),
            Err(TreeError::Full { capacity })
        );
        assert_eq!(bundle, before);
    }
}

#[test]
fn retained_paths_track_the_root_after_every_insertion() {
    let mut rng = XorShiftRng::from_seed(SEED);
    let mut bundle = Bundle::<Sha256Node>::new(5).unwrap();

    for i in 1..=32 {
        bundle
            .add_leaf(Sha256Node::from_u64(i), rng.next_u32() % 3 == 0)
            .unwrap();
        assert_witnesses_valid(&bundle);
    }
    assert!(bundle.is_full());
}

#[test]
fn retained_paths_track_the_pedersen_root() {
    let mut rng = XorShiftRng::from_seed(SEED);
    let bundle = random_bundle::<PedersenNode>(4, 11, &mut rng);
    assert_witnesses_valid(&bundle);
}

#[test]
fn full_tree_matches_a_level_by_level_fold() {
    let mut bundle = Bundle::<Sha256Node>::new(3).unwrap();
    let leaves: Vec<Sha256Node> = (10..18).map(Sha256Node::from_u64).collect();
    for leaf in &leaves {
        bundle.add_leaf(*leaf, true).unwrap();
    }

    let mut layer = leaves;
    for level in 0..3u8 {
        layer = layer
            .chunks(2)
            .map(|pair| mix(level, pair[0], pair[1]))
            .collect();
    }

    assert_eq!(bundle.root_hash(), Some(&layer[0]));
    for (position, path) in (0u64..).zip(bundle.auth_path()) {
        assert_eq!(path.position(), position);
    }
}

#[test]
fn empty_subtrees_are_zero_at_every_level() {
    let mut bundle = Bundle::<Sha256Node>::new(3).unwrap();
    let l: Vec<Sha256Node> = (0..6).map(Sha256Node::from_u64).collect();
    for leaf in &l {
        bundle.add_leaf(*leaf, false).unwrap();
    }

    let left = mix(1, mix(0, l[0], l[1]), mix(0, l[2], l[3]));
    let right = mix(1, mix(0, l[4], l[5]), Sha256Node::ZERO);
    assert_eq!(bundle.root_hash(), Some(&mix(2, left, right)));
}

#[test]
fn sibling_linkage_between_retained_paths() {
    let mut rng = XorShiftRng::from_seed(SEED);
    let bundle = random_bundle::<Sha256Node>(4, 13, &mut rng);
    let depth = bundle.depth();
    assert!(bundle.auth_leaf().len() >= 2);

    let retained: Vec<(&Sha256Node, &AuthPath<Sha256Node>)> =
        bundle.auth_leaf().iter().zip(bundle.auth_path()).collect();

    for (a_index, (a_leaf, a)) in retained.iter().enumerate() {
        for (b_leaf, b) in retained.iter().skip(a_index + 1) {
            let k = a.overlap(b);
            assert!(k < depth);

            assert_eq!(a.root_path()[depth - k - 1..], b.root_path()[depth - k - 1..]);
            if depth - k >= 2 {
                assert_ne!(a.root_path()[depth - k - 2], b.root_path()[depth - k - 2]);
                assert_eq!(a.siblings()[depth - k - 1], b.root_path()[depth - k - 2]);
                assert_eq!(b.siblings()[depth - k - 1], a.root_path()[depth - k - 2]);
            } else {
                assert_eq!(a.siblings()[0], **b_leaf);
                assert_eq!(b.siblings()[0], **a_leaf);
            }
        }
    }
}

#[test]
fn garbage_collection_keeps_an_in_order_subsequence() {
    let mut rng = XorShiftRng::from_seed(SEED);
    let mut bundle = random_bundle::<Sha256Node>(4, 12, &mut rng);

    let before: Vec<(Sha256Node, AuthPath<Sha256Node>)> = bundle
        .auth_leaf()
        .iter()
        .copied()
        .zip(bundle.auth_path().iter().cloned())
        .collect();
    let keep: BTreeSet<Sha256Node> = before.iter().step_by(2).map(|(leaf, _)| *leaf).collect();

    bundle.auth_garbage_collect(&keep);

    let expected: Vec<(Sha256Node, AuthPath<Sha256Node>)> = before
        .into_iter()
        .filter(|(leaf, _)| keep.contains(leaf))
        .collect();
    let after: Vec<(Sha256Node, AuthPath<Sha256Node>)> = bundle
        .auth_leaf()
        .iter()
        .copied()
        .zip(bundle.auth_path().iter().cloned())
        .collect();
    assert_eq!(after, expected);

    // surviving paths keep following the tree
    bundle.add_leaf(Sha256Node::from_u64(99), false).unwrap();
    assert_witnesses_valid(&bundle);

    bundle.auth_garbage_collect(&BTreeSet::new());
    assert!(bundle.auth_leaf().is_empty());
    assert!(bundle.auth_path().is_empty());
}

#[test]
fn depth_two_scenario_retaining_the_second_leaf() {
    let leaves: Vec<PedersenNode> = (0..4).map(|i| PedersenNode::from_u64(i + 100)).collect();
    let mut bundle = Bundle::<PedersenNode>::new(2).unwrap();
    for (i, leaf) in leaves.iter().enumerate() {
        bundle.add_leaf(*leaf, i == 1).unwrap();
    }

    let path = &bundle.auth_path()[0];
    let lower = mix(0, leaves[0], leaves[1]);
    let upper = mix(0, leaves[2], leaves[3]);
    let root = mix(1, lower, upper);

    assert_eq!(bundle.auth_leaf(), &[leaves[1]]);
    assert_eq!(path.child_bits(), &[true, false]);
    assert_eq!(path.siblings(), &[leaves[0], upper]);
    assert_eq!(path.root_path(), &[lower, root]);
    assert_eq!(bundle.root_hash(), Some(&root));
    assert!(bundle.is_full());
}

#[test]
fn encoding_round_trips() {
    let mut rng = XorShiftRng::from_seed(SEED);
    let bundle = random_bundle::<PedersenNode>(4, 9, &mut rng);

    let text = bundle.encode();
    let decoded = Bundle::<PedersenNode>::decode(&text).unwrap();
    assert_eq!(decoded, bundle);
    assert_eq!(decoded.root_hash(), bundle.root_hash());
    assert_eq!(decoded.to_string(), text);

    // a restored bundle keeps growing like the source
    let mut source = bundle;
    let mut restored = decoded;
    for i in 50..54 {
        source.add_leaf(PedersenNode::from_u64(i), true).unwrap();
        restored.add_leaf(PedersenNode::from_u64(i), true).unwrap();
    }
    assert_eq!(restored, source);
    assert_witnesses_valid(&restored);
}

#[test]
fn every_reachable_state_round_trips() {
    let mut rng = XorShiftRng::from_seed(SEED);
    for depth in 1..=4 {
        let mut bundle = Bundle::<Sha256Node>::new(depth).unwrap();
        let capacity = 1u64 << depth;
        for i in 0..capacity {
            bundle
                .add_leaf(Sha256Node::from_u64(i), rng.next_u32() % 2 == 0)
                .unwrap();
            if i == capacity / 2 {
                let keep: BTreeSet<Sha256Node> =
                    bundle.auth_leaf().iter().step_by(2).copied().collect();
                bundle.auth_garbage_collect(&keep);
            }

            assert_witnesses_valid(&bundle);
            assert_eq!(Bundle::decode(&bundle.encode()).unwrap(), bundle);
        }
        assert!(bundle.is_full());
    }
}

#[test]
fn full_bundle_round_trips() {
    let mut bundle = Bundle::<Sha256Node>::new(2).unwrap();
    for i in 0..4 {
        bundle.add_leaf(Sha256Node::from_u64(i), i == 3).unwrap();
    }
    let decoded: Bundle<Sha256Node> = bundle.encode().parse().unwrap();
    assert!(decoded.is_full());
    assert_eq!(decoded, bundle);
}

#[test]
fn decoding_rejects_an_inconsistent_tree_size() {
    let mut bundle = Bundle::<Sha256Node>::new(3).unwrap();
    for i in 0..3 {
        bundle.add_leaf(Sha256Node::from_u64(i), true).unwrap();
    }
    let tree = bundle.tree().encode();
    let text = bundle.encode();
    let rest = text[tree.len()..].strip_prefix("3\n").unwrap();
    let tampered = format!("{tree}4\n{rest}");

    assert_eq!(
        Bundle::<Sha256Node>::decode(&tampered),
        Err(CodecError::InconsistentSize { tree_size: 4 })
    );
}

#[test]
fn decoding_rejects_a_retained_path_of_another_depth() {
    let mut bundle = Bundle::<Sha256Node>::new(2).unwrap();
    bundle.add_leaf(Sha256Node::from_u64(1), false).unwrap();
    let header = bundle.encode();

    let leaf = Sha256Node::from_u64(1);
    let foreign = AuthPath::<Sha256Node>::new(1).unwrap();
    let text = format!(
        "{}1\n{}\n{}",
        header.strip_suffix("0\n").unwrap(),
        hex::encode(leaf.to_bytes()),
        foreign.encode()
    );

    assert_eq!(
        Bundle::<Sha256Node>::decode(&text),
        Err(CodecError::DepthMismatch {
            expected: 2,
            found: 1,
        })
    );
}

#[test]
fn decoding_rejects_truncated_input() {
    let mut bundle = Bundle::<Sha256Node>::new(2).unwrap();
    bundle.add_leaf(Sha256Node::from_u64(1), true).unwrap();
    let text = bundle.encode();
    let truncated = &text[..text.len() - 2];

    assert_eq!(
        Bundle::<Sha256Node>::decode(truncated),
        Err(CodecError::UnexpectedEnd("child_bits"))
    );
}
