//! Property tests for translation invariants.

use proptest::prelude::*;
use runcompose::{ComposeBuilder, compose::ComposeDocument};

const DISTINCT_FLAGS: [&str; 9] = [
    "--restart always",
    "-p 80:80",
    "--hostname web",
    "--cpus 2",
    "--ulimit nofile=10:20",
    "-e A=1",
    "--network backend",
    "-v data:/data",
    "--label tier=front",
];

fn document(source: &str) -> ComposeDocument {
    ComposeBuilder::default()
        .parse(source)
        .unwrap_or_else(|err| panic!("Failed to parse {source:?}: {err}"))
        .document()
        .clone()
}

proptest! {
    #[test]
    fn prop_distinct_flags_are_order_independent(
        flags in Just(DISTINCT_FLAGS.to_vec()).prop_shuffle(),
    ) {
        let shuffled = document(&format!("docker run {} nginx", flags.join(" ")));
        let canonical = document(&format!("docker run {} nginx", DISTINCT_FLAGS.join(" ")));

        prop_assert_eq!(shuffled, canonical);
    }

    #[test]
    fn prop_merge_is_associative_for_distinct_services(
        names in prop::collection::hash_set("[a-z]{3,8}", 3),
        ports in prop::collection::vec(1u16..u16::MAX, 3),
    ) {
        let names: Vec<_> = names.into_iter().collect();
        let documents: Vec<_> = names
            .iter()
            .zip(&ports)
            .map(|(name, port)| document(&format!("docker run -p {port}:{port} {name}")))
            .collect();

        let mut left = documents[0].clone();
        left.merge(documents[1].clone());
        left.merge(documents[2].clone());

        let mut tail = documents[1].clone();
        tail.merge(documents[2].clone());
        let mut right = documents[0].clone();
        right.merge(tail);

        prop_assert_eq!(left, right);
    }
}
