//! End-to-end reconciliation: detect a candidate grouping's mistakes and
//! repair it back to the authoritative grouping.

use std::collections::BTreeSet;

use chainstat_core::Grouping;
use chainstat_groups::{
    apply_corrections, grouped_identifiers, reconcile, reconcile_grouping, remove,
};
use proptest::prelude::*;

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}

fn actual() -> Grouping {
    Grouping::from_json(
        r#"{
            "science": ["AskScience", "physics"],
            "media": ["pics", "WTF"],
            "other": ["misc"]
        }"#,
    )
    .expect("valid grouping")
}

fn sample() -> Grouping {
    Grouping::from_json(
        r#"{
            "science": ["askscience", "physics", "MadeUp"],
            "media": ["pics", "wtf"],
            "other": ["misc", "MadeUp"]
        }"#,
    )
    .expect("valid grouping")
}

#[test]
fn casing_round_trip() {
    let r = reconcile(
        &set(&["AskReddit", "science"]),
        &set(&["askreddit", "science", "NewOne"]),
    );
    assert!(r.true_missing.is_empty());
    assert_eq!(r.true_add, set(&["NewOne"]));
    assert_eq!(r.changed["askreddit"], set(&["AskReddit"]));
    assert_eq!(r.changed["AskReddit"], set(&["AskReddit"]));
}

#[test]
fn classifies_sample_mistakes() {
    let authoritative = grouped_identifiers(&actual());
    let r = reconcile_grouping(&authoritative, &sample());

    assert!(r.true_missing.is_empty());
    assert_eq!(r.true_add, set(&["MadeUp"]));
    assert_eq!(
        r.changed.keys().cloned().collect::<BTreeSet<_>>(),
        set(&["AskScience", "WTF", "askscience", "wtf"])
    );
    assert_eq!(r.changed["wtf"], set(&["WTF"]));
}

#[test]
fn corrected_sample_matches_actual() {
    let authoritative = grouped_identifiers(&actual());
    let r = reconcile_grouping(&authoritative, &sample());

    let corrected = apply_corrections(&remove(&sample(), &r.true_add), &r.changed);
    let expected = remove(&actual(), &r.true_add);
    assert_eq!(corrected, expected);
}

#[test]
fn truly_missing_identifier_survives_correction() {
    let mut candidate = sample();
    candidate.members_mut("media").remove("wtf");

    let authoritative = grouped_identifiers(&actual());
    let r = reconcile_grouping(&authoritative, &candidate);
    assert_eq!(r.true_missing, set(&["WTF"]));
    assert!(!r.changed.contains_key("WTF"));
}

fn arb_grouping() -> impl Strategy<Value = Grouping> {
    prop::collection::btree_map(
        "[a-c]{1,3}",
        prop::collection::btree_set("[a-eA-E]{1,3}", 0..6),
        0..4,
    )
    .prop_map(|categories| categories.into_iter().collect())
}

proptest! {
    #[test]
    fn remove_is_idempotent(
        groups in arb_grouping(),
        removal in prop::collection::btree_set("[a-eA-E]{1,3}", 0..6),
    ) {
        let once = remove(&groups, &removal);
        let twice = remove(&once, &removal);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reconciliation_partitions_the_difference(
        authoritative in prop::collection::btree_set("[a-cA-C]{1,2}", 0..8),
        candidate in prop::collection::btree_set("[a-cA-C]{1,2}", 0..8),
    ) {
        let r = reconcile(&authoritative, &candidate);
        for id in &r.true_missing {
            prop_assert!(authoritative.contains(id) && !candidate.contains(id));
            prop_assert!(!r.changed.contains_key(id));
        }
        for id in &r.true_add {
            prop_assert!(candidate.contains(id) && !authoritative.contains(id));
            prop_assert!(!r.changed.contains_key(id));
        }
        let differing = authoritative.symmetric_difference(&candidate).count();
        prop_assert_eq!(r.true_missing.len() + r.true_add.len() + r.changed.len(), differing);
        for forms in r.changed.values() {
            prop_assert!(forms.is_subset(&authoritative));
        }
    }
}
