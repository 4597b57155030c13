use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use remap_config::MatcherConfig;
use remap_convert::{spawn_matching, ClassMatch, ClassMatcher, MatchPhase};
use remap_core::ClassEntry;
use remap_scheduler::{CancellationToken, Cancelled, Scheduler, SchedulerConfig};
use remap_test_utils::ClassBuilder;

use super::{index, pairs, twin_packages};

#[test]
fn a_lone_class_is_matched_in_the_first_round() {
    let old = index(vec![ClassBuilder::new("a")
        .field("f", "I")
        .method("m", "(Ljava/lang/String;)V")]);
    let new = index(vec![ClassBuilder::new("b")
        .field("g", "I")
        .method("n", "(Ljava/lang/String;)V")]);
    let config = MatcherConfig::default();

    let outcome = ClassMatcher::new(&old, &new, &config)
        .compute_matching(&BTreeMap::new(), &CancellationToken::new())
        .unwrap();

    assert_eq!(outcome.matching.unique_matches(), &pairs(&[("a", "b")]));
    let first = outcome.reports[0];
    assert_eq!(first.round, 1);
    assert_eq!(first.phase, MatchPhase::Structure);
    assert_eq!(first.new_unique_matches, 1);
    assert!(outcome.reports[1..]
        .iter()
        .all(|report| report.new_unique_matches == 0));
}

#[test]
fn references_break_structural_ties() {
    let (old, new) = twin_packages();
    let config = MatcherConfig::default();

    let outcome = ClassMatcher::new(&old, &new, &config)
        .compute_matching(&BTreeMap::new(), &CancellationToken::new())
        .unwrap();

    let first = outcome.reports[0];
    assert_eq!(first.phase, MatchPhase::Structure);
    assert_eq!(first.unique_matches, 0);
    assert_eq!(first.ambiguous_matches, 1);
    assert_eq!(
        outcome.matching.unique_matches(),
        &pairs(&[("a", "x"), ("b", "y")])
    );
    let resolving = outcome
        .reports
        .iter()
        .find(|report| report.new_unique_matches > 0)
        .unwrap();
    assert_eq!(resolving.phase, MatchPhase::References);
}

#[test]
fn structural_ties_stay_ambiguous_in_a_single_round() {
    let (old, new) = twin_packages();
    let config = MatcherConfig::default();
    let matcher = ClassMatcher::new(&old, &new, &config);

    let matching = matcher.round(
        MatchPhase::Structure,
        &BTreeMap::new(),
        &[(
            vec![ClassEntry::new("a"), ClassEntry::new("b")],
            vec![ClassEntry::new("x"), ClassEntry::new("y")],
        )],
    );
    assert_eq!(
        matching.ambiguous_matches(),
        &[ClassMatch::new(
            [ClassEntry::new("a"), ClassEntry::new("b")],
            [ClassEntry::new("x"), ClassEntry::new("y")],
        )]
    );
    assert!(matching.unique_matches().is_empty());
}

#[test]
fn known_pairs_are_kept_fixed() {
    let (old, new) = twin_packages();
    let config = MatcherConfig::default();

    let outcome = ClassMatcher::new(&old, &new, &config)
        .compute_matching(&pairs(&[("a", "y")]), &CancellationToken::new())
        .unwrap();
    assert_eq!(
        outcome.matching.unique_matches(),
        &pairs(&[("a", "y"), ("b", "x")])
    );
}

#[test]
fn classes_without_features_stay_unmatched() {
    let old = index(vec![ClassBuilder::new("a")]);
    let new = index(vec![ClassBuilder::new("b")]);
    let config = MatcherConfig::default();

    let outcome = ClassMatcher::new(&old, &new, &config)
        .compute_matching(&BTreeMap::new(), &CancellationToken::new())
        .unwrap();
    assert!(outcome.matching.unique_matches().is_empty());
    assert!(outcome
        .matching
        .unmatched_source_classes()
        .contains(&ClassEntry::new("a")));
    assert!(outcome
        .matching
        .unmatched_dest_classes()
        .contains(&ClassEntry::new("b")));
}

#[test]
fn parallel_scoring_gives_the_same_matching() {
    let (old, new) = twin_packages();
    let parallel = MatcherConfig::default();
    let serial = MatcherConfig {
        parallel: false,
        ..MatcherConfig::default()
    };
    let token = CancellationToken::new();

    let a = ClassMatcher::new(&old, &new, &parallel)
        .compute_matching(&BTreeMap::new(), &token)
        .unwrap();
    let b = ClassMatcher::new(&old, &new, &serial)
        .compute_matching(&BTreeMap::new(), &token)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn cancelled_matching_returns_nothing() {
    let (old, new) = twin_packages();
    let config = MatcherConfig::default();
    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(
        ClassMatcher::new(&old, &new, &config)
            .compute_matching(&BTreeMap::new(), &token)
            .unwrap_err(),
        Cancelled
    );
}

#[tokio::test]
async fn matching_runs_on_the_compute_pool() {
    let (old, new) = twin_packages();
    let scheduler = Scheduler::new(SchedulerConfig {
        compute_threads: 1,
        background_threads: 1,
    });

    let task = spawn_matching(
        &scheduler,
        Arc::new(old),
        Arc::new(new),
        BTreeMap::new(),
        MatcherConfig::default(),
    );
    let outcome = task.join().await.unwrap();
    assert_eq!(
        outcome.matching.unique_matches(),
        &pairs(&[("a", "x"), ("b", "y")])
    );
}
