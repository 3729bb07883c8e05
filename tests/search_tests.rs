use raidcomp::data::candidate::Candidate;
use raidcomp::data::catalog::{CatalogSpec, RoleCatalog};
use raidcomp::data::quota::RoleQuota;
use raidcomp::data::roster::{load_roster, Member};
use raidcomp::optimizer::scorer::meets_quota;
use raidcomp::optimizer::{
    search, search_with, search_with_progress, CompositionScorer, Evaluation, SearchError,
    SearchOptions, WeightedScorer,
};

fn small_catalog() -> RoleCatalog {
    let spec: CatalogSpec = serde_json::from_str(
        r#"{"categories": [
            {"name": "Tank", "roles": ["T1", "T2"]},
            {"name": "Healer", "roles": ["H1", "H2"]},
            {"name": "DPS", "roles": ["D1", "D2", "D3"]}
        ]}"#,
    )
    .expect("catalog spec should parse");
    RoleCatalog::from_spec(&spec).expect("catalog should build")
}

fn pool(catalog: &RoleCatalog, entries: &[(&str, &str)]) -> Vec<Candidate<String>> {
    entries
        .iter()
        .map(|(name, jobs)| {
            Candidate::parse(name.to_string(), jobs, catalog).expect("candidate should resolve")
        })
        .collect()
}

fn demo_pool() -> (RoleCatalog, Vec<Candidate<Member>>, RoleQuota) {
    let file = load_roster(concat!(env!("CARGO_MANIFEST_DIR"), "/data/rosters/demo.yaml"))
        .expect("demo roster should load");
    let catalog = file.catalog().expect("demo roster uses the built-in catalog");
    let roster = file.resolve(&catalog).expect("demo roster should resolve");
    let quota = roster.quota.expect("demo roster declares a quota");
    (catalog, roster.candidates, quota)
}

#[test]
fn disjoint_first_choices_give_a_single_assignment() {
    let catalog = small_catalog();
    let candidates = pool(&catalog, &[("a", "T1"), ("b", "H1"), ("c", "D1"), ("d", "D2")]);

    let result = search(&candidates, &RoleQuota::from_counts(vec![1, 1, 2]), &catalog).unwrap();

    assert_eq!(result.best_assignments.len(), 1);
    // Four first choices, each weighted |catalog| - 0; DPS is a single group so no bonus.
    assert_eq!(result.best_score, 4 * 7);
    assert_eq!(result.best_assignments[0].pool_indices, vec![0, 1, 2, 3]);
}

#[test]
fn one_tank_slot_never_holds_two_tanks() {
    let catalog = small_catalog();
    let candidates = pool(&catalog, &[("a", "T1"), ("b", "T1")]);
    let t1 = catalog.role("T1").unwrap();

    let result = search(&candidates, &RoleQuota::from_counts(vec![1, 0, 0]), &catalog).unwrap();

    assert_eq!(result.best_assignments.len(), 2);
    for assignment in &result.best_assignments {
        assert_eq!(assignment.roles, vec![t1]);
    }
}

#[test]
fn repeated_role_is_penalized_but_feasible() {
    let catalog = small_catalog();
    let candidates = pool(&catalog, &[("a", "T1"), ("b", "T1")]);

    let result = search(&candidates, &RoleQuota::from_counts(vec![2, 0, 0]), &catalog).unwrap();

    assert_eq!(result.best_assignments.len(), 1);
    assert_eq!(result.best_score, 7 + 7 - 10);
}

#[test]
fn exact_pool_scores_every_role_choice() {
    let catalog = RoleCatalog::ffxiv();
    let candidates = pool(
        &catalog,
        &[("a", "WAR,WHM"), ("b", "WHM,SCH"), ("c", "BLM,WAR,MNK")],
    );

    let result = search(&candidates, &RoleQuota::from_counts(vec![1, 1, 1]), &catalog).unwrap();

    assert_eq!(result.subsets_considered, 1);
    assert_eq!(result.subsets_pruned, 0);
    assert_eq!(result.assignments_scored, 2 * 2 * 3);
    assert!(!result.is_infeasible());
}

#[test]
fn zero_quota_yields_the_empty_composition() {
    let catalog = RoleCatalog::ffxiv();
    let candidates = pool(&catalog, &[("a", "WAR")]);

    let result = search(&candidates, &RoleQuota::from_counts(vec![0, 0, 0]), &catalog).unwrap();

    assert_eq!(result.best_score, 0);
    assert_eq!(result.best_assignments.len(), 1);
    assert!(result.best_assignments[0].members.is_empty());
}

#[test]
fn too_few_candidates_is_an_error() {
    let catalog = RoleCatalog::ffxiv();
    let candidates = pool(&catalog, &[("a", "WAR"), ("b", "WHM")]);

    let err = search(&candidates, &RoleQuota::from_counts(vec![1, 1, 1]), &catalog).unwrap_err();

    assert!(matches!(
        err,
        SearchError::InsufficientCandidates {
            required: 3,
            available: 2
        }
    ));
}

#[test]
fn no_matching_roles_is_infeasible_not_an_error() {
    let catalog = RoleCatalog::ffxiv();
    let candidates = pool(&catalog, &[("a", "WAR"), ("b", "PLD")]);

    let result = search(&candidates, &RoleQuota::from_counts(vec![1, 1, 0]), &catalog).unwrap();

    assert!(result.is_infeasible());
    assert_eq!(result.best_score, 0);
}

#[test]
fn repeated_runs_agree() {
    let (catalog, candidates, quota) = demo_pool();

    let first = search(&candidates, &quota, &catalog).unwrap();
    let second = search(&candidates, &quota, &catalog).unwrap();

    assert_eq!(first, second);
}

#[test]
fn demo_roster_produces_quota_compliant_ties() {
    let (catalog, candidates, quota) = demo_pool();

    let result = search(&candidates, &quota, &catalog).unwrap();

    assert!(!result.best_assignments.is_empty());
    assert!(result.best_score > 0);
    for assignment in &result.best_assignments {
        assert_eq!(assignment.members.len(), 8);
        assert!(meets_quota(&assignment.roles, &quota, &catalog));
    }
}

#[test]
fn parallel_search_matches_sequential() {
    let (catalog, candidates, quota) = demo_pool();
    let scorer = WeightedScorer::default();

    let sequential = search_with(
        &candidates,
        &quota,
        &catalog,
        &scorer,
        &SearchOptions::default(),
    )
    .unwrap();
    let parallel = search_with(
        &candidates,
        &quota,
        &catalog,
        &scorer,
        &SearchOptions {
            parallel: true,
            workers: 3,
            ..SearchOptions::default()
        },
    )
    .unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn pruning_does_not_change_the_outcome() {
    let (catalog, candidates, quota) = demo_pool();
    let scorer = WeightedScorer::default();

    let pruned = search_with(
        &candidates,
        &quota,
        &catalog,
        &scorer,
        &SearchOptions::default(),
    )
    .unwrap();
    let exhaustive = search_with(
        &candidates,
        &quota,
        &catalog,
        &scorer,
        &SearchOptions {
            prune: false,
            ..SearchOptions::default()
        },
    )
    .unwrap();

    assert_eq!(pruned.best_score, exhaustive.best_score);
    assert_eq!(pruned.best_assignments, exhaustive.best_assignments);
    assert_eq!(
        pruned.total_feasible_considered,
        exhaustive.total_feasible_considered
    );
    assert_eq!(exhaustive.subsets_pruned, 0);
    assert_eq!(pruned.subsets_considered, exhaustive.subsets_considered);
}

#[test]
fn progress_reaches_the_total() {
    let (catalog, candidates, quota) = demo_pool();
    let mut seen = Vec::new();

    search_with_progress(
        &candidates,
        &quota,
        &catalog,
        &WeightedScorer::default(),
        &SearchOptions::default(),
        |done, total| seen.push((done, total)),
    )
    .unwrap();

    let (done, total) = *seen.last().unwrap();
    assert_eq!(done, total);
    // Leading pairs with room for six more members out of eleven: C(5, 2).
    assert_eq!(total, 10);
    assert!(seen.windows(2).all(|pair| pair[0].0 <= pair[1].0));
}

#[test]
fn moving_the_played_role_earlier_never_lowers_the_score() {
    let (catalog, candidates, quota) = demo_pool();
    let scorer = WeightedScorer::default();
    let result = search(&candidates, &quota, &catalog).unwrap();
    let winner = &result.best_assignments[0];

    for (slot, member) in winner.members.iter().enumerate() {
        let played = winner.roles[slot];
        let mut promoted = vec![played];
        promoted.extend(member.preferences().iter().copied().filter(|role| *role != played));
        let promoted = Candidate::new(member.token.clone(), promoted, &catalog).unwrap();

        let mut members: Vec<&Candidate<Member>> = winner.members.iter().collect();
        members[slot] = &promoted;

        let before = scorer.score(
            &winner.members.iter().collect::<Vec<_>>(),
            &winner.roles,
            &quota,
            &catalog,
        );
        let after = scorer.score(&members, &winner.roles, &quota, &catalog);
        match (before, after) {
            (Evaluation::Feasible(before), Evaluation::Feasible(after)) => {
                assert!(after >= before)
            }
            other => panic!("winning assignment should stay feasible: {other:?}"),
        }
    }
}
