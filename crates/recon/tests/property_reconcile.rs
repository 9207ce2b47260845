// Property-based tests for filtering and reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use rollcall_recon::model::Value;
use rollcall_recon::{filter, reconcile, Roster};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small key space so collisions and duplicates are common.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (0i64..8).prop_map(Value::from),
        3 => "[a-d]".prop_map(Value::from),
        1 => Just(Value::Missing),
    ]
}

/// Rows of (key, campus, path).
fn arb_roster(label: &'static str) -> impl Strategy<Value = Roster> {
    prop::collection::vec((arb_value(), arb_value(), arb_value()), 0..24).prop_map(move |rows| {
        Roster::from_rows(
            label,
            vec!["key".into(), "campus".into(), "path".into()],
            rows.into_iter().map(|(k, c, p)| vec![k, c, p]).collect(),
        )
    })
}

fn arb_set() -> impl Strategy<Value = HashSet<Value>> {
    prop::collection::hash_set(arb_value(), 0..3)
}

fn keys(r: &Roster) -> Vec<Value> {
    let col = r.column("key").unwrap();
    r.values(&col).cloned().collect()
}

/// True if `sub` is `full` with some rows removed (stable subsequence).
fn is_subsequence(sub: &[Vec<Value>], full: &[Vec<Value>]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|row| it.any(|candidate| candidate == row))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn filter_with_empty_sets_is_identity(active in arb_roster("active")) {
        let campus = active.column("campus").unwrap();
        let path = active.column("path").unwrap();
        let out = filter(&active, &campus, &HashSet::new(), &path, &HashSet::new());
        prop_assert_eq!(out, active);
    }

    #[test]
    fn filter_rows_satisfy_both_predicates(
        active in arb_roster("active"),
        exclude in arb_set(),
        include in arb_set(),
    ) {
        let campus = active.column("campus").unwrap();
        let path = active.column("path").unwrap();
        let out = filter(&active, &campus, &exclude, &path, &include);

        for row in out.rows() {
            prop_assert!(!exclude.contains(out.get(row, &campus)));
            prop_assert!(include.is_empty() || include.contains(out.get(row, &path)));
        }
        prop_assert!(is_subsequence(out.rows(), active.rows()));
    }

    #[test]
    fn filter_order_does_not_matter(
        active in arb_roster("active"),
        exclude in arb_set(),
        include in arb_set(),
    ) {
        let campus = active.column("campus").unwrap();
        let path = active.column("path").unwrap();
        let none = HashSet::new();

        let both = filter(&active, &campus, &exclude, &path, &include);
        let excl_then_incl = filter(
            &filter(&active, &campus, &exclude, &path, &none),
            &campus, &none, &path, &include,
        );
        let incl_then_excl = filter(
            &filter(&active, &campus, &none, &path, &include),
            &campus, &exclude, &path, &none,
        );
        prop_assert_eq!(&both, &excl_then_incl);
        prop_assert_eq!(&both, &incl_then_excl);
    }

    #[test]
    fn reconcile_is_complete_and_stable(
        active in arb_roster("active"),
        access in arb_roster("access"),
    ) {
        let ak = active.column("key").unwrap();
        let xk = access.column("key").unwrap();
        let out = reconcile(&active, &ak, &access, &xk);

        let access_keys: HashSet<Value> = keys(&access).into_iter().collect();
        let active_keys: HashSet<Value> = keys(&active).into_iter().collect();

        // Every active row is either matched or in to_add, never both.
        let expected_add = active.rows().iter()
            .filter(|row| !access_keys.contains(active.get(row, &ak)))
            .count();
        prop_assert_eq!(out.to_add.len(), expected_add);
        for key in keys(&out.to_add) {
            prop_assert!(!access_keys.contains(&key));
        }

        let expected_remove = access.rows().iter()
            .filter(|row| !active_keys.contains(access.get(row, &xk)))
            .count();
        prop_assert_eq!(out.to_remove.len(), expected_remove);
        for key in keys(&out.to_remove) {
            prop_assert!(!active_keys.contains(&key));
        }

        prop_assert!(is_subsequence(out.to_add.rows(), active.rows()));
        prop_assert!(is_subsequence(out.to_remove.rows(), access.rows()));
    }

    #[test]
    fn reconcile_with_itself_is_empty(active in arb_roster("active")) {
        let key = active.column("key").unwrap();
        let out = reconcile(&active, &key, &active, &key);
        prop_assert!(out.to_add.is_empty());
        prop_assert!(out.to_remove.is_empty());
    }

    #[test]
    fn add_and_remove_keys_are_disjoint(
        active in arb_roster("active"),
        access in arb_roster("access"),
    ) {
        let ak = active.column("key").unwrap();
        let xk = access.column("key").unwrap();
        let out = reconcile(&active, &ak, &access, &xk);

        let add: HashSet<Value> = keys(&out.to_add).into_iter().collect();
        let remove: HashSet<Value> = keys(&out.to_remove).into_iter().collect();
        prop_assert!(add.is_disjoint(&remove));
    }
}
