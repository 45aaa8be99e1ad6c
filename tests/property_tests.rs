//! Property-based tests for trueno-preview
//!
//! Following ruchy/trueno/aprender pattern:
//! - Test mathematical invariants
//! - Test data integrity properties
//! - Run with ProptestConfig::with_cases(100)
//! - Must complete in <30 seconds for pre-commit hook

use proptest::prelude::*;
use trueno_preview::{
    Error, LeafPreview, Preview, PreviewCollection, TaskClass, VariedParameter,
};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a single-measurement leaf with 0..max_rows entries
fn arb_leaf(max_rows: usize) -> impl Strategy<Value = LeafPreview> {
    proptest::collection::vec(-1000.0f64..1000.0, 0..max_rows).prop_map(|values| {
        LeafPreview::new(["acc"], values.into_iter().map(|v| vec![v]).collect()).unwrap()
    })
}

/// Generate a sequence of (index, preview) calls, indices may skip ahead
fn arb_calls() -> impl Strategy<Value = Vec<(usize, LeafPreview)>> {
    proptest::collection::vec((0usize..6, arb_leaf(6)), 0..20)
}

fn folds() -> PreviewCollection<LeafPreview> {
    PreviewCollection::new("id", "fold", TaskClass::CROSS_VALIDATION)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: num_entries == min_entry_num * child count after any calls
    #[test]
    fn prop_num_entries_is_min_times_children(calls in arb_calls()) {
        let mut c = folds();
        for (index, leaf) in calls {
            let _ = c.set_preview(index, leaf);
            prop_assert_eq!(c.num_entries(), c.min_entry_num() * c.len());
            let min = c.previews().iter().map(Preview::num_entries).min().unwrap_or(0);
            prop_assert_eq!(c.min_entry_num(), min);
        }
    }

    /// Property: only indices past the end fail, and failures change nothing
    #[test]
    fn prop_invalid_index_leaves_state(calls in arb_calls()) {
        let mut c = folds();
        for (index, leaf) in calls {
            let len = c.len();
            let min = c.min_entry_num();
            let empty = leaf.num_entries() == 0;
            match c.set_preview(index, leaf) {
                Ok(()) => prop_assert!(empty || index <= len),
                Err(Error::InvalidIndex { .. }) => {
                    prop_assert!(index > len);
                    prop_assert_eq!(c.len(), len);
                    prop_assert_eq!(c.min_entry_num(), min);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }

    /// Property: a foreign contract is always rejected without side effects
    #[test]
    fn prop_contract_mismatch_leaves_state(
        first in arb_leaf(5),
        rows in proptest::collection::vec(-10.0f64..10.0, 1..5),
    ) {
        prop_assume!(first.num_entries() > 0);
        let mut c = folds();
        c.set_preview(0, first).unwrap();
        let before = c.to_string();

        let foreign = LeafPreview::new(["kappa"], rows.into_iter().map(|v| vec![v]).collect()).unwrap();
        let is_mismatch = matches!(c.set_preview(1, foreign), Err(Error::ContractMismatch { .. }));
        prop_assert!(is_mismatch);
        prop_assert_eq!(c.len(), 1);
        prop_assert_eq!(c.to_string(), before);
    }

    /// Property: interlaced entry i is [i, i mod n] ++ child[i mod n][i div n]
    #[test]
    fn prop_interlacing_layout(leaves in proptest::collection::vec(arb_leaf(5), 1..5)) {
        let mut c = folds();
        for leaf in leaves.into_iter().filter(|l| l.num_entries() > 0) {
            let slot = c.len();
            c.set_preview(slot, leaf).unwrap();
        }

        let n = c.len();
        for i in 0..c.num_entries() {
            let entry = c.entry_data(i).unwrap();
            let child = c.previews()[i % n].entry_data(i / n).unwrap();
            prop_assert_eq!(entry[0] as usize, i);
            prop_assert_eq!(entry[1] as usize, i % n);
            prop_assert_eq!(&entry[2..], child.as_slice());
        }
    }

    /// Property: replacing a slot never shrinks it
    #[test]
    fn prop_replacement_is_monotonic(lengths in proptest::collection::vec(1usize..8, 1..10)) {
        let mut c = folds();
        let mut longest = 0;
        for len in lengths {
            let leaf = LeafPreview::new(["acc"], vec![vec![0.0]; len]).unwrap();
            c.set_preview(0, leaf).unwrap();
            longest = longest.max(len);
            prop_assert_eq!(c.previews()[0].num_entries(), longest);
        }
    }

    /// Property: averaging identical folds returns the fold with zero std
    #[test]
    fn prop_identical_folds_have_zero_std(
        values in proptest::collection::vec(-100.0f64..100.0, 2),
        num_folds in 1usize..5,
    ) {
        let param = VariedParameter::new("budget", vec![0.1, 0.2]);
        let mut input = PreviewCollection::<PreviewCollection<LeafPreview>>::builder("id", "fold")
            .varied_param(param.clone())
            .build();
        for fold_slot in 0..num_folds {
            let mut fold = PreviewCollection::<LeafPreview>::builder("id", "param")
                .varied_param(param.clone())
                .build();
            for (slot, v) in values.iter().enumerate() {
                fold.set_preview(slot, LeafPreview::new(["acc"], vec![vec![*v]]).unwrap()).unwrap();
            }
            input.set_preview(fold_slot, fold).unwrap();
        }

        let means = input.calculate_mean_preview().unwrap().into_averaged().unwrap();
        for (slot, v) in values.iter().enumerate() {
            let row = &means.previews()[slot].rows()[0];
            prop_assert!((row[0] - v).abs() < 1e-9);
            prop_assert!(row[1].abs() < 1e-9);
        }
    }
}
