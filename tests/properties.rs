//! Property-based tests for the accuracy statistics and matrix helpers.

use mutation_age_figures::stats;
use proptest::prelude::*;

fn ages() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0_f64..1e5, 1..200)
}

fn square_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1_usize..12).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0.0_f64..1e4, n), n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Shifting every estimate by `c` shifts the bias by exactly `c`.
    #[test]
    fn bias_follows_a_constant_shift(x in ages(), c in -1e3_f64..1e3) {
        let y: Vec<f64> = x.iter().map(|v| v + c).collect();
        let b = stats::bias(&x, &y).unwrap();
        prop_assert!((b - c).abs() < 1e-6 * (1.0 + c.abs()), "bias {b} vs shift {c}");
    }

    /// Estimates equal to the truth have no error and perfect correlation.
    #[test]
    fn exact_estimates_are_perfect(x in ages()) {
        prop_assert_eq!(stats::rmsle(&x, &x).unwrap(), 0.0);
        if x.len() > 1 && x.iter().any(|v| *v != x[0]) {
            let rho = stats::spearman(&x, &x).unwrap();
            prop_assert!((rho - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn spearman_is_bounded(x in ages(), y in ages()) {
        let n = x.len().min(y.len());
        let rho = stats::spearman(&x[..n], &y[..n]).unwrap();
        prop_assert!(rho.is_nan() || (-1.0 - 1e-9..=1.0 + 1e-9).contains(&rho));
    }

    #[test]
    fn symmetrize_is_idempotent(m in square_matrix()) {
        let once = stats::symmetrize(&m).unwrap();
        let twice = stats::symmetrize(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        for i in 0..once.len() {
            for j in 0..once.len() {
                prop_assert_eq!(once[i][j], once[j][i]);
            }
            // The lower triangle and diagonal are untouched.
            for j in 0..=i {
                prop_assert_eq!(once[i][j], m[i][j]);
            }
        }
    }

    #[test]
    fn linkage_order_is_a_permutation(m in square_matrix()) {
        let sym = stats::symmetrize(&m).unwrap();
        let tree = stats::average_linkage(&stats::row_distances(&sym));
        prop_assert_eq!(tree.merges.len(), sym.len() - 1);
        let mut order = tree.order();
        order.sort_unstable();
        prop_assert_eq!(order, (0..sym.len()).collect::<Vec<_>>());
    }

    /// Merging young bins keeps the lowest edge, drops only edges younger
    /// than the cutoff, and the density still integrates to one.
    #[test]
    fn merged_histogram_integrates_to_one(
        max_log in 5.0_f64..12.0,
        bins in 5_usize..80,
        min_time in 1.0_f64..100.0,
        values in prop::collection::vec(0.0_f64..1.0, 1..100),
    ) {
        let edges = stats::linear_edges(0.0, max_log, bins);
        let merged = stats::merge_low_edges(&edges, min_time);
        prop_assert_eq!(merged[0], edges[0]);
        prop_assert!(merged.iter().skip(1).all(|e| e.exp() >= min_time));
        prop_assert!(merged.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(
            merged.len() - 1,
            edges.iter().skip(1).filter(|e| e.exp() >= min_time).count()
        );

        if merged.len() >= 2 {
            let times: Vec<f64> = values.iter().map(|v| v * max_log).collect();
            let weights = vec![1.0; times.len()];
            let density = stats::weighted_histogram(&times, &weights, &merged, true).unwrap();
            let area: f64 = density
                .iter()
                .zip(merged.windows(2))
                .map(|(d, w)| d * (w[1] - w[0]))
                .sum();
            prop_assert!((area - 1.0).abs() < 1e-9, "area {area}");
        }
    }

    /// Intervals are open: a bound equal to the truth does not cover it.
    #[test]
    fn coverage_counts_strictly_inside(truth in ages(), width in 1.0_f64..1e4, split in 0_usize..200) {
        let lower: Vec<f64> = truth.iter().map(|t| t - width).collect();
        let mut upper: Vec<f64> = truth.iter().map(|t| t + width).collect();
        prop_assert_eq!(stats::coverage(&truth, &lower, &upper).unwrap(), 1.0);

        let closed = split.min(truth.len());
        upper[..closed].copy_from_slice(&truth[..closed]);
        let c = stats::coverage(&truth, &lower, &upper).unwrap();
        let expected = (truth.len() - closed) as f64 / truth.len() as f64;
        prop_assert!((c - expected).abs() < 1e-12);
    }
}
