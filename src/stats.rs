//! Summary statistics behind the figure annotations, plus the binning and
//! clustering used by the histogram, hexbin and clustermap figures.

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{FigureError, Result};

/// Fail unless both sequences have the same length.
pub fn check_lengths<A, B>(x: &[A], y: &[B]) -> Result<()> {
    if x.len() != y.len() {
        return Err(FigureError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    Ok(())
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean signed error `mean(y - x)`.
pub fn bias(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths(x, y)?;
    let diffs: Vec<f64> = x.iter().zip(y).map(|(a, b)| b - a).collect();
    Ok(mean(&diffs))
}

/// Root mean squared log error, `sqrt(mean((ln y - ln x)^2))`.
pub fn rmsle(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths(x, y)?;
    let sq: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(a, b)| (b.ln() - a.ln()).powi(2))
        .collect();
    Ok(mean(&sq).sqrt())
}

/// Pearson's correlation coefficient. NaN when either input is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths(x, y)?;
    let mx = mean(x);
    let my = mean(y);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Ok(sxy / (sxx * syy).sqrt())
}

/// Ranks starting at 1, ties sharing their average rank.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) hold ranks start+1..=end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Spearman's rank correlation: Pearson's r on average ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths(x, y)?;
    pearson(&average_ranks(x), &average_ranks(y))
}

/// The annotations printed on every accuracy panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyStats {
    pub count: usize,
    pub rmsle: f64,
    /// Pearson's r of the log-transformed values.
    pub pearson_log: f64,
    pub spearman: f64,
    pub bias: f64,
}

impl AccuracyStats {
    /// Compare estimates `y` against true values `x`.
    pub fn compute(x: &[f64], y: &[f64]) -> Result<Self> {
        check_lengths(x, y)?;
        let log_x: Vec<f64> = x.iter().map(|v| v.ln()).collect();
        let log_y: Vec<f64> = y.iter().map(|v| v.ln()).collect();
        Ok(AccuracyStats {
            count: x.len(),
            rmsle: rmsle(x, y)?,
            pearson_log: pearson(&log_x, &log_y)?,
            spearman: spearman(x, y)?,
            bias: bias(x, y)?,
        })
    }

    /// Annotation lines, top to bottom.
    pub fn annotations(&self) -> [String; 5] {
        [
            format!("{} mutations", self.count),
            format!("RMSLE: {:.2}", self.rmsle),
            format!("Pearson's r: {:.2}", self.pearson_log),
            format!("Spearman's ρ: {:.2}", self.spearman),
            format!("Bias:{:.2}", self.bias),
        ]
    }
}

/// Two-decimal scientific notation with a signed two-digit exponent, e.g. `1.23E-04`.
pub fn sci2(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}").to_uppercase();
    }
    let s = format!("{value:.2E}");
    match s.split_once('E') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Box plots and trend lines
// ---------------------------------------------------------------------------

/// Linear-interpolated quantile of sorted data (numpy's default method).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Five-number summary with whiskers at the furthest data within 1.5 IQR.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Summarise the finite values; `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let reach = 1.5 * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);
        let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min).min(q1);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max).max(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();
        Some(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }

    pub fn min(&self) -> f64 {
        self.outliers.iter().copied().fold(self.lower_whisker, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.outliers.iter().copied().fold(self.upper_whisker, f64::max)
    }
}

/// Mean and 95% normal confidence interval of one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanInterval {
    pub mean: f64,
    pub low: f64,
    pub high: f64,
}

impl MeanInterval {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let m = mean(&finite);
        let half = if finite.len() > 1 {
            let var = finite.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
            1.96 * (var / finite.len() as f64).sqrt()
        } else {
            0.0
        };
        Some(MeanInterval {
            mean: m,
            low: m - half,
            high: m + half,
        })
    }
}

/// Group `(x, y)` observations by `x` and summarise each group, in `x` order.
pub fn grouped_intervals(points: &[(f64, f64)]) -> Vec<(f64, MeanInterval)> {
    let mut groups: BTreeMap<u64, (f64, Vec<f64>)> = BTreeMap::new();
    for &(x, y) in points {
        if !x.is_finite() {
            continue;
        }
        // Order-preserving key for finite floats.
        let bits = x.to_bits();
        let key = if x.is_sign_negative() { !bits } else { bits | (1 << 63) };
        groups.entry(key).or_insert((x, Vec::new())).1.push(y);
    }
    groups
        .into_values()
        .filter_map(|(x, ys)| MeanInterval::from_values(&ys).map(|ci| (x, ci)))
        .collect()
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// Per-bin means of an equal-width binning in log space.
#[derive(Debug, Clone, PartialEq)]
pub struct LogBin {
    pub left: f64,
    pub right: f64,
    /// Mean of each value series inside the bin, in input order.
    pub means: Vec<f64>,
}

/// Split positive `keys` into `bins` equal-width bins in log space and average
/// every series of `values` per bin. Bins include their right edge; bins that
/// are empty or whose means are undefined are dropped.
pub fn log_binned_means(keys: &[f64], values: &[Vec<f64>], bins: usize) -> Result<Vec<LogBin>> {
    for series in values {
        check_lengths(keys, series)?;
    }
    let logs: Vec<(usize, f64)> = keys
        .iter()
        .enumerate()
        .filter(|(_, k)| **k > 0.0 && k.is_finite())
        .map(|(i, k)| (i, k.ln()))
        .collect();
    if logs.is_empty() || bins == 0 {
        return Ok(Vec::new());
    }
    let lo = logs.iter().map(|(_, l)| *l).fold(f64::INFINITY, f64::min);
    let hi = logs.iter().map(|(_, l)| *l).fold(f64::NEG_INFINITY, f64::max);
    let width = (hi - lo) / bins as f64;

    let mut sums = vec![vec![(0.0, 0usize); values.len()]; bins];
    for (i, l) in logs {
        let b = if width > 0.0 {
            (((l - lo) / width).ceil() as isize - 1).clamp(0, bins as isize - 1) as usize
        } else {
            0
        };
        for (s, series) in values.iter().enumerate() {
            let v = series[i];
            if v.is_finite() {
                sums[b][s].0 += v;
                sums[b][s].1 += 1;
            }
        }
    }

    Ok(sums
        .into_iter()
        .enumerate()
        .filter_map(|(b, acc)| {
            let means: Vec<f64> = acc
                .iter()
                .map(|(sum, n)| if *n == 0 { f64::NAN } else { sum / *n as f64 })
                .collect();
            if means.iter().any(|m| !m.is_finite()) {
                return None;
            }
            Some(LogBin {
                left: (lo + width * b as f64).exp(),
                right: (lo + width * (b + 1) as f64).exp(),
                means,
            })
        })
        .collect())
}

/// `n + 1` evenly spaced edges covering `[lo, hi]`.
pub fn linear_edges(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let n = n.max(1);
    (0..=n)
        .map(|i| lo + (hi - lo) * i as f64 / n as f64)
        .collect()
}

/// Drop every log-time edge below `min_time` except the lowest one, merging
/// those bins into the first bin.
pub fn merge_low_edges(log_edges: &[f64], min_time: f64) -> Vec<f64> {
    let mut edges: Vec<f64> = log_edges.iter().take(1).copied().collect();
    edges.extend(log_edges.iter().skip(1).copied().filter(|e| e.exp() >= min_time));
    edges
}

/// Weighted histogram over explicit edges, numpy-style: bins are half-open
/// except the last, and values outside the edges are ignored. With `density`
/// the result integrates to one over the edges.
pub fn weighted_histogram(values: &[f64], weights: &[f64], edges: &[f64], density: bool) -> Result<Vec<f64>> {
    check_lengths(values, weights)?;
    if edges.len() < 2 {
        return Ok(Vec::new());
    }
    let n = edges.len() - 1;
    let last = edges[n];
    let mut counts = vec![0.0; n];
    for (v, w) in values.iter().zip(weights) {
        if !v.is_finite() || *v < edges[0] || *v > last {
            continue;
        }
        let b = if *v == last {
            n - 1
        } else {
            edges.partition_point(|e| e <= v).saturating_sub(1).min(n - 1)
        };
        counts[b] += w;
    }
    if density {
        let total: f64 = counts.iter().sum();
        for (c, pair) in counts.iter_mut().zip(edges.windows(2)) {
            *c /= total * (pair[1] - pair[0]);
        }
    }
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Hexagonal binning
// ---------------------------------------------------------------------------

/// One occupied hexagon; `center` is in the binning (transformed) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hexagon {
    pub center: (f64, f64),
    pub count: usize,
}

/// Hexagonal grid laid over a rectangle, `gridsize` hexagons across.
#[derive(Debug, Clone, PartialEq)]
pub struct HexGrid {
    pub cells: Vec<Hexagon>,
    /// Horizontal and vertical spacing of the grid.
    pub step: (f64, f64),
}

impl HexGrid {
    /// Vertices of the hexagon around `center`.
    pub fn vertices(&self, center: (f64, f64)) -> [(f64, f64); 6] {
        let (sx, sy) = (self.step.0, self.step.1 / 3.0);
        [(0.5, -0.5), (0.5, 0.5), (0.0, 1.0), (-0.5, 0.5), (-0.5, -0.5), (0.0, -1.0)]
            .map(|(dx, dy)| (center.0 + dx * sx, center.1 + dy * sy))
    }

    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

/// Bin points into two interleaved rectangular lattices that together form a
/// hexagonal tiling; each point goes to the nearer lattice centre. Points
/// outside `x_range`/`y_range` are ignored.
pub fn hexbin(points: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64), gridsize: usize) -> HexGrid {
    let nx = gridsize.max(1) as f64;
    let ny = (nx / 3f64.sqrt()).floor().max(1.0);
    let sx = (x_range.1 - x_range.0) / nx;
    let sy = (y_range.1 - y_range.0) / ny;
    let mut counts: BTreeMap<(i64, i64, bool), usize> = BTreeMap::new();
    if sx <= 0.0 || sy <= 0.0 {
        return HexGrid {
            cells: Vec::new(),
            step: (sx, sy),
        };
    }
    for &(x, y) in points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        if x < x_range.0 || x > x_range.1 || y < y_range.0 || y > y_range.1 {
            continue;
        }
        let ix = (x - x_range.0) / sx;
        let iy = (y - y_range.0) / sy;
        let (ix1, iy1) = (ix.round(), iy.round());
        let (ix2, iy2) = (ix.floor(), iy.floor());
        let d1 = (ix - ix1).powi(2) + 3.0 * (iy - iy1).powi(2);
        let d2 = (ix - ix2 - 0.5).powi(2) + 3.0 * (iy - iy2 - 0.5).powi(2);
        let key = if d1 < d2 {
            (ix1 as i64, iy1 as i64, false)
        } else {
            (ix2 as i64, iy2 as i64, true)
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    let cells = counts
        .into_iter()
        .map(|((i, j, offset), count)| {
            let shift = if offset { 0.5 } else { 0.0 };
            Hexagon {
                center: (
                    x_range.0 + (i as f64 + shift) * sx,
                    y_range.0 + (j as f64 + shift) * sy,
                ),
                count,
            }
        })
        .collect();
    HexGrid {
        cells,
        step: (sx, sy),
    }
}

// ---------------------------------------------------------------------------
// Matrices and clustering
// ---------------------------------------------------------------------------

/// Copy of a square matrix with the lower triangle mirrored into the upper one.
pub fn symmetrize(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = matrix.len();
    if let Some(row) = matrix.iter().find(|r| r.len() != n) {
        return Err(FigureError::LengthMismatch { x: n, y: row.len() });
    }
    let mut out = matrix.to_vec();
    for i in 0..n {
        for j in (i + 1)..n {
            out[i][j] = matrix[j][i];
        }
    }
    Ok(out)
}

/// Euclidean distances between the rows of `data`.
pub fn row_distances(data: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut dist = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = data[i]
                .iter()
                .zip(&data[j])
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }
    dist
}

/// One agglomeration step. Leaves are `0..n`; the cluster formed by merge `k`
/// has id `n + k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    pub leaves: usize,
    pub merges: Vec<Merge>,
}

impl Dendrogram {
    /// Leaf order from a left-first traversal of the tree.
    pub fn order(&self) -> Vec<usize> {
        if self.leaves == 0 {
            return Vec::new();
        }
        let Some(root) = self.merges.len().checked_sub(1) else {
            return vec![0];
        };
        let mut out = Vec::with_capacity(self.leaves);
        let mut stack = vec![self.leaves + root];
        while let Some(node) = stack.pop() {
            if node < self.leaves {
                out.push(node);
            } else {
                let m = self.merges[node - self.leaves];
                stack.push(m.right);
                stack.push(m.left);
            }
        }
        out
    }
}

/// Average-linkage (UPGMA) clustering of a distance matrix.
pub fn average_linkage(dist: &[Vec<f64>]) -> Dendrogram {
    let n = dist.len();
    let mut active: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect(); // (id, size)
    let mut d: Vec<Vec<f64>> = dist.to_vec();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    while active.len() > 1 {
        let (mut bi, mut bj, mut best) = (0, 1, f64::INFINITY);
        for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                if d[i][j] < best {
                    best = d[i][j];
                    bi = i;
                    bj = j;
                }
            }
        }
        let (id_i, size_i) = active[bi];
        let (id_j, size_j) = active[bj];
        let size = size_i + size_j;
        merges.push(Merge {
            left: id_i.min(id_j),
            right: id_i.max(id_j),
            height: if best.is_finite() { best } else { 0.0 },
            size,
        });

        // Distances from the merged cluster, written into slot bi.
        for k in 0..active.len() {
            if k == bi || k == bj {
                continue;
            }
            let merged = (d[bi][k] * size_i as f64 + d[bj][k] * size_j as f64) / size as f64;
            d[bi][k] = merged;
            d[k][bi] = merged;
        }
        active[bi] = (n + merges.len() - 1, size);
        active.remove(bj);
        d.remove(bj);
        for row in d.iter_mut() {
            row.remove(bj);
        }
    }

    Dendrogram { leaves: n, merges }
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Fraction of `truth` values strictly inside their `(lower, upper)` interval.
/// NaN when there are no rows.
pub fn coverage(truth: &[f64], lower: &[f64], upper: &[f64]) -> Result<f64> {
    check_lengths(truth, lower)?;
    check_lengths(truth, upper)?;
    if truth.is_empty() {
        return Ok(f64::NAN);
    }
    let inside = truth
        .iter()
        .zip(lower.iter().zip(upper))
        .filter(|(t, (lo, hi))| *t < *hi && *t > *lo)
        .count();
    Ok(inside as f64 / truth.len() as f64)
}

/// Add Gaussian noise with standard deviation `scale` to each value.
pub fn jitter<R: Rng>(values: &[f64], scale: f64, rng: &mut R) -> Vec<f64> {
    values
        .iter()
        .map(|v| {
            let z: f64 = rng.sample(StandardNormal);
            v + z * scale
        })
        .collect()
}

/// Jitter in log space, with noise proportional to the value range.
pub fn log_jitter<R: Rng>(values: &[f64], rng: &mut R) -> Vec<f64> {
    let (lo, hi) = min_max(values);
    let scale = (hi - lo) * 3e-7;
    values
        .iter()
        .map(|v| {
            let z: f64 = rng.sample(StandardNormal);
            (v.ln() + z * scale).exp()
        })
        .collect()
}

/// Minimum and maximum of the finite values, `(NaN, NaN)` if there are none.
pub fn min_max(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if lo > hi {
        (f64::NAN, f64::NAN)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn accuracy_annotations_for_three_mutations() {
        let x = [10.0, 100.0, 1000.0];
        let y = [12.0, 90.0, 1100.0];
        let stats = AccuracyStats::compute(&x, &y).unwrap();
        let expected = (((1.2f64).ln().powi(2) + (0.9f64).ln().powi(2) + (1.1f64).ln().powi(2)) / 3.0).sqrt();
        assert!(close(stats.rmsle, expected));
        assert!(close(stats.bias, 64.0));
        assert!(close(stats.spearman, 1.0));
        let lines = stats.annotations();
        assert_eq!(lines[0], "3 mutations");
        assert_eq!(lines[1], "RMSLE: 0.13");
        assert_eq!(lines[3], "Spearman's ρ: 1.00");
        assert_eq!(lines[4], "Bias:64.00");
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = AccuracyStats::compute(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, FigureError::LengthMismatch { x: 2, y: 1 }));
    }

    #[test]
    fn ties_share_average_rank() {
        assert_eq!(average_ranks(&[3.0, 1.0, 3.0, 2.0]), vec![3.5, 1.0, 3.5, 2.0]);
    }

    #[test]
    fn sci_has_signed_two_digit_exponent() {
        assert_eq!(sci2(0.000123), "1.23E-04");
        assert_eq!(sci2(12345.0), "1.23E+04");
        assert_eq!(sci2(1.0), "1.00E+00");
    }

    #[test]
    fn box_stats_match_numpy_quartiles() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(BoxStats::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn log_bins_report_right_edges() {
        let keys = [1.0, 5.0, 100.0];
        let vals = vec![vec![1.0, 2.0, 3.0]];
        let bins = log_binned_means(&keys, &vals, 2).unwrap();
        assert_eq!(bins.len(), 2);
        assert!(close(bins[0].right, 10.0));
        assert_eq!(bins[0].means, vec![1.5]);
        assert!(close(bins[1].right, 100.0));
        assert_eq!(bins[1].means, vec![3.0]);
    }

    #[test]
    fn histogram_density_integrates_to_one() {
        let edges = linear_edges(0.0, 4.0, 4);
        let hist = weighted_histogram(&[0.5, 1.5, 1.5, 4.0], &[1.0, 1.0, 2.0, 1.0], &edges, true).unwrap();
        let area: f64 = hist.iter().sum();
        assert!(close(area, 1.0));
        assert!(close(hist[1], 0.6));
        assert!(close(hist[3], 0.2));
    }

    #[test]
    fn low_edges_merge_into_first_bin() {
        let edges: Vec<f64> = [1.0f64, 5.0, 10.0, 25.0, 40.0].iter().map(|v| v.ln()).collect();
        let merged = merge_low_edges(&edges, 20.0);
        assert_eq!(merged.len(), 3);
        assert!(close(merged[0], 0.0));
        assert!((merged[1].exp() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn symmetrize_copies_lower_triangle() {
        let m = vec![vec![0.0, 9.0], vec![2.0, 0.0]];
        assert_eq!(symmetrize(&m).unwrap(), vec![vec![0.0, 2.0], vec![2.0, 0.0]]);
        assert!(symmetrize(&[vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn upgma_groups_nearest_first() {
        let d = vec![
            vec![0.0, 1.0, 5.0, 6.0],
            vec![1.0, 0.0, 5.0, 6.0],
            vec![5.0, 5.0, 0.0, 2.0],
            vec![6.0, 6.0, 2.0, 0.0],
        ];
        let tree = average_linkage(&d);
        assert_eq!(tree.merges.len(), 3);
        assert_eq!(tree.merges[0], Merge { left: 0, right: 1, height: 1.0, size: 2 });
        assert_eq!(tree.merges[1], Merge { left: 2, right: 3, height: 2.0, size: 2 });
        assert!(close(tree.merges[2].height, 5.5));
        assert_eq!(tree.order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn hexbin_counts_every_point_once() {
        let pts: Vec<(f64, f64)> = (0..50).map(|i| (i as f64 / 10.0, (i % 7) as f64 / 2.0)).collect();
        let grid = hexbin(&pts, (0.0, 5.0), (0.0, 3.0), 10);
        assert_eq!(grid.cells.iter().map(|c| c.count).sum::<usize>(), 50);
    }

    #[test]
    fn coverage_is_strict() {
        let c = coverage(&[1.0, 2.0, 3.0], &[0.0, 2.0, 0.0], &[2.0, 3.0, 2.0]).unwrap();
        assert!(close(c, 1.0 / 3.0));
    }
}
