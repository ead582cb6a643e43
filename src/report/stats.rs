//! Elementary aggregation over `f64` samples.
//!
//! Every function ignores non-finite values, so an institution with an
//! undefined acceptance rate drops out of a statistic instead of poisoning it.

use std::cmp::Ordering;

fn finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values.into_iter().filter(|v| v.is_finite()).collect()
}

fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut v = finite(values);
    v.sort_by(f64::total_cmp);
    v
}

/// Arithmetic mean, `None` without any finite value.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let v = finite(values);
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: impl IntoIterator<Item = f64>, q: f64) -> Option<f64> {
    quantile_sorted(&sorted_finite(values), q)
}

fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Keep the pairs where both sides are finite.
fn finite_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Vec<(f64, f64)> {
    pairs
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

/// Pearson correlation coefficient.
///
/// `None` with fewer than two pairs or when either side has zero variance.
pub fn pearson(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let pairs = finite_pairs(pairs);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    (denom > 0.0).then(|| sxy / denom)
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_fit(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<LinearFit> {
    let pairs = finite_pairs(pairs);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let sxy: f64 = pairs.iter().map(|(x, y)| (x - mx) * (y - my)).sum();
    let sxx: f64 = pairs.iter().map(|(x, _)| (x - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

/// Box-and-whisker summary (Tukey whiskers at 1.5 IQR).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

impl BoxSummary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let sorted = sorted_finite(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        // Whiskers reach the most extreme samples still inside the fences.
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|v| *v >= lo_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= hi_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
            count: sorted.len(),
        })
    }
}

/// One histogram bin covering `[start, start + width)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        self.start + self.width / 2.0
    }
}

/// Upper bound on the number of histogram bins.
pub const MAX_BINS: usize = 200;

/// Bin starts of equal width, beginning at the sample minimum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinLayout {
    pub starts: Vec<f64>,
    pub width: f64,
}

impl BinLayout {
    /// Bins of `width` from `min` covering `max` inclusively. When that would
    /// take more than [`MAX_BINS`] bins, the bins are widened to fit.
    pub fn new(min: f64, max: f64, width: f64) -> Self {
        let span = max - min;
        if !(span.is_finite() && span >= 0.0 && width.is_finite() && width > 0.0) {
            return Self::default();
        }
        let width = if span / width >= MAX_BINS as f64 {
            span / (MAX_BINS - 1) as f64
        } else {
            width
        };
        let n = ((span / width).floor() as usize + 1).min(MAX_BINS);
        BinLayout {
            starts: (0..n).map(|i| min + i as f64 * width).collect(),
            width,
        }
    }
}

/// Count `values` into the bins of `layout`. The last bin is closed so the
/// maximum is counted.
pub fn histogram(values: impl IntoIterator<Item = f64>, layout: &BinLayout) -> Vec<Bin> {
    let width = layout.width;
    let mut bins: Vec<Bin> = layout
        .starts
        .iter()
        .map(|&start| Bin {
            start,
            width,
            count: 0,
        })
        .collect();
    let Some(first) = layout.starts.first().copied() else {
        return bins;
    };
    let last = bins.len() - 1;
    for v in finite(values) {
        if v < first {
            continue;
        }
        let idx = ((v - first) / width).floor() as usize;
        if idx <= last {
            bins[idx].count += 1;
        } else if v <= bins[last].start + width * (1.0 + 1e-9) {
            bins[last].count += 1;
        }
    }
    bins
}

/// Ordering that puts non-finite values after every finite one.
pub fn cmp_finite_first(a: f64, b: f64, descending: bool) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) if descending => b.total_cmp(&a),
        (true, true) => a.total_cmp(&b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
