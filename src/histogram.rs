use serde::Serialize;

pub const DEFAULT_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Univariate frequency distribution over equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    pub samples: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning their range. The
    /// last bin is closed on the right. Non-finite values are ignored.
    pub fn from_values<I>(values: I, bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let bins = if bins == 0 { DEFAULT_BINS } else { bins };
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();

        let min = values.iter().copied().reduce(f64::min);
        let max = values.iter().copied().reduce(f64::max);
        let mean = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };

        let (lo, hi) = match (min, max) {
            (Some(lo), Some(hi)) if lo < hi => (lo, hi),
            (Some(v), Some(_)) => (v - 0.5, v + 0.5),
            _ => (0.0, 1.0),
        };

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0u64; bins];
        for v in &values {
            let idx = ((v - lo) / (hi - lo) * bins as f64).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
                count,
            })
            .collect();

        Self {
            bins,
            samples: values.len() as u64,
            min,
            max,
            mean,
        }
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}
