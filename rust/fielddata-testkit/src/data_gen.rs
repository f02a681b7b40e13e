//! Seeded generators of document values.

use std::ops::RangeInclusive;

/// Shape of the generated documents.
#[derive(Clone, Debug)]
pub struct ValueDistribution {
    /// Range the values are drawn from.
    pub range: RangeInclusive<i64>,
    /// Fraction of documents without any value.
    pub missing_ratio: f64,
    /// Fraction of documents (among those with values) holding more than one value.
    pub multi_ratio: f64,
    /// Upper bound on the number of values of a multi-valued document.
    pub max_values_per_doc: usize,
    /// When set, values are drawn from a pool of this many distinct values.
    pub cardinality: Option<usize>,
}

impl Default for ValueDistribution {
    fn default() -> Self {
        ValueDistribution {
            range: i64::MIN..=i64::MAX,
            missing_ratio: 0.0,
            multi_ratio: 0.0,
            max_values_per_doc: 4,
            cardinality: None,
        }
    }
}

impl ValueDistribution {
    pub fn with_range(mut self, range: RangeInclusive<i64>) -> Self {
        self.range = range;
        self
    }

    pub fn with_missing_ratio(mut self, ratio: f64) -> Self {
        self.missing_ratio = ratio;
        self
    }

    pub fn with_multi_ratio(mut self, ratio: f64) -> Self {
        self.multi_ratio = ratio;
        self
    }

    pub fn with_cardinality(mut self, cardinality: usize) -> Self {
        self.cardinality = Some(cardinality);
        self
    }
}

/// Generates `count` documents; the same seed always yields the same documents.
pub fn generate_docs(seed: u64, count: usize, distribution: &ValueDistribution) -> Vec<Vec<i64>> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let pool = distribution.cardinality.map(|cardinality| {
        assert!(cardinality > 0);
        (0..cardinality)
            .map(|_| rng.i64(distribution.range.clone()))
            .collect::<Vec<_>>()
    });

    let mut next_value = |rng: &mut fastrand::Rng| match &pool {
        Some(pool) => pool[rng.usize(..pool.len())],
        None => rng.i64(distribution.range.clone()),
    };

    (0..count)
        .map(|_| {
            if rng.f64() < distribution.missing_ratio {
                return Vec::new();
            }
            let num_values = if distribution.max_values_per_doc > 1
                && rng.f64() < distribution.multi_ratio
            {
                rng.usize(2..=distribution.max_values_per_doc)
            } else {
                1
            };
            (0..num_values).map(|_| next_value(&mut rng)).collect()
        })
        .collect()
}
