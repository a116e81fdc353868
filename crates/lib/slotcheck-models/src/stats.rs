use serde::Deserialize;

/// Which standard deviation to report: over the trials as a whole population (divisor `n`) or
/// as a sample of a larger one (divisor `n - 1`).
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StdDevKind {
    Population,
    #[default]
    Sample,
}

/// Running mean and variance of a metric over a set of trials.
///
/// Values are accumulated with Welford's update, and two accumulators over disjoint trial sets
/// can be merged with the pooled formulas of Chan et al. Merging yields the same statistics
/// as accumulating all the values in one pass, up to floating point error.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeanStd {
    count: u64,
    mean: f64,
    m2: f64,
}

impl MeanStd {
    /// Statistics over the given values. There are none over an empty population.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut stats = MeanStd::default();
        values.into_iter().for_each(|value| stats.push(value));
        if stats.count == 0 {
            return None;
        }
        Some(stats)
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn merge(&self, other: &MeanStd) -> MeanStd {
        if other.count == 0 {
            return *self;
        }
        if self.count == 0 {
            return *other;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let mean = self.mean + delta * other.count as f64 / count as f64;
        let m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64 * other.count as f64) / count as f64;
        MeanStd { count, mean, m2 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn population_std_dev(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some((self.m2 / self.count as f64).max(0.0).sqrt())
    }

    /// Undefined for fewer than two values.
    pub fn sample_std_dev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        Some((self.m2 / (self.count - 1) as f64).max(0.0).sqrt())
    }

    pub fn std_dev(&self, kind: StdDevKind) -> Option<f64> {
        match kind {
            StdDevKind::Population => self.population_std_dev(),
            StdDevKind::Sample => self.sample_std_dev(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn empty_population_has_no_stats() {
        assert_eq!(MeanStd::from_values(Vec::<f64>::new()), None);
    }

    #[test]
    fn mean_and_deviations() {
        let stats = MeanStd::from_values(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < TOLERANCE);
        assert!((stats.population_std_dev().unwrap() - 2.0).abs() < TOLERANCE);
        let sample = (32.0f64 / 7.0).sqrt();
        assert!((stats.sample_std_dev().unwrap() - sample).abs() < TOLERANCE);
    }

    #[test]
    fn single_value() {
        let stats = MeanStd::from_values(vec![3.5]).unwrap();
        assert_eq!(stats.std_dev(StdDevKind::Population), Some(0.0));
        assert_eq!(stats.std_dev(StdDevKind::Sample), None);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let stats = MeanStd::from_values(vec![1.0, 2.0]).unwrap();
        assert_eq!(stats.merge(&MeanStd::default()), stats);
        assert_eq!(MeanStd::default().merge(&stats), stats);
    }
}
