use serde::Serialize;

use crate::Value;

/// Running statistics over the samples recorded for one metric, segment set and time bucket.
///
/// All fields are `None` until the first sample arrives. After that, `average` is the
/// arithmetic mean of every sample folded in, and `minimum <= average <= maximum`.
///
/// The average is maintained as `((average * (count - 1)) + value) / count`. For short
/// sequences this reproduces the mean exactly. Over very long sequences rounding error
/// accumulates like any floating point running mean; do not expect exact results after
/// billions of samples.
///
/// This type is not synchronized. Callers serialize access, which the
/// [`Aggregator`][crate::Aggregator] does by requiring `&mut` access.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatSet {
    #[serde(rename = "avg_value")]
    average: Option<Value>,

    #[serde(rename = "min_value")]
    minimum: Option<Value>,

    #[serde(rename = "max_value")]
    maximum: Option<Value>,

    #[serde(rename = "sample_count")]
    count: u64,
}

impl StatSet {
    /// Creates an empty set of statistics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            average: None,
            minimum: None,
            maximum: None,
            count: 0,
        }
    }

    /// Folds one sample into the statistics.
    pub fn update(&mut self, value: Value) {
        self.count = self.count.saturating_add(1);

        match (self.average, self.minimum, self.maximum) {
            (Some(average), Some(minimum), Some(maximum)) => {
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "counts beyond 2^52 samples per minute are not a realistic concern"
                )]
                let count = self.count as Value;

                self.average = Some(((average * (count - 1.0)) + value) / count);
                self.minimum = Some(minimum.min(value));
                self.maximum = Some(maximum.max(value));
            }
            _ => {
                self.average = Some(value);
                self.minimum = Some(value);
                self.maximum = Some(value);
            }
        }
    }

    /// Mean of all samples, or `None` if there have been none.
    #[must_use]
    pub fn average(&self) -> Option<Value> {
        self.average
    }

    /// Smallest sample, or `None` if there have been none.
    #[must_use]
    pub fn minimum(&self) -> Option<Value> {
        self.minimum
    }

    /// Largest sample, or `None` if there have been none.
    #[must_use]
    pub fn maximum(&self) -> Option<Value> {
        self.maximum
    }

    /// Number of samples folded in.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether no samples have been folded in yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::float_cmp,
        reason = "exact equality is the property under test for short sequences"
    )]

    use super::*;

    fn fold(values: &[Value]) -> StatSet {
        let mut stats = StatSet::new();

        for &value in values {
            stats.update(value);
        }

        stats
    }

    #[test]
    fn new_is_empty() {
        let stats = StatSet::new();

        assert!(stats.is_empty());
        assert_eq!(stats.average(), None);
        assert_eq!(stats.minimum(), None);
        assert_eq!(stats.maximum(), None);
        assert_eq!(stats.count(), 0);
        assert_eq!(stats, StatSet::default());
    }

    #[test]
    fn update_empty() {
        let stats = fold(&[9.1]);

        assert_eq!(stats.average(), Some(9.1));
        assert_eq!(stats.minimum(), Some(9.1));
        assert_eq!(stats.maximum(), Some(9.1));
        assert_eq!(stats.count(), 1);
    }

    #[test]
    fn update_not_empty() {
        let stats = fold(&[9.1, 91.11]);

        assert_eq!(stats.average(), Some((9.1 + 91.11) / 2.0));
        assert_eq!(stats.minimum(), Some(9.1));
        assert_eq!(stats.maximum(), Some(91.11));
        assert_eq!(stats.count(), 2);
    }

    #[test]
    fn update_not_empty_multiple() {
        let stats = fold(&[9.1, 91.11, 12.11]);

        assert_eq!(stats.average(), Some((9.1 + 91.11 + 12.11) / 3.0));
        assert_eq!(stats.minimum(), Some(9.1));
        assert_eq!(stats.maximum(), Some(91.11));
        assert_eq!(stats.count(), 3);
    }

    #[test]
    fn update_negative() {
        let stats = fold(&[9.1, -23.1]);

        assert_eq!(stats.average(), Some((9.1 - 23.1) / 2.0));
        assert_eq!(stats.minimum(), Some(-23.1));
        assert_eq!(stats.maximum(), Some(9.1));
        assert_eq!(stats.count(), 2);
    }

    #[test]
    fn longer_sequence_matches_mean() {
        let values: Vec<Value> = (0..1000_i32)
            .map(|i| f64::from(i % 17) * 1.5 - 7.25)
            .collect();

        let stats = fold(&values);

        #[expect(clippy::cast_precision_loss, reason = "small test counts")]
        let expected_mean = values.iter().sum::<Value>() / values.len() as Value;

        assert!((stats.average().unwrap() - expected_mean).abs() < 1e-9);
        assert_eq!(stats.minimum(), Some(-7.25));
        assert_eq!(stats.maximum(), Some(16.0 * 1.5 - 7.25));
        assert_eq!(stats.count(), 1000);
    }

    #[test]
    fn average_stays_between_extremes() {
        let stats = fold(&[-3.0, 100.0, 0.5, 42.0, -17.75]);

        let average = stats.average().unwrap();
        assert!(stats.minimum().unwrap() <= average);
        assert!(average <= stats.maximum().unwrap());
    }

    #[test]
    fn serializes_with_wire_names() {
        let stats = fold(&[1.0, 3.0]);

        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "avg_value": 2.0,
                "min_value": 1.0,
                "max_value": 3.0,
                "sample_count": 2,
            })
        );
    }
}
