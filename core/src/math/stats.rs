pub struct StatsHelper;

impl StatsHelper {
    /// Difference between the strongest and weakest reading, 0 when empty.
    pub fn spread(values: &[i32]) -> i32 {
        match (values.iter().max(), values.iter().min()) {
            (Some(max), Some(min)) => max.saturating_sub(*min),
            _ => 0,
        }
    }

    pub fn mean(values: &[i32]) -> f32 {
        if values.is_empty() {
            return 0.0;
        }
        let sum: i64 = values.iter().map(|&v| v as i64).sum();
        sum as f32 / values.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_empty_sequence_yields_zero() {
        assert_eq!(StatsHelper::spread(&[]), 0);
        assert_eq!(StatsHelper::spread(&[-42]), 0);
    }

    #[test]
    fn spread_spans_extremes() {
        assert_eq!(StatsHelper::spread(&[-45, -80, -50, -55]), 35);
    }

    #[test]
    fn spread_saturates_on_extreme_readings() {
        assert_eq!(StatsHelper::spread(&[i32::MAX, i32::MIN]), i32::MAX);
    }

    #[test]
    fn mean_handles_single_value() {
        assert_eq!(StatsHelper::mean(&[-60]), -60.0);
        assert_eq!(StatsHelper::mean(&[]), 0.0);
    }
}
