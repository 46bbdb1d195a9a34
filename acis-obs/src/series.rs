use ndarray::{s, Array1, ArrayView1};

use crate::error::{Result, ThermalCheckError};

/// A temperature trace sampled at strictly increasing mission times.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSeries {
    times: Array1<f64>,
    values: Array1<f64>,
}

impl TemperatureSeries {
    /// Build a series, checking that both arrays have the same length and
    /// that times strictly increase. Times are stored contiguously.
    pub fn new(times: Array1<f64>, values: Array1<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(ThermalCheckError::SeriesLengthMismatch {
                name: "values",
                expected: times.len(),
                actual: values.len(),
            });
        }
        for (index, pair) in times.windows(2).into_iter().enumerate() {
            if pair[1] <= pair[0] {
                return Err(ThermalCheckError::NonIncreasingTimes {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        let times = if times.is_standard_layout() {
            times
        } else {
            times.as_standard_layout().into_owned()
        };
        Ok(Self { times, values })
    }

    pub fn from_vecs(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Self::new(Array1::from(times), Array1::from(values))
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    fn time_slice(&self) -> &[f64] {
        // `new` always stores times in standard layout
        self.times.as_slice().unwrap_or(&[])
    }

    /// Index of the first sample at or after `t`.
    fn lower_bound(&self, t: f64) -> usize {
        self.time_slice().partition_point(|&time| time < t)
    }

    /// Index one past the last sample at or before `t`.
    fn upper_bound(&self, t: f64) -> usize {
        self.time_slice().partition_point(|&time| time <= t)
    }

    /// Times and values of samples with `start <= t <= stop`.
    pub fn window(&self, start: f64, stop: f64) -> (ArrayView1<'_, f64>, ArrayView1<'_, f64>) {
        let lo = self.lower_bound(start);
        let hi = self.upper_bound(stop).max(lo);
        (
            self.times.slice(s![lo..hi]),
            self.values.slice(s![lo..hi]),
        )
    }

    /// Mask selecting samples at or after `t`.
    pub fn mask_from(&self, t: f64) -> Array1<bool> {
        self.times.mapv(|time| time >= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    #[test]
    fn test_rejects_length_mismatch() {
        let err = TemperatureSeries::from_vecs(vec![0.0, 1.0], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            ThermalCheckError::SeriesLengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_increasing_times() {
        let err = TemperatureSeries::from_vecs(vec![0.0, 1.0, 1.0], vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            ThermalCheckError::NonIncreasingTimes { index: 2, .. }
        ));
    }

    #[test]
    fn test_window_is_inclusive() {
        let series =
            TemperatureSeries::from_vecs(vec![0.0, 10.0, 20.0, 30.0, 40.0], vec![0.0; 5]).unwrap();
        let (times, _) = series.window(10.0, 30.0);
        assert_eq!(times.to_vec(), vec![10.0, 20.0, 30.0]);

        let (times, _) = series.window(5.0, 25.0);
        assert_eq!(times.to_vec(), vec![10.0, 20.0]);

        let (times, _) = series.window(41.0, 50.0);
        assert!(times.is_empty());

        let (times, _) = series.window(30.0, 10.0);
        assert!(times.is_empty());
    }

    #[test]
    fn test_window_on_reversed_storage() {
        let mut times = array![40.0, 30.0, 20.0, 10.0, 0.0];
        times.invert_axis(Axis(0));
        let values = Array1::linspace(0.0, 4.0, 5);
        let series = TemperatureSeries::new(times, values).unwrap();
        let (times, values) = series.window(10.0, 30.0);
        assert_eq!(times.to_vec(), vec![10.0, 20.0, 30.0]);
        assert_eq!(values.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mask_from() {
        let series = TemperatureSeries::from_vecs(vec![0.0, 10.0, 20.0], vec![0.0; 3]).unwrap();
        assert_eq!(series.mask_from(10.0).to_vec(), vec![false, true, true]);
    }
}
