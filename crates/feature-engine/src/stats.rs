//! Window Statistics Computation

/// Mean and sample standard deviation of one window slice
///
/// Missing values are skipped rather than imputed; a window with no valid
/// values has mean 0, and std needs at least two valid values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowStats {
    /// Arithmetic mean of valid values
    pub mean: f64,
    /// Sample (n-1) standard deviation
    pub std_dev: f64,
    /// Number of valid values in the window
    pub valid: usize,
}

impl WindowStats {
    /// Compute stats over a slice of optional values
    pub fn compute(values: &[Option<f64>]) -> Self {
        let valid: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        let n = valid.len();
        if n == 0 {
            return Self::default();
        }

        let mean = valid.iter().sum::<f64>() / n as f64;
        let std_dev = if n >= 2 {
            let m2: f64 = valid.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            mean,
            std_dev,
            valid: n,
        }
    }

    /// Mean of valid values only, 0 when none
    pub fn mean_of(values: &[Option<f64>]) -> f64 {
        Self::compute(values).mean
    }
}
