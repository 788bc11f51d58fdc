/// Root-mean-square of the given residuals; `None` when there are none.
pub fn rmse(errors: impl IntoIterator<Item = f64>) -> Option<f64> {
    super::mean(errors.into_iter().map(|e| e * e)).map(f64::sqrt)
}

/// Mean absolute error over (actual, predicted) pairs.
pub fn mae(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    super::mean(pairs.into_iter().map(|(actual, predicted)| (actual - predicted).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmse() {
        assert_eq!(rmse(vec![3.0, -4.0]), Some((12.5f64).sqrt()));
        assert_eq!(rmse(vec![0.0, 0.0]), Some(0.0));
        assert_eq!(rmse(Vec::new()), None);
    }

    #[test]
    fn test_mae() {
        assert_eq!(mae(vec![(5.0, 4.0), (2.0, 5.0)]), Some(2.0));
        assert_eq!(mae(Vec::new()), None);
    }
}
