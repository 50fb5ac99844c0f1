//! Label Rescaling

use ndarray::Array1;
use tracing::debug;

use crate::DatasetError;

/// Rescale a binary label column to {0, 1} via min-max over the observed
/// sample.
///
/// The raw files encode the classes as 1/2; min-max maps whatever two
/// values are present onto exactly 0.0 and 1.0. Anything other than two
/// distinct values is rejected rather than silently producing NaN.
pub fn rescale_binary_labels(labels: &Array1<f64>) -> Result<Array1<f64>, DatasetError> {
    let mut distinct: Vec<f64> = Vec::with_capacity(2);
    for &v in labels {
        if !distinct.iter().any(|&d| d == v) {
            distinct.push(v);
        }
        if distinct.len() > 2 {
            break;
        }
    }
    if distinct.len() != 2 {
        return Err(DatasetError::DegenerateLabels {
            distinct: distinct.len(),
        });
    }

    let min = distinct[0].min(distinct[1]);
    let max = distinct[0].max(distinct[1]);
    debug!("Rescaling labels: {} -> 0.0, {} -> 1.0", min, max);

    Ok(labels.mapv(|v| (v - min) / (max - min)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_maps_extremes_exactly() {
        let labels = Array1::from_vec(vec![2.0, 1.0, 1.0, 2.0, 1.0]);
        let rescaled = rescale_binary_labels(&labels).unwrap();
        assert_eq!(rescaled.as_slice().unwrap(), &[1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rescale_arbitrary_encoding() {
        let labels = Array1::from_vec(vec![-3.0, 5.0, -3.0]);
        let rescaled = rescale_binary_labels(&labels).unwrap();
        assert_eq!(rescaled.as_slice().unwrap(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_single_class_rejected() {
        let labels = Array1::from_vec(vec![1.0, 1.0, 1.0]);
        assert!(matches!(
            rescale_binary_labels(&labels),
            Err(DatasetError::DegenerateLabels { distinct: 1 })
        ));
    }

    #[test]
    fn test_three_classes_rejected() {
        let labels = Array1::from_vec(vec![0.0, 1.0, 2.0]);
        assert!(matches!(
            rescale_binary_labels(&labels),
            Err(DatasetError::DegenerateLabels { distinct: 3 })
        ));
    }

}
