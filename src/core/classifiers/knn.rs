use super::argmax;
use crate::domain::model::{FeatureVector, Label, FEATURE_COUNT};
use crate::domain::ports::Classifier;
use crate::utils::error::{PredictError, Result};

/// Brute-force k-nearest-neighbours with uniform votes.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    classes: Vec<Label>,
    k: usize,
    points: Vec<[f64; FEATURE_COUNT]>,
    targets: Vec<usize>,
}

impl KnnClassifier {
    pub fn new(
        classes: Vec<Label>,
        k: usize,
        points: Vec<Vec<f64>>,
        targets: Vec<usize>,
    ) -> Result<Self> {
        let invalid = |message: String| PredictError::InvalidModelError { message };

        if k == 0 {
            return Err(invalid("k must be at least 1".to_string()));
        }
        if points.is_empty() {
            return Err(invalid("knn model has no training points".to_string()));
        }
        if points.len() != targets.len() {
            return Err(invalid(format!(
                "{} points but {} targets",
                points.len(),
                targets.len()
            )));
        }
        if let Some(t) = targets.iter().find(|t| **t >= classes.len()) {
            return Err(invalid(format!(
                "target {} outside class table of {}",
                t,
                classes.len()
            )));
        }

        let points = points
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let width = row.len();
                let row: [f64; FEATURE_COUNT] = row.try_into().map_err(|_| {
                    invalid(format!(
                        "point {} has {} values, expected {}",
                        i, width, FEATURE_COUNT
                    ))
                })?;
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(invalid(format!("point {} has non-finite values", i)));
                }
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            classes,
            k,
            points,
            targets,
        })
    }

    fn squared_distance(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }
}

impl Classifier for KnnClassifier {
    fn algorithm(&self) -> &'static str {
        "knn"
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn predict_class(&self, features: &FeatureVector) -> Result<usize> {
        let query = features.values();
        let mut order: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (Self::squared_distance(p, query), i))
            .collect();
        // Stable, so equidistant points keep training order.
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = vec![0.0; self.classes.len()];
        for (_, i) in order.iter().take(self.k) {
            votes[self.targets[*i]] += 1.0;
        }

        argmax(&votes).ok_or_else(|| PredictError::InferenceError {
            message: "no neighbours voted".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(n: f64, p: f64) -> Vec<f64> {
        vec![n, p, 40.0, 25.0, 80.0, 6.5, 200.0]
    }

    fn model(k: usize) -> KnnClassifier {
        KnnClassifier::new(
            vec![Label::Integer(0), Label::Integer(1)],
            k,
            vec![
                point(0.0, 0.0),
                point(1.0, 0.0),
                point(10.0, 10.0),
                point(11.0, 10.0),
                point(10.0, 11.0),
            ],
            vec![0, 0, 1, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_majority_of_nearest_neighbours() {
        let knn = model(3);
        let near_zero = FeatureVector::new([0.5, 0.2, 40.0, 25.0, 80.0, 6.5, 200.0]);
        let near_ten = FeatureVector::new([10.2, 10.1, 40.0, 25.0, 80.0, 6.5, 200.0]);

        // k=3 near the origin: two class-0 points and one class-1 point.
        assert_eq!(knn.predict_class(&near_zero).unwrap(), 0);
        assert_eq!(knn.predict_class(&near_ten).unwrap(), 1);
    }

    #[test]
    fn test_k_larger_than_training_set_uses_all_points() {
        let knn = model(50);
        let x = FeatureVector::new([0.0, 0.0, 40.0, 25.0, 80.0, 6.5, 200.0]);
        assert_eq!(knn.predict_class(&x).unwrap(), 1);
    }

    #[test]
    fn test_vote_tie_goes_to_lowest_class() {
        // Query sits exactly between one point of each class.
        let knn = KnnClassifier::new(
            vec![Label::Integer(0), Label::Integer(1)],
            2,
            vec![point(0.0, 0.0), point(2.0, 0.0)],
            vec![1, 0],
        )
        .unwrap();
        let x = FeatureVector::new([1.0, 0.0, 40.0, 25.0, 80.0, 6.5, 200.0]);
        assert_eq!(knn.predict_class(&x).unwrap(), 0);
    }

    #[test]
    fn test_rejects_malformed_training_data() {
        let classes = vec![Label::Integer(0)];
        assert!(KnnClassifier::new(classes.clone(), 0, vec![point(0.0, 0.0)], vec![0]).is_err());
        assert!(KnnClassifier::new(classes.clone(), 1, vec![vec![1.0, 2.0]], vec![0]).is_err());
        assert!(KnnClassifier::new(classes.clone(), 1, vec![point(0.0, 0.0)], vec![3]).is_err());
        assert!(KnnClassifier::new(classes, 1, vec![point(0.0, 0.0)], vec![]).is_err());
    }
}
