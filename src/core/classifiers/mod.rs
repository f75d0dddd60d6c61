//! Inference-only estimators rebuilt from scikit-learn JSON exports.

pub mod forest;
pub mod knn;
pub mod tree;

pub use forest::RandomForestClassifier;
pub use knn::KnnClassifier;
pub use tree::{DecisionTreeClassifier, TreeData};

/// Index of the largest value; the first one wins on ties, matching numpy's argmax.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::argmax;

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[0.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
