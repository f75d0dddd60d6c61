use super::argmax;
use super::tree::{DecisionTree, TreeData};
use crate::domain::model::{FeatureVector, Label};
use crate::domain::ports::Classifier;
use crate::utils::error::{PredictError, Result};

/// Soft-voting ensemble: leaf distributions are normalised per tree, averaged, and the
/// most probable class wins.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    classes: Vec<Label>,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn new(classes: Vec<Label>, estimators: Vec<TreeData>) -> Result<Self> {
        if estimators.is_empty() {
            return Err(PredictError::InvalidModelError {
                message: "random forest has no estimators".to_string(),
            });
        }
        let trees = estimators
            .into_iter()
            .map(|data| DecisionTree::from_data(data, classes.len()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { classes, trees })
    }

    pub fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf_value(features);
            let total: f64 = leaf.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }
}

impl Classifier for RandomForestClassifier {
    fn algorithm(&self) -> &'static str {
        "random_forest"
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn predict_class(&self, features: &FeatureVector) -> Result<usize> {
        argmax(&self.predict_proba(features)).ok_or_else(|| PredictError::InferenceError {
            message: "empty class distribution".to_string(),
        })
    }
}
